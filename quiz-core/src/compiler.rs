//! Query Compiler
//!
//! Translates a tag-search AST into a parameterized SQLite predicate over
//! the `questions` table (aliased `q`). Each tag leaf becomes a semi-join
//! against the `tags` table:
//!
//! ```sql
//! EXISTS (SELECT 1 FROM tags t WHERE t.question_id = q.id AND t.tag = ?)  -- Tag
//! (<a> AND <b>)                                                           -- And
//! (<a> OR <b>)                                                            -- Or
//! NOT (<a>)                                                               -- Not
//! ```
//!
//! Tag literals are always bound as parameters, never embedded in the
//! clause text.

use quiz_types::TagQuery;

const TAG_EXISTS: &str = "EXISTS (SELECT 1 FROM tags t WHERE t.question_id = q.id AND t.tag = ?)";
const ALWAYS_TRUE: &str = "1=1";
const ALWAYS_FALSE: &str = "1=0";

/// Tag-search AST to SQL translator.
pub struct QueryCompiler;

/// A compiled predicate with `?` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPredicate {
    /// The WHERE clause (without the `WHERE` keyword).
    pub clause: String,
    /// Tag values for the placeholders, in order.
    pub params: Vec<String>,
}

impl CompiledPredicate {
    /// Full statement selecting matching question ids in ascending order.
    pub fn select_ids(&self) -> String {
        format!(
            "SELECT q.id FROM questions q WHERE {} ORDER BY q.id",
            self.clause
        )
    }

    /// The clause with SQL-escaped inline literals.
    ///
    /// For logging only. Never execute the result.
    pub fn render_inline(&self) -> String {
        let mut params = self.params.iter();
        let mut result = String::with_capacity(self.clause.len());
        for c in self.clause.chars() {
            if c == '?' {
                if let Some(param) = params.next() {
                    result.push('\'');
                    result.push_str(&param.replace('\'', "''"));
                    result.push('\'');
                    continue;
                }
            }
            result.push(c);
        }
        result
    }
}

impl QueryCompiler {
    /// Compile an AST into a parameterized predicate.
    pub fn compile(query: &TagQuery) -> CompiledPredicate {
        let mut params = Vec::new();
        let clause = Self::compile_node(query, &mut params);
        CompiledPredicate { clause, params }
    }

    /// Compile with SQL-escaped inline literals.
    ///
    /// For logging only. Never execute the result.
    pub fn render_inline(query: &TagQuery) -> String {
        Self::compile(query).render_inline()
    }

    fn compile_node(node: &TagQuery, params: &mut Vec<String>) -> String {
        match node {
            TagQuery::Tag(tag) => {
                params.push(tag.clone());
                TAG_EXISTS.to_string()
            }
            TagQuery::And(children) => Self::join(children, " AND ", ALWAYS_TRUE, params),
            TagQuery::Or(children) => Self::join(children, " OR ", ALWAYS_FALSE, params),
            TagQuery::Not(inner) => format!("NOT ({})", Self::compile_node(inner, params)),
        }
    }

    fn join(
        children: &[TagQuery],
        separator: &str,
        empty: &str,
        params: &mut Vec<String>,
    ) -> String {
        let parts: Vec<String> = children
            .iter()
            .map(|child| Self::compile_node(child, params))
            .collect();
        match parts.len() {
            0 => empty.to_string(),
            1 => parts[0].clone(),
            _ => format!("({})", parts.join(separator)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_tag() {
        let compiled = QueryCompiler::compile(&TagQuery::tag("math"));
        assert_eq!(compiled.clause, TAG_EXISTS);
        assert_eq!(compiled.params, vec!["math"]);
    }

    #[test]
    fn and_uses_one_semi_join_per_tag() {
        let compiled = QueryCompiler::compile(&TagQuery::all_of(["a", "b"]));
        assert_eq!(compiled.clause, format!("({TAG_EXISTS} AND {TAG_EXISTS})"));
        assert_eq!(compiled.params, vec!["a", "b"]);
    }

    #[test]
    fn or_and_not() {
        let query = TagQuery::tag("a").or(TagQuery::tag("b").not());
        let compiled = QueryCompiler::compile(&query);
        assert_eq!(
            compiled.clause,
            format!("({TAG_EXISTS} OR NOT ({TAG_EXISTS}))")
        );
        assert_eq!(compiled.params, vec!["a", "b"]);
    }

    #[test]
    fn empty_and_or() {
        assert_eq!(QueryCompiler::compile(&TagQuery::And(vec![])).clause, "1=1");
        assert_eq!(QueryCompiler::compile(&TagQuery::Or(vec![])).clause, "1=0");
        assert!(QueryCompiler::compile(&TagQuery::Or(vec![])).params.is_empty());
    }

    #[test]
    fn literals_never_inlined() {
        let hostile = "x' OR 1=1 --";
        let compiled = QueryCompiler::compile(&TagQuery::tag(hostile));
        assert!(!compiled.clause.contains(hostile));
        assert_eq!(compiled.params, vec![hostile]);
    }

    #[test]
    fn deterministic() {
        let query = TagQuery::tag("a")
            .and(TagQuery::tag("b").or(TagQuery::tag("c")))
            .and(TagQuery::tag("d").not());
        assert_eq!(QueryCompiler::compile(&query), QueryCompiler::compile(&query));
    }

    #[test]
    fn inline_rendering_escapes_quotes() {
        let rendered = QueryCompiler::render_inline(&TagQuery::tag("it's"));
        assert!(rendered.contains("t.tag = 'it''s'"));
        assert!(!rendered.contains('?'));
    }

    #[test]
    fn compiled_predicate_renders_inline() {
        let query = TagQuery::all_of(["O'Brien", "why?"]);
        let rendered = QueryCompiler::compile(&query).render_inline();

        assert!(rendered.contains("t.tag = 'O''Brien'"));
        assert!(rendered.contains("t.tag = 'why?'"));
        assert_eq!(rendered.matches("t.tag = '").count(), 2);
        assert_eq!(rendered, QueryCompiler::render_inline(&query));
    }

    #[test]
    fn select_ids_orders_by_id() {
        let sql = QueryCompiler::compile(&TagQuery::tag("a")).select_ids();
        assert!(sql.starts_with("SELECT q.id FROM questions q WHERE EXISTS"));
        assert!(sql.ends_with("ORDER BY q.id"));
    }
}
