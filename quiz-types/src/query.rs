//! Tag-search expression tree.
//!
//! The tree is produced by an external parser; quizsync only consumes it.
//! The query-string rendering below is the canonical text the search
//! endpoint receives when a caller holds an AST but no original text.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A parsed tag-search expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TagQuery {
    /// Matches questions carrying this tag.
    Tag(String),
    /// Matches when every child matches.
    And(Vec<TagQuery>),
    /// Matches when any child matches.
    Or(Vec<TagQuery>),
    /// Matches when the child does not.
    Not(Box<TagQuery>),
}

impl TagQuery {
    /// A single tag-equality leaf.
    pub fn tag(tag: impl Into<String>) -> Self {
        Self::Tag(tag.into())
    }

    /// Combine with another expression using AND.
    ///
    /// Nested ANDs are flattened.
    pub fn and(self, other: TagQuery) -> Self {
        match self {
            Self::And(mut children) => {
                children.push(other);
                Self::And(children)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Combine with another expression using OR.
    ///
    /// Nested ORs are flattened.
    pub fn or(self, other: TagQuery) -> Self {
        match self {
            Self::Or(mut children) => {
                children.push(other);
                Self::Or(children)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Negate this expression.
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// AND of all the given tags.
    pub fn all_of<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::And(tags.into_iter().map(|t| Self::Tag(t.into())).collect())
    }

    /// OR of all the given tags.
    pub fn any_of<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Or(tags.into_iter().map(|t| Self::Tag(t.into())).collect())
    }

    /// Every tag literal in the expression, left to right.
    pub fn tags(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_tags(&mut out);
        out
    }

    fn collect_tags<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Tag(t) => out.push(t),
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_tags(out);
                }
            }
            Self::Not(inner) => inner.collect_tags(out),
        }
    }

    fn is_composite(&self) -> bool {
        matches!(self, Self::And(c) | Self::Or(c) if c.len() > 1)
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_composite() {
            write!(f, "({self})")
        } else {
            write!(f, "{self}")
        }
    }
}

impl fmt::Display for TagQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tag(tag) => {
                if !tag.is_empty() && tag.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    f.write_str(tag)
                } else {
                    write!(f, "\"{}\"", tag.replace('\\', "\\\\").replace('"', "\\\""))
                }
            }
            Self::And(children) | Self::Or(children) => {
                let sep = if matches!(self, Self::And(_)) { " * " } else { " + " };
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(sep)?;
                    }
                    child.fmt_child(f)?;
                }
                Ok(())
            }
            Self::Not(inner) => {
                f.write_str("-")?;
                inner.fmt_child(f)
            }
        }
    }
}

/// An active search: the parsed tree plus the text sent to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Parsed expression, used for local cache lookups.
    pub ast: TagQuery,
    /// Query string, sent verbatim to the search endpoint.
    pub text: String,
}

impl SearchQuery {
    /// Pair an AST with the text it was parsed from.
    pub fn new(ast: TagQuery, text: impl Into<String>) -> Self {
        Self {
            ast,
            text: text.into(),
        }
    }

    /// Build a query whose text is the canonical rendering of the AST.
    pub fn from_ast(ast: TagQuery) -> Self {
        let text = ast.to_string();
        Self { ast, text }
    }
}
