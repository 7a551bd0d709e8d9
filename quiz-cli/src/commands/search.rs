//! Page through questions matching tags.

use anyhow::Result;
use quiz_client::{Notification, ProxyState};
use quiz_types::{SearchQuery, TagQuery};

use super::{format_question, open, Options};
use crate::config::Settings;

/// Build the search query for `tags`.
pub fn build_query(tags: &[String], any: bool) -> SearchQuery {
    let ast = if let [tag] = tags {
        TagQuery::tag(tag.as_str())
    } else if any {
        TagQuery::any_of(tags)
    } else {
        TagQuery::all_of(tags)
    };
    SearchQuery::from_ast(ast)
}

/// Run the search command.
pub async fn run(
    settings: &Settings,
    options: &Options,
    tags: &[String],
    any: bool,
    limit: usize,
) -> Result<()> {
    let (mut proxy, _events) = open(settings, options).await?;
    let query = build_query(tags, any);
    println!("Searching: {}", query.text);
    proxy.set_query(query);

    let mut shown = 0;
    while shown < limit {
        match proxy.get_question().await {
            Notification::QuestionReady(question) => {
                shown += 1;
                print!("{}", format_question(&question));
            }
            Notification::NothingAvailable(kind) => {
                if shown == 0 {
                    println!("No question available: {kind}");
                }
                break;
            }
            other => tracing::debug!(?other, "unexpected outcome"),
        }
        // Back in NORMAL means the results are exhausted.
        if proxy.state() == ProxyState::Normal {
            break;
        }
    }

    println!("{shown} question(s)");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_tags_by_default() {
        let tags = vec!["math".to_string(), "easy".to_string()];
        assert_eq!(build_query(&tags, false).text, "math * easy");
        assert_eq!(build_query(&tags, true).text, "math + easy");
    }

    #[test]
    fn single_tag_is_bare() {
        let query = build_query(&["geo".to_string()], false);
        assert_eq!(query.ast, TagQuery::tag("geo"));
        assert_eq!(query.text, "geo");
    }
}
