//! Index document parsing.
//!
//! The index is a markdown list where each entry looks like
//! `- [Name](https://url) [Optional Title]`. Anything else is skipped.

use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

use crate::model::Target;
use crate::traits::{HarvestError, PageFetcher};

/// Raw markdown of the developer-portfolios list.
pub const DEFAULT_INDEX_URL: &str =
    "https://raw.githubusercontent.com/emmabostian/developer-portfolios/master/README.md";

/// URL fragments that are never harvested: the index's own repository and
/// social profiles that are not portfolios.
pub const EXCLUDED_URL_FRAGMENTS: &[&str] = &["github.com/emmabostian", "twitter.com"];

static RE_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^- \[([^\]\n]+)\]\(([^)\n]+)\)[ \t]*(?:\[([^\]\n]*)\])?").unwrap()
});

/// Parses the index into targets, preserving document order.
pub fn parse_index(markdown: &str) -> Vec<Target> {
    RE_ENTRY
        .captures_iter(markdown)
        .filter_map(|cap| {
            let url = cap[2].trim();
            if url.is_empty() || is_excluded(url) {
                return None;
            }
            let title = cap.get(3).map(|m| m.as_str().trim()).unwrap_or_default();
            Some(Target::new(cap[1].trim(), url, title))
        })
        .collect()
}

pub fn is_excluded(url: &str) -> bool {
    EXCLUDED_URL_FRAGMENTS.iter().any(|frag| url.contains(frag))
}

/// Fetches and parses the index. Any failure here is fatal for the run.
pub async fn load_index<F>(fetcher: &F, index_url: &str) -> Result<Vec<Target>, HarvestError>
where
    F: PageFetcher + ?Sized,
{
    let markdown = fetcher
        .fetch(index_url)
        .await
        .map_err(|source| HarvestError::IndexUnavailable {
            url: index_url.to_string(),
            source,
        })?;

    let targets = parse_index(&markdown);
    if targets.is_empty() {
        return Err(HarvestError::EmptyIndex(index_url.to_string()));
    }

    info!(count = targets.len(), url = index_url, "Parsed index document");
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::FetchError;
    use async_trait::async_trait;

    struct StaticFetcher(Result<String, FetchError>);

    #[async_trait]
    impl PageFetcher for StaticFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            self.0.clone()
        }
    }

    #[test]
    fn test_parse_line_with_title() {
        let targets = parse_index("- [Jane Doe](https://jane.dev) [Frontend Engineer]");
        assert_eq!(
            targets,
            vec![Target::new("Jane Doe", "https://jane.dev", "Frontend Engineer")]
        );
    }

    #[test]
    fn test_parse_trims_fields() {
        let targets = parse_index("- [ Ann ]( https://ann.io )  [ Designer ]");
        assert_eq!(targets, vec![Target::new("Ann", "https://ann.io", "Designer")]);
    }

    #[test]
    fn test_parse_missing_title() {
        let targets = parse_index("- [Bo](https://bo.io)\n- [Cy](https://cy.io) [Dev]\n");
        assert_eq!(
            targets,
            vec![
                Target::new("Bo", "https://bo.io", ""),
                Target::new("Cy", "https://cy.io", "Dev"),
            ]
        );
    }

    #[test]
    fn test_title_does_not_leak_from_next_line() {
        let targets = parse_index("- [Bo](https://bo.io)\n[Not a title]\n");
        assert_eq!(targets, vec![Target::new("Bo", "https://bo.io", "")]);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let markdown = "\
# Developer Portfolios
- [Broken](https://broken.io
-[NoSpace](https://nospace.io)
* [Star](https://star.io)
  - [Indented](https://indented.io)
- [](https://empty-name.io)
- [Good](https://good.io)
";
        assert_eq!(
            parse_index(markdown),
            vec![Target::new("Good", "https://good.io", "")]
        );
    }

    #[test]
    fn test_excluded_urls_dropped() {
        let markdown = "\
- [Emma](https://github.com/emmabostian/developer-portfolios)
- [Tweets](https://twitter.com/someone)
- [Kept](https://kept.dev)
";
        let urls: Vec<_> = parse_index(markdown).into_iter().map(|t| t.url).collect();
        assert_eq!(urls, vec!["https://kept.dev"]);
    }

    #[tokio::test]
    async fn test_load_index_fetch_failure_is_fatal() {
        let fetcher = StaticFetcher(Err(FetchError::Status(500)));
        let err = load_index(&fetcher, "https://index.test").await.unwrap_err();
        assert!(matches!(
            err,
            HarvestError::IndexUnavailable { source: FetchError::Status(500), .. }
        ));
    }

    #[tokio::test]
    async fn test_load_index_without_entries_is_fatal() {
        let fetcher = StaticFetcher(Ok("# nothing here".to_string()));
        let err = load_index(&fetcher, "https://index.test").await.unwrap_err();
        assert!(matches!(err, HarvestError::EmptyIndex(_)));
    }

    #[tokio::test]
    async fn test_load_index_parses_entries() {
        let fetcher = StaticFetcher(Ok("- [A](https://a.io)\n- [B](https://b.io)".to_string()));
        let targets = load_index(&fetcher, "https://index.test").await.unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets[1].name, "B");
    }
}
