// src/analyzers/headings.rs
// Heading inventory: for h1..h6, the non-empty heading texts in document order.
// Levels without a single non-empty heading are left out.

use super::{Analyzer, FactValue};
use crate::error::AnalyzeError;
use crate::page::ParsedPage;
use async_trait::async_trait;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingGroup {
    pub tag_name: String,
    pub tag_contents: Vec<String>,
    pub tag_count: usize,
}

pub struct HeadingAnalyzer;

#[async_trait]
impl Analyzer for HeadingAnalyzer {
    fn key(&self) -> &'static str {
        "headings"
    }

    async fn analyze(&self, page: &ParsedPage) -> Result<FactValue, AnalyzeError> {
        let groups = collect_headings(page)?;
        debug!(levels = groups.len(), "heading analyzer completed");
        Ok(FactValue::Headings(groups))
    }
}

fn collect_headings(page: &ParsedPage) -> Result<Vec<HeadingGroup>, AnalyzeError> {
    let document = page.document();
    let mut groups = Vec::new();

    for level in 1..=6 {
        let tag_name = format!("h{level}");
        let selector = Selector::parse(&tag_name)
            .map_err(|e| AnalyzeError::new(format!("bad selector {tag_name}: {e}")))?;

        let tag_contents: Vec<String> = document
            .select(&selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty())
            .collect();

        if !tag_contents.is_empty() {
            groups.push(HeadingGroup {
                tag_name,
                tag_count: tag_contents.len(),
                tag_contents,
            });
        }
    }

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[tokio::test]
    async fn test_groups_by_level() {
        let page = ParsedPage::new(
            Url::parse("https://example.com").unwrap(),
            "<h1>Main</h1><h2>A</h2><h2> </h2><h2>B</h2><h4>Deep</h4>",
        );
        let FactValue::Headings(groups) = HeadingAnalyzer.analyze(&page).await.unwrap() else {
            panic!("expected headings");
        };

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].tag_name, "h1");
        assert_eq!(groups[1].tag_contents, vec!["A", "B"]);
        assert_eq!(groups[1].tag_count, 2);
        assert_eq!(groups[2].tag_name, "h4");
    }

    #[tokio::test]
    async fn test_no_headings() {
        let page = ParsedPage::new(Url::parse("https://example.com").unwrap(), "<p>text</p>");
        assert_eq!(
            HeadingAnalyzer.analyze(&page).await.unwrap(),
            FactValue::Headings(vec![])
        );
    }

    #[test]
    fn test_wire_names() {
        let group = HeadingGroup {
            tag_name: "h1".into(),
            tag_contents: vec!["Hi".into()],
            tag_count: 1,
        };
        let json = serde_json::to_value(group).unwrap();
        assert_eq!(json["tagName"], "h1");
        assert_eq!(json["tagCount"], 1);
    }
}
