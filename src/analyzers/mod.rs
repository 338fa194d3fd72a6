// src/analyzers/mod.rs
// =============================================================================
// Page analyzers: each one reads a ParsedPage and produces one named Fact.
//
// Submodules:
// - title: text of the <title> element            -> "title"
// - doctype: declared HTML version                 -> "htmlVersion"
// - headings: h1..h6 inventory                     -> "headings"
// - login: is there a password input?              -> "hasLoginForm"
// - links: verified link inventory                 -> "links"
//
// Adding an analyzer means implementing `Analyzer` and listing it in
// `standard_set`.
// =============================================================================

mod doctype;
mod headings;
mod links;
mod login;
mod title;

pub use doctype::DoctypeAnalyzer;
pub use headings::{HeadingAnalyzer, HeadingGroup};
pub use links::LinkAnalyzer;
pub use login::LoginFormAnalyzer;
pub use title::TitleAnalyzer;

use crate::error::AnalyzeError;
use crate::links::{LinkInventory, VerificationPool};
use crate::page::ParsedPage;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Payload of a fact. Each analyzer produces exactly one variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FactValue {
    Text(String),
    Headings(Vec<HeadingGroup>),
    Flag(bool),
    Links(LinkInventory),
}

/// One named result for one page. Exactly one of `value` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<FactValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Fact {
    pub fn value(key: impl Into<String>, value: FactValue) -> Self {
        Self {
            key: key.into(),
            value: Some(value),
            error: None,
        }
    }

    pub fn error(key: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            error: Some(error.into()),
        }
    }
}

/// A single-purpose, stateless page analyzer.
#[async_trait]
pub trait Analyzer: Send + Sync {
    /// Key of the fact this analyzer produces; unique within a set.
    fn key(&self) -> &'static str;

    /// Reads the page (never mutates it) and produces the fact's payload.
    async fn analyze(&self, page: &ParsedPage) -> Result<FactValue, AnalyzeError>;
}

/// The five analyzers every request runs.
pub fn standard_set(pool: Arc<VerificationPool>) -> Vec<Arc<dyn Analyzer>> {
    vec![
        Arc::new(DoctypeAnalyzer),
        Arc::new(TitleAnalyzer),
        Arc::new(HeadingAnalyzer),
        Arc::new(LoginFormAnalyzer),
        Arc::new(LinkAnalyzer::new(pool)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::links::Prober;
    use std::collections::HashSet;

    struct NeverCalled;

    #[async_trait]
    impl Prober for NeverCalled {
        async fn probe(&self, _url: &str) -> u16 {
            unreachable!("no links in these tests")
        }
    }

    #[tokio::test]
    async fn test_standard_set_keys_are_unique() {
        let pool = Arc::new(VerificationPool::start(1, Arc::new(NeverCalled)));
        let keys: HashSet<_> = standard_set(pool).iter().map(|a| a.key()).collect();
        assert_eq!(
            keys,
            HashSet::from(["title", "htmlVersion", "headings", "hasLoginForm", "links"])
        );
    }

    #[test]
    fn test_fact_serializes_value_or_error() {
        let ok = serde_json::to_value(Fact::value("title", FactValue::Text("Hi".into()))).unwrap();
        assert_eq!(ok, serde_json::json!({"key": "title", "value": "Hi"}));

        let failed = serde_json::to_value(Fact::error("links", "boom")).unwrap();
        assert_eq!(failed, serde_json::json!({"key": "links", "error": "boom"}));
    }
}
