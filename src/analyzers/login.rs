// src/analyzers/login.rs
// A page "has a login form" when any <input type="password"> appears in it.

use super::{Analyzer, FactValue};
use crate::error::AnalyzeError;
use crate::markup;
use crate::page::ParsedPage;
use async_trait::async_trait;

pub struct LoginFormAnalyzer;

#[async_trait]
impl Analyzer for LoginFormAnalyzer {
    fn key(&self) -> &'static str {
        "hasLoginForm"
    }

    async fn analyze(&self, page: &ParsedPage) -> Result<FactValue, AnalyzeError> {
        let found = markup::has_password_input(page.markup())?;
        Ok(FactValue::Flag(found))
    }
}
