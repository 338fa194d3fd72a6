// src/markup.rs
// =============================================================================
// Streaming scans over raw markup (lol_html).
//
// The markup goes through an HTML tokenizer once, forward only, and element
// handlers pick out the few attributes we care about. The tokenizer knows
// where tags can really start, so text inside comments, <script>, <style>
// and <textarea> is never mistaken for markup. Nothing is rewritten; the
// output sink discards everything.
//
// Used by the link extractor and by the login-form analyzer.
// =============================================================================

use crate::error::ScanError;
use lol_html::html_content::Element;
use lol_html::{element, HtmlRewriter, Settings};
use std::cell::RefCell;

/// Raw URL values of `<a href>`, `<link href>` and `<script src>`, in
/// document order, entities decoded. Values are not trimmed or validated.
pub fn url_values(markup: &str) -> Result<Vec<String>, ScanError> {
    let found = RefCell::new(Vec::new());

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![
                element!("a[href]", |el| {
                    push_attribute(&found, el, "href");
                    Ok(())
                }),
                element!("link[href]", |el| {
                    push_attribute(&found, el, "href");
                    Ok(())
                }),
                element!("script[src]", |el| {
                    push_attribute(&found, el, "src");
                    Ok(())
                }),
            ],
            ..Settings::default()
        },
        |_: &[u8]| {},
    );
    rewriter.write(markup.as_bytes())?;
    rewriter.end()?;

    Ok(found.into_inner())
}

/// True if any `<input>` has `type="password"` (ASCII case-insensitive).
pub fn has_password_input(markup: &str) -> Result<bool, ScanError> {
    let mut found = false;

    let mut rewriter = HtmlRewriter::new(
        Settings {
            element_content_handlers: vec![element!("input[type]", |el| {
                if el
                    .get_attribute("type")
                    .is_some_and(|t| t.trim().eq_ignore_ascii_case("password"))
                {
                    found = true;
                }
                Ok(())
            })],
            ..Settings::default()
        },
        |_: &[u8]| {},
    );
    rewriter.write(markup.as_bytes())?;
    rewriter.end()?;

    Ok(found)
}

// lol_html hands back attribute values as written in the source
fn push_attribute(found: &RefCell<Vec<String>>, el: &Element, name: &str) {
    if let Some(value) = el.get_attribute(name) {
        let decoded = html_escape::decode_html_entities(&value).into_owned();
        found.borrow_mut().push(decoded);
    }
}
