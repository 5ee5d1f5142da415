//! Extraction of obfuscated page data.
//!
//! Lanzou pages carry the values needed for the authorization request as
//! variable assignments inside inline scripts, padded with commented-out
//! decoys. This module strips the comments and pulls single values out with
//! the patterns in [`patterns`]. Page-format changes should only ever touch
//! those constants.

use crate::error::{ResolveError, Result};
use regex::Regex;
use scraper::{Html, Selector};

/// Field patterns, in the order they are sent to `ajaxm.php`.
/// Captured values are trimmed before use, so `var kdns = 1;` yields `1`.
pub mod patterns {
    /// Query suffix of the authorization endpoint.
    pub const AJAX_SUFFIX: &str = r"'*ajaxm\.php(.*?)'";
    /// `sign` on password pages.
    pub const PASSWORD_SIGN: &str = r"'sign':'(.*?)'";
    /// `kd`, optional on both layouts.
    pub const KD: &str = r"var kdns =(.*?);";
    pub const KD_DEFAULT: &str = "0";

    pub const SIGNS: &str = r"ajaxdata = '(.*?)'";
    pub const SIGN: &str = r"wp_sign = '(.*?)'";
    pub const WEBSIGN: &str = r"ciucjdsdc = '(.*?)'";
    pub const WEBSIGNKEY: &str = r"ajaxdata = '(.*?)'";
    pub const VES: &str = r"'ves':(.*?)(\s}|,)";

    /// Token on the anti-automation challenge page.
    pub const CHALLENGE_ARG1: &str = r"var arg1='(.*?)';";
}

/// Page structure selectors.
mod selectors {
    /// Present when the owner closed the share.
    pub const CLOSED: &str = ".off";
    /// Password input on gated pages.
    pub const PASSWORD: &str = "#pwd";
    /// Download iframe on open pages.
    pub const IFRAME: &str = "iframe.ifr2, .ifr2";
    pub const SCRIPT: &str = "script";
}

/// De-commented text of a document's inline scripts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPayload {
    text: String,
}

impl ScriptPayload {
    /// Strip comments from raw script text.
    ///
    /// Line comments are only removed when a line break follows them, which
    /// leaves a trailing `//` on the last line untouched.
    pub fn from_script_text(raw: &str) -> Result<Self> {
        let line_re = Regex::new(r"//[^\n\r]*([\n\r])")?;
        let block_re = Regex::new(r"(?s)/\*.*?\*/")?;

        let without_lines = line_re.replace_all(raw, "$1");
        let text = block_re.replace_all(&without_lines, "").into_owned();
        Ok(Self { text })
    }

    /// Collect and clean every inline `<script>` of a parsed document.
    pub fn from_document(document: &Html) -> Result<Self> {
        let selector = parse_selector(selectors::SCRIPT)?;
        let raw: String = document
            .select(&selector)
            .flat_map(|script| script.text())
            .collect();
        Self::from_script_text(&raw)
    }

    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_document(&Html::parse_document(html))
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Capture group 1 of `pattern`.
    pub fn field(&self, pattern: &str) -> Result<String> {
        self.field_at(pattern, 1)
    }

    /// Capture group `group` of `pattern`, failing loudly when it is absent
    /// or empty.
    pub fn field_at(&self, pattern: &str, group: usize) -> Result<String> {
        capture(&self.text, pattern, group)
    }

    /// Capture group 1 of `pattern`, or `default` when the field is missing.
    pub fn field_or(&self, pattern: &str, default: &str) -> Result<String> {
        match self.field(pattern) {
            Ok(value) => Ok(value),
            Err(ResolveError::PatternNotFound { .. }) => Ok(default.to_string()),
            Err(e) => Err(e),
        }
    }
}

/// Extract a trimmed, non-empty capture from arbitrary text.
pub fn capture(text: &str, pattern: &str, group: usize) -> Result<String> {
    let re = Regex::new(pattern)?;
    re.captures(text)
        .and_then(|c| c.get(group))
        .map(|m| m.as_str().trim())
        .filter(|value| !value.is_empty())
        .map(String::from)
        .ok_or_else(|| ResolveError::PatternNotFound {
            pattern: pattern.to_string(),
        })
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| ResolveError::Selector(format!("{}: {}", selector, e)))
}

/// Everything the resolver needs from one share page.
///
/// Built synchronously so the parsed DOM never lives across an await.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharePage {
    /// Text of the closure marker, when the share was revoked.
    pub closure: Option<String>,
    pub password_gate: bool,
    /// Raw `src` of the download iframe.
    pub iframe_src: Option<String>,
    pub script: ScriptPayload,
}

impl SharePage {
    pub fn parse(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);

        let closure = document
            .select(&parse_selector(selectors::CLOSED)?)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string());

        let password_gate = document
            .select(&parse_selector(selectors::PASSWORD)?)
            .next()
            .is_some();

        let iframe_src = document
            .select(&parse_selector(selectors::IFRAME)?)
            .find_map(|el| el.value().attr("src"))
            .map(|src| src.trim().to_string())
            .filter(|src| !src.is_empty());

        let script = ScriptPayload::from_document(&document)?;

        Ok(Self {
            closure,
            password_gate,
            iframe_src,
            script,
        })
    }
}
