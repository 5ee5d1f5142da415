//! Data models for Lanzou link resolution.

use serde::{Deserialize, Serialize};
use url::Url;

/// Options for a single resolution.
///
/// Built once through [`ResolveOptions::builder`] and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveOptions {
    url: String,
    password: Option<String>,
    solve_redirect: bool,
    get_length: bool,
}

impl ResolveOptions {
    /// Start building options for a share URL.
    pub fn builder(url: impl Into<String>) -> ResolveOptionsBuilder {
        ResolveOptionsBuilder::new(url)
    }

    /// Share page URL as supplied by the caller.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Share password, `None` when absent or empty.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }

    /// Whether to follow the authorization redirect and solve challenges.
    pub fn solve_redirect(&self) -> bool {
        self.solve_redirect
    }

    /// Whether to probe the final URL for size and filename.
    pub fn get_length(&self) -> bool {
        self.get_length
    }
}

/// Builder for [`ResolveOptions`].
#[derive(Debug, Clone)]
pub struct ResolveOptionsBuilder {
    url: String,
    password: Option<String>,
    solve_redirect: bool,
    get_length: bool,
}

impl ResolveOptionsBuilder {
    /// Create a new builder with the required share URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            password: None,
            solve_redirect: true,
            get_length: false,
        }
    }

    /// Set the share password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Follow the authorization redirect (default `true`).
    pub fn solve_redirect(mut self, solve: bool) -> Self {
        self.solve_redirect = solve;
        self
    }

    /// Probe the final URL with a HEAD request (default `false`).
    pub fn get_length(mut self, get_length: bool) -> Self {
        self.get_length = get_length;
        self
    }

    pub fn build(self) -> ResolveOptions {
        ResolveOptions {
            url: self.url,
            password: self.password,
            solve_redirect: self.solve_redirect,
            get_length: self.get_length,
        }
    }
}

/// Outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveResult {
    /// Absolute download URL with the `pid` parameter removed.
    pub down_url: Url,
    /// Disposition filename when probed, otherwise the server label.
    pub filename: String,
    /// Size in bytes, 0 when not probed.
    pub filesize: u64,
    /// Non-fatal anomalies in the order they occurred.
    pub warnings: Vec<String>,
}

/// Raw JSON reply from `ajaxm.php`.
#[derive(Debug, Deserialize)]
pub struct RawAjaxReply {
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub zt: bool,
    #[serde(default, deserialize_with = "deserialize_optional_string_or_int")]
    pub inf: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub dom: Option<String>,
}

/// Authorization reply, split by the `zt` success flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AjaxReply {
    /// File path granted; `inf` is the server's label for the file.
    Granted { dom: String, url: String, inf: String },
    /// Request refused; `inf` carries the server's message.
    Rejected { inf: String },
}

impl AjaxReply {
    /// Parse the reply body.
    ///
    /// A success flag without `dom` or `url` is treated as an invalid
    /// response rather than a grant.
    pub fn parse(body: &str) -> crate::error::Result<Self> {
        let raw: RawAjaxReply = serde_json::from_str(body)?;
        Self::try_from(raw)
    }
}

impl TryFrom<RawAjaxReply> for AjaxReply {
    type Error = crate::error::ResolveError;

    fn try_from(raw: RawAjaxReply) -> Result<Self, Self::Error> {
        let inf = raw.inf.unwrap_or_default();
        if !raw.zt {
            return Ok(AjaxReply::Rejected { inf });
        }
        match (raw.dom, raw.url) {
            (Some(dom), Some(url)) if !dom.is_empty() && !url.is_empty() => {
                Ok(AjaxReply::Granted { dom, url, inf })
            }
            _ => Err(crate::error::ResolveError::InvalidResponse(
                "ajaxm.php granted access without 'dom' or 'url'".into(),
            )),
        }
    }
}

/// `zt` arrives as 1/0, true/false or "1"/"0" depending on the page version.
fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct FlagVisitor;

    impl<'de> Visitor<'de> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a boolean, integer, string, or null")
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(false)
        }

        fn visit_bool<E>(self, v: bool) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v)
        }

        fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v != 0)
        }

        fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(v != 0)
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(!matches!(v.trim(), "" | "0" | "false"))
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}

/// Helper to deserialize fields that can be either string or integer
fn deserialize_optional_string_or_int<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};

    struct StringOrIntVisitor;

    impl<'de> Visitor<'de> for StringOrIntVisitor {
        type Value = Option<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string, integer, or null")
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(None)
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v.to_string()))
        }

        fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v.to_string()))
        }

        fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Some(v.to_string()))
        }
    }

    deserializer.deserialize_any(StringOrIntVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = ResolveOptions::builder("https://www.lanzoux.com/iAbc").build();
        assert!(options.solve_redirect());
        assert!(!options.get_length());
        assert_eq!(options.password(), None);
    }

    #[test]
    fn test_empty_password_is_absent() {
        let options = ResolveOptions::builder("https://www.lanzoux.com/iAbc")
            .password("")
            .build();
        assert_eq!(options.password(), None);
    }

    #[test]
    fn test_parse_granted_reply() {
        let body = r#"{"zt":1,"dom":"https://developer.lanzoug.com","url":"?abc","inf":"demo.zip"}"#;
        let reply = AjaxReply::parse(body).unwrap();
        assert_eq!(
            reply,
            AjaxReply::Granted {
                dom: "https://developer.lanzoug.com".into(),
                url: "?abc".into(),
                inf: "demo.zip".into(),
            }
        );
    }

    #[test]
    fn test_parse_rejected_reply() {
        let reply = AjaxReply::parse(r#"{"zt":0,"inf":"密码不正确"}"#).unwrap();
        assert_eq!(
            reply,
            AjaxReply::Rejected {
                inf: "密码不正确".into()
            }
        );
    }

    #[test]
    fn test_parse_flag_variants() {
        assert!(matches!(
            AjaxReply::parse(r#"{"zt":"0","inf":0}"#).unwrap(),
            AjaxReply::Rejected { inf } if inf == "0"
        ));
        assert!(matches!(
            AjaxReply::parse(r#"{"zt":true,"dom":"https://a.example","url":"x"}"#).unwrap(),
            AjaxReply::Granted { .. }
        ));
    }

    #[test]
    fn test_granted_without_path_is_invalid() {
        let err = AjaxReply::parse(r#"{"zt":1,"inf":"demo.zip"}"#).unwrap_err();
        assert_eq!(err.kind(), "invalid_response");
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let result = ResolveResult {
            down_url: Url::parse("https://example.com/file").unwrap(),
            filename: "a.zip".into(),
            filesize: 3,
            warnings: vec![],
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["downUrl"], "https://example.com/file");
        assert_eq!(json["filesize"], 3);
    }
}
