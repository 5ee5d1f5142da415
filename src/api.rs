//! Query-string front end for HTTP handlers and FFI callers.
//!
//! Maps `?url=&pwd=&more&direct&debug` to [`ResolveOptions`] and a resolution
//! outcome to a status code, optional redirect target and JSON body. Serving
//! the response is left to the embedding server.

use crate::client::Lanzou;
use crate::models::ResolveOptions;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use url::form_urlencoded;

/// Query parameters accepted by the handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ApiQuery {
    /// Share link (required).
    pub url: Option<String>,
    /// Share password.
    pub pwd: Option<String>,
    /// Probe size and filename.
    pub more: Option<String>,
    /// Answer with a 302 to the download URL.
    pub direct: Option<String>,
    /// Attach the full result to the body.
    pub debug: Option<String>,
}

impl ApiQuery {
    /// Parse a raw query string; the last occurrence of a key wins.
    pub fn from_query_string(query: &str) -> Self {
        let mut parsed = Self::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let value = Some(value.into_owned());
            match key.as_ref() {
                "url" => parsed.url = value,
                "pwd" => parsed.pwd = value,
                "more" => parsed.more = value,
                "direct" => parsed.direct = value,
                "debug" => parsed.debug = value,
                _ => {}
            }
        }
        parsed
    }

    pub fn wants_length(&self) -> bool {
        flag(&self.more)
    }

    pub fn wants_redirect(&self) -> bool {
        flag(&self.direct)
    }

    pub fn wants_debug(&self) -> bool {
        flag(&self.debug)
    }

    /// Options for this query, `None` when `url` is missing or empty.
    pub fn options(&self) -> Option<ResolveOptions> {
        let url = self.url.as_deref().filter(|u| !u.is_empty())?;
        let mut builder = ResolveOptions::builder(url).get_length(self.wants_length());
        if let Some(pwd) = self.pwd.as_deref().filter(|p| !p.is_empty()) {
            builder = builder.password(pwd);
        }
        Some(builder.build())
    }
}

/// A flag is on when present and empty, or `true`.
fn flag(value: &Option<String>) -> bool {
    matches!(value.as_deref(), Some("") | Some("true"))
}

/// Handler output, independent of any server framework.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse {
    pub status: u16,
    /// Redirect target for `direct` requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub body: Value,
}

impl ApiResponse {
    fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            location: None,
            body,
        }
    }

    /// Body as sent on the wire; empty for redirects.
    pub fn body_string(&self) -> String {
        if self.body.is_null() {
            String::new()
        } else {
            self.body.to_string()
        }
    }
}

/// Resolve the link named by `query`.
pub async fn handle(client: &Lanzou, query: &ApiQuery) -> ApiResponse {
    let Some(options) = query.options() else {
        return ApiResponse::json(400, json!({ "error": "parameter 'url' is required" }));
    };

    match client.resolve(&options).await {
        Ok(result) => {
            if query.wants_redirect() {
                return ApiResponse {
                    status: 302,
                    location: Some(result.down_url.to_string()),
                    body: Value::Null,
                };
            }

            let mut body = json!({
                "downloadUrl": result.down_url.as_str(),
                "filename": result.filename,
                "filesize": result.filesize,
            });
            if !result.warnings.is_empty() {
                body["warnings"] = json!(result.warnings);
            }
            if query.wants_debug() {
                body["debugInfo"] = json!({
                    "originalResult": result,
                    "requestUrl": options.url(),
                });
            }
            ApiResponse::json(200, body)
        }
        Err(e) => {
            tracing::debug!("Resolution of {} failed: {}", options.url(), e);
            ApiResponse::json(
                500,
                json!({
                    "error": "failed to resolve link",
                    "details": e.to_string(),
                    "kind": e.kind(),
                }),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_flags() {
        let query = ApiQuery::from_query_string(
            "?url=https%3A%2F%2Fwww.lanzoux.com%2FiAbc&pwd=1234&more&direct=false&debug=true",
        );
        assert_eq!(query.url.as_deref(), Some("https://www.lanzoux.com/iAbc"));
        assert!(query.wants_length());
        assert!(!query.wants_redirect());
        assert!(query.wants_debug());

        let options = query.options().unwrap();
        assert_eq!(options.password(), Some("1234"));
        assert!(options.get_length());
    }

    #[test]
    fn test_missing_url_has_no_options() {
        assert!(ApiQuery::from_query_string("pwd=1").options().is_none());
        assert!(ApiQuery::from_query_string("url=").options().is_none());
    }

    #[test]
    fn test_missing_url_is_bad_request() {
        let client = Lanzou::builder().build().unwrap();
        let response = tokio_test::block_on(handle(&client, &ApiQuery::default()));
        assert_eq!(response.status, 400);
        assert_eq!(response.body["error"], "parameter 'url' is required");
    }

    #[test]
    fn test_redirect_body_is_empty() {
        let response = ApiResponse {
            status: 302,
            location: Some("https://example.com".into()),
            body: Value::Null,
        };
        assert_eq!(response.body_string(), "");
    }
}
