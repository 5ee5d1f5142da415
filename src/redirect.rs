//! Following the authorization URL to the final content URL.
//!
//! The download host answers the authorization URL with a redirect, unless it
//! suspects automation, in which case it serves a challenge page instead. The
//! challenge is solved at most once per resolution.

use crate::crypto;
use crate::deobfuscate::{self, patterns};
use crate::error::{ResolveError, Result};
use rquest::header::{
    HeaderMap, ACCEPT, ACCEPT_LANGUAGE, CONTENT_DISPOSITION, CONTENT_LENGTH, COOKIE, LOCATION,
    USER_AGENT,
};
use regex::Regex;
use rquest::{Client, RequestBuilder};
use url::Url;

/// Attempts per resolution: the first request and one retry carrying the cookie.
pub const MAX_ATTEMPTS: usize = 2;

/// Session query parameter removed from every resolved URL.
pub const PID_PARAM: &str = "pid";

pub const CHALLENGE_WARNING: &str =
    "anti-automation challenge encountered; solved acw_sc__v2 cookie";

/// Quoted value in group 1, bare value in group 2.
const FILENAME_PATTERN: &str = r#"filename\*?=(?:UTF-8'')?(?:"([^"]*)"|([^;]*))"#;

/// Headers sent with every request of a resolution.
#[derive(Debug, Clone)]
pub struct BrowserProfile {
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
}

impl BrowserProfile {
    /// Attach the profile headers to `request`.
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(USER_AGENT, &self.user_agent)
            .header(ACCEPT, &self.accept)
            .header(ACCEPT_LANGUAGE, &self.accept_language)
    }
}

/// Outcome of following the authorization URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub url: Url,
    /// Disposition filename, only when the probe ran.
    pub filename: Option<String>,
    /// Content length, 0 when the probe did not run.
    pub filesize: u64,
    pub warnings: Vec<String>,
}

/// Metadata read from the final HEAD probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub length: u64,
    pub filename: String,
}

/// Redirect follower bound to one HTTP client.
pub struct RedirectResolver<'a> {
    client: &'a Client,
    profile: &'a BrowserProfile,
}

impl<'a> RedirectResolver<'a> {
    pub fn new(client: &'a Client, profile: &'a BrowserProfile) -> Self {
        Self { client, profile }
    }

    /// Follow `auth_url` one hop and optionally probe the target.
    pub async fn resolve(&self, auth_url: &Url, get_length: bool) -> Result<Resolved> {
        let mut warnings = Vec::new();
        let mut cookie: Option<String> = None;
        let mut target: Option<Url> = None;

        for attempt in 0..MAX_ATTEMPTS {
            debug_assert!(attempt == 0 || cookie.is_some());

            let mut request = self
                .profile
                .apply(self.client.get(auth_url.as_str()))
                .redirect(rquest::redirect::Policy::none());
            if let Some(ref value) = cookie {
                request = request.header(COOKIE, value);
            }

            let response = request.send().await?;
            tracing::debug!(
                "Authorization URL answered {} on attempt {}",
                response.status(),
                attempt + 1
            );

            if let Some(location) = location_header(response.headers())? {
                target = Some(strip_pid(auth_url.join(&location)?));
                break;
            }

            if cookie.is_some() {
                return Err(ResolveError::ChallengeVerificationFailed {
                    message: format!(
                        "no redirect after sending the {} cookie",
                        crypto::ACW_COOKIE_NAME
                    ),
                });
            }

            let body = response.text().await?;
            let token = deobfuscate::capture(&body, patterns::CHALLENGE_ARG1, 1)?;
            tracing::warn!("Challenge page served for {}, solving token", auth_url);
            cookie = Some(crypto::challenge_cookie(&token));
            warnings.push(CHALLENGE_WARNING.to_string());
        }

        let url = target.ok_or_else(|| ResolveError::ChallengeVerificationFailed {
            message: format!("no redirect after {} attempts", MAX_ATTEMPTS),
        })?;

        if !get_length {
            return Ok(Resolved {
                url,
                filename: None,
                filesize: 0,
                warnings,
            });
        }

        let metadata = self.probe(&url).await?;
        Ok(Resolved {
            url,
            filename: Some(metadata.filename),
            filesize: metadata.length,
            warnings,
        })
    }

    /// HEAD the final URL for its length and disposition filename.
    pub async fn probe(&self, url: &Url) -> Result<FileMetadata> {
        let response = self
            .profile
            .apply(self.client.head(url.as_str()))
            .send()
            .await?;
        file_metadata(response.headers())
    }
}

fn location_header(headers: &HeaderMap) -> Result<Option<String>> {
    match headers.get(LOCATION) {
        Some(value) => value
            .to_str()
            .map(|s| Some(s.to_string()))
            .map_err(|_| ResolveError::InvalidResponse("non-ASCII location header".into())),
        None => Ok(None),
    }
}

/// Read length and filename from probe headers.
pub fn file_metadata(headers: &HeaderMap) -> Result<FileMetadata> {
    let missing = |header: &str| ResolveError::MissingFileMetadata {
        header: header.to_string(),
    };

    let length = headers
        .get(CONTENT_LENGTH)
        .ok_or_else(|| missing("content-length"))?
        .to_str()
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .ok_or_else(|| ResolveError::InvalidResponse("unparsable content-length".into()))?;

    let disposition = headers
        .get(CONTENT_DISPOSITION)
        .ok_or_else(|| missing("content-disposition"))?;
    let disposition = String::from_utf8_lossy(disposition.as_bytes());
    let filename =
        disposition_filename(&disposition).ok_or_else(|| missing("content-disposition"))?;

    Ok(FileMetadata { length, filename })
}

/// Percent-decoded, trimmed `filename` / `filename*` parameter.
pub fn disposition_filename(disposition: &str) -> Option<String> {
    let captures = Regex::new(FILENAME_PATTERN).ok()?.captures(disposition)?;
    let raw = captures
        .get(1)
        .or_else(|| captures.get(2))?
        .as_str()
        .to_string();
    let decoded = urlencoding::decode(&raw)
        .map(|s| s.into_owned())
        .unwrap_or(raw);
    let filename = decoded.trim();
    (!filename.is_empty()).then(|| filename.to_string())
}

/// Remove the `pid` query parameter, leaving other parameters untouched.
pub fn strip_pid(mut url: Url) -> Url {
    if !url.query_pairs().any(|(k, _)| k == PID_PARAM) {
        return url;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| k != PID_PARAM)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
    url
}
