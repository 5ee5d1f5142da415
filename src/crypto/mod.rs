//! Cryptography module for the anti-automation challenge cookie.

pub mod acw;

pub use acw::{solve as solve_acw_sc_v2, COOKIE_NAME as ACW_COOKIE_NAME};

/// Build the `cookie` header value for a challenge token.
pub fn challenge_cookie(token: &str) -> String {
    format!("{}={}", ACW_COOKIE_NAME, solve_acw_sc_v2(token))
}
