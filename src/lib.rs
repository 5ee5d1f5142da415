//! # lanzou-resolver
//!
//! Resolve Lanzou cloud share links into direct, time-limited download URLs.
//!
//! ## Features
//!
//! - **Both page layouts**: password-gated share pages and open pages that
//!   hide the download form behind an iframe.
//! - **Script deobfuscation**: strips the decoy comments Lanzou injects into
//!   its inline scripts before extracting the signed request fields.
//! - **Challenge solving**: reproduces the `acw_sc__v2` cookie derivation when
//!   the download host withholds the redirect, with exactly one retry.
//! - **TLS Fingerprinting**: Uses `rquest` for Chrome-like TLS fingerprinting.
//! - **Stateless**: one immutable client serves any number of concurrent
//!   resolutions.
//!
//! ## Quick Start
//!
//! ```ignore
//! use lanzou_resolver::{Lanzou, ResolveOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Lanzou::builder().build()?;
//!
//!     let options = ResolveOptions::builder("https://www.lanzoux.com/iAbc123")
//!         .password("1234")
//!         .get_length(true)
//!         .build();
//!
//!     let result = client.resolve(&options).await?;
//!
//!     println!("url: {}", result.down_url);
//!     println!("filename: {}", result.filename);
//!     println!("filesize: {}", result.filesize);
//!     for warning in &result.warnings {
//!         println!("warning: {}", warning);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## With Proxy
//!
//! ```ignore
//! use lanzou_resolver::Lanzou;
//!
//! let client = Lanzou::builder()
//!     .proxy("socks5://127.0.0.1:1080")
//!     .build()?;
//! ```

// Allow missing docs for internal types for now
#![allow(missing_docs)]

pub mod ajax;
pub mod api;
pub mod client;
pub mod crypto;
pub mod deobfuscate;
pub mod error;
#[cfg(feature = "ffi")]
pub mod ffi;
pub mod models;
pub mod redirect;

// Re-exports for convenience
pub use client::{Lanzou, LanzouBuilder};
pub use error::{ResolveError, Result};
pub use models::{ResolveOptions, ResolveOptionsBuilder, ResolveResult};

/// Resolve a share link with a default client.
pub async fn resolve(options: &ResolveOptions) -> Result<ResolveResult> {
    Lanzou::new()?.resolve(options).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solver_reexported() {
        assert_eq!(crypto::solve_acw_sc_v2("a"), "3a");
    }
}
