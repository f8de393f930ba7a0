#![deny(missing_docs)]
//! HMAC authentication of HTTP requests and responses.
//!
//! A sender signs a message by computing a keyed digest over a canonical
//! representation of it and attaching the result as an `Authorization` header:
//!
//! ```text
//! Authorization: <Provider> <CredentialId>:<Base64Digest>
//! ```
//!
//! A receiver recomputes the digest with the secret key belonging to the
//! credential id and compares the two in constant time.
//!
//! ## Features
//!
//! Messages are accessed through the [`MessageLike`] trait, which is implemented for
//! the `http` crate's `Request` and `Response` types. Client-specific implementations
//! are gated by correspondingly named features.
//!
//! | Crate / Feature name                              | Client/Server | Notes                                                         |
//! | ------------------------------------------------- | ------------- | ------------------------------------------------------------- |
//! | [reqwest](https://crates.io/crates/reqwest)       | Client        | Streaming request bodies cannot be signed.                    |
//!
//! ### Supported keyed-hash algorithms:
//!
//! - `hmac-sha256` (default)
//! - `hmac-sha512`
//!
//! ## Example usage
//!
//! ```rust
//! use http_hmac::*;
//!
//! const SECRET_KEY: &[u8] = b"secret";
//!
//! let signer = Signer::new(
//!     SignerConfig::new().add_custom_header("X-Request-Id").unwrap(),
//!     Version1::new(),
//! )
//! .unwrap();
//!
//! let req = http::Request::post("https://example.com/resource")
//!     .header("Content-Type", "application/json")
//!     .header("Date", "Wed, 21 Oct 2015 07:28:00 GMT")
//!     .header("X-Request-Id", "42")
//!     .body(b"{}".to_vec())
//!     .unwrap();
//!
//! let auth = signer.authorization(&req, "efdde334", SECRET_KEY).unwrap();
//!
//! let (mut parts, body) = req.into_parts();
//! parts.headers.insert(http::header::AUTHORIZATION, auth.parse().unwrap());
//! let req = http::Request::from_parts(parts, body);
//!
//! let signature = signer.verify(&req, SECRET_KEY).unwrap();
//! assert_eq!(signature.id(), "efdde334");
//! ```

#[macro_use]
mod macros;

mod error;
pub use error::*;

mod algorithm;
pub use algorithm::*;

mod header;
pub use header::*;

mod message;
pub use message::*;

mod canonicalize;
pub use canonicalize::*;

mod signature;
pub use signature::*;

mod signer;
pub use signer::*;

mod verifying;
pub use verifying::*;

/// Module containing mock request and response types which implement
/// `MessageLike` for testing.
pub mod mock_message;

#[cfg(feature = "reqwest")]
mod reqwest_impls;
#[cfg(feature = "reqwest")]
pub use reqwest_impls::*;
