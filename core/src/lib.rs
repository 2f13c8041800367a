//! Core components for signing and verifying HTTP API requests.
//!
//! This crate provides the algorithm-agnostic half of tlsign: how a request is
//! turned into the bytes a signature covers, and how the detached signature token
//! is laid out. Signing schemes such as `tlsign-es512` build on top of it.
//!
//! ## Overview
//!
//! - **Canonical string** ([`canonical`]): the deterministic serialization of method,
//!   path, covered headers and body.
//! - **Payload** ([`SignaturePayload`]): the request fields a signature covers,
//!   collected by hand or from an `http::Request`.
//! - **Token** ([`jws`]): the JWS header naming algorithm, key id and covered
//!   headers, and the `header..signature` compact form.
//! - **Context** ([`Context`]): environment access for configuration loaders.
//!
//! ## Example
//!
//! ```
//! use tlsign_core::SignaturePayload;
//!
//! # fn main() -> tlsign_core::Result<()> {
//! let mut payload = SignaturePayload::new();
//! payload.set_method("POST");
//! payload.set_path("/payments");
//! payload.push_header("Idempotency-Key", "abc-123");
//! payload.set_body(r#"{"a":1}"#);
//!
//! let canonical = payload.canonical()?;
//! assert!(canonical.starts_with(b"idempotency-key: abc-123\nPOST /payments\n"));
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod canonical;
pub mod hash;
pub mod jws;
pub mod utils;

mod context;
pub use context::{Context, Env, NoopEnv, OsEnv, StaticEnv};
mod error;
pub use error::{Error, ErrorKind, Result};
mod request;
pub use request::SignaturePayload;
