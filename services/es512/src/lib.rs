//! ES512 request signing for HTTP API calls.
//!
//! A sender signs method, path, chosen headers and body with an ECDSA P-521 key and
//! sends the detached JWS token in the `Tl-Signature` header. A receiver rebuilds
//! the same bytes from the request it got and checks the token.
//!
//! ## Example
//!
//! ```no_run
//! use tlsign_es512::{verify_with_pem, PrivateKey, Signer};
//!
//! # fn main() -> tlsign_core::Result<()> {
//! let key = PrivateKey::from_pem(std::fs::read("ec512-private.pem")?)?;
//! let body = r#"{"currency":"GBP","max_amount_in_minor":5000000}"#;
//!
//! let token = Signer::new("45fc75cf-5649-4134-84b3-192c2c78e990", &key)
//!     .method("POST")
//!     .path("/merchant_accounts/a61313f1/sweeping")
//!     .header("Idempotency-Key", "idemp-2076717c-9005-4811-a321-9e0787fa0382")
//!     .body(body)
//!     .sign()?;
//!
//! verify_with_pem(std::fs::read("ec512-public.pem")?)?
//!     .method("POST")
//!     .path("/merchant_accounts/a61313f1/sweeping")
//!     .header("Idempotency-Key", "idemp-2076717c-9005-4811-a321-9e0787fa0382")
//!     .require_header("Idempotency-Key")
//!     .body(body)
//!     .verify(&token)?;
//! # Ok(())
//! # }
//! ```

mod constants;
pub use constants::{
    ES512, TL_SIGNATURE, TL_SIGNING_JKU, TL_SIGNING_KID, TL_SIGNING_PRIVATE_KEY,
    TL_SIGNING_PRIVATE_KEY_FILE,
};

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod key;
pub use key::{Jwk, KeySet, KeySource, PrivateKey, PublicKey};

mod sign_request;
pub use sign_request::{sign_with_pem, RequestSigner, Signer};

mod verify_request;
pub use verify_request::{extract_jws_header, verify_with_jwks, verify_with_pem, Verifier};
