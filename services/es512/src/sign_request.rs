// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::borrow::Cow;

use bytes::Bytes;
use http::HeaderValue;
use log::debug;
use tlsign_core::canonical::check_header_names;
use tlsign_core::jws::{signing_input, JwsHeader, SignatureToken};
use tlsign_core::{Error, Result, SignaturePayload};

use crate::constants::{ES512, TL_SIGNATURE};
use crate::{Credential, PrivateKey};

/// Signer builds a `Tl-Signature` token for one request.
///
/// Headers are covered in the order they are added.
///
/// ```no_run
/// use tlsign_es512::{PrivateKey, Signer};
///
/// # fn main() -> tlsign_core::Result<()> {
/// let key = PrivateKey::from_pem(std::fs::read("private.pem")?)?;
/// let token = Signer::new("my-kid", &key)
///     .method("POST")
///     .path("/payments")
///     .header("Idempotency-Key", "abc-123")
///     .body(r#"{"amount":100}"#)
///     .sign()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Signer<'a> {
    kid: String,
    key: Cow<'a, PrivateKey>,
    jku: Option<String>,
    payload: SignaturePayload,
}

/// Create a signer that owns a key loaded from `pem`.
pub fn sign_with_pem(kid: impl Into<String>, pem: impl AsRef<[u8]>) -> Result<Signer<'static>> {
    let key = PrivateKey::from_pem(pem)?;
    Ok(Signer::with_key(kid.into(), Cow::Owned(key)))
}

impl<'a> Signer<'a> {
    /// Create a signer for `kid` using `key`.
    pub fn new(kid: impl Into<String>, key: &'a PrivateKey) -> Self {
        Self::with_key(kid.into(), Cow::Borrowed(key))
    }

    fn with_key(kid: String, key: Cow<'a, PrivateKey>) -> Self {
        Self {
            kid,
            key,
            jku: None,
            payload: SignaturePayload::new(),
        }
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.payload.set_method(method);
        self
    }

    /// Set the request path, e.g. `/payments`.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.payload.set_path(path);
        self
    }

    /// Add a header to be covered by the signature.
    pub fn header(mut self, name: impl Into<String>, value: impl AsRef<[u8]>) -> Self {
        self.payload.push_header(name, value);
        self
    }

    /// Add several headers, in iteration order.
    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<[u8]>,
    {
        for (name, value) in headers {
            self.payload.push_header(name, value);
        }
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl AsRef<[u8]>) -> Self {
        self.payload
            .set_body(Bytes::copy_from_slice(body.as_ref()));
        self
    }

    /// Advertise the JWKS url in the token header.
    pub fn jku(mut self, jku: impl Into<String>) -> Self {
        self.jku = Some(jku.into());
        self
    }

    /// Produce the detached token `header..signature`.
    pub fn sign(&self) -> Result<String> {
        if let Some(declared) = self.key.kid() {
            if declared != self.kid {
                return Err(Error::key_mismatch(format!(
                    "private key is declared for kid {declared:?}, not {:?}",
                    self.kid
                )));
            }
        }

        let canonical = self.payload.canonical()?;

        let mut header = JwsHeader::new(ES512, self.kid.as_str(), self.payload.header_names());
        if let Some(jku) = &self.jku {
            header = header.with_jku(jku.as_str());
        }
        let header_segment = header.encode()?;

        let signature = self
            .key
            .sign_bytes(&signing_input(&header_segment, &canonical))?;
        debug!(
            "signed request for kid {} covering [{}]",
            header.kid, header.tl_headers
        );

        Ok(SignatureToken::new(header_segment, header, signature).to_string())
    }
}

/// RequestSigner signs `http::Request`s and attaches the `tl-signature` header.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credential: Credential,
    headers: Vec<String>,
}

impl RequestSigner {
    /// Create a request signer using `credential`.
    pub fn new(credential: Credential) -> Self {
        Self {
            credential,
            headers: Vec::new(),
        }
    }

    /// Cover the header `name`, read from each request.
    pub fn with_header(mut self, name: impl Into<String>) -> Self {
        self.headers.push(name.into());
        self
    }

    /// Cover several headers, in iteration order.
    pub fn with_headers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.headers.extend(names.into_iter().map(Into::into));
        self
    }

    /// Sign `req` in place.
    ///
    /// Every configured header must be present on the request.
    pub fn sign_request<B: AsRef<[u8]>>(&self, req: &mut http::Request<B>) -> Result<()> {
        check_header_names(self.headers.iter().map(String::as_str))?;

        let mut signer = Signer::new(self.credential.kid.as_str(), &self.credential.private_key);
        signer.payload = SignaturePayload::from_request(req);
        if let Some(jku) = &self.credential.jku {
            signer = signer.jku(jku.as_str());
        }

        for name in &self.headers {
            let value = req.headers().get(name.as_str()).ok_or_else(|| {
                Error::incomplete_request(format!("request has no {name:?} header to sign"))
            })?;
            signer.payload.push_header(name.as_str(), value.as_bytes());
        }

        let token = signer.sign()?;
        req.headers_mut()
            .insert(TL_SIGNATURE, HeaderValue::from_str(&token)?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tlsign_core::hash::base64url_decode;
    use tlsign_core::ErrorKind;

    const PRIVATE: &str = include_str!("../tests/keys/ec512-private-sec1.pem");

    fn key() -> PrivateKey {
        PrivateKey::from_pem(PRIVATE).unwrap()
    }

    #[test]
    fn test_token_layout() {
        let key = key();
        let token = Signer::new("kid-1", &key)
            .method("POST")
            .path("/payments")
            .header("Idempotency-Key", "abc-123")
            .header("Content-Type", "application/json")
            .body(r#"{"a":1}"#)
            .sign()
            .unwrap();

        let (header_segment, rest) = token.split_once("..").unwrap();
        assert!(!rest.contains('.'));
        assert_eq!(base64url_decode(rest).unwrap().len(), 132);

        let header = JwsHeader::decode(header_segment).unwrap();
        assert_eq!(header.alg, "ES512");
        assert_eq!(header.kid, "kid-1");
        assert_eq!(header.tl_version.as_deref(), Some("2"));
        assert_eq!(header.tl_headers, "Idempotency-Key,Content-Type");
        assert_eq!(header.jku, None);
    }

    #[test]
    fn test_token_carries_jku() {
        let token = sign_with_pem("kid-1", PRIVATE)
            .unwrap()
            .method("GET")
            .path("/")
            .jku("https://example.com/.well-known/jwks")
            .sign()
            .unwrap();

        let header = SignatureToken::parse(&token).unwrap().header().clone();
        assert_eq!(
            header.jku.as_deref(),
            Some("https://example.com/.well-known/jwks")
        );
        assert_eq!(header.tl_headers, "");
    }

    #[test]
    fn test_key_mismatch() {
        let key = key().with_kid("kid-1");
        let err = Signer::new("kid-2", &key)
            .method("GET")
            .path("/")
            .sign()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyMismatch);

        assert!(Signer::new("kid-1", &key).method("GET").path("/").sign().is_ok());
    }

    #[test]
    fn test_incomplete_request() {
        let key = key();
        let err = Signer::new("kid-1", &key).path("/").sign().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompleteRequest);

        let err = Signer::new("kid-1", &key).method("GET").sign().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompleteRequest);
    }

    #[test]
    fn test_canonical_errors_surface() {
        let key = key();
        let err = Signer::new("kid-1", &key)
            .method("GET")
            .path("payments")
            .sign()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedPath);

        let err = Signer::new("kid-1", &key)
            .method("GET")
            .path("/")
            .header("X-A", "1")
            .header("x-a", "2")
            .sign()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateHeaderName);
    }

    #[test]
    fn test_sign_with_pem_invalid_key() {
        let err = sign_with_pem("kid-1", "garbage").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKeyFormat);
    }

    #[test]
    fn test_request_signer_inserts_header() {
        let cred = Credential::new("kid-1", key()).unwrap();
        let signer = RequestSigner::new(cred).with_headers(["Idempotency-Key"]);

        let mut req = http::Request::builder()
            .method("POST")
            .uri("https://api.example.com/payments")
            .header("Idempotency-Key", "abc-123")
            .body(b"{}".to_vec())
            .unwrap();
        signer.sign_request(&mut req).unwrap();

        let token = req.headers().get(TL_SIGNATURE).unwrap().to_str().unwrap();
        let parsed = SignatureToken::parse(token).unwrap();
        assert_eq!(parsed.header().tl_headers, "Idempotency-Key");
    }

    #[test]
    fn test_request_signer_missing_header() {
        let cred = Credential::new("kid-1", key()).unwrap();
        let signer = RequestSigner::new(cred).with_header("Idempotency-Key");

        let mut req = http::Request::builder()
            .method("POST")
            .uri("/payments")
            .body("")
            .unwrap();
        let err = signer.sign_request(&mut req).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompleteRequest);
        assert!(req.headers().get(TL_SIGNATURE).is_none());
    }
}
