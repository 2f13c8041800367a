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

use bytes::Bytes;
use http::HeaderMap;
use log::debug;
use tlsign_core::jws::{JwsHeader, SignatureToken};
use tlsign_core::{Error, Result, SignaturePayload};

use crate::constants::{ES512, TL_SIGNATURE};
use crate::{KeySet, KeySource, PublicKey};

/// Verifier checks a `Tl-Signature` token against the request it arrived with.
///
/// Add the received headers with [`Verifier::header`] or [`Verifier::header_map`];
/// only those named in the token are used to rebuild the signed bytes.
#[derive(Debug, Clone)]
pub struct Verifier<'a> {
    keys: KeySource<'a>,
    required: Vec<String>,
    payload: SignaturePayload,
}

/// Create a verifier that owns a public key loaded from `pem`.
pub fn verify_with_pem(pem: impl AsRef<[u8]>) -> Result<Verifier<'static>> {
    Ok(Verifier::new(PublicKey::from_pem(pem)?))
}

/// Create a verifier that owns the keys of a JWKS document.
pub fn verify_with_jwks(jwks: impl AsRef<[u8]>) -> Result<Verifier<'static>> {
    Ok(Verifier::new(KeySet::from_jwks(jwks)?))
}

/// Decode the header of `token` without verifying anything.
///
/// Useful to read `kid` or `jku` before choosing which keys to verify with.
pub fn extract_jws_header(token: &str) -> Result<JwsHeader> {
    let token = SignatureToken::parse(token)?;
    Ok(token.header().clone())
}

impl<'a> Verifier<'a> {
    /// Create a verifier resolving keys from `keys`.
    pub fn new(keys: impl Into<KeySource<'a>>) -> Self {
        Self {
            keys: keys.into(),
            required: Vec::new(),
            payload: SignaturePayload::new(),
        }
    }

    /// Set the HTTP method of the received request.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.payload.set_method(method);
        self
    }

    /// Set the path of the received request.
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.payload.set_path(path);
        self
    }

    /// Add a received header.
    pub fn header(mut self, name: impl Into<String>, value: impl AsRef<[u8]>) -> Self {
        self.payload.push_header(name, value);
        self
    }

    /// Add several received headers.
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

    /// Add every header of a `HeaderMap`.
    pub fn header_map(mut self, headers: &HeaderMap) -> Self {
        self.payload.push_header_map(headers);
        self
    }

    /// Require that `name` is covered by the signature.
    pub fn require_header(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Require that every name in `names` is covered by the signature.
    pub fn require_headers<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required.extend(names.into_iter().map(Into::into));
        self
    }

    /// Set the received body.
    pub fn body(mut self, body: impl AsRef<[u8]>) -> Self {
        self.payload
            .set_body(Bytes::copy_from_slice(body.as_ref()));
        self
    }

    /// Verify `token` against the request described by this builder.
    pub fn verify(&self, token: &str) -> Result<()> {
        self.verify_payload(&self.payload, token)
    }

    /// Verify the `tl-signature` header of `req`.
    ///
    /// Method, path, headers and body are all read from `req`; anything set on
    /// this builder other than keys and required headers is ignored.
    pub fn verify_request<B: AsRef<[u8]>>(&self, req: &http::Request<B>) -> Result<()> {
        let token = req
            .headers()
            .get(TL_SIGNATURE)
            .ok_or_else(|| Error::malformed_token("request has no tl-signature header"))?
            .to_str()
            .map_err(|e| {
                Error::malformed_token("tl-signature header is not visible ascii").with_source(e)
            })?;

        let mut payload = SignaturePayload::from_request(req);
        payload.push_header_map(req.headers());
        self.verify_payload(&payload, token)
    }

    fn verify_payload(&self, payload: &SignaturePayload, token: &str) -> Result<()> {
        let result = self.check(payload, token);
        if let Err(err) = &result {
            debug!("signature verification failed: {}", err.kind());
        }
        result
    }

    fn check(&self, payload: &SignaturePayload, token: &str) -> Result<()> {
        payload.method_and_path()?;

        let token = SignatureToken::parse(token)?;
        let header = token.header();

        let key = self.keys.resolve(&header.kid)?;
        debug!("resolved verification key for kid {}", header.kid);

        if header.alg != ES512 {
            return Err(Error::algorithm_mismatch(format!(
                "token algorithm {:?} is not {ES512}",
                header.alg
            )));
        }

        let covered = header.header_names();
        if let Some(name) = covered.iter().find(|name| payload.header(name).is_none()) {
            return Err(Error::missing_required_header(format!(
                "signed header {name:?} is absent from the request"
            )));
        }
        if let Some(name) = self.required.iter().find(|name| !header.covers(name)) {
            return Err(Error::required_header_not_signed(format!(
                "required header {name:?} is not covered by the signature"
            )));
        }

        let canonical = payload.canonical_for(&covered)?;
        key.verify_bytes(&token.signing_input(&canonical), token.signature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PrivateKey, Signer};
    use tlsign_core::ErrorKind;

    const PRIVATE: &str = include_str!("../tests/keys/ec512-private.pem");
    const PUBLIC: &str = include_str!("../tests/keys/ec512-public.pem");

    fn token() -> String {
        let key = PrivateKey::from_pem(PRIVATE).unwrap();
        Signer::new("kid-1", &key)
            .method("DELETE")
            .path("/items/7")
            .header("X-Request-Id", "r-1")
            .jku("https://example.com/jwks")
            .sign()
            .unwrap()
    }

    #[test]
    fn test_verify() {
        let verifier = verify_with_pem(PUBLIC)
            .unwrap()
            .method("delete")
            .path("/items/7")
            .header("x-request-id", "r-1")
            .header("User-Agent", "test");

        verifier.verify(&token()).unwrap();
    }

    #[test]
    fn test_verify_requires_method_and_path() {
        let err = verify_with_pem(PUBLIC)
            .unwrap()
            .path("/items/7")
            .verify(&token())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompleteRequest);
    }

    #[test]
    fn test_extract_jws_header() {
        let header = extract_jws_header(&token()).unwrap();
        assert_eq!(header.kid, "kid-1");
        assert_eq!(header.alg, "ES512");
        assert_eq!(header.jku.as_deref(), Some("https://example.com/jwks"));
        assert_eq!(header.header_names(), vec!["X-Request-Id"]);

        let err = extract_jws_header("not-a-token").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedToken);
    }

    #[test]
    fn test_verify_request_without_signature_header() {
        let req = http::Request::builder()
            .method("GET")
            .uri("/")
            .body(Vec::new())
            .unwrap();
        let public = PublicKey::from_pem(PUBLIC).unwrap();
        let err = Verifier::new(&public).verify_request(&req).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedToken);
        assert!(err.is_verification_failure());
    }
}
