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

//! Detached compact JWS: the header envelope and the `header..signature` token.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::canonical::check_header_names;
use crate::hash::{base64url_decode, base64url_encode};
use crate::{Error, Result};

/// The `tl_version` value written into every header.
pub const TL_VERSION: &str = "2";

/// JwsHeader is the metadata segment of a signature token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    /// Signature algorithm, e.g. `ES512`.
    pub alg: String,
    /// Key id of the signing key.
    pub kid: String,
    /// Signing scheme version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tl_version: Option<String>,
    /// Covered header names joined by `,` in signing order.
    #[serde(default)]
    pub tl_headers: String,
    /// URL of the JWKS that holds the signer's public key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jku: Option<String>,
}

impl JwsHeader {
    /// Create a header for the given algorithm, key id and covered header names.
    pub fn new<'a>(
        alg: impl Into<String>,
        kid: impl Into<String>,
        header_names: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            alg: alg.into(),
            kid: kid.into(),
            tl_version: Some(TL_VERSION.to_string()),
            tl_headers: header_names.into_iter().collect::<Vec<_>>().join(","),
            jku: None,
        }
    }

    /// Set the JWKS url.
    pub fn with_jku(mut self, jku: impl Into<String>) -> Self {
        self.jku = Some(jku.into());
        self
    }

    /// Covered header names in signing order, as the signer spelled them.
    ///
    /// Entries are taken verbatim; [`JwsHeader::decode`] rejects empty or padded ones.
    pub fn header_names(&self) -> Vec<&str> {
        if self.tl_headers.is_empty() {
            return Vec::new();
        }
        self.tl_headers.split(',').collect()
    }

    /// Check whether `name` is covered, ignoring case.
    pub fn covers(&self, name: &str) -> bool {
        self.header_names()
            .iter()
            .any(|covered| covered.eq_ignore_ascii_case(name))
    }

    /// Serialize and base64url encode the header.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self).map_err(|e| {
            Error::signing_backend("failed to serialize jws header").with_source(e)
        })?;
        Ok(base64url_encode(&json))
    }

    /// Decode and validate a base64url encoded header.
    pub fn decode(segment: &str) -> Result<Self> {
        let json = base64url_decode(segment)?;
        let header: JwsHeader = serde_json::from_slice(&json)
            .map_err(|e| Error::malformed_token("jws header is not valid json").with_source(e))?;

        if let Some(version) = &header.tl_version {
            if version != TL_VERSION {
                return Err(Error::malformed_token(format!(
                    "unsupported tl_version {version:?}"
                )));
            }
        }
        check_header_names(header.header_names()).map_err(|e| {
            Error::malformed_token("jws header carries an invalid tl_headers list").with_source(e)
        })?;

        Ok(header)
    }
}

/// SignatureToken is a detached compact JWS, `header..signature`.
///
/// The payload segment is always empty: verifiers rebuild the signed bytes from
/// the request they received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureToken {
    header_segment: String,
    header: JwsHeader,
    signature: Vec<u8>,
}

impl SignatureToken {
    /// Assemble a token from an encoded header and raw signature bytes.
    pub fn new(header_segment: String, header: JwsHeader, signature: Vec<u8>) -> Self {
        Self {
            header_segment,
            header,
            signature,
        }
    }

    /// Parse a token string.
    pub fn parse(token: &str) -> Result<Self> {
        let parts = token.trim().split('.').collect::<Vec<_>>();
        let [header_segment, payload_segment, signature_segment] = parts.as_slice() else {
            return Err(Error::malformed_token(format!(
                "expected 3 dot separated segments, got {}",
                parts.len()
            )));
        };
        if header_segment.is_empty() || signature_segment.is_empty() {
            return Err(Error::malformed_token(
                "header and signature segments must not be empty",
            ));
        }
        if !payload_segment.is_empty() {
            return Err(Error::malformed_token(
                "payload segment must be empty for a detached signature",
            ));
        }

        let header = JwsHeader::decode(header_segment)?;
        let signature = base64url_decode(signature_segment)?;

        Ok(Self {
            header_segment: header_segment.to_string(),
            header,
            signature,
        })
    }

    /// The decoded header.
    pub fn header(&self) -> &JwsHeader {
        &self.header
    }

    /// The header exactly as it appeared in the token.
    pub fn header_segment(&self) -> &str {
        &self.header_segment
    }

    /// Raw signature bytes.
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// The bytes covered by the signature for the given canonical string.
    pub fn signing_input(&self, canonical: &[u8]) -> Vec<u8> {
        signing_input(&self.header_segment, canonical)
    }
}

impl Display for SignatureToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.header_segment,
            base64url_encode(&self.signature)
        )
    }
}

/// JWS signing input with detached content: `header_segment.base64url(canonical)`.
pub fn signing_input(header_segment: &str, canonical: &[u8]) -> Vec<u8> {
    let payload = base64url_encode(canonical);
    let mut input = Vec::with_capacity(header_segment.len() + 1 + payload.len());
    input.extend_from_slice(header_segment.as_bytes());
    input.push(b'.');
    input.extend_from_slice(payload.as_bytes());
    input
}
