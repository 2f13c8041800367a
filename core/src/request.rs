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

use crate::{canonical, Error, Result};

/// SignaturePayload holds the request fields that a signature covers.
///
/// Headers keep insertion order. For signing, every header is covered in that
/// order; for verifying, they are the headers of the received request and are
/// looked up by name.
#[derive(Debug, Clone, Default)]
pub struct SignaturePayload {
    method: Option<String>,
    path: Option<String>,
    headers: Vec<(String, Bytes)>,
    body: Option<Bytes>,
}

impl SignaturePayload {
    /// Create an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a payload from an `http::Request`.
    ///
    /// Only method, path and body are taken; headers are left to the caller so the
    /// covered set stays explicit.
    pub fn from_request<B: AsRef<[u8]>>(req: &http::Request<B>) -> Self {
        Self::from_parts(req.method(), req.uri(), req.body().as_ref())
    }

    fn from_parts(method: &http::Method, uri: &http::Uri, body: &[u8]) -> Self {
        Self {
            method: Some(method.as_str().to_string()),
            path: Some(uri.path().to_string()),
            headers: Vec::new(),
            body: Some(Bytes::copy_from_slice(body)),
        }
    }

    /// Set the HTTP method. Case-insensitive.
    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = Some(method.into());
    }

    /// Set the request path, without query string.
    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = Some(path.into());
    }

    /// Append a header.
    pub fn push_header(&mut self, name: impl Into<String>, value: impl AsRef<[u8]>) {
        self.headers
            .push((name.into(), Bytes::copy_from_slice(value.as_ref())));
    }

    /// Append every header of a `HeaderMap`.
    ///
    /// Only the first value of a multi-valued header is kept.
    pub fn push_header_map(&mut self, headers: &HeaderMap) {
        for name in headers.keys() {
            if let Some(value) = headers.get(name) {
                self.push_header(name.as_str(), value.as_bytes());
            }
        }
    }

    /// Set the body. An empty body is still a set body.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = Some(body.into());
    }

    /// HTTP method as given.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Request path.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Headers in insertion order.
    pub fn headers(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    /// Header names in insertion order.
    pub fn header_names(&self) -> Vec<&str> {
        self.headers.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// First value of the header named `name`, ignoring case.
    pub fn header(&self, name: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_ref())
    }

    /// Body bytes; an unset body reads as empty.
    pub fn body(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }

    /// Whether a body was set explicitly.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Return method and path, failing if either is missing or empty.
    pub fn method_and_path(&self) -> Result<(&str, &str)> {
        let method = self
            .method()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::incomplete_request("method is not set"))?;
        let path = self
            .path()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::incomplete_request("path is not set"))?;
        Ok((method, path))
    }

    /// Canonical string covering every header in insertion order.
    pub fn canonical(&self) -> Result<Vec<u8>> {
        let (method, path) = self.method_and_path()?;
        canonical::build(method, path, self.headers(), self.body())
    }

    /// Canonical string covering `names`, in that order, with values looked up
    /// from this payload's headers.
    ///
    /// Fails with `MissingRequiredHeader` if a name has no value here.
    pub fn canonical_for<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<u8>> {
        let (method, path) = self.method_and_path()?;

        let mut covered = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let value = self.header(name).ok_or_else(|| {
                Error::missing_required_header(format!(
                    "signed header {name:?} is absent from the request"
                ))
            })?;
            covered.push((name, value));
        }

        canonical::build(method, path, covered, self.body())
    }
}
