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

//! Canonical string construction.
//!
//! The canonical string is the exact byte sequence covered by a signature:
//!
//! ```text
//! idempotency-key: abc-123\n
//! content-type: application/json\n
//! POST /payments\n
//! idempotency-key,content-type\n
//! {"a":1}
//! ```
//!
//! One `name: value` line per covered header in caller order, the request line,
//! the list of covered names, then the body verbatim.

use std::collections::HashSet;

use http::header::{HeaderName, HeaderValue};
use http::Method;
use log::debug;

use crate::{Error, Result};

/// Build the canonical string for a request.
///
/// `headers` are the covered headers in signing order. Names are lowercased,
/// values are written verbatim.
pub fn build<'a, I>(method: &str, path: &str, headers: I, body: &[u8]) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    check_method(method)?;
    check_path(path)?;

    let headers = headers.into_iter().collect::<Vec<_>>();
    let names = check_header_names(headers.iter().map(|(name, _)| *name))?;
    for (name, value) in &headers {
        HeaderValue::from_bytes(value).map_err(|e| {
            Error::invalid_header_name(format!("header {name:?} has a value that is not valid HTTP"))
                .with_source(e)
        })?;
    }

    let capacity = headers
        .iter()
        .map(|(name, value)| name.len() * 2 + value.len() + 4)
        .sum::<usize>()
        + method.len()
        + path.len()
        + body.len()
        + 3;
    let mut buf = Vec::with_capacity(capacity);

    for (name, (_, value)) in names.iter().zip(headers.iter()) {
        buf.extend_from_slice(name.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(value);
        buf.push(b'\n');
    }

    buf.extend_from_slice(method.to_ascii_uppercase().as_bytes());
    buf.push(b' ');
    buf.extend_from_slice(path.as_bytes());
    buf.push(b'\n');

    buf.extend_from_slice(names.join(",").as_bytes());
    buf.push(b'\n');

    buf.extend_from_slice(body);

    debug!(
        "canonical string built: {} headers [{}], {} body bytes, {} bytes total",
        names.len(),
        names.join(","),
        body.len(),
        buf.len()
    );
    Ok(buf)
}

/// Check that `method` is a valid HTTP method token.
pub fn check_method(method: &str) -> Result<()> {
    Method::from_bytes(method.as_bytes()).map_err(|e| {
        Error::invalid_method(format!("{method:?} is not a valid HTTP method")).with_source(e)
    })?;
    Ok(())
}

/// Check that `path` is an absolute path without query, fragment, whitespace or
/// control characters.
pub fn check_path(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        return Err(Error::malformed_path(format!(
            "path must start with '/', got {path:?}"
        )));
    }
    if path.contains(['?', '#']) {
        return Err(Error::malformed_path(format!(
            "path must not contain a query or fragment, got {path:?}"
        )));
    }
    if path
        .bytes()
        .any(|b| b.is_ascii_control() || b.is_ascii_whitespace())
    {
        return Err(Error::malformed_path(format!(
            "path must not contain whitespace or control characters, got {path:?}"
        )));
    }
    Ok(())
}

/// Validate header names and return them lowercased, in order.
///
/// Fails on names that are not HTTP tokens and on case-insensitive duplicates.
pub fn check_header_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut lowered = Vec::new();

    for name in names {
        let header = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
            Error::invalid_header_name(format!("{name:?} is not a valid header name"))
                .with_source(e)
        })?;
        let header = header.as_str().to_string();

        if !seen.insert(header.clone()) {
            return Err(Error::duplicate_header_name(format!(
                "header {name:?} is included more than once"
            )));
        }
        lowered.push(header);
    }

    Ok(lowered)
}
