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

use std::fmt::{Debug, Formatter};

use tlsign_core::{Error, Result};

use crate::PrivateKey;

/// Credential is a signing key together with the key id it is published under.
#[derive(Clone)]
pub struct Credential {
    /// Key id placed in the token header.
    pub kid: String,
    /// The ES512 private key.
    pub private_key: PrivateKey,
    /// URL of the JWKS publishing the public key, if any.
    pub jku: Option<String>,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("kid", &self.kid)
            .field("private_key", &self.private_key)
            .field("jku", &self.jku)
            .finish()
    }
}

impl Credential {
    /// Create a credential, failing if the key already declares another kid.
    pub fn new(kid: impl Into<String>, private_key: PrivateKey) -> Result<Self> {
        let kid = kid.into();
        if kid.is_empty() {
            return Err(Error::config_invalid("kid must not be empty"));
        }
        if let Some(declared) = private_key.kid() {
            if declared != kid {
                return Err(Error::key_mismatch(format!(
                    "private key is declared for kid {declared:?}, not {kid:?}"
                )));
            }
        }

        Ok(Self {
            private_key: private_key.with_kid(kid.clone()),
            kid,
            jku: None,
        })
    }

    /// Set the JWKS url.
    pub fn with_jku(mut self, jku: impl Into<String>) -> Self {
        self.jku = Some(jku.into());
        self
    }

    /// Check that the credential can sign.
    pub fn is_valid(&self) -> bool {
        !self.kid.is_empty() && self.private_key.kid() == Some(self.kid.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tlsign_core::ErrorKind;

    const PRIVATE: &str = include_str!("../tests/keys/ec512-private.pem");

    #[test]
    fn test_credential_new() {
        let key = PrivateKey::from_pem(PRIVATE).unwrap();
        let cred = Credential::new("kid-1", key).unwrap().with_jku("https://example.com/jwks");

        assert!(cred.is_valid());
        assert_eq!(cred.private_key.kid(), Some("kid-1"));
        assert_eq!(cred.jku.as_deref(), Some("https://example.com/jwks"));
    }

    #[test]
    fn test_credential_key_mismatch() {
        let key = PrivateKey::from_pem(PRIVATE).unwrap().with_kid("kid-1");
        let err = Credential::new("kid-2", key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::KeyMismatch);
    }

    #[test]
    fn test_credential_empty_kid() {
        let key = PrivateKey::from_pem(PRIVATE).unwrap();
        let err = Credential::new("", key).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_credential_debug() {
        let key = PrivateKey::from_pem(PRIVATE).unwrap();
        let cred = Credential::new("kid-1", key).unwrap();
        let s = format!("{cred:?}");
        assert!(s.contains("kid-1"));
        assert!(s.contains("<redacted>"));
        assert!(!s.contains("PRIVATE KEY"));
    }
}
