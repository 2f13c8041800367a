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

use log::debug;
use tlsign_core::utils::Redact;
use tlsign_core::{Context, Result};

use crate::constants::*;
use crate::{Credential, PrivateKey};

/// Config for request signing, usually loaded from the environment.
#[derive(Clone, Default)]
pub struct Config {
    /// Key id published for the signing key.
    pub kid: Option<String>,
    /// Private key PEM text.
    pub private_key: Option<String>,
    /// Path to a private key PEM file, `~` is expanded.
    pub private_key_file: Option<String>,
    /// JWKS url to advertise in tokens.
    pub jku: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("kid", &self.kid)
            .field("private_key", &Redact::from(&self.private_key))
            .field("private_key_file", &self.private_key_file)
            .field("jku", &self.jku)
            .finish()
    }
}

impl Config {
    /// Load config from environment variables.
    ///
    /// Empty values are treated as unset.
    pub fn from_env(ctx: &Context) -> Self {
        let var = |key: &str| ctx.env_var(key).filter(|v| !v.trim().is_empty());

        Self {
            kid: var(TL_SIGNING_KID),
            private_key: var(TL_SIGNING_PRIVATE_KEY),
            private_key_file: var(TL_SIGNING_PRIVATE_KEY_FILE),
            jku: var(TL_SIGNING_JKU),
        }
    }

    /// Build a credential from this config.
    ///
    /// Returns `Ok(None)` when the kid or the key is not configured. Inline key
    /// text wins over a key file.
    pub fn load_credential(&self, ctx: &Context) -> Result<Option<Credential>> {
        let Some(kid) = &self.kid else {
            debug!("no signing kid configured");
            return Ok(None);
        };

        let pem = match (&self.private_key, &self.private_key_file) {
            (Some(pem), _) => pem.clone(),
            (None, Some(path)) => {
                debug!("loading signing key from {path}");
                ctx.file_read_as_string(path)?
            }
            (None, None) => {
                debug!("no signing key configured");
                return Ok(None);
            }
        };

        let mut cred = Credential::new(kid.as_str(), PrivateKey::from_pem(pem)?)?;
        if let Some(jku) = &self.jku {
            cred = cred.with_jku(jku.as_str());
        }
        Ok(Some(cred))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tlsign_core::{ErrorKind, OsEnv, StaticEnv};

    const PRIVATE: &str = include_str!("../tests/keys/ec512-private.pem");

    fn static_ctx(envs: &[(&str, &str)]) -> Context {
        Context::new().with_env(StaticEnv {
            home_dir: None,
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
    }

    #[test]
    fn test_from_env() {
        let ctx = static_ctx(&[
            (TL_SIGNING_KID, "kid-1"),
            (TL_SIGNING_PRIVATE_KEY, PRIVATE),
            (TL_SIGNING_JKU, ""),
        ]);
        let config = Config::from_env(&ctx);

        assert_eq!(config.kid.as_deref(), Some("kid-1"));
        assert_eq!(config.private_key.as_deref(), Some(PRIVATE));
        assert_eq!(config.private_key_file, None);
        assert_eq!(config.jku, None);
        assert!(!format!("{config:?}").contains("PRIVATE KEY-----\nMI"));
    }

    #[test]
    fn test_load_credential_inline() {
        let ctx = static_ctx(&[
            (TL_SIGNING_KID, "kid-1"),
            (TL_SIGNING_PRIVATE_KEY, PRIVATE),
            (TL_SIGNING_JKU, "https://example.com/jwks"),
        ]);
        let cred = Config::from_env(&ctx)
            .load_credential(&ctx)
            .unwrap()
            .unwrap();

        assert_eq!(cred.kid, "kid-1");
        assert_eq!(cred.jku.as_deref(), Some("https://example.com/jwks"));
        assert!(cred.is_valid());
    }

    #[test]
    fn test_load_credential_not_configured() {
        let ctx = static_ctx(&[(TL_SIGNING_PRIVATE_KEY, PRIVATE)]);
        assert!(Config::from_env(&ctx).load_credential(&ctx).unwrap().is_none());

        let ctx = static_ctx(&[(TL_SIGNING_KID, "kid-1")]);
        assert!(Config::from_env(&ctx).load_credential(&ctx).unwrap().is_none());
    }

    #[test]
    fn test_load_credential_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("signing.pem")).unwrap();
        file.write_all(PRIVATE.as_bytes()).unwrap();

        let ctx = Context::new().with_env(StaticEnv {
            home_dir: Some(dir.path().to_path_buf()),
            envs: HashMap::from([
                (TL_SIGNING_KID.to_string(), "kid-1".to_string()),
                (
                    TL_SIGNING_PRIVATE_KEY_FILE.to_string(),
                    "~/signing.pem".to_string(),
                ),
            ]),
        });
        let cred = Config::from_env(&ctx)
            .load_credential(&ctx)
            .unwrap()
            .unwrap();
        assert_eq!(cred.private_key.kid(), Some("kid-1"));
    }

    #[test]
    fn test_load_credential_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            kid: Some("kid-1".to_string()),
            private_key_file: Some(dir.path().join("absent.pem").to_string_lossy().to_string()),
            ..Default::default()
        };
        let err = config.load_credential(&Context::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    }

    #[test]
    fn test_load_credential_bad_key() {
        let config = Config {
            kid: Some("kid-1".to_string()),
            private_key: Some("not a key".to_string()),
            ..Default::default()
        };
        let err = config.load_credential(&Context::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidKeyFormat);
    }

    #[test]
    fn test_from_os_env() {
        temp_env::with_vars(
            [
                (TL_SIGNING_KID, Some("kid-os")),
                (TL_SIGNING_PRIVATE_KEY, Some(PRIVATE)),
                (TL_SIGNING_PRIVATE_KEY_FILE, None),
                (TL_SIGNING_JKU, None),
            ],
            || {
                let ctx = Context::new().with_env(OsEnv);
                let cred = Config::from_env(&ctx)
                    .load_credential(&ctx)
                    .unwrap()
                    .unwrap();
                assert_eq!(cred.kid, "kid-os");
                assert_eq!(cred.jku, None);
            },
        );
    }
}
