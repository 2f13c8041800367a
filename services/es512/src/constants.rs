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

/// JWS algorithm name for ECDSA over P-521 with SHA-512.
pub const ES512: &str = "ES512";

/// Header carrying the signature token.
pub const TL_SIGNATURE: &str = "tl-signature";

/// JWK curve name for P-521.
pub(crate) const JWK_CRV_P521: &str = "P-521";
/// JWK key type for elliptic curve keys.
pub(crate) const JWK_KTY_EC: &str = "EC";
/// Byte length of a P-521 field element.
pub(crate) const P521_FIELD_BYTES: usize = 66;

/// Env var holding the signing key id.
pub const TL_SIGNING_KID: &str = "TL_SIGNING_KID";
/// Env var holding the private key PEM.
pub const TL_SIGNING_PRIVATE_KEY: &str = "TL_SIGNING_PRIVATE_KEY";
/// Env var holding the private key file path.
pub const TL_SIGNING_PRIVATE_KEY_FILE: &str = "TL_SIGNING_PRIVATE_KEY_FILE";
/// Env var holding the JWKS url.
pub const TL_SIGNING_JKU: &str = "TL_SIGNING_JKU";
