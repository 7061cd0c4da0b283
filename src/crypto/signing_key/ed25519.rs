//
// Copyright 2026 The evidence-engine Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Ed25519 Signer
//!
//! Signs the message directly with Ed25519; there is no pre-hash step.

use ed25519_dalek::pkcs8::DecodePrivateKey;
use ed25519_dalek::Signer as _;

use crate::dsse;
use crate::errors::{EvidenceError, Result};

pub struct Ed25519Signer {
    signing_key: ed25519_dalek::SigningKey,
    key_id: String,
}

impl Ed25519Signer {
    /// Build an `Ed25519Signer` from a PKCS#8 DER private key.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let signing_key = ed25519_dalek::SigningKey::from_pkcs8_der(der).map_err(|e| {
            EvidenceError::KeyParseError(format!(
                "convert from pkcs8 der to ed25519 key failed: {e}"
            ))
        })?;
        Ok(Self {
            signing_key,
            key_id: String::new(),
        })
    }

    pub fn set_key_id(&mut self, key_id: String) {
        self.key_id = key_id;
    }
}

impl dsse::Signer for Ed25519Signer {
    /// Sign the given message using Ed25519.
    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let signature = self.signing_key.try_sign(msg)?;
        Ok(signature.to_bytes().to_vec())
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use ed25519_dalek::Verifier as _;

    use super::Ed25519Signer;
    use crate::crypto::signing_key::tests::MESSAGE;
    use crate::dsse::Signer as _;

    #[test]
    fn sign_and_verify() {
        let pem = fs::read("tests/data/keys/ed25519_private.pem").expect("read fixture failed");
        let block = pem::parse(&pem).unwrap();
        let signer = Ed25519Signer::from_pkcs8_der(block.contents()).unwrap();

        let sig = signer.sign(MESSAGE).expect("signing failed");
        let signature = ed25519_dalek::Signature::from_slice(&sig).unwrap();
        signer
            .signing_key
            .verifying_key()
            .verify(MESSAGE, &signature)
            .expect("signature did not verify");
    }

    #[test]
    fn rsa_pkcs8_is_not_an_ed25519_key() {
        let pem = fs::read("tests/data/keys/rsa_private.pem").unwrap();
        let block = pem::parse(&pem).unwrap();
        assert!(Ed25519Signer::from_pkcs8_der(block.contents()).is_err());
    }
}
