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

//! # ECDSA Signer
//!
//! Signs with ECDSA over the P-256 curve. The message is hashed with SHA-256
//! and the signature is encoded in ASN.1 DER.

use p256::ecdsa::signature::Signer as _;
use p256::pkcs8::DecodePrivateKey;

use crate::dsse;
use crate::errors::{EvidenceError, Result};

pub struct EcdsaSigner {
    signing_key: p256::ecdsa::SigningKey,
    key_id: String,
}

impl EcdsaSigner {
    /// Build an `EcdsaSigner` from a PKCS#8 DER private key.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let signing_key = p256::ecdsa::SigningKey::from_pkcs8_der(der).map_err(|e| {
            EvidenceError::KeyParseError(format!("convert from pkcs8 der to ecdsa key failed: {e}"))
        })?;
        Ok(Self {
            signing_key,
            key_id: String::new(),
        })
    }

    /// Build an `EcdsaSigner` from a SEC1 DER private key
    /// (`EC PRIVATE KEY` PEM blocks).
    pub fn from_sec1_der(der: &[u8]) -> Result<Self> {
        let secret = p256::SecretKey::from_sec1_der(der).map_err(|e| {
            EvidenceError::KeyParseError(format!("convert from sec1 der to ecdsa key failed: {e}"))
        })?;
        Ok(Self {
            signing_key: p256::ecdsa::SigningKey::from(secret),
            key_id: String::new(),
        })
    }

    pub fn set_key_id(&mut self, key_id: String) {
        self.key_id = key_id;
    }
}

impl dsse::Signer for EcdsaSigner {
    /// Sign the given message. The message is hashed with SHA-256, and the
    /// resulting ECDSA signature is encoded in ASN.1 DER.
    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let signature: p256::ecdsa::Signature = self.signing_key.try_sign(msg)?;
        Ok(signature.to_der().as_bytes().to_vec())
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use p256::ecdsa::signature::Verifier as _;

    use super::EcdsaSigner;
    use crate::crypto::signing_key::tests::MESSAGE;
    use crate::dsse::Signer as _;

    #[test]
    fn sign_and_verify() {
        let pem = fs::read("tests/data/keys/ecdsa_private.pem").expect("read fixture failed");
        let block = pem::parse(&pem).unwrap();
        let signer = EcdsaSigner::from_pkcs8_der(block.contents()).unwrap();

        let sig = signer.sign(MESSAGE).expect("signing failed");

        let verifying_key = signer.signing_key.verifying_key();
        let signature = p256::ecdsa::Signature::from_der(&sig).expect("signature is not DER");
        verifying_key
            .verify(MESSAGE, &signature)
            .expect("signature did not verify");
    }

    #[test]
    fn sec1_and_pkcs8_load_the_same_key() {
        let pkcs8 = fs::read("tests/data/keys/ecdsa_private.pem").unwrap();
        let sec1 = fs::read("tests/data/keys/ecdsa_sec1_private.pem").unwrap();
        let a = EcdsaSigner::from_pkcs8_der(pem::parse(&pkcs8).unwrap().contents()).unwrap();
        let b = EcdsaSigner::from_sec1_der(pem::parse(&sec1).unwrap().contents()).unwrap();
        assert_eq!(
            a.signing_key.verifying_key().to_sec1_bytes(),
            b.signing_key.verifying_key().to_sec1_bytes()
        );
    }

    #[test]
    fn ed25519_pkcs8_is_not_an_ecdsa_key() {
        let pem = fs::read("tests/data/keys/ed25519_private.pem").unwrap();
        let block = pem::parse(&pem).unwrap();
        assert!(EcdsaSigner::from_pkcs8_der(block.contents()).is_err());
    }
}
