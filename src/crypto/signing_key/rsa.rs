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

//! # RSA-PSS Signer
//!
//! Signs with RSA using PSS padding and SHA-256. PSS (rather than
//! PKCS#1 v1.5) keeps evidence signatures domain-separated from legacy RSA
//! signature schemes.

use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::pss::BlindedSigningKey;
use rsa::signature::{RandomizedSigner, SignatureEncoding};

use crate::dsse;
use crate::errors::{EvidenceError, Result};

pub struct RsaPssSigner {
    signing_key: BlindedSigningKey<sha2::Sha256>,
    key_id: String,
}

impl RsaPssSigner {
    /// Build an `RsaPssSigner` from a PKCS#8 DER private key.
    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self> {
        let private_key = rsa::RsaPrivateKey::from_pkcs8_der(der).map_err(|e| {
            EvidenceError::KeyParseError(format!("convert from pkcs8 der to rsa key failed: {e}"))
        })?;
        Ok(Self::from_private_key(private_key))
    }

    /// Build an `RsaPssSigner` from a PKCS#1 DER private key
    /// (`RSA PRIVATE KEY` PEM blocks).
    pub fn from_pkcs1_der(der: &[u8]) -> Result<Self> {
        let private_key = rsa::RsaPrivateKey::from_pkcs1_der(der).map_err(|e| {
            EvidenceError::KeyParseError(format!("convert from pkcs1 der to rsa key failed: {e}"))
        })?;
        Ok(Self::from_private_key(private_key))
    }

    fn from_private_key(private_key: rsa::RsaPrivateKey) -> Self {
        Self {
            signing_key: BlindedSigningKey::<sha2::Sha256>::new(private_key),
            key_id: String::new(),
        }
    }

    pub fn set_key_id(&mut self, key_id: String) {
        self.key_id = key_id;
    }
}

impl dsse::Signer for RsaPssSigner {
    /// Sign the given message with RSA-PSS over a SHA-256 digest.
    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>> {
        let mut rng = rand::thread_rng();
        Ok(self.signing_key.sign_with_rng(&mut rng, msg).to_vec())
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rsa::signature::{Keypair, Verifier};

    use super::RsaPssSigner;
    use crate::crypto::signing_key::tests::MESSAGE;
    use crate::dsse::Signer as _;

    #[test]
    fn sign_and_verify() {
        let pem = fs::read("tests/data/keys/rsa_private.pem").expect("read fixture failed");
        let block = pem::parse(&pem).unwrap();
        let signer = RsaPssSigner::from_pkcs8_der(block.contents()).unwrap();

        let sig = signer.sign(MESSAGE).expect("signing failed");

        let verifying_key = signer.signing_key.verifying_key();
        let signature = rsa::pss::Signature::try_from(sig.as_slice()).unwrap();
        verifying_key
            .verify(MESSAGE, &signature)
            .expect("signature did not verify");
    }

    #[test]
    fn pss_signatures_are_randomized() {
        let pem = fs::read("tests/data/keys/rsa_pkcs1_private.pem").unwrap();
        let block = pem::parse(&pem).unwrap();
        let signer = RsaPssSigner::from_pkcs1_der(block.contents()).unwrap();
        let first = signer.sign(MESSAGE).unwrap();
        let second = signer.sign(MESSAGE).unwrap();
        // PSS embeds a random salt, two signatures over the same message differ.
        assert_ne!(first, second);
    }
}
