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

//! DSSE (Dead Simple Signing Envelope) support.
//!
//! This module implements the DSSE v1 envelope format and the
//! Pre-Authentication Encoding (PAE) signed over by every signer.
//!
//! See: <https://github.com/secure-systems-lab/dsse/blob/v1.0.0/envelope.md>

use base64::{engine::general_purpose::STANDARD as base64, Engine as _};
use serde::{Deserialize, Serialize};

use crate::errors::{EvidenceError, Result};

/// A signer contributes one signature entry to a DSSE envelope.
///
/// `sign` receives the PAE bytes, never the raw payload.
pub trait Signer {
    /// Sign the given pre-authentication-encoded message.
    fn sign(&self, msg: &[u8]) -> Result<Vec<u8>>;

    /// The key identifier recorded next to the signature. May be empty.
    fn key_id(&self) -> &str;
}

/// A DSSE envelope as serialized on the wire.
///
/// `payload` is the base64 encoding of the raw payload bytes; the PAE
/// encoding is only ever used as signature input and is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub payload: String,
    #[serde(rename = "payloadType")]
    pub payload_type: String,
    pub signatures: Vec<Signature>,
}

/// One `{keyid, sig}` entry of an envelope. Both fields are base64/plain
/// strings to match the wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub keyid: String,
    pub sig: String,
}

impl Envelope {
    /// Base64-decode the stored payload back into the raw bytes.
    pub fn decoded_payload(&self) -> Result<Vec<u8>> {
        Ok(base64.decode(&self.payload)?)
    }
}

/// Compute the DSSE Pre-Authentication Encoding for the given payload type
/// and payload:
///
/// ```text
/// "DSSEv1" + SP + LEN(type) + SP + type + SP + LEN(payload) + SP + payload
/// ```
///
/// Lengths are byte lengths in ASCII decimal.
pub fn pae(payload_type: &str, payload: &[u8]) -> Vec<u8> {
    let mut enc = format!("DSSEv1 {} {} ", payload_type.len(), payload_type).into_bytes();
    enc.extend_from_slice(format!("{} ", payload.len()).as_bytes());
    enc.extend_from_slice(payload);
    enc
}

/// `EnvelopeSigner` signs payloads into envelopes using one or more
/// [`Signer`]s. One signature entry is produced per signer, in registration
/// order.
pub struct EnvelopeSigner {
    providers: Vec<Box<dyn Signer>>,
}

impl std::fmt::Debug for EnvelopeSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeSigner")
            .field("providers", &self.providers.len())
            .finish()
    }
}

impl EnvelopeSigner {
    /// Create an `EnvelopeSigner` from the given signers.
    ///
    /// Zero signers is a construction-time error; an unsigned envelope is
    /// never produced.
    pub fn new(signers: Vec<Box<dyn Signer>>) -> Result<Self> {
        if signers.is_empty() {
            return Err(EvidenceError::NoSigners);
        }
        Ok(EnvelopeSigner { providers: signers })
    }

    /// Sign `body` under `payload_type` into a DSSE envelope.
    pub fn sign_payload(&self, payload_type: &str, body: &[u8]) -> Result<Envelope> {
        let mut envelope = Envelope {
            payload: base64.encode(body),
            payload_type: payload_type.to_string(),
            signatures: Vec::with_capacity(self.providers.len()),
        };

        let pae_enc = pae(payload_type, body);
        for signer in &self.providers {
            let sig = signer.sign(&pae_enc)?;
            envelope.signatures.push(Signature {
                keyid: signer.key_id().to_string(),
                sig: base64.encode(sig),
            });
        }

        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSigner {
        key_id: String,
        output: Vec<u8>,
    }

    impl Signer for FakeSigner {
        fn sign(&self, _msg: &[u8]) -> Result<Vec<u8>> {
            Ok(self.output.clone())
        }

        fn key_id(&self) -> &str {
            &self.key_id
        }
    }

    #[test]
    fn pae_format() {
        let result = pae("application/test", b"test payload");
        assert_eq!(result, b"DSSEv1 16 application/test 12 test payload");
    }

    #[test]
    fn pae_uses_byte_lengths() {
        let result = pae("t", "p\u{00e9}".as_bytes());
        // "pé" is three bytes in UTF-8.
        assert!(result.starts_with(b"DSSEv1 1 t 3 "));
    }

    #[test]
    fn no_signers_is_an_error() {
        let err = EnvelopeSigner::new(vec![]).expect_err("zero signers must fail");
        assert!(matches!(err, EvidenceError::NoSigners));
    }

    #[test]
    fn one_signature_per_signer_in_order() {
        let signers: Vec<Box<dyn Signer>> = vec![
            Box::new(FakeSigner {
                key_id: "first".into(),
                output: vec![1, 2, 3],
            }),
            Box::new(FakeSigner {
                key_id: "second".into(),
                output: vec![4, 5, 6],
            }),
        ];
        let envelope = EnvelopeSigner::new(signers)
            .unwrap()
            .sign_payload("application/vnd.in-toto+json", b"{\"a\":1}")
            .unwrap();

        assert_eq!(envelope.signatures.len(), 2);
        assert_eq!(envelope.signatures[0].keyid, "first");
        assert_eq!(envelope.signatures[1].keyid, "second");
        assert_eq!(envelope.decoded_payload().unwrap(), b"{\"a\":1}");
    }

    #[test]
    fn payload_round_trips_unmodified() {
        let body = br#"{"_type":"https://in-toto.io/Statement/v1"}"#;
        let signers: Vec<Box<dyn Signer>> = vec![Box::new(FakeSigner {
            key_id: String::new(),
            output: vec![0xAA],
        })];
        let envelope = EnvelopeSigner::new(signers)
            .unwrap()
            .sign_payload("application/vnd.in-toto+json", body)
            .unwrap();
        assert_eq!(envelope.decoded_payload().unwrap(), body);
        assert_eq!(envelope.payload_type, "application/vnd.in-toto+json");
    }

    #[test]
    fn envelope_wire_field_names() {
        let envelope = Envelope {
            payload: "cGF5bG9hZA==".into(),
            payload_type: "application/vnd.in-toto+json".into(),
            signatures: vec![Signature {
                keyid: "k".into(),
                sig: "c2ln".into(),
            }],
        };
        let json = serde_json::to_string(&envelope).unwrap();
        assert!(json.contains("\"payloadType\""));
        assert!(json.contains("\"keyid\""));
        assert!(json.contains("\"sig\""));
    }
}
