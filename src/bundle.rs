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

//! Sigstore bundle adapter for "bring your own attestation" flows.
//!
//! Bundles produced by third-party signing tools carry an already-signed
//! DSSE envelope. The adapter parses the bundle JSON, exposes that envelope,
//! and extracts the subject (repository path and digest) recorded in the
//! envelope's in-toto statement. Verification material in the bundle is
//! preserved but not interpreted here.

use std::path::Path;

use base64::engine::general_purpose::STANDARD as base64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::dsse::Envelope;
use crate::errors::{EvidenceError, Result};

/// A parsed sigstore bundle. Fields this engine does not consume
/// (verification material, transparency log entries) are retained untyped
/// so the bundle can be re-serialized without loss.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(rename = "mediaType", default)]
    pub media_type: String,

    #[serde(
        rename = "dsseEnvelope",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dsse_envelope: Option<Envelope>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Bundle {
    /// Load and parse a bundle from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read(path.as_ref())?;
        Self::from_slice(&raw)
    }

    /// Parse a bundle from JSON bytes.
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw)
            .map_err(|e| EvidenceError::BundleParseError(e.to_string()))
    }

    /// The DSSE envelope embedded in the bundle.
    pub fn dsse_envelope(&self) -> Result<&Envelope> {
        self.dsse_envelope
            .as_ref()
            .ok_or(EvidenceError::BundleMissingDsseEnvelope)
    }

    /// Extract `(repoPath, sha256)` from the first subject of the statement
    /// inside the bundle's DSSE envelope. The name is required; a missing
    /// digest yields an empty string.
    pub fn extract_subject(&self) -> Result<(String, String)> {
        let envelope = self.dsse_envelope()?;
        let payload = base64.decode(&envelope.payload)?;
        let statement: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(&payload)
                .map_err(|e| EvidenceError::BundleParseError(e.to_string()))?;
        extract_repo_path_from_statement(&statement)
    }

    /// Serialize the bundle back into its JSON wire form.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

fn extract_repo_path_from_statement(
    statement: &serde_json::Map<String, serde_json::Value>,
) -> Result<(String, String)> {
    let subject = statement
        .get("subject")
        .and_then(|s| s.as_array())
        .and_then(|s| s.first())
        .ok_or(EvidenceError::StatementSubjectMissing)?;

    let name = subject
        .get("name")
        .and_then(|n| n.as_str())
        .filter(|n| !n.is_empty())
        .ok_or(EvidenceError::SubjectNameMissing)?;

    let sha256 = subject
        .get("digest")
        .and_then(|d| d.get("sha256"))
        .and_then(|s| s.as_str())
        .unwrap_or_default();

    Ok((name.to_string(), sha256.to_string()))
}
