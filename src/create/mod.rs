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

//! Evidence assembly and upload.
//!
//! [`EvidenceCreator`] carries everything needed to attest one subject:
//! it verifies the subject digest against the artifact service, builds the
//! in-toto statement, signs it into a DSSE envelope and uploads the result.
//! [`CustomEvidence`] layers the multi-subject batch flow on top.

pub mod custom;

pub use custom::CustomEvidence;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::artifactory::{ArtifactoryServices, EvidenceDetails, EvidenceService};
use crate::crypto::SigningKey;
use crate::dsse::{Envelope, EnvelopeSigner, Signer};
use crate::errors::{EvidenceError, Result};
use crate::intoto::{self, Statement};

/// `createdBy` identity recorded when the caller supplies no user.
pub const DEFAULT_CREATED_BY: &str = "Evidence CLI";

/// The evidence service's answer to an upload.
///
/// `verified == false` means the server could not validate the signature
/// against a known public key. The upload still succeeded; the flag is only
/// surfaced to the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvidenceUploadResult {
    #[serde(rename = "predicateSlug", default)]
    pub predicate_slug: String,

    #[serde(default)]
    pub verified: bool,

    #[serde(rename = "predicateType", default)]
    pub predicate_type: String,
}

/// Builds, signs and uploads evidence for a single subject.
pub struct EvidenceCreator<'a> {
    artifactory: &'a dyn ArtifactoryServices,
    evidence: &'a dyn EvidenceService,
    predicate_file_path: String,
    predicate_type: String,
    markdown_file_path: String,
    key: String,
    key_id: String,
    provider_id: String,
    stage: String,
    user: String,
}

impl<'a> EvidenceCreator<'a> {
    pub fn new(
        artifactory: &'a dyn ArtifactoryServices,
        evidence: &'a dyn EvidenceService,
    ) -> Self {
        EvidenceCreator {
            artifactory,
            evidence,
            predicate_file_path: String::new(),
            predicate_type: String::new(),
            markdown_file_path: String::new(),
            key: String::new(),
            key_id: String::new(),
            provider_id: String::new(),
            stage: String::new(),
            user: String::new(),
        }
    }

    /// Path of the JSON predicate file.
    pub fn predicate_file(mut self, path: impl Into<String>) -> Self {
        self.predicate_file_path = path.into();
        self
    }

    pub fn predicate_type(mut self, predicate_type: impl Into<String>) -> Self {
        self.predicate_type = predicate_type.into();
        self
    }

    /// Path of an optional `.md` annotation file.
    pub fn markdown_file(mut self, path: impl Into<String>) -> Self {
        self.markdown_file_path = path.into();
        self
    }

    /// The signing key: either PEM content or a path to a PEM file.
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Key alias recorded as `keyid` in the envelope signatures.
    pub fn key_id(mut self, key_id: impl Into<String>) -> Self {
        self.key_id = key_id.into();
        self
    }

    pub fn provider_id(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = provider_id.into();
        self
    }

    pub fn stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = stage.into();
        self
    }

    /// Identity recorded as `createdBy`; defaults to [`DEFAULT_CREATED_BY`].
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Attest `subject`: build, sign and upload the evidence in one go.
    ///
    /// `subject_sha256` is the digest the caller believes the subject has;
    /// pass an empty string to accept whatever the artifact service reports.
    pub fn create(&self, subject: &str, subject_sha256: &str) -> Result<EvidenceUploadResult> {
        let envelope = self.create_envelope(subject, subject_sha256)?;
        self.upload(&envelope, subject)
    }

    /// Build and sign the DSSE envelope for `subject` without uploading it.
    /// Returns the serialized envelope JSON.
    pub fn create_envelope(&self, subject: &str, subject_sha256: &str) -> Result<Vec<u8>> {
        let predicate = fs::read(&self.predicate_file_path).map_err(|e| {
            warn!(path = self.predicate_file_path, "failed to read predicate file");
            EvidenceError::from(e)
        })?;
        self.create_envelope_with_predicate(
            subject,
            subject_sha256,
            &self.predicate_type,
            &predicate,
        )
    }

    /// Build and sign an envelope from an in-memory predicate instead of
    /// the configured predicate file. Used by flows that already hold the
    /// predicate bytes and type.
    pub fn create_envelope_with_predicate(
        &self,
        subject: &str,
        subject_sha256: &str,
        predicate_type: &str,
        predicate: &[u8],
    ) -> Result<Vec<u8>> {
        let user = if self.user.is_empty() {
            DEFAULT_CREATED_BY
        } else {
            &self.user
        };
        let mut statement = Statement::new(predicate, predicate_type, user)?;
        self.set_markdown(&mut statement)?;
        let sha256 = self.resolve_subject_sha256(subject, subject_sha256)?;
        statement.set_subject(&sha256);
        statement.set_stage(&self.stage);
        let envelope = create_and_sign_envelope(&statement.marshal()?, &self.key, &self.key_id)?;
        Ok(serde_json::to_vec(&envelope)?)
    }

    /// Sign a statement authored by an external integration. The subject
    /// digest and stage are injected into the statement JSON as-is; no other
    /// part of the document is interpreted.
    pub fn create_envelope_from_statement(
        &self,
        statement: &[u8],
        subject: &str,
        subject_sha256: &str,
    ) -> Result<Vec<u8>> {
        let sha256 = self.resolve_subject_sha256(subject, subject_sha256)?;
        let extended = intoto::add_subject_and_stage(statement, &sha256, &self.stage)?;
        let envelope = create_and_sign_envelope(&extended, &self.key, &self.key_id)?;
        Ok(serde_json::to_vec(&envelope)?)
    }

    /// Fetch the authoritative digest from the artifact service and compare
    /// it against the caller-supplied one. A disagreement is a hard error;
    /// the caller's value never wins.
    fn resolve_subject_sha256(&self, subject: &str, subject_sha256: &str) -> Result<String> {
        let info = self.artifactory.file_info(subject).map_err(|e| {
            warn!(subject, "file path does not exist");
            e
        })?;
        if !subject_sha256.is_empty() && info.sha256 != subject_sha256 {
            return Err(EvidenceError::DigestMismatch);
        }
        Ok(info.sha256)
    }

    fn set_markdown(&self, statement: &mut Statement) -> Result<()> {
        if self.markdown_file_path.is_empty() {
            return Ok(());
        }
        // Extension check happens before any file I/O.
        if !self.markdown_file_path.ends_with(".md") {
            return Err(EvidenceError::MarkdownExtensionError(
                self.markdown_file_path.clone(),
            ));
        }
        let markdown = fs::read(&self.markdown_file_path).map_err(|e| {
            warn!(path = self.markdown_file_path, "failed to read markdown file");
            EvidenceError::from(e)
        })?;
        statement.set_markdown(&markdown);
        Ok(())
    }

    /// Upload an evidence payload for `repo_path` and interpret the server's
    /// JSON response.
    pub(crate) fn upload(&self, payload: &[u8], repo_path: &str) -> Result<EvidenceUploadResult> {
        let details = EvidenceDetails {
            subject_uri: repo_path.to_string(),
            dsse_file_raw: payload.to_vec(),
            provider_id: self.provider_id.clone(),
        };
        let body = self.evidence.upload_evidence(&details)?;
        let result: EvidenceUploadResult = serde_json::from_slice(&body)?;
        if result.verified {
            info!(subject = repo_path, "evidence successfully created and verified");
        } else {
            info!(
                subject = repo_path,
                "evidence created but not verified due to a missing or invalid public key"
            );
        }
        Ok(result)
    }

    pub(crate) fn artifactory(&self) -> &'a dyn ArtifactoryServices {
        self.artifactory
    }
}

/// Sign `payload` into a DSSE envelope. `key` is PEM content or a path to a
/// PEM file; `key_id` is the optional server-side key alias.
pub fn create_and_sign_envelope(payload: &[u8], key: &str, key_id: &str) -> Result<Envelope> {
    let key_material = if Path::new(key).is_file() {
        fs::read_to_string(key)?
    } else {
        key.to_string()
    };
    let mut signing_key = SigningKey::from_pem(key_material.as_bytes())
        .map_err(|e| enhance_key_error(e, key_id))?;
    signing_key.set_key_id(key_id);

    let signers: Vec<Box<dyn Signer>> = vec![Box::new(signing_key)];
    EnvelopeSigner::new(signers)?.sign_payload(intoto::PAYLOAD_TYPE, payload)
}

/// Wrap a key-loading failure with guidance that depends on whether a key
/// alias was supplied: an alias points at a server-side lookup problem, no
/// alias points at the raw key material.
fn enhance_key_error(err: EvidenceError, key_id: &str) -> EvidenceError {
    if key_id.is_empty() {
        EvidenceError::InvalidPrivateKey {
            source: Box::new(err),
        }
    } else {
        EvidenceError::KeyAliasNotFound {
            key_id: key_id.to_string(),
            source: Box::new(err),
        }
    }
}
