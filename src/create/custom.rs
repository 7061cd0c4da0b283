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

//! Multi-subject "custom evidence" flow.
//!
//! One evidence payload — either a freshly signed DSSE envelope or a
//! third-party sigstore bundle — is attached to up to ten subjects. Subjects
//! are processed independently; one failure does not abort the rest. When
//! the subjects were discovered automatically (extracted from a bundle
//! rather than named by the caller), failures degrade to a non-fatal no-op
//! so orchestration pipelines can treat "nothing to attest" as
//! success-adjacent.

use tracing::{error, info};

use crate::bundle::Bundle;
use crate::create::{EvidenceCreator, EvidenceUploadResult};
use crate::errors::{EvidenceError, Result};
use crate::subject;

const SUBJECTS_LIMIT: usize = 10;

pub struct CustomEvidence<'a> {
    creator: EvidenceCreator<'a>,
    subject_repo_paths: Vec<String>,
    subject_sha256: String,
    sigstore_bundle_path: String,
    auto_subject_resolution: bool,
}

impl<'a> CustomEvidence<'a> {
    pub fn new(creator: EvidenceCreator<'a>) -> Self {
        CustomEvidence {
            creator,
            subject_repo_paths: Vec::new(),
            subject_sha256: String::new(),
            sigstore_bundle_path: String::new(),
            auto_subject_resolution: false,
        }
    }

    /// Add an explicitly named subject repository path.
    pub fn subject(mut self, repo_path: impl Into<String>) -> Self {
        self.subject_repo_paths.push(repo_path.into());
        self
    }

    /// The digest the caller expects the subject(s) to have.
    pub fn subject_sha256(mut self, sha256: impl Into<String>) -> Self {
        self.subject_sha256 = sha256.into();
        self
    }

    /// Path of a sigstore bundle to upload instead of signing a new
    /// envelope. When no subject is named explicitly, the bundle's own
    /// subject is extracted and resolved.
    pub fn sigstore_bundle(mut self, path: impl Into<String>) -> Self {
        self.sigstore_bundle_path = path.into();
        self
    }

    /// Process all subjects and upload the evidence payload to each.
    pub fn run(mut self) -> Result<Vec<EvidenceUploadResult>> {
        self.check_subjects_limit()?;

        let payload = if !self.sigstore_bundle_path.is_empty() {
            info!(path = self.sigstore_bundle_path, "reading sigstore bundle");
            self.process_sigstore_bundle()?
        } else {
            let subject = self
                .subject_repo_paths
                .first()
                .ok_or(EvidenceError::EmptySubject)?;
            info!(subject, "creating DSSE envelope");
            // There is always exactly one subject on this path.
            self.creator.create_envelope(subject, &self.subject_sha256)?
        };
        self.check_subjects_limit()?;

        let mut results = Vec::new();
        let mut errors: Vec<EvidenceError> = Vec::new();
        let mut succeeded: Vec<String> = Vec::new();
        let mut failed: Vec<String> = Vec::new();

        for repo_path in &self.subject_repo_paths {
            if let Err(e) = validate_subject(repo_path) {
                error!(subject = repo_path.as_str(), error = %e, "subject validation failed");
                errors.push(e);
                failed.push(repo_path.clone());
                continue;
            }
            match self.creator.upload(&payload, repo_path) {
                Ok(result) => {
                    info!(subject = repo_path.as_str(), "successfully processed subject");
                    succeeded.push(repo_path.clone());
                    results.push(result);
                }
                Err(e) => {
                    let handled = handle_subject_not_found(repo_path, e);
                    error!(subject = repo_path.as_str(), error = %handled, "evidence upload failed");
                    errors.push(handled);
                    failed.push(repo_path.clone());
                }
            }
        }

        if !succeeded.is_empty() {
            info!(count = succeeded.len(), subjects = succeeded.join(", ").as_str(), "subjects processed");
        }
        if !failed.is_empty() {
            error!(count = failed.len(), subjects = failed.join(", ").as_str(), "subjects failed");
        }

        self.final_result(results, errors, &succeeded, &failed)
    }

    fn check_subjects_limit(&self) -> Result<()> {
        if self.subject_repo_paths.len() > SUBJECTS_LIMIT {
            return Err(EvidenceError::TooManySubjects {
                count: self.subject_repo_paths.len(),
                limit: SUBJECTS_LIMIT,
            });
        }
        Ok(())
    }

    /// Parse the bundle, fill in its subjects when none were named, and
    /// return the bundle JSON as the evidence payload.
    fn process_sigstore_bundle(&mut self) -> Result<Vec<u8>> {
        let bundle = Bundle::from_path(&self.sigstore_bundle_path)?;
        if self.subject_repo_paths.is_empty() {
            self.auto_subject_resolution = true;
            self.subject_repo_paths = self.extract_subjects(&bundle)?;
        }
        bundle.to_json()
    }

    fn extract_subjects(&self, bundle: &Bundle) -> Result<Vec<String>> {
        let (name, sha256) = bundle
            .extract_subject()
            .map_err(|e| self.subject_error(e.to_string()))?;

        info!(subject = name.as_str(), checksum = sha256.as_str(), "resolving subject from bundle");
        let subjects = subject::resolve_subject(self.creator.artifactory(), &name, &sha256)
            .map_err(|e| self.subject_error(e.to_string()))?;

        info!(count = subjects.len(), "resolved subjects from bundle");
        Ok(subjects)
    }

    /// Subject discovery errors are only a no-op when discovery was
    /// automatic; an explicitly named subject keeps the real error.
    fn subject_error(&self, message: String) -> EvidenceError {
        if self.auto_subject_resolution {
            EvidenceError::NoOp(message)
        } else {
            EvidenceError::UnexpectedError(message)
        }
    }

    fn final_result(
        &self,
        results: Vec<EvidenceUploadResult>,
        mut errors: Vec<EvidenceError>,
        succeeded: &[String],
        failed: &[String],
    ) -> Result<Vec<EvidenceUploadResult>> {
        if errors.is_empty() {
            return Ok(results);
        }
        if self.auto_subject_resolution {
            let message = if succeeded.is_empty() {
                format!(
                    "Failed to process {} subjects: {}",
                    failed.len(),
                    failed.join(", ")
                )
            } else {
                format!(
                    "Partially successful: {} succeeded, {} failed. Failed subjects: {}",
                    succeeded.len(),
                    failed.len(),
                    failed.join(", ")
                )
            };
            return Err(EvidenceError::NoOp(message));
        }
        // Explicitly named subjects get the first error as-is.
        Err(errors.remove(0))
    }
}

/// A subject must be `<repo>/<name>` or deeper, with no empty segments.
fn validate_subject(repo_path: &str) -> Result<()> {
    let segments: Vec<&str> = repo_path.split('/').collect();
    if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
        return Err(EvidenceError::InvalidSubject(repo_path.to_string()));
    }
    Ok(())
}

/// Remap 400/404 upload responses to a single user-facing message; the usual
/// cause is a subject-format mistake, not a server problem.
fn handle_subject_not_found(repo_path: &str, err: EvidenceError) -> EvidenceError {
    let message = err.to_string();
    if message.contains("404 Not Found") || message.contains("400 Bad Request") {
        return EvidenceError::InvalidSubject(repo_path.to_string());
    }
    err
}
