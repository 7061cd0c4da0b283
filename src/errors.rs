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

//! The errors that can be raised by evidence-engine

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvidenceError>;

#[derive(Error, Debug)]
pub enum EvidenceError {
    #[error("failed to parse URL: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error(transparent)]
    FromPemError(#[from] pem::PemError),

    #[error(transparent)]
    Base64DecodeError(#[from] base64::DecodeError),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::Error),

    #[error(transparent)]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    HttpError(#[from] reqwest::Error),

    #[error(transparent)]
    SignatureError(#[from] signature::Error),

    #[error("expected a private key but the PEM block holds a public key")]
    KeyIsPublic,

    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("failed to parse the key: {0}")]
    KeyParseError(String),

    #[error("key pair is incorrect or key alias '{key_id}' was not found: {source}")]
    KeyAliasNotFound {
        key_id: String,
        source: Box<EvidenceError>,
    },

    #[error("failed to load private key. Please verify the provided key is correct: {source}")]
    InvalidPrivateKey { source: Box<EvidenceError> },

    #[error("no signers provided")]
    NoSigners,

    #[error("provided sha256 does not match the file's sha256")]
    DigestMismatch,

    #[error("file '{0}' does not have a .md extension")]
    MarkdownExtensionError(String),

    #[error("subject cannot be empty")]
    EmptySubject,

    #[error("protocol prefix cannot be empty")]
    EmptyProtocolPrefix,

    #[error("repository name and checksum must be provided")]
    MissingRepoOrChecksum,

    #[error("no subject found for repository {repo} and checksum {checksum} and path {path}")]
    SubjectNotFound {
        repo: String,
        checksum: String,
        path: String,
    },

    #[error("OCI reference not valid: {reference}")]
    OciReferenceNotValidError { reference: String },

    #[error("no repository found in response headers for subject: {0}")]
    RegistryHeaderMissing(String),

    #[error("failed to parse sigstore bundle: {0}")]
    BundleParseError(String),

    #[error("bundle does not contain a DSSE envelope")]
    BundleMissingDsseEnvelope,

    #[error("subject was not found in DSSE statement")]
    StatementSubjectMissing,

    #[error("name was not found in DSSE subject")]
    SubjectNameMissing,

    #[error(
        "Subject '{0}' is invalid or not found. Please ensure the subject exists and follows \
         the correct format: <repo>/<path>/<name> or <repo>/<name>"
    )]
    InvalidSubject(String),

    #[error("too many subjects resolved ({count}). Maximum allowed is {limit}")]
    TooManySubjects { count: usize, limit: usize },

    #[error("evidence service request unsuccessful: {0}")]
    EvidenceServiceError(String),

    #[error("artifact service request unsuccessful: {0}")]
    ArtifactServiceError(String),

    /// A success-adjacent outcome: nothing was attested, but the caller opted
    /// into automatic subject discovery, so orchestration pipelines should not
    /// treat this as a hard failure.
    #[error("{0}")]
    NoOp(String),

    #[error("{0}")]
    UnexpectedError(String),
}

impl EvidenceError {
    /// Whether this error is the non-fatal "nothing to attest" condition
    /// raised by the batch flow when subjects were discovered automatically.
    pub fn is_no_op(&self) -> bool {
        matches!(self, EvidenceError::NoOp(_))
    }
}
