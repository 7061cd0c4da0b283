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

//! Collaborator interfaces for the artifact-query and evidence services,
//! plus a thin blocking HTTP implementation.
//!
//! The engine itself is fully synchronous; timeout and retry policy is
//! delegated to the underlying HTTP client.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::errors::{EvidenceError, Result};

/// Connection details for the artifact service.
#[derive(Debug, Clone, Default)]
pub struct ServerDetails {
    /// Base URL, e.g. `https://artifacts.example.com/artifactory`.
    pub url: String,
    pub user: String,
    pub password: String,
    pub access_token: String,
}

/// Checksum information for a repository file.
#[derive(Debug, Clone, Deserialize)]
pub struct FileInfo {
    pub sha256: String,
}

/// One row of an artifact-query result.
#[derive(Debug, Clone, Deserialize)]
pub struct AqlItem {
    pub repo: String,
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AqlResult {
    #[serde(default)]
    pub results: Vec<AqlItem>,
}

/// Response of a manifest HEAD request; only the headers are consumed.
#[derive(Debug, Clone, Default)]
pub struct HeadResponse {
    pub headers: HashMap<String, String>,
}

impl HeadResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Query operations the subject resolver needs from the artifact service.
pub trait ArtifactoryServices {
    /// Fetch checksum information for a repository path.
    fn file_info(&self, path: &str) -> Result<FileInfo>;

    /// Execute an AQL query and return the matching items.
    fn execute_aql(&self, query: &str) -> Result<AqlResult>;

    /// Issue a HEAD request with the service's own connection and auth
    /// details. Used for OCI manifest lookups.
    fn send_head(&self, url: &str) -> Result<HeadResponse>;

    /// The configured base URL of the artifact service.
    fn base_url(&self) -> &str;
}

/// Payload of one evidence upload.
#[derive(Debug, Clone)]
pub struct EvidenceDetails {
    pub subject_uri: String,
    /// Raw evidence body. Usually a DSSE envelope, but may be a whole
    /// sigstore bundle.
    pub dsse_file_raw: Vec<u8>,
    pub provider_id: String,
}

/// Upload operation of the evidence service.
pub trait EvidenceService {
    /// Upload evidence for a subject and return the raw JSON response body.
    fn upload_evidence(&self, details: &EvidenceDetails) -> Result<Vec<u8>>;
}

#[derive(Deserialize)]
struct FileInfoResponse {
    checksums: Checksums,
}

#[derive(Deserialize)]
struct Checksums {
    #[serde(default)]
    sha256: String,
}

/// Blocking HTTP client for both collaborator services.
pub struct HttpClient {
    details: ServerDetails,
    http: reqwest::blocking::Client,
}

impl HttpClient {
    pub fn new(details: ServerDetails) -> Result<Self> {
        let http = reqwest::blocking::Client::builder().build()?;
        Ok(HttpClient { details, http })
    }

    fn apply_auth(
        &self,
        request: reqwest::blocking::RequestBuilder,
    ) -> reqwest::blocking::RequestBuilder {
        if !self.details.access_token.is_empty() {
            request.bearer_auth(&self.details.access_token)
        } else if !self.details.user.is_empty() {
            request.basic_auth(&self.details.user, Some(&self.details.password))
        } else {
            request
        }
    }

    fn api_url(&self, suffix: &str) -> String {
        format!("{}/{}", self.details.url.trim_end_matches('/'), suffix)
    }
}

impl ArtifactoryServices for HttpClient {
    fn file_info(&self, path: &str) -> Result<FileInfo> {
        let url = self.api_url(&format!("api/storage/{path}"));
        debug!(url, "fetching file info");
        let response = self.apply_auth(self.http.get(&url)).send()?;
        if !response.status().is_success() {
            return Err(EvidenceError::ArtifactServiceError(format!(
                "{} for file info '{path}'",
                response.status()
            )));
        }
        let info: FileInfoResponse = response.json()?;
        Ok(FileInfo {
            sha256: info.checksums.sha256,
        })
    }

    fn execute_aql(&self, query: &str) -> Result<AqlResult> {
        let url = self.api_url("api/search/aql");
        debug!(query, "executing aql query");
        let response = self
            .apply_auth(self.http.post(&url))
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(query.to_string())
            .send()?;
        if !response.status().is_success() {
            return Err(EvidenceError::ArtifactServiceError(format!(
                "{} for aql query",
                response.status()
            )));
        }
        Ok(response.json()?)
    }

    fn send_head(&self, url: &str) -> Result<HeadResponse> {
        let response = self.apply_auth(self.http.head(url)).send()?;
        if !response.status().is_success() {
            return Err(EvidenceError::ArtifactServiceError(format!(
                "{} for HEAD {url}",
                response.status()
            )));
        }
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| {
                v.to_str()
                    .ok()
                    .map(|v| (k.as_str().to_string(), v.to_string()))
            })
            .collect();
        Ok(HeadResponse { headers })
    }

    fn base_url(&self) -> &str {
        &self.details.url
    }
}

impl EvidenceService for HttpClient {
    fn upload_evidence(&self, details: &EvidenceDetails) -> Result<Vec<u8>> {
        let mut url = self.api_url(&format!("evidence/api/v1/subject/{}", details.subject_uri));
        if !details.provider_id.is_empty() {
            url.push_str(&format!("?providerId={}", details.provider_id));
        }
        debug!(subject = details.subject_uri, "uploading evidence");
        let response = self
            .apply_auth(self.http.post(&url))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(details.dsse_file_raw.clone())
            .send()?;
        let status = response.status();
        let body = response.bytes()?.to_vec();
        if !status.is_success() {
            return Err(EvidenceError::EvidenceServiceError(format!(
                "{status} for subject '{}'",
                details.subject_uri
            )));
        }
        Ok(body)
    }
}
