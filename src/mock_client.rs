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

//! Canned in-memory collaborators used by the unit tests instead of a live
//! artifact service.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::artifactory::{
    AqlItem, AqlResult, ArtifactoryServices, EvidenceDetails, EvidenceService, FileInfo,
    HeadResponse,
};
use crate::errors::{EvidenceError, Result};

/// Stub implementation of both collaborator traits. Every response is
/// configured up front through public fields; requests are recorded so
/// tests can assert on what was sent.
pub(crate) struct MockServices {
    pub base_url: String,

    /// Checksum reported for any `file_info` call. `None` means the file
    /// does not exist.
    pub file_sha256: Option<String>,

    /// `(repo, path, name)` rows returned for any AQL query.
    pub aql_items: Vec<(String, String, String)>,

    /// Headers returned for any HEAD request.
    pub head_headers: HashMap<String, String>,

    /// Error message returned by `upload_evidence`; takes precedence over
    /// `upload_response`.
    pub upload_error: Option<String>,

    /// Response body returned on successful upload.
    pub upload_response: Vec<u8>,

    pub aql_queries: RefCell<Vec<String>>,
    pub head_urls: RefCell<Vec<String>>,
    pub uploaded: RefCell<Vec<EvidenceDetails>>,
}

impl Default for MockServices {
    fn default() -> Self {
        MockServices {
            base_url: "https://artifacts.example.com/artifactory".to_string(),
            file_sha256: None,
            aql_items: Vec::new(),
            head_headers: HashMap::new(),
            upload_error: None,
            upload_response:
                br#"{"predicateSlug":"custom-slug","verified":true,"predicateType":"t"}"#.to_vec(),
            aql_queries: RefCell::new(Vec::new()),
            head_urls: RefCell::new(Vec::new()),
            uploaded: RefCell::new(Vec::new()),
        }
    }
}

impl ArtifactoryServices for MockServices {
    fn file_info(&self, path: &str) -> Result<FileInfo> {
        match &self.file_sha256 {
            Some(sha256) => Ok(FileInfo {
                sha256: sha256.clone(),
            }),
            None => Err(EvidenceError::ArtifactServiceError(format!(
                "404 Not Found for file info '{path}'"
            ))),
        }
    }

    fn execute_aql(&self, query: &str) -> Result<AqlResult> {
        self.aql_queries.borrow_mut().push(query.to_string());
        Ok(AqlResult {
            results: self
                .aql_items
                .iter()
                .map(|(repo, path, name)| AqlItem {
                    repo: repo.clone(),
                    path: path.clone(),
                    name: name.clone(),
                })
                .collect(),
        })
    }

    fn send_head(&self, url: &str) -> Result<HeadResponse> {
        self.head_urls.borrow_mut().push(url.to_string());
        Ok(HeadResponse {
            headers: self.head_headers.clone(),
        })
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl EvidenceService for MockServices {
    fn upload_evidence(&self, details: &EvidenceDetails) -> Result<Vec<u8>> {
        self.uploaded.borrow_mut().push(details.clone());
        if let Some(message) = &self.upload_error {
            return Err(EvidenceError::EvidenceServiceError(message.clone()));
        }
        Ok(self.upload_response.clone())
    }
}
