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

//! Create, sign and publish tamper-evident evidence about repository
//! artifacts.
//!
//! The engine builds an [in-toto Statement](crate::intoto::Statement) about a
//! subject artifact, signs it into a [DSSE envelope](crate::dsse::Envelope)
//! with one of the supported key algorithms (ECDSA P-256, RSA-PSS, Ed25519),
//! resolves the concrete repository path of the subject (plain paths,
//! `docker://`/`oci://` image references, or sigstore-bundle subjects) and
//! uploads the result to the artifact-evidence service.
//!
//! The main entry points are [`create::EvidenceCreator`] for single-subject
//! evidence and [`create::CustomEvidence`] for the multi-subject
//! "bring your own attestation" flow.
//!
//! ```no_run
//! use evidence_engine::artifactory::{HttpClient, ServerDetails};
//! use evidence_engine::create::EvidenceCreator;
//!
//! let details = ServerDetails {
//!     url: "https://artifacts.example.com/artifactory".into(),
//!     access_token: "token".into(),
//!     ..Default::default()
//! };
//! let client = HttpClient::new(details).unwrap();
//! let creator = EvidenceCreator::new(&client, &client)
//!     .predicate_file("predicate.json")
//!     .predicate_type("https://example.com/predicate/v1")
//!     .key(std::fs::read_to_string("key.pem").unwrap());
//! creator.create("my-repo/path/artifact.tar.gz", "").unwrap();
//! ```

pub mod artifactory;
pub mod bundle;
pub mod create;
pub mod crypto;
pub mod dsse;
pub mod errors;
pub mod intoto;
pub mod subject;

#[cfg(test)]
pub(crate) mod mock_client;
