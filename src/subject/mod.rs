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

//! Subject resolution.
//!
//! A subject may be given as a plain repository path (`repo/path/name`) or
//! carry a protocol prefix (`docker://registry/image:tag`). Prefixed forms
//! are dispatched to a protocol-specific resolver that maps them to one or
//! more repository paths; unprefixed forms pass through verbatim.

pub mod aql;
pub mod oci;

use tracing::debug;

use crate::artifactory::ArtifactoryServices;
use crate::errors::{EvidenceError, Result};

/// Resolve a raw subject reference into repository paths.
///
/// `docker://` and `oci://` prefixes are resolved against the registry and
/// the artifact service, using `checksum` as the image manifest digest.
/// Anything else is returned as-is. A reference that does not contain
/// exactly one `://` separator is treated as unprefixed.
pub fn resolve_subject(
    client: &dyn ArtifactoryServices,
    subject: &str,
    checksum: &str,
) -> Result<Vec<String>> {
    if subject.is_empty() {
        return Err(EvidenceError::EmptySubject);
    }
    let mut parts = subject.splitn(3, "://");
    let prefix = parts.next().unwrap_or_default();
    let rest = match (parts.next(), parts.next()) {
        (Some(rest), None) => rest,
        _ => {
            debug!(subject, "no protocol prefix, using subject as-is");
            return Ok(vec![subject.to_string()]);
        }
    };
    let prefix = prefix.trim().to_ascii_lowercase();
    if prefix.is_empty() {
        return Err(EvidenceError::EmptyProtocolPrefix);
    }
    match prefix.as_str() {
        "docker" | "oci" => {
            debug!(subject, prefix, "resolving container image subject");
            oci::OciSubjectResolver::new(rest, client).resolve(checksum)
        }
        _ => {
            debug!(subject, prefix, "unsupported protocol prefix, using subject as-is");
            Ok(vec![subject.to_string()])
        }
    }
}
