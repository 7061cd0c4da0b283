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

//! Container image (Docker/OCI) subject lookup. Both protocols share the
//! image reference grammar and the registry v2 manifest API.
//!
//! Resolution walks the registry first: a manifest HEAD request reveals the
//! backing repository key through the `X-Artifactory-Docker-Registry`
//! response header, and the key, image path and digest then go through the
//! AQL lookup.

use tracing::debug;
use url::Url;

use crate::artifactory::ArtifactoryServices;
use crate::errors::{EvidenceError, Result};
use crate::subject::aql::AqlSubjectResolver;

const REGISTRY_HEADER: &str = "X-Artifactory-Docker-Registry";
const SHA_PREFIX: &str = "sha256:";

pub struct OciSubjectResolver<'a> {
    subject: String,
    client: &'a dyn ArtifactoryServices,
}

impl<'a> OciSubjectResolver<'a> {
    /// `subject` is the image reference without its protocol prefix,
    /// e.g. `my.registry.io/repo/image:tag`.
    pub fn new(subject: &str, client: &'a dyn ArtifactoryServices) -> Self {
        Self {
            subject: subject.to_string(),
            client,
        }
    }

    /// Resolve the image reference to repository paths, using `checksum` as
    /// the manifest digest.
    pub fn resolve(&self, checksum: &str) -> Result<Vec<String>> {
        if self.subject.is_empty() {
            return Err(EvidenceError::EmptySubject);
        }
        if checksum.is_empty() {
            return Err(EvidenceError::MissingRepoOrChecksum);
        }

        let (domain, path) = parse_oci_subject(&self.subject)?;
        let manifest_url = self.build_manifest_url(&domain, &path, checksum)?;
        debug!(url = manifest_url, "querying registry for manifest");

        let response = self.client.send_head(&manifest_url)?;
        let repo = response.header(REGISTRY_HEADER).unwrap_or_default();
        if repo.is_empty() {
            return Err(EvidenceError::RegistryHeaderMissing(self.subject.clone()));
        }

        AqlSubjectResolver::new(self.client).resolve(repo, &path, checksum)
    }

    /// Build the registry v2 manifest URL:
    /// `{scheme}://{registry}/v2/{path}/manifests/sha256:{digest}`.
    ///
    /// The registry host is the domain embedded in the reference when there
    /// is one, otherwise the artifact service's own host. The scheme always
    /// comes from the artifact service URL.
    fn build_manifest_url(&self, domain: &str, path: &str, checksum: &str) -> Result<String> {
        let base = Url::parse(self.client.base_url())?;
        let scheme = base.scheme();
        let registry = if domain.is_empty() {
            base.host_str()
                .ok_or_else(|| EvidenceError::OciReferenceNotValidError {
                    reference: self.subject.clone(),
                })?
        } else {
            domain
        };
        let digest = checksum.strip_prefix(SHA_PREFIX).unwrap_or(checksum);
        Ok(format!(
            "{scheme}://{registry}/v2/{path}/manifests/{SHA_PREFIX}{digest}"
        ))
    }
}

/// Split an image reference into `(registryDomain, repositoryPath)`.
///
/// The first `/`-separated component is a registry domain only when it could
/// be a hostname (contains a dot or a port, or is `localhost`); otherwise the
/// whole reference is a path on the default registry. A trailing `@digest`
/// or `:tag` is not part of the path.
pub(crate) fn parse_oci_subject(subject: &str) -> Result<(String, String)> {
    let reference = subject.split_once('@').map_or(subject, |(head, _)| head);

    let (domain, remainder) = match reference.split_once('/') {
        Some((first, rest)) if is_registry_domain(first) => (first.to_string(), rest),
        _ => (String::new(), reference),
    };

    // A colon after the last slash is a tag separator.
    let path = match remainder.rsplit_once(':') {
        Some((head, tail)) if !tail.contains('/') => head,
        _ => remainder,
    };

    if path.is_empty() {
        return Err(EvidenceError::OciReferenceNotValidError {
            reference: subject.to_string(),
        });
    }
    Ok((domain, path.to_string()))
}

fn is_registry_domain(component: &str) -> bool {
    component == "localhost" || component.contains('.') || component.contains(':')
}
