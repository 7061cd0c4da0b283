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

//! Artifact-query (AQL) subject lookup: maps a repository key, an optional
//! path hint, and a content digest to concrete repository paths.

use tracing::{debug, info};

use crate::artifactory::ArtifactoryServices;
use crate::errors::{EvidenceError, Result};

pub struct AqlSubjectResolver<'a> {
    client: &'a dyn ArtifactoryServices,
}

impl<'a> AqlSubjectResolver<'a> {
    pub fn new(client: &'a dyn ArtifactoryServices) -> Self {
        Self { client }
    }

    /// Look up all items matching the repository key, path hint, and digest.
    /// Zero matches is an error, not an empty result.
    pub fn resolve(&self, repo: &str, path: &str, checksum: &str) -> Result<Vec<String>> {
        if repo.is_empty() || checksum.is_empty() {
            return Err(EvidenceError::MissingRepoOrChecksum);
        }
        if path.is_empty() {
            info!(repo, checksum, "resolving subject by repository and checksum");
        } else {
            info!(repo, path, checksum, "resolving subject by repository, path and checksum");
        }
        let query = build_query(repo, path, checksum);
        debug!(query, "executing aql query");
        let result = self.client.execute_aql(&query)?;

        let subjects: Vec<String> = result
            .results
            .iter()
            .map(|item| format!("{}/{}/{}", item.repo, item.path, item.name))
            .collect();
        if subjects.is_empty() {
            return Err(EvidenceError::SubjectNotFound {
                repo: repo.to_string(),
                checksum: checksum.to_string(),
                path: path.to_string(),
            });
        }
        Ok(subjects)
    }
}

/// Build the AQL query text for a repo/path/checksum lookup.
///
/// The repository key can also appear as a leading path segment (registries
/// reachable under a sub-domain store the key inside the path). When trimming
/// the `repo/` prefix shortens the path, the match is widened with a leading
/// wildcard so either layout is found.
pub(crate) fn build_query(repo: &str, path: &str, checksum: &str) -> String {
    if path.is_empty() {
        return format!(r#"items.find({{"repo": "{repo}","sha256": "{checksum}"}})"#);
    }
    let normalized = path.strip_prefix(&format!("{repo}/")).unwrap_or(path);
    let pattern = if normalized.len() < path.len() {
        format!("*{normalized}")
    } else {
        normalized.to_string()
    };
    format!(
        r#"items.find({{"repo": "{repo}", "path": {{"$match" : "{pattern}*"}},"sha256": "{checksum}"}})"#
    )
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{build_query, AqlSubjectResolver};
    use crate::errors::EvidenceError;
    use crate::mock_client::MockServices;

    const CHECKSUM: &str = "sha256:1234567890abcdef";

    #[test]
    fn empty_path_matches_by_repo_and_checksum_only() {
        assert_eq!(
            build_query("test-repo", "", CHECKSUM),
            r#"items.find({"repo": "test-repo","sha256": "sha256:1234567890abcdef"})"#
        );
    }

    #[test]
    fn plain_path_gets_a_trailing_wildcard() {
        assert_eq!(
            build_query("test-repo", "some/path", CHECKSUM),
            r#"items.find({"repo": "test-repo", "path": {"$match" : "some/path*"},"sha256": "sha256:1234567890abcdef"})"#
        );
    }

    #[test]
    fn repo_prefixed_path_is_widened_with_a_leading_wildcard() {
        assert_eq!(
            build_query("test-repo", "test-repo/some/path", CHECKSUM),
            r#"items.find({"repo": "test-repo", "path": {"$match" : "*some/path*"},"sha256": "sha256:1234567890abcdef"})"#
        );
    }

    #[test]
    fn path_equal_to_repo_key_is_not_widened() {
        // "test-repo" alone is not followed by a slash, so nothing is trimmed.
        assert_eq!(
            build_query("test-repo", "test-repo", CHECKSUM),
            r#"items.find({"repo": "test-repo", "path": {"$match" : "test-repo*"},"sha256": "sha256:1234567890abcdef"})"#
        );
    }

    #[rstest]
    #[case("", CHECKSUM)]
    #[case("test-repo", "")]
    fn missing_repo_or_checksum_is_rejected(#[case] repo: &str, #[case] checksum: &str) {
        let client = MockServices::default();
        let err = AqlSubjectResolver::new(&client)
            .resolve(repo, "some/path", checksum)
            .unwrap_err();
        assert!(matches!(err, EvidenceError::MissingRepoOrChecksum));
    }

    #[test]
    fn matching_items_become_repo_paths() {
        let mut client = MockServices::default();
        client.aql_items = vec![
            ("test-repo".to_string(), "a".to_string(), "x.txt".to_string()),
            ("test-repo".to_string(), "b".to_string(), "y.txt".to_string()),
        ];
        let subjects = AqlSubjectResolver::new(&client)
            .resolve("test-repo", "", CHECKSUM)
            .unwrap();
        assert_eq!(subjects, vec!["test-repo/a/x.txt", "test-repo/b/y.txt"]);
    }

    #[test]
    fn zero_matches_is_an_error_naming_the_search() {
        let client = MockServices::default();
        let err = AqlSubjectResolver::new(&client)
            .resolve("test-repo", "some/path", CHECKSUM)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("test-repo"));
        assert!(message.contains(CHECKSUM));
        assert!(message.contains("some/path"));
    }
}
