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

//! In-toto Statement v1 attestation support.
//!
//! A [`Statement`] is the typed attestation document produced by this engine:
//! one subject (digest of the target artifact), a predicate (the claim), and
//! creation metadata. Statements authored elsewhere ("foreign" statements,
//! e.g. produced by a third-party integration) are augmented through
//! [`add_subject_and_stage`] instead, a narrowly-scoped untyped JSON patch
//! that avoids requiring a full schema for statement shapes we do not own.
//!
//! See: <https://github.com/in-toto/attestation/blob/main/spec/v1/statement.md>

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// The DSSE payload type for in-toto statements.
pub const PAYLOAD_TYPE: &str = "application/vnd.in-toto+json";

/// The in-toto Statement v1 type identifier.
pub const STATEMENT_TYPE: &str = "https://in-toto.io/Statement/v1";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// An in-toto Statement v1 attestation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "_type")]
    pub statement_type: String,

    /// The subjects of this statement. Exactly one entry is populated by
    /// this engine; foreign statements may already carry more.
    #[serde(default)]
    pub subject: Vec<ResourceDescriptor>,

    #[serde(rename = "predicateType")]
    pub predicate_type: String,

    /// The predicate contents (claim-specific data).
    pub predicate: serde_json::Value,

    #[serde(rename = "createdAt")]
    pub created_at: String,

    #[serde(rename = "createdBy")]
    pub created_by: String,

    /// Optional human-readable annotation.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub markdown: String,

    /// Optional pipeline stage; omitted entirely when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub stage: String,
}

/// A subject of an in-toto statement.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub digest: Digest,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Digest {
    pub sha256: String,
}

impl Statement {
    /// Create a statement carrying the given predicate. `predicate` must be
    /// valid JSON; `user` is recorded as `createdBy`.
    pub fn new(predicate: &[u8], predicate_type: &str, user: &str) -> Result<Self> {
        Ok(Statement {
            statement_type: STATEMENT_TYPE.to_string(),
            subject: Vec::new(),
            predicate_type: predicate_type.to_string(),
            predicate: serde_json::from_slice(predicate)?,
            created_at: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
            created_by: user.to_string(),
            markdown: String::new(),
            stage: String::new(),
        })
    }

    /// Set the single subject entry to the given content digest.
    pub fn set_subject(&mut self, subject_sha256: &str) {
        self.subject = vec![ResourceDescriptor {
            name: String::new(),
            digest: Digest {
                sha256: subject_sha256.to_string(),
            },
        }];
    }

    pub fn set_markdown(&mut self, markdown: &[u8]) {
        self.markdown = String::from_utf8_lossy(markdown).into_owned();
    }

    pub fn set_stage(&mut self, stage: &str) {
        self.stage = stage.to_string();
    }

    /// Serialize the statement into its JSON wire form.
    pub fn marshal(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

/// Inject `subject` and (when non-empty) `stage` into an already-serialized
/// statement. Used for foreign statements whose schema this engine does not
/// own; only these two keys are touched.
pub fn add_subject_and_stage(statement: &[u8], sha256: &str, stage: &str) -> Result<Vec<u8>> {
    let mut doc: serde_json::Map<String, serde_json::Value> = serde_json::from_slice(statement)?;
    doc.insert(
        "subject".to_string(),
        serde_json::json!([{ "digest": { "sha256": sha256 } }]),
    );
    if !stage.is_empty() {
        doc.insert("stage".to_string(), serde_json::Value::String(stage.into()));
    }
    Ok(serde_json::to_vec(&doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_digest_round_trips() {
        let mut statement = Statement::new(br#"{"a":1}"#, "https://example.com/pred/v1", "me")
            .expect("building statement failed");
        statement.set_subject("d34db33f");
        let json = statement.marshal().unwrap();

        let parsed: Statement = serde_json::from_slice(&json).unwrap();
        assert_eq!(parsed.statement_type, STATEMENT_TYPE);
        assert_eq!(parsed.subject.len(), 1);
        assert_eq!(parsed.subject[0].digest.sha256, "d34db33f");
        assert_eq!(parsed.predicate_type, "https://example.com/pred/v1");
        assert_eq!(parsed.created_by, "me");
    }

    #[test]
    fn empty_stage_and_markdown_are_omitted() {
        let statement = Statement::new(b"{}", "t", "me").unwrap();
        let json = String::from_utf8(statement.marshal().unwrap()).unwrap();
        assert!(!json.contains("\"stage\""));
        assert!(!json.contains("\"markdown\""));
    }

    #[test]
    fn stage_and_markdown_are_kept_when_set() {
        let mut statement = Statement::new(b"{}", "t", "me").unwrap();
        statement.set_stage("release");
        statement.set_markdown(b"# report");
        let json = String::from_utf8(statement.marshal().unwrap()).unwrap();
        assert!(json.contains("\"stage\":\"release\""));
        assert!(json.contains("\"markdown\":\"# report\""));
    }

    #[test]
    fn invalid_predicate_json_is_rejected() {
        assert!(Statement::new(b"not json", "t", "me").is_err());
    }

    #[test]
    fn foreign_statement_patch_injects_subject_and_stage() {
        let foreign = br#"{"_type":"https://in-toto.io/Statement/v1","predicateType":"t","predicate":{"x":true}}"#;
        let patched = add_subject_and_stage(foreign, "abc", "qa").unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&patched).unwrap();
        assert_eq!(doc["subject"][0]["digest"]["sha256"], "abc");
        assert_eq!(doc["stage"], "qa");
        // Untouched keys survive.
        assert_eq!(doc["predicate"]["x"], true);
    }

    #[test]
    fn foreign_statement_patch_omits_empty_stage() {
        let patched = add_subject_and_stage(b"{}", "abc", "").unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&patched).unwrap();
        assert!(doc.get("stage").is_none());
        assert_eq!(doc["subject"][0]["digest"]["sha256"], "abc");
    }

    #[test]
    fn created_at_uses_millisecond_utc_layout() {
        let statement = Statement::new(b"{}", "t", "me").unwrap();
        // e.g. 2026-08-23T10:11:12.123Z
        assert_eq!(statement.created_at.len(), 24);
        assert!(statement.created_at.ends_with('Z'));
        assert_eq!(&statement.created_at[4..5], "-");
        assert_eq!(&statement.created_at[10..11], "T");
        assert_eq!(&statement.created_at[19..20], ".");
    }
}
