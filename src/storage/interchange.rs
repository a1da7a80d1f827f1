// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Slashing protection interchange envelope (EIP-3076, format version 5).
//!
//! Only the envelope is modelled: per-validator records are kept as lists of
//! signed blocks and attestations and are merged by union. No minimal-form
//! compaction is performed.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::PubkeyHex;

pub const INTERCHANGE_FORMAT_VERSION: &str = "5";

/// Genesis validators root reported when none is configured.
pub const ZERO_GENESIS_VALIDATORS_ROOT: &str =
    "0x0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, thiserror::Error)]
pub enum InterchangeError {
    #[error("malformed slashing protection data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported interchange format version {0}")]
    UnsupportedVersion(String),

    #[error("genesis validators root mismatch: expected {expected}, found {found}")]
    GenesisMismatch { expected: String, found: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterchangeMetadata {
    pub interchange_format_version: String,
    pub genesis_validators_root: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedBlock {
    #[serde(with = "quoted_u64")]
    pub slot: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_root: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAttestation {
    #[serde(with = "quoted_u64")]
    pub source_epoch: u64,
    #[serde(with = "quoted_u64")]
    pub target_epoch: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_root: Option<String>,
}

/// Signing history of one validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorRecord {
    pub pubkey: PubkeyHex,
    #[serde(default)]
    pub signed_blocks: Vec<SignedBlock>,
    #[serde(default)]
    pub signed_attestations: Vec<SignedAttestation>,
}

impl ValidatorRecord {
    pub fn empty(pubkey: PubkeyHex) -> Self {
        Self {
            pubkey,
            signed_blocks: Vec::new(),
            signed_attestations: Vec::new(),
        }
    }

    /// Append every entry of `other` not already present.
    pub fn merge(&mut self, other: ValidatorRecord) {
        for block in other.signed_blocks {
            if !self.signed_blocks.contains(&block) {
                self.signed_blocks.push(block);
            }
        }
        for attestation in other.signed_attestations {
            if !self.signed_attestations.contains(&attestation) {
                self.signed_attestations.push(attestation);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interchange {
    pub metadata: InterchangeMetadata,
    pub data: Vec<ValidatorRecord>,
}

impl Interchange {
    pub fn new(genesis_validators_root: impl Into<String>, data: Vec<ValidatorRecord>) -> Self {
        Self {
            metadata: InterchangeMetadata {
                interchange_format_version: INTERCHANGE_FORMAT_VERSION.to_string(),
                genesis_validators_root: genesis_validators_root.into(),
            },
            data,
        }
    }

    /// Parse a document and check it belongs to the expected chain.
    pub fn parse(json: &str, genesis_validators_root: &str) -> Result<Self, InterchangeError> {
        let interchange: Self = serde_json::from_str(json)?;
        let metadata = &interchange.metadata;

        if metadata.interchange_format_version != INTERCHANGE_FORMAT_VERSION {
            return Err(InterchangeError::UnsupportedVersion(
                metadata.interchange_format_version.clone(),
            ));
        }
        if !metadata
            .genesis_validators_root
            .eq_ignore_ascii_case(genesis_validators_root)
        {
            return Err(InterchangeError::GenesisMismatch {
                expected: genesis_validators_root.to_string(),
                found: metadata.genesis_validators_root.clone(),
            });
        }
        Ok(interchange)
    }

    /// The combined record for `pubkey`, if the document mentions it.
    pub fn record_for(&self, pubkey: &PubkeyHex) -> Option<ValidatorRecord> {
        self.data
            .iter()
            .filter(|record| record.pubkey == *pubkey)
            .cloned()
            .reduce(|mut merged, record| {
                merged.merge(record);
                merged
            })
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Unsigned integers as decimal strings.
mod quoted_u64 {
    use super::*;

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::test_keys::pubkey;
    use serde_json::json;

    fn document(pk: &PubkeyHex) -> String {
        json!({
            "metadata": {
                "interchange_format_version": "5",
                "genesis_validators_root": ZERO_GENESIS_VALIDATORS_ROOT
            },
            "data": [
                {
                    "pubkey": pk.to_string(),
                    "signed_blocks": [{ "slot": "81952", "signing_root": "0x4ff6" }],
                    "signed_attestations": [{ "source_epoch": "2290", "target_epoch": "3007" }]
                },
                {
                    "pubkey": pk.to_string(),
                    "signed_blocks": [{ "slot": "81953" }, { "slot": "81952", "signing_root": "0x4ff6" }],
                    "signed_attestations": []
                }
            ]
        })
        .to_string()
    }

    #[test]
    fn parses_and_combines_records_for_one_key() {
        let pk = pubkey(9);
        let interchange = Interchange::parse(&document(&pk), ZERO_GENESIS_VALIDATORS_ROOT).unwrap();
        let record = interchange.record_for(&pk).unwrap();
        assert_eq!(record.signed_blocks.len(), 2);
        assert_eq!(record.signed_blocks[1].slot, 81953);
        assert_eq!(record.signed_attestations[0].target_epoch, 3007);
        assert!(interchange.record_for(&pubkey(1)).is_none());
    }

    #[test]
    fn rejects_wrong_version_and_chain() {
        let pk = pubkey(9);
        let other_root = format!("0x{}", "11".repeat(32));
        assert!(matches!(
            Interchange::parse(&document(&pk), &other_root),
            Err(InterchangeError::GenesisMismatch { .. })
        ));

        let mut v4: serde_json::Value = serde_json::from_str(&document(&pk)).unwrap();
        v4["metadata"]["interchange_format_version"] = json!("4");
        assert!(matches!(
            Interchange::parse(&v4.to_string(), ZERO_GENESIS_VALIDATORS_ROOT),
            Err(InterchangeError::UnsupportedVersion(v)) if v == "4"
        ));

        assert!(matches!(
            Interchange::parse("not json", ZERO_GENESIS_VALIDATORS_ROOT),
            Err(InterchangeError::Json(_))
        ));
    }

    #[test]
    fn merge_is_a_union() {
        let pk = pubkey(2);
        let mut record = ValidatorRecord::empty(pk);
        let block = SignedBlock { slot: 5, signing_root: None };
        record.merge(ValidatorRecord {
            pubkey: pk,
            signed_blocks: vec![block.clone()],
            signed_attestations: vec![],
        });
        record.merge(ValidatorRecord {
            pubkey: pk,
            signed_blocks: vec![block.clone(), SignedBlock { slot: 6, signing_root: None }],
            signed_attestations: vec![],
        });
        assert_eq!(record.signed_blocks.len(), 2);
        assert_eq!(record.signed_blocks[0], block);
    }

    #[test]
    fn serializes_integers_as_strings() {
        let pk = pubkey(3);
        let mut record = ValidatorRecord::empty(pk);
        record.signed_blocks.push(SignedBlock { slot: 7, signing_root: None });
        let text = Interchange::new(ZERO_GENESIS_VALIDATORS_ROOT, vec![record])
            .to_json_string()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["data"][0]["signed_blocks"][0]["slot"], json!("7"));
        assert_eq!(value["metadata"]["interchange_format_version"], json!("5"));
    }
}
