//! In-memory model of an ECM scene description.
//!
//! The exporter writes one JSON object per map with `placements`,
//! `mapzone_entities` and `triggers` arrays (plus `paths` and `lights`, which
//! are ignored here). Unknown keys are skipped so newer exports keep loading.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{ImportError, Result};

/// Number of data words a trigger can carry.
pub const TRIGGER_DATA_WORDS: usize = 16;

/// Number of link slots a trigger can carry.
pub const TRIGGER_LINK_SLOTS: usize = 8;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneDocument {
    pub placements: Vec<Placement>,
    pub mapzone_entities: Vec<MapzoneEntity>,
    pub triggers: Vec<Trigger>,
}

/// One instanced, cacheable mesh occurrence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Placement {
    pub object_ref: u32,
    pub hashcode: u32,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

/// A uniquely loaded mesh. Exports normally carry no transform for these; the
/// mesh is already baked into map space.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MapzoneEntity {
    pub entity_refptr: u32,
    #[serde(default)]
    pub position: Option<[f64; 3]>,
    #[serde(default)]
    pub rotation: Option<[f64; 3]>,
    #[serde(default)]
    pub scale: Option<[f64; 3]>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Trigger {
    pub ttype: String,
    #[serde(default)]
    pub tsubtype: Option<String>,
    /// Zero means unset.
    pub data: Vec<u32>,
    /// `-1` means unset.
    pub links: Vec<i32>,
    pub position: [f64; 3],
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
    #[serde(default)]
    pub link_ref: Option<i32>,
    #[serde(default)]
    pub debug: Option<u16>,
    #[serde(default)]
    pub game_flags: Option<u32>,
    #[serde(default)]
    pub trig_flags: Option<u32>,
}

impl SceneDocument {
    pub fn parse(input: &[u8]) -> Result<Self> {
        let document: SceneDocument = serde_json::from_slice(input)?;
        document.validate()?;
        Ok(document)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ImportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&bytes)
    }

    fn validate(&self) -> Result<()> {
        for (index, trigger) in self.triggers.iter().enumerate() {
            if trigger.data.len() > TRIGGER_DATA_WORDS {
                return Err(ImportError::malformed(format!(
                    "trigger {index} carries {} data words (max {TRIGGER_DATA_WORDS})",
                    trigger.data.len()
                )));
            }
            if trigger.links.len() > TRIGGER_LINK_SLOTS {
                return Err(ImportError::malformed(format!(
                    "trigger {index} carries {} links (max {TRIGGER_LINK_SLOTS})",
                    trigger.links.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "paths": [],
        "lights": [],
        "placements": [
            {"hashcode": 3735928559, "object_ref": 42, "flags": 0,
             "position": [1.0, 2.0, 3.0], "rotation": [0.0, 0.5, 0.0], "scale": [1.0, 1.0, 1.0]}
        ],
        "mapzone_entities": [{"entity_refptr": 7}],
        "triggers": [
            {"ttype": "HT_TriggerType_CrossPlane", "tsubtype": "HT_TriggerSubType_LoadMap",
             "data": [1065353216, 1073741824, 0], "links": [-1, 3],
             "position": [0.0, 0.0, 0.0], "rotation": [0.0, 0.0, 0.0], "scale": [1.0, 1.0, 1.0],
             "link_ref": -1, "game_flags": 0, "trig_flags": 3, "raw_data": [0, 0]}
        ]
    }"#;

    fn assert_malformed(input: &str) {
        match SceneDocument::parse(input.as_bytes()) {
            Err(ImportError::MalformedInput { .. }) => {}
            other => panic!("expected MalformedInput, got {other:?}"),
        }
    }

    #[test]
    fn parses_exporter_output() {
        let doc = SceneDocument::parse(SAMPLE.as_bytes()).expect("parse");
        assert_eq!(doc.placements.len(), 1);
        assert_eq!(doc.placements[0].object_ref, 42);
        assert_eq!(doc.placements[0].hashcode, 0xdeadbeef);
        assert_eq!(doc.mapzone_entities[0].entity_refptr, 7);
        assert!(doc.mapzone_entities[0].position.is_none());

        let trigger = &doc.triggers[0];
        assert_eq!(trigger.tsubtype.as_deref(), Some("HT_TriggerSubType_LoadMap"));
        assert_eq!(trigger.data, vec![0x3F80_0000, 0x4000_0000, 0]);
        assert_eq!(trigger.links, vec![-1, 3]);
        assert_eq!(trigger.trig_flags, Some(3));
    }

    #[test]
    fn missing_triggers_key_is_malformed() {
        assert_malformed(r#"{"placements": [], "mapzone_entities": []}"#);
    }

    #[test]
    fn non_object_root_is_malformed() {
        assert_malformed("[]");
        assert_malformed("not json");
    }

    #[test]
    fn missing_entry_field_is_malformed() {
        assert_malformed(
            r#"{"placements": [{"object_ref": 1, "hashcode": 2, "position": [0,0,0],
                "rotation": [0,0,0]}], "mapzone_entities": [], "triggers": []}"#,
        );
    }

    #[test]
    fn out_of_range_numbers_are_malformed() {
        assert_malformed(
            r#"{"placements": [{"object_ref": 4294967296, "hashcode": 0, "position": [0,0,0],
                "rotation": [0,0,0], "scale": [1,1,1]}], "mapzone_entities": [], "triggers": []}"#,
        );
        assert_malformed(
            r#"{"placements": [], "mapzone_entities": [{"entity_refptr": -1}], "triggers": []}"#,
        );
    }

    #[test]
    fn oversized_trigger_payload_is_malformed() {
        let data = vec!["1"; TRIGGER_DATA_WORDS + 1].join(",");
        let input = format!(
            r#"{{"placements": [], "mapzone_entities": [], "triggers": [{{"ttype": "Box",
                "data": [{data}], "links": [], "position": [0,0,0], "rotation": [0,0,0],
                "scale": [1,1,1]}}]}}"#
        );
        assert_malformed(&input);
    }

    #[test]
    fn from_path_reports_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = SceneDocument::from_path(dir.path().join("absent.ecm")).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
