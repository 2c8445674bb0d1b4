use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use ecm_scene::{
    BlendMode, ImportError, ImportOptions, ImportSession, MarkerShape, MemoryHost, SceneDocument,
    SceneHost, SourceMaterial,
};
use glam::DVec3;

type Assets = BTreeMap<PathBuf, Vec<SourceMaterial>>;

const MAP: &str = r#"{
    "paths": [],
    "lights": [],
    "placements": [
        {"hashcode": 1, "object_ref": 171, "position": [1, 2, 3], "rotation": [0, 0, 0], "scale": [1, 1, 1]},
        {"hashcode": 2, "object_ref": 171, "position": [4, 5, 6], "rotation": [0, 0, 0], "scale": [2, 2, 2]},
        {"hashcode": 3, "object_ref": 205, "position": [0, 0, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1]},
        {"hashcode": 4, "object_ref": 999, "position": [0, 0, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1]}
    ],
    "mapzone_entities": [{"entity_refptr": 171}],
    "triggers": [
        {"ttype": "HT_TriggerType_CrossPlane", "tsubtype": "HT_TriggerSubType_LoadMap",
         "data": [1065353216, 1073741824, 0, 5, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
         "links": [-1, -1, -1, -1, -1, -1, -1, -1],
         "position": [0, 10, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1]},
        {"ttype": "Box", "data": [0, 0], "links": [-1, -1],
         "position": [0, 0, 0], "rotation": [0, 0, 0], "scale": [1, 1, 1]}
    ]
}"#;

fn assets() -> Assets {
    let mut assets = Assets::new();
    assets.insert(
        PathBuf::from("maps/ab.gltf"),
        vec![
            SourceMaterial::new("brick", BlendMode::Opaque),
            SourceMaterial::new("glass", BlendMode::AlphaBlend),
        ],
    );
    assets.insert(
        PathBuf::from("maps/cd.gltf"),
        vec![
            SourceMaterial::new("brick", BlendMode::Opaque),
            SourceMaterial::new("glass", BlendMode::Opaque),
        ],
    );
    assets.insert(
        PathBuf::from("maps/ref_171.gltf"),
        vec![SourceMaterial::new("brick", BlendMode::Opaque)],
    );
    assets
}

fn slot_names(host: &MemoryHost<Assets>, object: &str) -> Vec<String> {
    let handle = host.find_object(object).expect("object");
    host.material_slots(handle)
        .unwrap()
        .into_iter()
        .map(|slot| host.material(slot).unwrap().name.clone())
        .collect()
}

#[test]
fn full_import_builds_expected_scene() {
    let document = SceneDocument::parse(MAP.as_bytes()).expect("parse");
    let mut host = MemoryHost::new(assets());
    let session = ImportSession::new("maps", "level", ImportOptions::default());

    let report = session.run(&document, &mut host).expect("import");

    assert_eq!(report.templates_loaded, 2);
    assert_eq!(report.instances_cloned, 1);
    assert_eq!(report.mapzones_loaded, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.warnings(), 1);
    assert_eq!(report.triggers_imported, 2);
    assert_eq!(report.markers_created, 1);
    assert_eq!(host.load_calls(), 4);
    assert_eq!(host.clone_calls(), 1);

    // ab, ab.001, cd, ref_171, two trigger objects and one marker.
    assert_eq!(host.members(report.collection).len(), 7);
    assert_eq!(host.collections()[0].name, "level");

    let clone = host.object(host.find_object("ab.001").unwrap()).unwrap();
    assert_eq!(clone.transform.position, DVec3::new(-4.0, -6.0, 5.0));
    assert_eq!(clone.transform.scale, DVec3::splat(2.0));

    // cd's brick.001 merges; its opaque glass.001 differs from the blended base.
    assert_eq!(slot_names(&host, "cd"), vec!["brick", "glass.001"]);
    assert_eq!(slot_names(&host, "ref_171"), vec!["brick"]);
    assert_eq!(report.material_slots_rewritten, 2);

    let trigger = host.object(host.find_object("CrossPlane_0").unwrap()).unwrap();
    assert_eq!(trigger.transform.position, DVec3::new(0.0, 0.0, 10.0));
    assert_eq!(trigger.properties.get("data[0x3]").map(String::as_str), Some("0x5"));
    assert_eq!(
        trigger.properties.get("subtype").map(String::as_str),
        Some("HT_TriggerSubType_LoadMap")
    );

    let marker_handle = host.find_object("CrossPlane_0#Visualization").unwrap();
    let marker = host.object(marker_handle).unwrap();
    assert_eq!(marker.shape, Some(MarkerShape::Plane));
    assert_eq!(marker.dimensions, Some(DVec3::new(1.0, 2.0, 0.0)));
    assert_eq!(marker.color, Some([0.0, 0.0, 1.0, 1.0]));
    assert_eq!(marker.parent, host.find_object("CrossPlane_0"));
    assert_eq!(marker.transform.position, DVec3::ZERO);

    let plain = host.object(host.find_object("Box_1").unwrap()).unwrap();
    assert!(plain.properties.is_empty());
}

#[test]
fn options_gate_triggers_visualizations_and_merging() {
    let document = SceneDocument::parse(MAP.as_bytes()).expect("parse");

    let mut host = MemoryHost::new(assets());
    let options = ImportOptions {
        merge_materials: false,
        trigger_visualizations: false,
        ..ImportOptions::default()
    };
    let report = ImportSession::new("maps", "level", options)
        .run(&document, &mut host)
        .expect("import");
    assert_eq!(report.markers_created, 0);
    assert_eq!(report.material_slots_rewritten, 0);
    assert_eq!(slot_names(&host, "cd"), vec!["brick.001", "glass.001"]);
    assert!(host.find_object("CrossPlane_0#Visualization").is_none());

    let mut host = MemoryHost::new(assets());
    let options = ImportOptions {
        import_triggers: false,
        ..ImportOptions::default()
    };
    let report = ImportSession::new("maps", "level", options)
        .run(&document, &mut host)
        .expect("import");
    assert_eq!(report.triggers_imported, 0);
    assert!(host.find_object("CrossPlane_0").is_none());
}

#[test]
fn downscale_and_lock_apply_to_every_object() {
    let document = SceneDocument::parse(MAP.as_bytes()).expect("parse");
    let mut host = MemoryHost::new(assets());
    let options = ImportOptions {
        downscale: true,
        lock_objects: true,
        ..ImportOptions::default()
    };
    let report = ImportSession::new("maps", "level", options)
        .run(&document, &mut host)
        .expect("import");

    let ab = host.object(host.find_object("ab").unwrap()).unwrap();
    assert!((ab.transform.position - DVec3::new(-0.1, -0.3, 0.2)).length() < 1e-9);
    for handle in host.members(report.collection) {
        assert!(!host.object(handle).unwrap().selectable);
    }
}

#[test]
fn import_file_uses_sibling_assets_and_file_stem() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ecm_path = dir.path().join("1a2b.ecm");
    fs::write(&ecm_path, MAP).expect("write ecm");

    let mut assets = Assets::new();
    assets.insert(dir.path().join("ab.gltf"), vec![]);
    let mut host = MemoryHost::new(assets);

    let report = ImportSession::for_file(&ecm_path, ImportOptions::default())
        .import_file(&ecm_path, &mut host)
        .expect("import");
    assert_eq!(host.collections()[0].name, "1a2b");
    assert_eq!(report.templates_loaded, 1);
    assert_eq!(report.skipped, 3);
}

#[test]
fn malformed_file_leaves_host_untouched() {
    let dir = tempfile::tempdir().expect("tempdir");
    let ecm_path = dir.path().join("broken.ecm");
    fs::write(&ecm_path, r#"{"placements": [], "mapzone_entities": []}"#).expect("write ecm");

    let mut host = MemoryHost::new(Assets::new());
    let err = ImportSession::for_file(&ecm_path, ImportOptions::default())
        .import_file(&ecm_path, &mut host)
        .unwrap_err();
    assert!(matches!(err, ImportError::MalformedInput { .. }));
    assert!(host.collections().is_empty());
    assert!(host.objects().is_empty());
}
