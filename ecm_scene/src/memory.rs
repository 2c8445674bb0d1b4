//! In-memory scene graph implementing [`SceneHost`].
//!
//! Models the parts of an editor's object model the importer touches:
//! collections, objects with material slots, shared materials and custom
//! properties. Names follow the editor convention of appending `.001`,
//! `.002`, ... when a name is already taken, which is what produces the
//! material variant families the canonicalizer later collapses.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

use glam::DVec3;
use serde::Serialize;

use crate::host::{
    BlendMode, CollectionHandle, HostError, MarkerShape, MaterialHandle, MaterialInfo,
    ObjectHandle, Rgba, SceneHost,
};
use crate::transform::Transform;

/// Material description read from a model file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMaterial {
    pub name: String,
    pub blend_mode: BlendMode,
    pub double_sided: bool,
}

impl SourceMaterial {
    pub fn new(name: impl Into<String>, blend_mode: BlendMode) -> Self {
        Self {
            name: name.into(),
            blend_mode,
            double_sided: false,
        }
    }
}

/// Where [`MemoryHost`] reads model files from.
pub trait AssetSource {
    /// Material table of the model at `path`, or `None` when it does not exist.
    fn open(&mut self, path: &Path) -> Result<Option<Vec<SourceMaterial>>, HostError>;
}

impl AssetSource for BTreeMap<PathBuf, Vec<SourceMaterial>> {
    fn open(&mut self, path: &Path) -> Result<Option<Vec<SourceMaterial>>, HostError> {
        Ok(self.get(path).cloned())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneCollection {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneMaterial {
    pub name: String,
    pub blend_mode: BlendMode,
    pub backface_culling: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asset: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<MarkerShape>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<DVec3>,
    pub transform: Transform,
    pub collections: Vec<CollectionHandle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<ObjectHandle>,
    pub material_slots: Vec<MaterialHandle>,
    pub smooth: bool,
    pub selectable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Rgba>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl SceneObject {
    fn new(name: String) -> Self {
        Self {
            name,
            asset: None,
            shape: None,
            dimensions: None,
            transform: Transform::IDENTITY,
            collections: Vec::new(),
            parent: None,
            material_slots: Vec::new(),
            smooth: false,
            selectable: true,
            color: None,
            properties: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(bound = "")]
pub struct MemoryHost<S> {
    #[serde(skip)]
    source: S,
    collections: Vec<SceneCollection>,
    objects: Vec<SceneObject>,
    materials: Vec<SceneMaterial>,
    #[serde(skip)]
    collection_names: NameRegistry,
    #[serde(skip)]
    object_names: NameRegistry,
    #[serde(skip)]
    material_names: NameRegistry,
    #[serde(skip)]
    load_calls: usize,
    #[serde(skip)]
    clone_calls: usize,
    #[serde(skip)]
    smoothing_calls: usize,
    #[serde(skip)]
    culling_calls: usize,
}

/// Names already handed out in one namespace, plus the next numeric suffix
/// to try per base name so repeated duplicates don't rescan from `.001`.
#[derive(Debug, Default)]
pub struct NameRegistry {
    taken: HashSet<String>,
    next_suffix: HashMap<String, u32>,
}

impl NameRegistry {
    /// `base` if free, otherwise the first free `base.NNN`. The returned name
    /// is reserved.
    pub fn claim(&mut self, base: &str) -> String {
        if self.taken.insert(base.to_string()) {
            return base.to_string();
        }
        let next = self.next_suffix.entry(base.to_string()).or_insert(1);
        loop {
            let candidate = format!("{base}.{:03}", *next);
            *next += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

impl<S: AssetSource> MemoryHost<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            collections: Vec::new(),
            objects: Vec::new(),
            materials: Vec::new(),
            collection_names: NameRegistry::default(),
            object_names: NameRegistry::default(),
            material_names: NameRegistry::default(),
            load_calls: 0,
            clone_calls: 0,
            smoothing_calls: 0,
            culling_calls: 0,
        }
    }

    pub fn collections(&self) -> &[SceneCollection] {
        &self.collections
    }

    pub fn object(&self, handle: ObjectHandle) -> Option<&SceneObject> {
        self.objects.get(handle.0 as usize)
    }

    pub fn material(&self, handle: MaterialHandle) -> Option<&SceneMaterial> {
        self.materials.get(handle.0 as usize)
    }

    pub fn find_object(&self, name: &str) -> Option<ObjectHandle> {
        self.objects
            .iter()
            .position(|object| object.name == name)
            .map(|index| ObjectHandle(index as u32))
    }

    pub fn find_material(&self, name: &str) -> Option<MaterialHandle> {
        self.materials
            .iter()
            .position(|material| material.name == name)
            .map(|index| MaterialHandle(index as u32))
    }

    /// Objects linked into `collection`, in creation order.
    pub fn members(&self, collection: CollectionHandle) -> Vec<ObjectHandle> {
        self.objects
            .iter()
            .enumerate()
            .filter(|(_, object)| object.collections.contains(&collection))
            .map(|(index, _)| ObjectHandle(index as u32))
            .collect()
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls
    }

    pub fn clone_calls(&self) -> usize {
        self.clone_calls
    }

    pub fn smoothing_calls(&self) -> usize {
        self.smoothing_calls
    }

    pub fn culling_calls(&self) -> usize {
        self.culling_calls
    }

    fn object_mut(&mut self, handle: ObjectHandle) -> Result<&mut SceneObject, HostError> {
        self.objects
            .get_mut(handle.0 as usize)
            .ok_or(HostError::StaleObject(handle))
    }

    fn push_object(&mut self, object: SceneObject) -> ObjectHandle {
        self.objects.push(object);
        ObjectHandle((self.objects.len() - 1) as u32)
    }

    fn object_name(&mut self, base: &str) -> String {
        self.object_names.claim(base)
    }

    fn add_material(&mut self, source: &SourceMaterial) -> MaterialHandle {
        let name = self.material_names.claim(&source.name);
        self.materials.push(SceneMaterial {
            name,
            blend_mode: source.blend_mode,
            backface_culling: !source.double_sided,
        });
        MaterialHandle((self.materials.len() - 1) as u32)
    }
}

impl<S: AssetSource> SceneHost for MemoryHost<S> {
    fn create_collection(&mut self, name: &str) -> Result<CollectionHandle, HostError> {
        let name = self.collection_names.claim(name);
        self.collections.push(SceneCollection { name });
        Ok(CollectionHandle((self.collections.len() - 1) as u32))
    }

    fn load_asset(&mut self, path: &Path) -> Result<ObjectHandle, HostError> {
        self.load_calls += 1;
        let source_materials = self
            .source
            .open(path)?
            .ok_or_else(|| HostError::NotFound(path.to_path_buf()))?;

        let slots = source_materials
            .iter()
            .map(|material| self.add_material(material))
            .collect();

        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Object".to_string());
        let mut object = SceneObject::new(self.object_name(&stem));
        object.asset = Some(path.to_path_buf());
        object.material_slots = slots;
        Ok(self.push_object(object))
    }

    fn clone_asset(&mut self, handle: ObjectHandle) -> Result<ObjectHandle, HostError> {
        self.clone_calls += 1;
        let mut copy = self
            .object(handle)
            .ok_or(HostError::StaleObject(handle))?
            .clone();
        copy.name = self.object_name(&copy.name);
        copy.collections.clear();
        Ok(self.push_object(copy))
    }

    fn relink(
        &mut self,
        handle: ObjectHandle,
        collection: CollectionHandle,
    ) -> Result<(), HostError> {
        if collection.0 as usize >= self.collections.len() {
            return Err(HostError::StaleCollection(collection));
        }
        let object = self.object_mut(handle)?;
        object.collections.clear();
        object.collections.push(collection);
        Ok(())
    }

    fn set_transform(
        &mut self,
        handle: ObjectHandle,
        transform: &Transform,
    ) -> Result<(), HostError> {
        self.object_mut(handle)?.transform = *transform;
        Ok(())
    }

    fn apply_smoothing(&mut self, handle: ObjectHandle) -> Result<(), HostError> {
        self.smoothing_calls += 1;
        self.object_mut(handle)?.smooth = true;
        Ok(())
    }

    fn set_selectable(&mut self, handle: ObjectHandle, selectable: bool) -> Result<(), HostError> {
        self.object_mut(handle)?.selectable = selectable;
        Ok(())
    }

    fn material_slots(&self, handle: ObjectHandle) -> Result<Vec<MaterialHandle>, HostError> {
        self.object(handle)
            .map(|object| object.material_slots.clone())
            .ok_or(HostError::StaleObject(handle))
    }

    fn set_material_slot(
        &mut self,
        handle: ObjectHandle,
        slot: usize,
        material: MaterialHandle,
    ) -> Result<(), HostError> {
        if self.material(material).is_none() {
            return Err(HostError::StaleMaterial(material));
        }
        let object = self.object_mut(handle)?;
        let entry = object
            .material_slots
            .get_mut(slot)
            .ok_or(HostError::SlotOutOfRange {
                object: handle,
                slot,
            })?;
        *entry = material;
        Ok(())
    }

    fn set_material_backface_culling(
        &mut self,
        material: MaterialHandle,
        enabled: bool,
    ) -> Result<(), HostError> {
        self.culling_calls += 1;
        let entry = self
            .materials
            .get_mut(material.0 as usize)
            .ok_or(HostError::StaleMaterial(material))?;
        entry.backface_culling = enabled;
        Ok(())
    }

    fn materials(&self) -> Vec<MaterialInfo> {
        self.materials
            .iter()
            .enumerate()
            .map(|(index, material)| MaterialInfo {
                handle: MaterialHandle(index as u32),
                name: material.name.clone(),
                blend_mode: material.blend_mode,
            })
            .collect()
    }

    fn objects(&self) -> Vec<ObjectHandle> {
        (0..self.objects.len() as u32).map(ObjectHandle).collect()
    }

    fn create_marker_object(
        &mut self,
        name: &str,
        shape: MarkerShape,
        dimensions: DVec3,
        transform: &Transform,
    ) -> Result<ObjectHandle, HostError> {
        let mut object = SceneObject::new(self.object_name(name));
        object.shape = Some(shape);
        object.dimensions = Some(dimensions);
        object.transform = *transform;
        Ok(self.push_object(object))
    }

    fn set_color(&mut self, handle: ObjectHandle, rgba: Rgba) -> Result<(), HostError> {
        self.object_mut(handle)?.color = Some(rgba);
        Ok(())
    }

    fn set_parent(&mut self, child: ObjectHandle, parent: ObjectHandle) -> Result<(), HostError> {
        if self.object(parent).is_none() {
            return Err(HostError::StaleObject(parent));
        }
        self.object_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn clear_origin(&mut self, handle: ObjectHandle) -> Result<(), HostError> {
        self.object_mut(handle)?.transform.position = DVec3::ZERO;
        Ok(())
    }

    fn set_property(
        &mut self,
        handle: ObjectHandle,
        key: &str,
        value: &str,
    ) -> Result<(), HostError> {
        self.object_mut(handle)?
            .properties
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestHost = MemoryHost<BTreeMap<PathBuf, Vec<SourceMaterial>>>;

    fn host_with(assets: Vec<(&str, Vec<(&str, BlendMode)>)>) -> TestHost {
        let source = assets
            .into_iter()
            .map(|(path, materials)| {
                let materials = materials
                    .into_iter()
                    .map(|(name, blend)| SourceMaterial::new(name, blend))
                    .collect();
                (PathBuf::from(path), materials)
            })
            .collect();
        MemoryHost::new(source)
    }

    #[test]
    fn duplicate_names_get_numbered_suffixes() {
        let mut host = host_with(vec![
            ("a.gltf", vec![("brick", BlendMode::Opaque)]),
            (
                "b.gltf",
                vec![("brick", BlendMode::Opaque), ("brick", BlendMode::Opaque)],
            ),
        ]);
        host.load_asset(Path::new("a.gltf")).expect("load a");
        host.load_asset(Path::new("b.gltf")).expect("load b");
        let names: Vec<String> = host.materials().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["brick", "brick.001", "brick.002"]);
    }

    #[test]
    fn name_registry_continues_suffixes_and_skips_taken_names() {
        let mut names = NameRegistry::default();
        assert_eq!(names.claim("rock"), "rock");
        assert_eq!(names.claim("rock.002"), "rock.002");
        assert_eq!(names.claim("rock"), "rock.001");
        assert_eq!(names.claim("rock"), "rock.003");
        assert_eq!(names.claim("rock"), "rock.004");
    }

    #[test]
    fn many_clones_get_sequential_names() {
        let mut host = host_with(vec![("a.gltf", vec![])]);
        let template = host.load_asset(Path::new("a.gltf")).unwrap();
        let mut last = template;
        for _ in 0..1500 {
            last = host.clone_asset(template).unwrap();
        }
        assert_eq!(host.object(last).unwrap().name, "a.1500");
        assert_eq!(host.objects().len(), 1501);
    }

    #[test]
    fn missing_asset_reports_not_found() {
        let mut host = host_with(vec![]);
        let err = host.load_asset(Path::new("nope.gltf")).unwrap_err();
        assert!(matches!(err, HostError::NotFound(_)));
        assert_eq!(host.load_calls(), 1);
    }

    #[test]
    fn clone_shares_materials_and_gets_new_name() {
        let mut host = host_with(vec![("a.gltf", vec![("stone", BlendMode::Opaque)])]);
        let original = host.load_asset(Path::new("a.gltf")).expect("load");
        let copy = host.clone_asset(original).expect("clone");
        assert_ne!(original, copy);
        assert_eq!(host.object(copy).unwrap().name, "a.001");
        assert_eq!(
            host.material_slots(copy).unwrap(),
            host.material_slots(original).unwrap()
        );
        assert_eq!(host.materials().len(), 1);
    }

    #[test]
    fn relink_keeps_a_single_membership() {
        let mut host = host_with(vec![("a.gltf", vec![])]);
        let first = host.create_collection("first").unwrap();
        let second = host.create_collection("second").unwrap();
        let object = host.load_asset(Path::new("a.gltf")).unwrap();
        host.relink(object, first).unwrap();
        host.relink(object, second).unwrap();
        host.relink(object, second).unwrap();
        assert_eq!(host.object(object).unwrap().collections, vec![second]);
        assert!(host.members(first).is_empty());
    }

    #[test]
    fn stale_handles_are_rejected() {
        let mut host = host_with(vec![]);
        assert!(matches!(
            host.clone_asset(ObjectHandle(9)),
            Err(HostError::StaleObject(ObjectHandle(9)))
        ));
    }
}
