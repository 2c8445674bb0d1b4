//! Collapses duplicate material variants onto a canonical base material.
//!
//! The editor renames a material to `name.001`, `name.002`, ... whenever an
//! import brings in a material whose name is already taken. Those variants
//! form a family with the unsuffixed base. The naming convention lives behind
//! [`NamingPolicy`] so the rewrite itself does not depend on it.

use std::collections::HashMap;

use log::debug;

use crate::host::{HostError, MaterialHandle, MaterialInfo, SceneHost};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FamilyKey {
    /// The material is the canonical candidate of its own family.
    Base(String),
    /// The material is a duplicate within the named family.
    Variant(String),
}

impl FamilyKey {
    pub fn family(&self) -> &str {
        match self {
            FamilyKey::Base(family) | FamilyKey::Variant(family) => family,
        }
    }

    pub fn is_base(&self) -> bool {
        matches!(self, FamilyKey::Base(_))
    }
}

pub trait NamingPolicy {
    fn family_key(&self, name: &str) -> FamilyKey;
}

impl<F> NamingPolicy for F
where
    F: Fn(&str) -> FamilyKey,
{
    fn family_key(&self, name: &str) -> FamilyKey {
        self(name)
    }
}

/// Everything after the last `.` is a duplicate suffix, except for names
/// ending in `.png`, where the suffix is part of the texture name.
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateSuffixPolicy;

impl NamingPolicy for DuplicateSuffixPolicy {
    fn family_key(&self, name: &str) -> FamilyKey {
        match name.rsplit_once('.') {
            Some((base, _)) if !name.ends_with(".png") => FamilyKey::Variant(base.to_string()),
            _ => FamilyKey::Base(name.to_string()),
        }
    }
}

/// Map every mergeable variant to its family's base material.
///
/// Variants whose family has no base, or whose blend mode differs from the
/// base's, are left out of the plan.
pub fn plan_canonical_materials(
    materials: &[MaterialInfo],
    policy: &dyn NamingPolicy,
) -> HashMap<MaterialHandle, MaterialHandle> {
    let keyed: Vec<(FamilyKey, &MaterialInfo)> = materials
        .iter()
        .map(|material| (policy.family_key(&material.name), material))
        .collect();

    let mut bases: HashMap<&str, &MaterialInfo> = HashMap::new();
    for (key, material) in &keyed {
        if key.is_base() {
            bases.entry(key.family()).or_insert(*material);
        }
    }

    let mut plan = HashMap::new();
    for (key, material) in &keyed {
        if key.is_base() {
            continue;
        }
        match bases.get(key.family()) {
            Some(base) if base.blend_mode == material.blend_mode => {
                debug!("merging {} into {}", material.name, base.name);
                plan.insert(material.handle, base.handle);
            }
            Some(base) => debug!(
                "keeping {} distinct from {}: blend mode {:?} vs {:?}",
                material.name, base.name, material.blend_mode, base.blend_mode
            ),
            None => debug!("no base material for family {}", key.family()),
        }
    }
    plan
}

/// Rewrite every object's material slots according to the plan. Returns the
/// number of slots rewritten; a second run rewrites nothing.
pub fn canonicalize_materials<H: SceneHost + ?Sized>(
    host: &mut H,
    policy: &dyn NamingPolicy,
) -> Result<usize, HostError> {
    let plan = plan_canonical_materials(&host.materials(), policy);
    if plan.is_empty() {
        return Ok(0);
    }

    let mut rewritten = 0;
    for object in host.objects() {
        let slots = host.material_slots(object)?;
        for (slot, material) in slots.into_iter().enumerate() {
            if let Some(&canonical) = plan.get(&material) {
                host.set_material_slot(object, slot, canonical)?;
                rewritten += 1;
            }
        }
    }
    debug!("rewrote {rewritten} material slots");
    Ok(rewritten)
}
