//! Trigger import: property export plus optional visual markers.
//!
//! Trigger classes may arrive bare (`CrossPlane`) or engine-qualified
//! (`HT_TriggerType_CrossPlane`); both resolve to the same visualizer.

use std::collections::HashMap;
use std::f64::consts::FRAC_PI_2;

use glam::DVec3;
use once_cell::sync::Lazy;

use crate::document::Trigger;
use crate::host::{CollectionHandle, HostError, MarkerShape, ObjectHandle, Rgba, SceneHost};
use crate::options::ImportOptions;
use crate::raw::decode_raw_float;
use crate::transform::Transform;

const TYPE_PREFIX: &str = "HT_TriggerType_";
const SUBTYPE_PREFIX: &str = "HT_TriggerSubType_";

pub const LOAD_MAP_COLOR: Rgba = [0.0, 0.0, 1.0, 1.0];
pub const CLOSE_MAP_COLOR: Rgba = [1.0, 0.0, 0.0, 1.0];

#[derive(Debug, Clone, PartialEq)]
pub struct VisualMarker {
    pub shape: MarkerShape,
    pub dimensions: DVec3,
    /// Local Euler rotation relative to the trigger object.
    pub rotation: DVec3,
    pub color: Option<Rgba>,
}

/// Builds a marker from the (unqualified) subtype and the trigger data words.
pub type Visualizer = fn(Option<&str>, &[u32]) -> Option<VisualMarker>;

pub fn trigger_class(ttype: &str) -> &str {
    ttype.strip_prefix(TYPE_PREFIX).unwrap_or(ttype)
}

pub fn trigger_subclass(tsubtype: &str) -> &str {
    tsubtype.strip_prefix(SUBTYPE_PREFIX).unwrap_or(tsubtype)
}

fn crossplane(subtype: Option<&str>, data: &[u32]) -> Option<VisualMarker> {
    let word = |index: usize| data.get(index).copied().unwrap_or(0);
    let color = match subtype {
        Some("LoadMap") => Some(LOAD_MAP_COLOR),
        Some("CloseMap") => Some(CLOSE_MAP_COLOR),
        _ => None,
    };
    Some(VisualMarker {
        shape: MarkerShape::Plane,
        dimensions: DVec3::new(decode_raw_float(word(0)), decode_raw_float(word(1)), 0.0),
        rotation: DVec3::new(FRAC_PI_2, 0.0, 0.0),
        color,
    })
}

/// Table of trigger class to visualizer.
#[derive(Debug, Clone)]
pub struct VisualizerRegistry {
    table: HashMap<String, Visualizer>,
}

impl VisualizerRegistry {
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    pub fn register(&mut self, class: impl Into<String>, visualizer: Visualizer) {
        self.table.insert(class.into(), visualizer);
    }

    pub fn visualization_for(
        &self,
        ttype: &str,
        tsubtype: Option<&str>,
        data: &[u32],
    ) -> Option<VisualMarker> {
        let visualizer = self.table.get(trigger_class(ttype))?;
        visualizer(tsubtype.map(trigger_subclass), data)
    }
}

impl Default for VisualizerRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("CrossPlane", crossplane);
        registry
    }
}

static BUILTIN: Lazy<VisualizerRegistry> = Lazy::new(VisualizerRegistry::default);

/// Marker for a trigger using the built-in visualizers.
pub fn visualization_for(ttype: &str, tsubtype: Option<&str>, data: &[u32]) -> Option<VisualMarker> {
    BUILTIN.visualization_for(ttype, tsubtype, data)
}

/// Named properties exported for a trigger. Unset data words (zero) and unset
/// links (`-1`) are omitted.
pub fn trigger_properties(trigger: &Trigger) -> Vec<(String, String)> {
    let mut properties = Vec::new();
    for (index, value) in trigger.data.iter().enumerate() {
        if *value != 0 {
            properties.push((format!("data[{index:#x}]"), format!("{value:#x}")));
        }
    }
    for (index, value) in trigger.links.iter().enumerate() {
        if *value != -1 {
            properties.push((format!("links[{index}]"), value.to_string()));
        }
    }
    if let Some(subtype) = &trigger.tsubtype {
        properties.push(("subtype".to_string(), subtype.clone()));
    }
    if let Some(link_ref) = trigger.link_ref.filter(|value| *value != -1) {
        properties.push(("link_ref".to_string(), link_ref.to_string()));
    }
    if let Some(flags) = trigger.game_flags.filter(|value| *value != 0) {
        properties.push(("game_flags".to_string(), format!("{flags:#x}")));
    }
    if let Some(flags) = trigger.trig_flags.filter(|value| *value != 0) {
        properties.push(("trig_flags".to_string(), format!("{flags:#x}")));
    }
    if let Some(debug) = trigger.debug.filter(|value| *value != 0) {
        properties.push(("debug".to_string(), format!("{debug:#x}")));
    }
    properties
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerObjects {
    pub object: ObjectHandle,
    pub marker: Option<ObjectHandle>,
}

/// Create the trigger's object, export its properties and attach a marker if
/// its class has a visualizer and visualizations are enabled.
pub fn import_trigger<H: SceneHost + ?Sized>(
    host: &mut H,
    collection: CollectionHandle,
    index: usize,
    trigger: &Trigger,
    options: &ImportOptions,
    registry: &VisualizerRegistry,
) -> Result<TriggerObjects, HostError> {
    let name = format!("{}_{index}", trigger_class(&trigger.ttype));
    let transform = Transform::from_source(trigger.position, trigger.rotation, trigger.scale)
        .with_position_scale(options.position_scale());
    let object = host.create_marker_object(&name, MarkerShape::Empty, DVec3::ONE, &transform)?;
    host.relink(object, collection)?;
    for (key, value) in trigger_properties(trigger) {
        host.set_property(object, &key, &value)?;
    }
    if options.lock_objects {
        host.set_selectable(object, false)?;
    }

    if !options.trigger_visualizations {
        return Ok(TriggerObjects {
            object,
            marker: None,
        });
    }
    let Some(visual) =
        registry.visualization_for(&trigger.ttype, trigger.tsubtype.as_deref(), &trigger.data)
    else {
        return Ok(TriggerObjects {
            object,
            marker: None,
        });
    };

    let local = Transform {
        rotation: visual.rotation,
        ..Transform::IDENTITY
    };
    let marker = host.create_marker_object(
        &format!("{name}#Visualization"),
        visual.shape,
        visual.dimensions,
        &local,
    )?;
    host.set_parent(marker, object)?;
    host.clear_origin(marker)?;
    if let Some(color) = visual.color {
        host.set_color(marker, color)?;
    }
    host.relink(marker, collection)?;
    if options.lock_objects {
        host.set_selectable(marker, false)?;
    }

    Ok(TriggerObjects {
        object,
        marker: Some(marker),
    })
}
