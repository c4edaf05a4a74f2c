//! Parsed OBJ/MTL types.
//!
//! Geometry is stored the way a rasterizer consumes it without an index
//! buffer: one flat `f32` array per vertex attribute, three vertices per
//! triangle.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;

/// Name used for object, group and material until the file sets one.
pub const DEFAULT_NAME: &str = "default";

/// A per-vertex attribute channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Position,
    Texcoord,
    Normal,
    Color,
}

impl Channel {
    /// All channels, in output order.
    pub const ALL: [Channel; 4] = [
        Channel::Position,
        Channel::Texcoord,
        Channel::Normal,
        Channel::Color,
    ];

    /// Number of floats per vertex in this channel.
    pub fn arity(&self) -> usize {
        match self {
            Channel::Texcoord => 2,
            Channel::Position | Channel::Normal | Channel::Color => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Position => "position",
            Channel::Texcoord => "texcoord",
            Channel::Normal => "normal",
            Channel::Color => "color",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A run of triangles sharing one object name, group set and material.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Object name from the last `o` directive
    pub object: String,

    /// Group names from the last `g` directive
    pub groups: Vec<String>,

    /// Material name from the last `usemtl` directive
    pub material: String,

    /// Flat attribute buffers keyed by channel
    pub data: BTreeMap<Channel, Vec<f32>>,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(DEFAULT_NAME, vec![DEFAULT_NAME.to_string()], DEFAULT_NAME)
    }
}

impl Geometry {
    /// Create an empty geometry with every channel present.
    pub fn new(object: impl Into<String>, groups: Vec<String>, material: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            groups,
            material: material.into(),
            data: Channel::ALL.iter().map(|&c| (c, Vec::new())).collect(),
        }
    }

    /// Append one vertex worth of values to a channel.
    pub(crate) fn push(&mut self, channel: Channel, values: &[f32]) {
        self.data.entry(channel).or_default().extend_from_slice(values);
    }

    /// Drop channels no face wrote to.
    pub fn prune_empty_channels(&mut self) {
        self.data.retain(|_, values| !values.is_empty());
    }

    /// Flat buffer for a channel, if present.
    pub fn channel(&self, channel: Channel) -> Option<&[f32]> {
        self.data.get(&channel).map(Vec::as_slice)
    }

    pub fn has_channel(&self, channel: Channel) -> bool {
        self.channel(channel).is_some_and(|values| !values.is_empty())
    }

    /// Number of emitted vertices.
    pub fn vertex_count(&self) -> usize {
        self.channel(Channel::Position).map_or(0, |p| p.len() / 3)
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        self.triples(Channel::Position)
    }

    pub fn normals(&self) -> &[[f32; 3]] {
        self.triples(Channel::Normal)
    }

    pub fn colors(&self) -> &[[f32; 3]] {
        self.triples(Channel::Color)
    }

    pub fn texcoords(&self) -> &[[f32; 2]] {
        self.channel(Channel::Texcoord)
            .and_then(|values| bytemuck::try_cast_slice(values).ok())
            .unwrap_or_default()
    }

    fn triples(&self, channel: Channel) -> &[[f32; 3]] {
        self.channel(channel)
            .and_then(|values| bytemuck::try_cast_slice(values).ok())
            .unwrap_or_default()
    }

    /// Axis-aligned bounds of the emitted positions.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(self.positions().iter().map(|&p| Vec3::from_array(p)))
    }
}

/// Result of parsing an OBJ document.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedScene {
    /// Geometries in order of first face
    pub geometries: Vec<Geometry>,

    /// `mtllib` arguments in order of appearance (duplicates kept)
    pub material_libs: Vec<String>,
}

impl ParsedScene {
    pub fn total_triangle_count(&self) -> usize {
        self.geometries.iter().map(Geometry::triangle_count).sum()
    }

    pub fn total_vertex_count(&self) -> usize {
        self.geometries.iter().map(Geometry::vertex_count).sum()
    }

    /// Bounds enclosing every geometry.
    pub fn bounds(&self) -> Bounds {
        self.geometries
            .iter()
            .map(Geometry::bounds)
            .fold(Bounds::empty(), |acc, b| acc.union(&b))
    }
}

/// A material from an MTL file. Unset fields were not present in the file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    /// `Ns`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shininess: Option<f32>,

    /// `Ka`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient: Option<Vec<f32>>,

    /// `Kd`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diffuse: Option<Vec<f32>>,

    /// `Ks`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specular: Option<Vec<f32>>,

    /// `Ke`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissive: Option<Vec<f32>>,

    /// `Ni`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optical_density: Option<f32>,

    /// `d`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,

    /// `illum`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illum: Option<i32>,

    /// `map_Kd`, stored verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_diffuse: Option<String>,
}

impl Material {
    /// Check if this material references a diffuse texture.
    pub fn has_textures(&self) -> bool {
        self.map_diffuse.is_some()
    }

    /// Check if this material has a non-black emissive color.
    pub fn is_emissive(&self) -> bool {
        self.emissive
            .as_ref()
            .is_some_and(|ke| ke.iter().any(|&c| c > 0.0))
    }
}

/// Materials keyed by `newmtl` name.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MaterialLibrary {
    pub materials: HashMap<String, Material>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Material> {
        self.materials.get(name)
    }

    /// Insert a material, replacing any existing one with the same name.
    pub fn insert(&mut self, name: impl Into<String>, material: Material) -> Option<Material> {
        self.materials.insert(name.into(), material)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    /// Material names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.materials.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Material)> {
        self.materials.iter()
    }

    /// Merge another library into this one. Entries in `other` win.
    pub fn extend(&mut self, other: MaterialLibrary) {
        self.materials.extend(other.materials);
    }
}
