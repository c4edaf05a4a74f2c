//! OBJ geometry parser.
//!
//! Vertex attributes are collected into 1-indexed pools as `v`/`vt`/`vn`
//! lines arrive. Each `f` line resolves its references against the pools as
//! they stand at that moment and appends the referenced values to the
//! current [`Geometry`], fan-triangulating polygons.
//!
//! A new geometry starts at the first face after an `o`, `g` or `usemtl`
//! change. Metadata changes before any face data are folded into the pending
//! geometry instead of producing empty ones.

use thiserror::Error;

use super::keyword::ObjKeyword;
use super::tokenizer::{tokenize, Line};
use super::types::*;

/// Errors that can occur during OBJ/MTL parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Invalid number at line {line}: {token:?}")]
    InvalidNumber { line: usize, token: String },

    #[error("Missing value for `{keyword}` at line {line}")]
    MissingValue { line: usize, keyword: &'static str },

    #[error("Expected {expected} {channel} components at line {line}, found {found}")]
    Arity {
        line: usize,
        channel: Channel,
        expected: usize,
        found: usize,
    },

    #[error("Invalid vertex reference at line {line}: {token:?}")]
    InvalidReference { line: usize, token: String },

    #[error("Bad {channel} index at line {line}: {source}")]
    Index {
        line: usize,
        channel: Channel,
        source: IndexError,
    },

    #[error("Face at line {line} has {count} vertices, need at least 3")]
    DegenerateFace { line: usize, count: usize },

    #[error("`{keyword}` at line {line} appears before any newmtl")]
    NoActiveMaterial { line: usize, keyword: &'static str },
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Face index resolution failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexError {
    #[error("index 0 is not valid, indices start at 1")]
    Zero,

    #[error("index {index} out of range, {available} entries defined")]
    OutOfRange { index: i64, available: usize },
}

/// Resolve a face index against a pool holding `pool_len` entries,
/// including the unused entry at slot 0.
///
/// Positive indices are absolute. Negative indices count back from the end
/// of the pool, so `-1` is the most recently declared entry.
pub fn resolve_index(raw: i64, pool_len: usize) -> Result<usize, IndexError> {
    let out_of_range = IndexError::OutOfRange {
        index: raw,
        available: pool_len.saturating_sub(1),
    };

    let resolved = match raw {
        0 => return Err(IndexError::Zero),
        r if r > 0 => r,
        r => pool_len as i64 + r,
    };

    if resolved < 1 || resolved >= pool_len as i64 {
        return Err(out_of_range);
    }

    Ok(resolved as usize)
}

/// Parse an OBJ document.
pub fn parse_obj(text: &str) -> ParseResult<ParsedScene> {
    let mut parser = ObjParser::new();
    for line in tokenize(text) {
        parser.dispatch(&line)?;
    }
    Ok(parser.finish())
}

/// Append-only attribute pool. Slot 0 holds a zero entry so that format
/// indices map straight to vector positions.
#[derive(Debug)]
struct Pool<const N: usize> {
    entries: Vec<[f32; N]>,
}

impl<const N: usize> Pool<N> {
    fn new() -> Self {
        Self {
            entries: vec![[0.0; N]],
        }
    }

    fn push(&mut self, entry: [f32; N]) {
        self.entries.push(entry);
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    /// True once the file declared at least one entry.
    fn is_used(&self) -> bool {
        self.entries.len() > 1
    }

    fn resolve(&self, raw: i64) -> Result<usize, IndexError> {
        resolve_index(raw, self.len())
    }

    fn at(&self, index: usize) -> Result<&[f32; N], IndexError> {
        self.entries.get(index).ok_or(IndexError::OutOfRange {
            index: index as i64,
            available: self.len() - 1,
        })
    }
}

/// Attribute pools for one parse call.
#[derive(Debug)]
struct Pools {
    position: Pool<3>,
    texcoord: Pool<2>,
    normal: Pool<3>,
    color: Pool<3>,
}

impl Pools {
    fn new() -> Self {
        Self {
            position: Pool::new(),
            texcoord: Pool::new(),
            normal: Pool::new(),
            color: Pool::new(),
        }
    }
}

/// Where new face data goes.
///
/// The active geometry, when there is one, is always the last entry of
/// `ObjParser::geometries`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cursor {
    /// The next face starts a new geometry.
    Idle,

    /// Faces append to the last geometry.
    Active { has_data: bool },
}

struct ObjParser {
    pools: Pools,
    object: String,
    groups: Vec<String>,
    material: String,
    geometries: Vec<Geometry>,
    material_libs: Vec<String>,
    cursor: Cursor,
}

impl ObjParser {
    fn new() -> Self {
        Self {
            pools: Pools::new(),
            object: DEFAULT_NAME.to_string(),
            groups: vec![DEFAULT_NAME.to_string()],
            material: DEFAULT_NAME.to_string(),
            geometries: Vec::new(),
            material_libs: Vec::new(),
            cursor: Cursor::Idle,
        }
    }

    fn dispatch(&mut self, line: &Line<'_>) -> ParseResult<()> {
        let Some(keyword) = ObjKeyword::parse(line.keyword) else {
            log::warn!("Unhandled OBJ keyword `{}` at line {}", line.keyword, line.number);
            return Ok(());
        };

        match keyword {
            ObjKeyword::Vertex => self.vertex(line),
            ObjKeyword::TexCoord => {
                let values = parse_floats(&line.parts, line.number)?;
                let entry = tuple(&values, Channel::Texcoord, line.number)?;
                self.pools.texcoord.push(entry);
                Ok(())
            }
            ObjKeyword::Normal => {
                let values = parse_floats(&line.parts, line.number)?;
                let entry = tuple(&values, Channel::Normal, line.number)?;
                self.pools.normal.push(entry);
                Ok(())
            }
            ObjKeyword::Face => self.face(line),
            ObjKeyword::Group => {
                self.groups = line.parts.iter().map(|s| s.to_string()).collect();
                self.begin_new_geometry();
                Ok(())
            }
            ObjKeyword::Object => {
                self.object = line.remainder.to_string();
                self.begin_new_geometry();
                Ok(())
            }
            ObjKeyword::UseMaterial => {
                self.material = line.remainder.to_string();
                self.begin_new_geometry();
                Ok(())
            }
            ObjKeyword::MaterialLibrary => {
                self.material_libs.push(line.remainder.to_string());
                Ok(())
            }
            // Smoothing groups are not supported
            ObjKeyword::Smoothing => Ok(()),
        }
    }

    /// `v x y z [r g b]`
    fn vertex(&mut self, line: &Line<'_>) -> ParseResult<()> {
        let values = parse_floats(&line.parts, line.number)?;

        if values.len() > 3 {
            let position = tuple(&values[..3], Channel::Position, line.number)?;
            let color = tuple(&values[3..], Channel::Color, line.number)?;
            self.pools.position.push(position);
            self.pools.color.push(color);
        } else {
            let position = tuple(&values, Channel::Position, line.number)?;
            self.pools.position.push(position);
        }

        Ok(())
    }

    /// `f v1 v2 v3 ...`, fan-triangulated around the first vertex.
    fn face(&mut self, line: &Line<'_>) -> ParseResult<()> {
        let count = line.parts.len();
        if count < 3 {
            return Err(ParseError::DegenerateFace {
                line: line.number,
                count,
            });
        }

        let index = self.ensure_geometry();
        let geometry = &mut self.geometries[index];

        for i in 0..count - 2 {
            for reference in [line.parts[0], line.parts[i + 1], line.parts[i + 2]] {
                emit_vertex(&self.pools, geometry, reference, line.number)?;
            }
        }

        self.cursor = Cursor::Active {
            has_data: geometry.has_channel(Channel::Position),
        };
        Ok(())
    }

    /// Start a geometry with the current names if none is active, and
    /// return the index of the active one.
    fn ensure_geometry(&mut self) -> usize {
        if self.cursor == Cursor::Idle {
            self.geometries.push(Geometry::new(
                self.object.clone(),
                self.groups.clone(),
                self.material.clone(),
            ));
            self.cursor = Cursor::Active { has_data: false };
        }
        self.geometries.len() - 1
    }

    /// Handle an `o`/`g`/`usemtl` change.
    fn begin_new_geometry(&mut self) {
        match self.cursor {
            Cursor::Idle => {}
            Cursor::Active { has_data: true } => self.cursor = Cursor::Idle,
            Cursor::Active { has_data: false } => {
                if let Some(geometry) = self.geometries.last_mut() {
                    geometry.object = self.object.clone();
                    geometry.groups = self.groups.clone();
                    geometry.material = self.material.clone();
                }
            }
        }
    }

    fn finish(mut self) -> ParsedScene {
        for geometry in &mut self.geometries {
            geometry.prune_empty_channels();
        }

        log::debug!(
            "Parsed {} geometries ({} positions, {} texcoords, {} normals, {} colors declared)",
            self.geometries.len(),
            self.pools.position.len() - 1,
            self.pools.texcoord.len() - 1,
            self.pools.normal.len() - 1,
            self.pools.color.len() - 1,
        );

        ParsedScene {
            geometries: self.geometries,
            material_libs: self.material_libs,
        }
    }
}

/// Resolve one `pos[/tex][/norm]` reference and append its values.
///
/// Empty components are skipped. Inline vertex colors follow the position
/// index since they have no slot of their own.
fn emit_vertex(
    pools: &Pools,
    geometry: &mut Geometry,
    reference: &str,
    line: usize,
) -> ParseResult<()> {
    let index_error = |channel, source| ParseError::Index {
        line,
        channel,
        source,
    };

    for (slot, component) in reference.split('/').enumerate() {
        if component.is_empty() {
            continue;
        }
        let raw = parse_int(component, line)?;

        match slot {
            0 => {
                let index = pools
                    .position
                    .resolve(raw)
                    .map_err(|e| index_error(Channel::Position, e))?;
                geometry.push(Channel::Position, &pools.position.entries[index]);

                if pools.color.is_used() {
                    let color = pools
                        .color
                        .at(index)
                        .map_err(|e| index_error(Channel::Color, e))?;
                    geometry.push(Channel::Color, color);
                }
            }
            1 => {
                let index = pools
                    .texcoord
                    .resolve(raw)
                    .map_err(|e| index_error(Channel::Texcoord, e))?;
                geometry.push(Channel::Texcoord, &pools.texcoord.entries[index]);
            }
            2 => {
                let index = pools
                    .normal
                    .resolve(raw)
                    .map_err(|e| index_error(Channel::Normal, e))?;
                geometry.push(Channel::Normal, &pools.normal.entries[index]);
            }
            _ => {
                return Err(ParseError::InvalidReference {
                    line,
                    token: reference.to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Take the first `N` values as a pool entry. Extra values are dropped.
fn tuple<const N: usize>(values: &[f32], channel: Channel, line: usize) -> ParseResult<[f32; N]> {
    if values.len() < N {
        return Err(ParseError::Arity {
            line,
            channel,
            expected: N,
            found: values.len(),
        });
    }

    let mut entry = [0.0; N];
    entry.copy_from_slice(&values[..N]);
    Ok(entry)
}

pub(crate) fn parse_float(token: &str, line: usize) -> ParseResult<f32> {
    token.parse::<f32>().map_err(|_| ParseError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}

pub(crate) fn parse_floats(parts: &[&str], line: usize) -> ParseResult<Vec<f32>> {
    parts.iter().map(|token| parse_float(token, line)).collect()
}

pub(crate) fn parse_int(token: &str, line: usize) -> ParseResult<i64> {
    token.parse::<i64>().map_err(|_| ParseError::InvalidNumber {
        line,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(geometry: &Geometry) -> &[f32] {
        geometry.channel(Channel::Position).unwrap()
    }

    #[test]
    fn test_parse_single_triangle() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

        let scene = parse_obj(obj).unwrap();
        assert_eq!(scene.geometries.len(), 1);

        let geometry = &scene.geometries[0];
        assert_eq!(
            position(geometry),
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
        assert_eq!(geometry.data.len(), 1, "only position should survive pruning");
        assert_eq!(geometry.object, "default");
        assert_eq!(geometry.groups, vec!["default"]);
        assert_eq!(geometry.material, "default");
        assert!(scene.material_libs.is_empty());
    }

    #[test]
    fn test_quad_fan_triangulation() {
        // A=(1,0,0) B=(2,0,0) C=(3,0,0) D=(4,0,0), using x as the vertex id
        let obj = "v 1 0 0\nv 2 0 0\nv 3 0 0\nv 4 0 0\nf 1 2 3 4\n";

        let scene = parse_obj(obj).unwrap();
        let ids: Vec<f32> = scene.geometries[0].positions().iter().map(|p| p[0]).collect();

        // (A,B,C) then (A,C,D)
        assert_eq!(ids, vec![1.0, 2.0, 3.0, 1.0, 3.0, 4.0]);
        assert_eq!(scene.geometries[0].triangle_count(), 2);
    }

    #[test]
    fn test_pentagon_triangle_count() {
        let obj = "v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nf 1 2 3 4 5\n";
        let scene = parse_obj(obj).unwrap();
        assert_eq!(scene.geometries[0].triangle_count(), 3);
    }

    #[test]
    fn test_resolve_index() {
        // Pool of 4 entries: seed plus three declared values
        assert_eq!(resolve_index(1, 4), Ok(1));
        assert_eq!(resolve_index(3, 4), Ok(3));
        assert_eq!(resolve_index(-1, 4), Ok(3));
        assert_eq!(resolve_index(-3, 4), Ok(1));
        assert_eq!(resolve_index(0, 4), Err(IndexError::Zero));
        assert_eq!(
            resolve_index(4, 4),
            Err(IndexError::OutOfRange { index: 4, available: 3 })
        );
        assert_eq!(
            resolve_index(-4, 4),
            Err(IndexError::OutOfRange { index: -4, available: 3 })
        );
    }

    #[test]
    fn test_negative_indices_are_relative_to_current_pool() {
        let obj = "\
v 1 0 0
v 2 0 0
v 3 0 0
f -3 -2 -1
v 4 0 0
f -3 -2 -1
";
        let scene = parse_obj(obj).unwrap();
        let ids: Vec<f32> = scene.geometries[0].positions().iter().map(|p| p[0]).collect();
        assert_eq!(ids, vec![1.0, 2.0, 3.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_full_references() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 1
f 1/1/1 2/2/1 3/3/1
";
        let scene = parse_obj(obj).unwrap();
        let geometry = &scene.geometries[0];

        assert_eq!(geometry.texcoords(), &[[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
        assert_eq!(geometry.normals(), &[[0.0, 0.0, 1.0]; 3]);
        assert!(!geometry.has_channel(Channel::Color));
    }

    #[test]
    fn test_empty_texcoord_component_is_skipped() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 1 0\nf 1//1 2//1 3//1\n";

        let scene = parse_obj(obj).unwrap();
        let geometry = &scene.geometries[0];

        assert_eq!(geometry.vertex_count(), 3);
        assert_eq!(geometry.normals().len(), 3);
        assert!(geometry.channel(Channel::Texcoord).is_none());
    }

    #[test]
    fn test_inline_vertex_colors_follow_position_index() {
        let obj = "\
v 1 2 3 0.1 0.2 0.3
v 4 5 6 0.4 0.5 0.6
v 7 8 9 0.7 0.8 0.9
f 3 1 2
";
        let scene = parse_obj(obj).unwrap();
        let geometry = &scene.geometries[0];

        assert_eq!(geometry.positions()[0], [7.0, 8.0, 9.0]);
        assert_eq!(
            geometry.colors(),
            &[[0.7, 0.8, 0.9], [0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]
        );
    }

    #[test]
    fn test_color_missing_for_referenced_position() {
        let obj = "v 0 0 0 1 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

        let err = parse_obj(obj).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Index {
                line: 4,
                channel: Channel::Color,
                ..
            }
        ));
    }

    #[test]
    fn test_metadata_before_faces_creates_one_geometry() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
o Body
g left arm
usemtl Skin Tone
f 1 2 3
";
        let scene = parse_obj(obj).unwrap();

        assert_eq!(scene.geometries.len(), 1);
        let geometry = &scene.geometries[0];
        assert_eq!(geometry.object, "Body");
        assert_eq!(geometry.groups, vec!["left", "arm"]);
        assert_eq!(geometry.material, "Skin Tone");
    }

    #[test]
    fn test_metadata_change_folds_into_geometry_without_positions() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
usemtl A
f /1 /1 /1
usemtl B
f 1 2 3
";
        let scene = parse_obj(obj).unwrap();

        // The first face wrote only texcoords, so the material change
        // renames that geometry instead of starting a new one.
        assert_eq!(scene.geometries.len(), 1);
        let geometry = &scene.geometries[0];
        assert_eq!(geometry.material, "B");
        assert_eq!(geometry.channel(Channel::Position).map(<[f32]>::len), Some(9));
        assert_eq!(geometry.channel(Channel::Texcoord).map(<[f32]>::len), Some(6));
    }

    #[test]
    fn test_homogeneous_w_is_read_as_short_color() {
        // More than three values means inline color, so `v x y z w` leaves
        // a one-component color.
        let err = parse_obj("v 1 2 3 1\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::Arity {
                line: 1,
                channel: Channel::Color,
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn test_material_change_splits_geometry() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
usemtl Red
f 1 2 3
usemtl Blue
f 3 2 1
f 1 2 3
";
        let scene = parse_obj(obj).unwrap();

        assert_eq!(scene.geometries.len(), 2);
        assert_eq!(scene.geometries[0].material, "Red");
        assert_eq!(scene.geometries[0].triangle_count(), 1);
        assert_eq!(scene.geometries[1].material, "Blue");
        assert_eq!(scene.geometries[1].triangle_count(), 2);
    }

    #[test]
    fn test_faces_without_changes_share_geometry() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\ns 1\nf 1 2 3\n";
        let scene = parse_obj(obj).unwrap();

        assert_eq!(scene.geometries.len(), 1);
        assert_eq!(scene.geometries[0].triangle_count(), 2);
    }

    #[test]
    fn test_unknown_keyword_is_skipped() {
        let obj = "v 0 0 0\nxyz 1 2 3\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

        let scene = parse_obj(obj).unwrap();
        assert_eq!(scene.geometries[0].vertex_count(), 3);
        assert_eq!(scene.geometries[0].positions()[2], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_material_libs_keep_order_and_duplicates() {
        let obj = "mtllib a.mtl\nmtllib my textures/b.mtl\nmtllib a.mtl\n";
        let scene = parse_obj(obj).unwrap();

        assert_eq!(scene.material_libs, vec!["a.mtl", "my textures/b.mtl", "a.mtl"]);
        assert!(scene.geometries.is_empty());
    }

    #[test]
    fn test_texcoord_extra_component_dropped() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0.5 0.5 0\nf 1/1 2/1 3/1\n";
        let scene = parse_obj(obj).unwrap();

        assert_eq!(scene.geometries[0].channel(Channel::Texcoord).unwrap().len(), 6);
    }

    #[test]
    fn test_invalid_number() {
        let err = parse_obj("v 0 zero 0\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidNumber {
                line: 1,
                token: "zero".to_string()
            }
        );
    }

    #[test]
    fn test_short_tuple() {
        let err = parse_obj("v 0 0 0\nvn 0 1\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::Arity {
                line: 2,
                channel: Channel::Normal,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_out_of_range_face_index() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::Index {
                line: 3,
                channel: Channel::Position,
                source: IndexError::OutOfRange { index: 3, available: 2 },
            }
        );
    }

    #[test]
    fn test_forward_reference_is_rejected() {
        let err = parse_obj("v 0 0 0\nf 1 2 3\nv 1 0 0\nv 0 1 0\n").unwrap_err();
        assert!(matches!(err, ParseError::Index { line: 2, .. }));
    }

    #[test]
    fn test_degenerate_face() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n").unwrap_err();
        assert_eq!(err, ParseError::DegenerateFace { line: 3, count: 2 });
    }

    #[test]
    fn test_channel_lengths_divisible_by_arity() {
        let obj = "\
v 0 0 0 1 0 0
v 1 0 0 0 1 0
v 1 1 0 0 0 1
v 0 1 0 1 1 1
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
o Quad
f 1/1/1 2/2/1 3/3/1 4/4/1
g second
f 4/4 3/3 2/2
";
        let scene = parse_obj(obj).unwrap();
        assert_eq!(scene.geometries.len(), 2);

        for geometry in &scene.geometries {
            for (channel, values) in &geometry.data {
                assert!(!values.is_empty(), "{channel} should have been pruned");
                assert_eq!(values.len() % channel.arity(), 0, "{channel} length");
            }
        }
        assert!(scene.geometries[1].channel(Channel::Normal).is_none());
    }
}
