//! File loading for OBJ models and their material libraries.
//!
//! Parsing itself never touches the filesystem. This module reads files,
//! hands their text to the parsers and resolves `mtllib` references
//! relative to the model.

use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;

use super::material::parse_mtl;
use super::parser::{parse_obj, ParseError};
use super::types::{Geometry, Material, MaterialLibrary, ParsedScene};

/// Errors that can occur while loading files.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("Parse error in {}: {source}", .path.display())]
    Parse { path: PathBuf, source: ParseError },
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Options for [`load_model`].
#[derive(Clone, Debug)]
pub struct LoadOptions {
    /// Load the material libraries named by `mtllib`
    pub load_materials: bool,

    /// Directory `mtllib` paths are relative to. Defaults to the directory
    /// containing the OBJ file.
    pub base_dir: Option<PathBuf>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            load_materials: true,
            base_dir: None,
        }
    }
}

/// A parsed OBJ file together with its materials.
#[derive(Clone, Debug, Default)]
pub struct Model {
    pub scene: ParsedScene,
    pub materials: MaterialLibrary,
}

impl Model {
    /// Material assigned to a geometry via `usemtl`, if it was loaded.
    pub fn material_for(&self, geometry: &Geometry) -> Option<&Material> {
        self.materials.get(&geometry.material)
    }
}

/// Load and parse an OBJ file.
pub fn load_obj<P: AsRef<Path>>(path: P) -> LoadResult<ParsedScene> {
    let path = path.as_ref();
    let text = read(path)?;
    let scene = parse_obj(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!(
        "Loaded {}: {} geometries, {} triangles",
        path.display(),
        scene.geometries.len(),
        scene.total_triangle_count()
    );
    Ok(scene)
}

/// Load and parse an MTL file.
pub fn load_mtl<P: AsRef<Path>>(path: P) -> LoadResult<MaterialLibrary> {
    let path = path.as_ref();
    let text = read(path)?;
    let library = parse_mtl(&text).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    log::info!("Loaded {}: {} materials", path.display(), library.len());
    Ok(library)
}

/// Load an OBJ file and, unless disabled, every material library it names.
///
/// # Example
///
/// ```ignore
/// use objkit_core::obj::{load_model, LoadOptions};
///
/// let model = load_model("models/chair.obj", &LoadOptions::default())?;
/// for geometry in &model.scene.geometries {
///     println!("{} -> {:?}", geometry.object, model.material_for(geometry));
/// }
/// ```
pub fn load_model<P: AsRef<Path>>(path: P, options: &LoadOptions) -> LoadResult<Model> {
    let path = path.as_ref();
    let scene = load_obj(path)?;

    let materials = if options.load_materials && !scene.material_libs.is_empty() {
        let base_dir = options
            .base_dir
            .clone()
            .or_else(|| path.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        load_material_libs(&base_dir, &scene.material_libs)?
    } else {
        MaterialLibrary::new()
    };

    Ok(Model { scene, materials })
}

/// Load material libraries relative to `base_dir` and merge them.
///
/// Libraries are parsed in parallel and merged in the order given, so a
/// material defined in a later library replaces one of the same name from
/// an earlier library. Duplicate names are loaded once. Unreadable files are
/// logged and skipped; malformed files are an error.
pub fn load_material_libs(base_dir: &Path, names: &[String]) -> LoadResult<MaterialLibrary> {
    let mut unique: Vec<&str> = Vec::with_capacity(names.len());
    for name in names {
        if !unique.contains(&name.as_str()) {
            unique.push(name);
        }
    }

    let results: Vec<LoadResult<MaterialLibrary>> = unique
        .par_iter()
        .map(|name| load_mtl(base_dir.join(name)))
        .collect();

    let mut merged = MaterialLibrary::new();
    for result in results {
        match result {
            Ok(library) => merged.extend(library),
            Err(LoadError::Io { path, source }) => {
                log::warn!("Skipping material library {}: {}", path.display(), source);
            }
            Err(err) => return Err(err),
        }
    }

    Ok(merged)
}

fn read(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}
