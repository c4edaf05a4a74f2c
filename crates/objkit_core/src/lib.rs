//! objkit core - Wavefront OBJ/MTL parsing for rendering.
//!
//! This crate provides:
//!
//! - **Geometry parsing**: OBJ text to flat, per-vertex attribute buffers
//!   grouped by object, group and material
//! - **Material parsing**: MTL text to a name-keyed material library
//! - **Loading**: file reading and `mtllib` resolution
//!
//! # Example
//!
//! ```ignore
//! use objkit_core::obj::{load_model, LoadOptions};
//!
//! let model = load_model("scene.obj", &LoadOptions::default())?;
//! println!("Loaded {} geometries, {} materials",
//!     model.scene.geometries.len(),
//!     model.materials.len());
//! ```

pub mod bounds;
pub mod obj;

// Re-export commonly used types
pub use bounds::Bounds;
pub use obj::{
    load_model, load_mtl, load_obj, parse_mtl, parse_obj, Channel, Geometry, LoadOptions,
    Material, MaterialLibrary, Model, ParsedScene,
};
