//! Wavefront OBJ and MTL support.
//!
//! Both formats are line oriented: each non-blank, non-comment line starts
//! with a directive keyword followed by its arguments. The two parsers share
//! one tokenizer and differ only in their keyword set and accumulator.
//!
//! ## Supported OBJ directives
//!
//! - `v` (with optional inline `r g b` vertex color), `vt`, `vn`
//!   (a `v` line with more than three values is always read as position
//!   plus color, so homogeneous `v x y z w` is rejected)
//! - `f` with `pos`, `pos/tex`, `pos//norm` and `pos/tex/norm` references,
//!   positive or negative (relative) indices; polygons are fan-triangulated
//! - `o`, `g`, `usemtl`, `mtllib`
//! - `s` is accepted and ignored
//!
//! ## Supported MTL directives
//!
//! - `newmtl`, `Ns`, `Ka`, `Kd`, `Ks`, `Ke`, `Ni`, `d`, `illum`, `map_Kd`
//!
//! Any other directive is logged and skipped.
//!
//! # Example
//!
//! ```ignore
//! use objkit_core::obj::parse_obj;
//!
//! let scene = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n")?;
//! assert_eq!(scene.geometries.len(), 1);
//! ```

mod keyword;
mod loader;
mod material;
mod parser;
mod tokenizer;
mod types;

pub use keyword::*;
pub use loader::*;
pub use material::*;
pub use parser::*;
pub use tokenizer::*;
pub use types::*;
