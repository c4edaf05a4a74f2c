//! Inspect an OBJ or MTL file.
//!
//! Run with: cargo run --bin objkit_inspect -- <file.obj|file.mtl> [--json] [--no-materials]

use std::env;
use std::path::Path;

use anyhow::{Context, Result};
use objkit_core::obj::{load_model, load_mtl, LoadOptions, MaterialLibrary, Model};
use objkit_core::Channel;

struct Args {
    path: String,
    json: bool,
    load_materials: bool,
}

fn parse_args() -> Option<Args> {
    let mut path = None;
    let mut json = false;
    let mut load_materials = true;

    for arg in env::args().skip(1) {
        match arg.as_str() {
            "--json" => json = true,
            "--no-materials" => load_materials = false,
            _ if arg.starts_with("--") => {
                eprintln!("Unknown flag: {}", arg);
                return None;
            }
            _ => path = Some(arg),
        }
    }

    Some(Args {
        path: path?,
        json,
        load_materials,
    })
}

fn main() -> Result<()> {
    env_logger::init();

    let Some(args) = parse_args() else {
        eprintln!("Usage: objkit_inspect <file.obj|file.mtl> [--json] [--no-materials]");
        std::process::exit(1);
    };

    let path = Path::new(&args.path);
    let is_mtl = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("mtl"));

    if is_mtl {
        let library = load_mtl(path).with_context(|| format!("Failed to load {}", args.path))?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&library)?);
        } else {
            print_materials(&library);
        }
        return Ok(());
    }

    let options = LoadOptions {
        load_materials: args.load_materials,
        ..Default::default()
    };
    let model = load_model(path, &options).with_context(|| format!("Failed to load {}", args.path))?;
    log::debug!("Loaded model from {}", path.display());

    if args.json {
        let value = serde_json::json!({
            "scene": model.scene,
            "materials": model.materials,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        print_model(&model);
    }

    Ok(())
}

fn print_model(model: &Model) {
    let scene = &model.scene;
    println!("=== {} geometries ===", scene.geometries.len());
    println!("Total vertices: {}", scene.total_vertex_count());
    println!("Total triangles: {}", scene.total_triangle_count());
    println!("Material libraries: {:?}", scene.material_libs);

    for (i, geometry) in scene.geometries.iter().enumerate() {
        println!(
            "\n[{}] object={:?} groups={:?} material={:?}",
            i, geometry.object, geometry.groups, geometry.material
        );

        let channels: Vec<&str> = Channel::ALL
            .iter()
            .filter(|c| geometry.has_channel(**c))
            .map(|c| c.name())
            .collect();
        println!("     Channels: {}", channels.join(", "));
        println!(
            "     {} vertices, {} triangles",
            geometry.vertex_count(),
            geometry.triangle_count()
        );

        let bounds = geometry.bounds();
        if !bounds.is_empty() {
            println!(
                "     Bounds: ({:.2}, {:.2}, {:.2}) to ({:.2}, {:.2}, {:.2})",
                bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
            );
        }

        if !model.materials.is_empty() && model.material_for(geometry).is_none() {
            println!("     Material {:?} not found in loaded libraries", geometry.material);
        }
    }

    if !model.materials.is_empty() {
        println!();
        print_materials(&model.materials);
    }
}

fn print_materials(library: &MaterialLibrary) {
    println!("=== {} materials ===", library.len());

    for name in library.names() {
        let Some(material) = library.get(name) else {
            continue;
        };
        println!("\n{}", name);
        if let Some(kd) = &material.diffuse {
            println!("  diffuse: {:?}", kd);
        }
        if let Some(ns) = material.shininess {
            println!("  shininess: {}", ns);
        }
        if let Some(d) = material.opacity {
            println!("  opacity: {}", d);
        }
        if let Some(illum) = material.illum {
            println!("  illum: {}", illum);
        }
        if let Some(map) = &material.map_diffuse {
            println!("  map_Kd: {}", map);
        }
        if material.is_emissive() {
            println!("  emissive: {:?}", material.emissive);
        }
    }
}
