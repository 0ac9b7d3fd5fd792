//! isomesh CLI
//!
//! Meshes a synthetic sphere field and reports vertex cache statistics.

#![allow(clippy::uninlined_format_args, clippy::needless_pass_by_value)]

#[cfg(feature = "cli")]
use isomesh::prelude::*;
#[cfg(feature = "cli")]
use std::path::PathBuf;
#[cfg(feature = "cli")]
use std::time::Instant;

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "isomesh")]
#[command(version = isomesh::VERSION)]
#[command(about = "Isosurface extraction and vertex cache optimization", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Mesh a sphere density field
    Sphere {
        /// Samples along each axis
        #[arg(short, long, default_value = "64")]
        resolution: usize,
        /// Sphere radius in world units (the field spans [-1, 1])
        #[arg(long, default_value = "0.75")]
        radius: f32,
        /// Iso-level (overrides the config file)
        #[arg(long)]
        iso: Option<f32>,
        /// Simulated LRU size (overrides the config file)
        #[arg(long)]
        lru: Option<usize>,
        /// Skip the vertex cache sort
        #[arg(long)]
        no_sort: bool,
        /// Output OBJ file
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Mesh config JSON
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Write the default mesh config as JSON
    Config {
        /// Output file
        #[arg(short, long, default_value = "isomesh.json")]
        output: PathBuf,
    },
}

#[cfg(feature = "cli")]
struct SphereArgs {
    resolution: usize,
    radius: f32,
    iso: Option<f32>,
    lru: Option<usize>,
    no_sort: bool,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
}

#[cfg(feature = "cli")]
fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sphere {
            resolution,
            radius,
            iso,
            lru,
            no_sort,
            output,
            config,
        } => cmd_sphere(SphereArgs {
            resolution,
            radius,
            iso,
            lru,
            no_sort,
            output,
            config,
        }),
        Commands::Config { output } => cmd_config(output),
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI not enabled. Build with --features cli");
    std::process::exit(1);
}

#[cfg(feature = "cli")]
fn cmd_sphere(args: SphereArgs) {
    let mut config = match &args.config {
        Some(path) => match load_config(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Config error: {}", e);
                std::process::exit(1);
            }
        },
        None => MeshConfig::default(),
    };
    if let Some(iso) = args.iso {
        config.iso_level = iso;
    }
    if let Some(lru) = args.lru {
        config.lru_size = lru;
    }
    if args.no_sort {
        config.cache_sort = false;
    }
    if let Err(e) = config.validate() {
        eprintln!("Config error: {}", e);
        std::process::exit(1);
    }

    let n = args.resolution;
    let field = match DensityField::sphere(n, n, n, args.radius) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Field error: {}", e);
            std::process::exit(1);
        }
    };

    println!("Extracting {}^3 field at iso {}...", n, config.iso_level);
    let start = Instant::now();
    let mut mesh = density_to_mesh(
        &field,
        &MeshConfig {
            cache_sort: false,
            ..config
        },
    );
    let extract_time = start.elapsed();

    println!("  Vertices:  {}", mesh.vertex_count());
    println!("  Triangles: {}", mesh.face_count());
    println!("  Time:      {:.2?}", extract_time);

    let acmr_before = mesh.acmr(config.lru_size);
    println!("  ACMR ({} entries): {:.3}", config.lru_size, acmr_before);

    if config.cache_sort {
        let start = Instant::now();
        mesh.cache_sort(config.lru_size);
        let sort_time = start.elapsed();

        println!("Cache sort:");
        println!("  ACMR ({} entries): {:.3}", config.lru_size, mesh.acmr(config.lru_size));
        println!("  Time:      {:.2?}", sort_time);
    }

    let geom = mesh.create_geom();
    println!(
        "Geometry: {} bytes vertices, {} x {}-byte indices",
        geom.vertex_bytes().len(),
        geom.indices.len(),
        geom.indices.element_size()
    );

    if let Some(output) = args.output {
        if let Err(e) = export_obj(&mesh, &output, &ObjConfig::default()) {
            eprintln!("Export error: {}", e);
            std::process::exit(1);
        }
        println!("Saved to {}", output.display());
    }
}

#[cfg(feature = "cli")]
fn cmd_config(output: PathBuf) {
    match save_config(&MeshConfig::default(), &output) {
        Ok(()) => println!("Wrote default config to {}", output.display()),
        Err(e) => {
            eprintln!("Save error: {}", e);
            std::process::exit(1);
        }
    }
}
