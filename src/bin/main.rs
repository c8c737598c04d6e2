//! isomap-mesher CLI
//!
//! Inspect resource packs and turn world snapshots into GLB or OBJ files.

use clap::{Parser, Subcommand, ValueEnum};
use isomap_mesher::{
    export_glb, load_resource_pack, BlockConfig, LightStyle, Mesher, MesherConfig, ModelRegistry, ObjExport,
    RenderMode, WorldSnapshot,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "isomap-mesher")]
#[command(author, version, about = "Generate textured geometry from voxel world snapshots", long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show information about a resource pack
    Info {
        /// Path to resource pack (ZIP or directory)
        pack: PathBuf,
    },

    /// Resolve one blockstate state and print the models drawn for it
    Model {
        /// Path to resource pack (ZIP or directory)
        pack: PathBuf,

        /// Blockstate name (e.g., "minecraft:ladder" or "ladder")
        blockstate: String,

        /// State key (e.g., "facing=north" or "north=true,east=true")
        #[arg(long, default_value = "normal")]
        variant: String,
    },

    /// Mesh a world snapshot
    Mesh {
        /// Path to resource pack (ZIP or directory)
        pack: PathBuf,

        /// World snapshot JSON file
        world: PathBuf,

        /// Output file; the extension (.glb or .obj) picks the format
        #[arg(short, long)]
        output: PathBuf,

        /// Block type configuration; the built-in one is used if omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the snapshot's light style
        #[arg(long, value_enum)]
        light: Option<LightArg>,

        /// Keep faces hidden by neighbours
        #[arg(long)]
        interior: bool,

        /// Maximum atlas size
        #[arg(long, default_value = "4096")]
        atlas_size: u32,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum LightArg {
    Day,
    Night,
    Cave,
    None,
}

impl From<LightArg> for LightStyle {
    fn from(arg: LightArg) -> Self {
        match arg {
            LightArg::Day => LightStyle::Day,
            LightArg::Night => LightStyle::Night,
            LightArg::Cave => LightStyle::Cave,
            LightArg::None => LightStyle::None,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info { pack } => show_pack_info(&pack)?,
        Commands::Model {
            pack,
            blockstate,
            variant,
        } => show_model(&pack, &blockstate, &variant)?,
        Commands::Mesh {
            pack,
            world,
            output,
            config,
            light,
            interior,
            atlas_size,
        } => {
            let render_mode = if interior { RenderMode::Interior } else { RenderMode::Edge };
            let mesher_config = MesherConfig::default()
                .with_render_mode(render_mode)
                .with_atlas_size(atlas_size, 1);
            mesh_world(&pack, &world, &output, config.as_deref(), mesher_config, light)?;
        }
    }

    Ok(())
}

fn show_pack_info(pack_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (pack, report) = load_resource_pack(pack_path)?;
    let (models, model_report) = ModelRegistry::build(&pack);

    println!("Resource pack {}", pack_path.display());
    println!("  Version: {}", pack.version.as_str());
    println!("  Namespaces: {}", pack.namespaces().join(", "));
    println!("  Blockstates: {}", pack.blockstate_count());
    println!("  Models: {} ({} resolved)", pack.model_count(), models.model_count());
    println!("  Textures: {}", pack.texture_count());

    if !report.is_empty() || !model_report.is_empty() {
        println!("\nSkipped files:");
        for issue in report.iter().chain(model_report.iter()) {
            println!("  {}: {}", issue.path, issue.error);
        }
    }
    Ok(())
}

fn show_model(pack_path: &Path, blockstate: &str, variant: &str) -> Result<(), Box<dyn std::error::Error>> {
    let (pack, _) = load_resource_pack(pack_path)?;
    let (models, _) = ModelRegistry::build(&pack);
    let parts = models.resolve_parts(blockstate, variant)?;

    for (index, part) in parts.iter().enumerate() {
        if parts.len() > 1 {
            println!("part {index}:");
        }
        for alternative in part {
            let model = &alternative.model;
            println!(
                "{} (weight {}, x {}, y {}, uvlock {}, {} steps)",
                model.location,
                alternative.weight,
                alternative.transform.x,
                alternative.transform.y,
                alternative.transform.uvlock,
                model.steps
            );
            for (name, texture) in &model.textures {
                println!("  #{name} = {texture}");
            }
            for (i, element) in model.elements.iter().enumerate() {
                println!("  element {i}: {:?} -> {:?}", element.from, element.to);
                for (direction, face) in &element.faces {
                    let cull = face
                        .cullface
                        .map(|d| format!(" cull {d:?}"))
                        .unwrap_or_default();
                    println!("    {direction:?}: {}{cull}", face.texture);
                }
            }
        }
    }
    Ok(())
}

fn mesh_world(
    pack_path: &Path,
    world_path: &Path,
    output_path: &Path,
    config_path: Option<&Path>,
    config: MesherConfig,
    light: Option<LightArg>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (pack, _) = load_resource_pack(pack_path)?;
    let blocks = match config_path {
        Some(path) => BlockConfig::load(path)?,
        None => BlockConfig::builtin(),
    };

    let mut world = WorldSnapshot::load(world_path)?;
    if let Some(light) = light {
        world = world.with_light_style(light.into());
    }

    let (mesher, _) = Mesher::from_pack(&pack, &blocks, config)?;
    let output = mesher.mesh(&world);
    println!(
        "Generated {} vertices, {} triangles from {} blocks",
        output.total_vertices(),
        output.total_triangles(),
        world.block_count()
    );

    match output_path.extension().and_then(|e| e.to_str()) {
        Some("obj") => {
            let name = output_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("mesh");
            let dir = output_path.parent().unwrap_or_else(|| Path::new("."));
            ObjExport::from_output(&output, name)?.write_to(dir, name)?;
            println!("Exported OBJ to {}", output_path.display());
        }
        Some("glb") | None => {
            let path = output_path.with_extension("glb");
            let glb = export_glb(&output)?;
            fs::write(&path, &glb)?;
            println!("Exported GLB ({} bytes) to {}", glb.len(), path.display());
        }
        Some(other) => return Err(format!("unsupported output format '.{other}', use .glb or .obj").into()),
    }
    Ok(())
}
