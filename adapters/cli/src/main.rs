#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for inspecting and editing Brickyard build files.

mod config;
mod session;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use brickyard_core::{
    catalog, height_in_layers, Baseplate, Command, Event, GridCell, PieceCategory, PieceColor,
    PieceId, PlacementError, Rotation, Scene, ToolSelection,
};
use brickyard_persistence::{
    build_file::UNTITLED, decode_share_code, encode_share_code, BuildFile, BuildLibrary,
};
use brickyard_system_builder::{Builder, BuilderInput, PlacementPreview};
use brickyard_system_resolver::PointerHit;
use brickyard_world::{self as world, occupancy::find_collisions, query, World};
use clap::{ArgAction, Args, Parser, Subcommand};
use glam::Vec3;
use log::info;

use crate::config::Config;

/// Inspect and edit brick building scenes stored as build files.
#[derive(Parser)]
#[command(name = "brickyard", version, about, long_about = None)]
struct Cli {
    /// Configuration file [default: ./brickyard.toml when present]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raise log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Create an empty build file
    New {
        /// Build file to create
        file: PathBuf,
        /// Build name [default: file stem]
        #[arg(long)]
        name: Option<String>,
        /// Free-form description
        #[arg(long)]
        description: Option<String>,
        /// Baseplate: small, medium, large or a stud extent
        #[arg(long, value_parser = parse_baseplate)]
        baseplate: Option<Baseplate>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Place a piece with its minimum corner at the grid cell
    #[command(allow_negative_numbers = true)]
    Place {
        /// Build file to edit
        file: PathBuf,
        /// Grid column
        x: i32,
        /// Layer
        y: i32,
        /// Grid row
        z: i32,
        #[command(flatten)]
        tool: ToolArgs,
    },
    /// Remove a placed piece by identifier
    Remove {
        /// Build file to edit
        file: PathBuf,
        /// Piece identifier as printed by `inspect`
        id: u32,
    },
    /// Print build metadata and the piece list
    Inspect {
        /// Build file to read
        file: PathBuf,
    },
    /// Report pieces that overlap an earlier piece
    Check {
        /// Build file to read
        file: PathBuf,
    },
    /// Resolve a pointer hit in baseplate-centred coordinates into a placement
    #[command(allow_negative_numbers = true)]
    Snap {
        /// Hit position along x
        hit_x: f32,
        /// Hit position along z
        hit_z: f32,
        /// Build file providing the scene [default: empty scene]
        #[arg(long)]
        file: Option<PathBuf>,
        /// Treat the hit as landing on top of this piece
        #[arg(long)]
        on: Option<u32>,
        /// Place the piece when the preview is valid (requires --file)
        #[arg(long, requires = "file")]
        commit: bool,
        #[command(flatten)]
        tool: ToolArgs,
    },
    /// Print a single-line share code for a build
    Share {
        /// Build file to read
        file: PathBuf,
    },
    /// Write a build file from a share code
    Unshare {
        /// Share code as printed by `share`
        code: String,
        /// Build file to create
        file: PathBuf,
        /// Build name
        #[arg(long)]
        name: Option<String>,
    },
    /// List catalog pieces
    Catalog {
        /// Restrict the listing to one category
        #[arg(long, value_parser = parse_category)]
        category: Option<PieceCategory>,
    },
    /// Manage the named build library
    #[command(subcommand)]
    Library(LibraryCommand),
}

#[derive(Subcommand)]
enum LibraryCommand {
    /// List saved builds
    List,
    /// Save a build file into the library
    Save {
        /// Build file to store
        file: PathBuf,
        /// Name to store it under [default: the build's own name]
        #[arg(long)]
        name: Option<String>,
    },
    /// Export a saved build into a build file
    Load {
        /// Saved build name
        name: String,
        /// Build file to write
        file: PathBuf,
    },
    /// Delete a saved build
    Delete {
        /// Saved build name
        name: String,
    },
    /// Write the autosave slot into a build file
    Restore {
        /// Build file to write
        file: PathBuf,
    },
}

/// Tool selection overrides shared by placing commands.
#[derive(Args)]
struct ToolArgs {
    /// Catalog part number or piece name [default: from configuration]
    #[arg(long)]
    part: Option<String>,
    /// Piece color [default: from configuration]
    #[arg(long, value_parser = parse_color)]
    color: Option<PieceColor>,
    /// Rotation in degrees, any multiple of 90
    #[arg(long, value_parser = parse_rotation, default_value = "0")]
    rotation: Rotation,
}

impl ToolArgs {
    fn resolve(&self, config: &Config) -> Result<ToolSelection> {
        let part = self.part.as_deref().unwrap_or(&config.part);
        let size = catalog::find(part)
            .with_context(|| format!("part `{part}` is not in the catalog"))?;
        Ok(ToolSelection::new(
            size,
            self.color.unwrap_or(config.color),
            self.rotation,
        ))
    }
}

fn parse_baseplate(value: &str) -> Result<Baseplate, String> {
    Baseplate::from_name(value)
        .or_else(|| value.trim().parse().ok().and_then(Baseplate::from_extent))
        .ok_or_else(|| format!("expected small, medium, large, 16, 32 or 48, got `{value}`"))
}

fn parse_color(value: &str) -> Result<PieceColor, String> {
    PieceColor::from_name(value).ok_or_else(|| {
        let names: Vec<_> = PieceColor::ALL.iter().map(|color| color.name()).collect();
        format!("unknown color `{value}`; expected one of {}", names.join(", "))
    })
}

fn parse_rotation(value: &str) -> Result<Rotation, String> {
    let degrees = value
        .trim()
        .parse::<i32>()
        .map_err(|error| format!("`{value}` is not a whole number of degrees: {error}"))?;
    Rotation::from_degrees(degrees).map_err(|error| error.to_string())
}

fn parse_category(value: &str) -> Result<PieceCategory, String> {
    PieceCategory::from_name(value).ok_or_else(|| {
        let names: Vec<_> = PieceCategory::ALL
            .iter()
            .map(|category| category.name())
            .collect();
        format!("unknown category `{value}`; expected one of {}", names.join(", "))
    })
}

/// Entry point for the Brickyard command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load(cli.config.as_deref())?;
    run(cli.command, &config)
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(command: CliCommand, config: &Config) -> Result<()> {
    match command {
        CliCommand::New {
            file,
            name,
            description,
            baseplate,
            force,
        } => new_build(&file, name, description, baseplate, force, config),
        CliCommand::Place { file, x, y, z, tool } => {
            place(&file, GridCell::new(x, y, z), &tool.resolve(config)?, config)
        }
        CliCommand::Remove { file, id } => remove(&file, PieceId::new(id), config),
        CliCommand::Inspect { file } => inspect(&file),
        CliCommand::Check { file } => check(&file),
        CliCommand::Snap {
            hit_x,
            hit_z,
            file,
            on,
            commit,
            tool,
        } => {
            let tool = tool.resolve(config)?;
            snap(hit_x, hit_z, file.as_deref(), on, commit, &tool, config)
        }
        CliCommand::Share { file } => {
            let build = session::load_build(&file)?;
            let code = encode_share_code(&build.scene).context("failed to encode share code")?;
            println!("{code}");
            Ok(())
        }
        CliCommand::Unshare { code, file, name } => unshare(&code, &file, name),
        CliCommand::Catalog { category } => {
            list_catalog(category);
            Ok(())
        }
        CliCommand::Library(command) => library(command, config),
    }
}

fn new_build(
    file: &Path,
    name: Option<String>,
    description: Option<String>,
    baseplate: Option<Baseplate>,
    force: bool,
    config: &Config,
) -> Result<()> {
    if file.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", file.display());
    }
    let name = name.unwrap_or_else(|| default_name(file));
    let scene = Scene::empty(baseplate.unwrap_or(config.baseplate));
    let build = BuildFile::new(scene, name, description, session::timestamp());
    session::save_build(file, &build)?;
    println!(
        "created '{}' on the {} baseplate at {}",
        build.name,
        build.scene.baseplate,
        file.display()
    );
    Ok(())
}

fn default_name(file: &Path) -> String {
    file.file_stem()
        .and_then(|stem| stem.to_str())
        .map_or_else(|| UNTITLED.to_owned(), str::to_owned)
}

fn place(file: &Path, anchor: GridCell, tool: &ToolSelection, config: &Config) -> Result<()> {
    let mut build = session::load_build(file)?;
    let mut world = session::open_world(&build, tool);
    let mut events = Vec::new();
    world::apply(&mut world, Command::PlacePiece { anchor }, &mut events);
    report_events(&events);

    if events
        .iter()
        .any(|event| matches!(event, Event::PiecePlaced { .. }))
    {
        commit(file, &mut build, &world, config)?;
    }
    Ok(())
}

fn remove(file: &Path, piece: PieceId, config: &Config) -> Result<()> {
    let mut build = session::load_build(file)?;
    let mut world = World::from_scene(build.scene.clone());
    let mut events = Vec::new();
    world::apply(&mut world, Command::RemovePiece { piece }, &mut events);

    if events.is_empty() {
        println!("no piece {piece} in {}", file.display());
        return Ok(());
    }
    report_events(&events);
    commit(file, &mut build, &world, config)
}

/// Writes the edited scene back and mirrors it into the autosave slot if enabled.
fn commit(file: &Path, build: &mut BuildFile, world: &World, config: &Config) -> Result<()> {
    let scene = query::scene(world);
    if config.autosave {
        let library = BuildLibrary::open(&config.library_dir)?;
        library.autosave(&scene)?;
        info!("autosaved to {}", library.root().display());
    }
    build.update(scene, session::timestamp());
    session::save_build(file, build)
}

fn report_events(events: &[Event]) {
    for event in events {
        match event {
            Event::PiecePlaced { piece, footprint } => println!(
                "placed piece {piece} at {} ({}×{} studs, {} layers)",
                footprint.anchor(),
                footprint.width(),
                footprint.length(),
                footprint.height()
            ),
            Event::PlacementRejected {
                anchor,
                reason: PlacementError::Occupied,
                conflict,
            } => println!("cannot place at {anchor}: cell {conflict} is occupied"),
            Event::PlacementRejected {
                anchor,
                reason: PlacementError::NoFreeIdentifier,
                ..
            } => println!("cannot place at {anchor}: no free piece identifier"),
            Event::PieceRemoved { piece, footprint } => {
                println!("removed piece {piece} from {}", footprint.anchor());
            }
            _ => {}
        }
    }
}

fn inspect(file: &Path) -> Result<()> {
    let build = session::load_build(file)?;
    let metadata = &build.metadata;
    println!("{} (format {})", build.name, build.version);
    if let Some(description) = &build.description {
        println!("{description}");
    }
    println!("created {}, modified {}", build.created, build.modified);
    let extent = build.scene.baseplate.extent();
    println!(
        "baseplate {} ({extent}×{extent} studs)",
        build.scene.baseplate
    );
    println!(
        "{} pieces, {} studs, {}×{}×{} (w×h×d)",
        metadata.piece_count,
        metadata.stud_count,
        metadata.dimensions.width,
        metadata.dimensions.height,
        metadata.dimensions.depth
    );

    for piece in &build.scene.bricks {
        println!(
            "{:>6}  {:<8} {:<24} {:<10} {:>4}  {}",
            piece.id.to_string(),
            piece.size.part_num.as_deref().unwrap_or("-"),
            piece.size.name,
            piece.color.name(),
            piece.rotation.to_string(),
            piece.anchor
        );
    }
    Ok(())
}

fn check(file: &Path) -> Result<()> {
    let build = session::load_build(file)?;
    let collisions = find_collisions(&build.scene.bricks);
    if collisions.is_empty() {
        println!("{} pieces, no collisions", build.scene.bricks.len());
        return Ok(());
    }

    for collision in &collisions {
        println!(
            "piece {} overlaps piece {} at {}",
            collision.piece, collision.blocked_by, collision.cell
        );
    }
    bail!(
        "{} of {} pieces collide with earlier pieces",
        collisions.len(),
        build.scene.bricks.len()
    )
}

fn snap(
    hit_x: f32,
    hit_z: f32,
    file: Option<&Path>,
    on: Option<u32>,
    confirm: bool,
    tool: &ToolSelection,
    config: &Config,
) -> Result<()> {
    let mut build = file.map(session::load_build).transpose()?;
    let mut world = match &build {
        Some(build) => session::open_world(build, tool),
        None => {
            let mut world = World::from_scene(Scene::empty(config.baseplate));
            session::select_tool(&mut world, tool);
            world
        }
    };

    let point = Vec3::new(hit_x, 0.0, hit_z);
    let hit = match on {
        Some(id) => PointerHit::on_piece(point, PieceId::new(id)),
        None => PointerHit::on_baseplate(point),
    };
    let Some(preview) = PlacementPreview::from_hit(
        &hit,
        query::tool(&world),
        query::baseplate(&world),
        |id| query::piece(&world, id),
        |anchor| query::can_place(&world, anchor),
    ) else {
        bail!("piece {} does not exist", PieceId::new(on.unwrap_or_default()));
    };

    println!(
        "anchor {} (world {}, {}), {} layers tall, {}",
        preview.anchor,
        preview.world_x,
        preview.world_z,
        height_in_layers(tool.size()),
        if preview.placeable { "free" } else { "blocked" }
    );

    let (Some(file), Some(build)) = (file, build.as_mut()) else {
        return Ok(());
    };
    let mut commands = Vec::new();
    Builder::new().handle(
        Some(preview),
        BuilderInput {
            confirm_action: confirm,
            pointer: Some(hit),
            ..BuilderInput::default()
        },
        &mut commands,
    );
    if commands.is_empty() {
        return Ok(());
    }

    let mut events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    report_events(&events);
    commit(file, build, &world, config)
}

fn unshare(code: &str, file: &Path, name: Option<String>) -> Result<()> {
    let (scene, report) = decode_share_code(code).context("failed to decode share code")?;
    session::warn_about_repairs(&report);
    let name = name.unwrap_or_else(|| default_name(file));
    let build = BuildFile::new(scene, name, None, session::timestamp());
    session::save_build(file, &build)?;
    println!(
        "wrote '{}' with {} pieces to {}",
        build.name,
        build.metadata.piece_count,
        file.display()
    );
    Ok(())
}

fn list_catalog(category: Option<PieceCategory>) {
    for heading in PieceCategory::ALL {
        if category.is_some_and(|wanted| wanted != heading) {
            continue;
        }
        println!("{}", heading.display_name());
        for size in catalog::by_category(heading) {
            println!(
                "  {:<8} {:<28} {}×{}, {} layers",
                size.part_num.as_deref().unwrap_or("-"),
                size.name,
                size.w,
                size.l,
                height_in_layers(size)
            );
        }
    }
}

fn library(command: LibraryCommand, config: &Config) -> Result<()> {
    let library = BuildLibrary::open(&config.library_dir)?;
    match command {
        LibraryCommand::List => {
            let builds = library.list()?;
            if builds.is_empty() {
                println!("no saved builds in {}", library.root().display());
            }
            for build in builds {
                println!(
                    "{:<24} {:>5} pieces  modified {}",
                    build.name, build.piece_count, build.modified
                );
            }
        }
        LibraryCommand::Save { file, name } => {
            let build = session::load_build(&file)?;
            let name = name.unwrap_or_else(|| build.name.clone());
            let saved =
                library.save_named(build.scene, &name, build.description, &session::timestamp())?;
            println!("saved '{}' to the library", saved.name);
        }
        LibraryCommand::Load { name, file } => {
            let (build, report) = library.load(&name)?;
            session::warn_about_repairs(&report);
            session::save_build(&file, &build)?;
            println!("wrote '{}' to {}", build.name, file.display());
        }
        LibraryCommand::Delete { name } => {
            if library.delete(&name)? {
                println!("deleted '{name}'");
            } else {
                println!("no saved build named '{name}'");
            }
        }
        LibraryCommand::Restore { file } => {
            let Some((scene, report)) = library.restore_autosave()? else {
                bail!("no autosave in {}", library.root().display());
            };
            session::warn_about_repairs(&report);
            let build = BuildFile::new(scene, "Autosave", None, session::timestamp());
            session::save_build(&file, &build)?;
            println!(
                "restored {} autosaved pieces to {}",
                build.metadata.piece_count,
                file.display()
            );
        }
    }
    Ok(())
}
