//! Build file I/O and session setup shared by the commands.

use std::{
    fs,
    path::Path,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use brickyard_core::{Command, ToolSelection};
use brickyard_persistence::{export_build, import_build, BuildFile, LoadReport};
use brickyard_world::{self as world, World};
use log::warn;

/// Reads and decodes the build file at `path`.
pub(crate) fn load_build(path: &Path) -> Result<BuildFile> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read build file at {}", path.display()))?;
    let (build, report) = import_build(&contents)
        .with_context(|| format!("failed to import build file {}", path.display()))?;
    warn_about_repairs(&report);
    Ok(build)
}

/// Writes the build file to `path`, replacing any previous contents.
pub(crate) fn save_build(path: &Path, build: &BuildFile) -> Result<()> {
    let json = export_build(build).context("failed to serialise build file")?;
    fs::write(path, json)
        .with_context(|| format!("failed to write build file at {}", path.display()))
}

/// Logs every repair applied while decoding a scene.
pub(crate) fn warn_about_repairs(report: &LoadReport) {
    for skipped in &report.skipped {
        warn!("skipped stored piece {}: {}", skipped.index, skipped.reason);
    }
    if report.reassigned_ids > 0 {
        warn!(
            "assigned fresh identifiers to {} pieces",
            report.reassigned_ids
        );
    }
    if report.baseplate_defaulted {
        warn!("stored baseplate was unreadable; using the default");
    }
}

/// Seconds since the Unix epoch, stored verbatim in build files.
pub(crate) fn timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
        .to_string()
}

/// Opens a session on the build's scene with the provided tool selected.
pub(crate) fn open_world(build: &BuildFile, tool: &ToolSelection) -> World {
    let mut world = World::from_scene(build.scene.clone());
    select_tool(&mut world, tool);
    world
}

/// Selects the tool by replaying the matching commands.
pub(crate) fn select_tool(world: &mut World, tool: &ToolSelection) {
    let mut events = Vec::new();
    world::apply(
        world,
        Command::SelectPiece {
            size: tool.size().clone(),
        },
        &mut events,
    );
    world::apply(
        world,
        Command::SelectColor {
            color: tool.color(),
        },
        &mut events,
    );
    while world::query::tool(world).rotation() != tool.rotation() {
        world::apply(world, Command::RotateClockwise, &mut events);
    }
}
