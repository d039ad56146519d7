//! Replays a recorded server command stream through the map view engine and
//! prints the resulting view.
//!
//! Usage:
//!   cfview-replay <capture> [--settings <file>] [--faces <file>]
//!   cfview-replay --write-demo <capture>
//!
//! `--write-demo` writes a synthetic capture plus a matching
//! `<capture>.faces.json` and exits.

mod capture;
mod demo;
mod render;
mod settings;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use cfview_core::{FaceTable, Session};

use crate::capture::Capture;
use crate::settings::{load_settings, ReplaySettings};

const DEFAULT_SETTINGS_FILE: &str = "cfview.json";

struct Args {
    capture: PathBuf,
    settings: Option<PathBuf>,
    faces: Option<PathBuf>,
    write_demo: bool,
}

fn usage() {
    eprintln!("Usage: cfview-replay <capture> [--settings <file>] [--faces <file>]");
    eprintln!("       cfview-replay --write-demo <capture>");
}

fn parse_args() -> Option<Args> {
    let args: Vec<String> = env::args().collect();
    let mut capture = None;
    let mut settings = None;
    let mut faces = None;
    let mut write_demo = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--settings" => {
                i += 1;
                settings = Some(PathBuf::from(args.get(i)?));
            }
            "--faces" => {
                i += 1;
                faces = Some(PathBuf::from(args.get(i)?));
            }
            "--write-demo" => write_demo = true,
            "--help" | "-h" => return None,
            other if other.starts_with("--") => {
                eprintln!("Unknown argument: {other}");
                return None;
            }
            other => capture = Some(PathBuf::from(other)),
        }
        i += 1;
    }

    Some(Args {
        capture: capture?,
        settings,
        faces,
        write_demo,
    })
}

fn load_faces(path: Option<&Path>) -> anyhow::Result<FaceTable> {
    let Some(path) = path else {
        log::info!("No face file given, every face is drawn as a single tile");
        return Ok(FaceTable::new());
    };
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    FaceTable::load_json(&text).with_context(|| format!("Invalid face file {}", path.display()))
}

fn write_demo(path: &Path, settings: &ReplaySettings) -> anyhow::Result<()> {
    demo::demo_capture(settings.viewport_width, settings.viewport_height).save(path)?;

    let faces_path = path.with_extension("faces.json");
    let json = serde_json::to_string_pretty(&demo::demo_faces())
        .context("Failed to serialize demo faces")?;
    fs::write(&faces_path, format!("{json}\n"))
        .with_context(|| format!("Failed to write {}", faces_path.display()))?;

    log::info!(
        "Wrote demo capture to {} and faces to {}",
        path.display(),
        faces_path.display()
    );
    Ok(())
}

fn replay(args: &Args, settings: &ReplaySettings) -> anyhow::Result<()> {
    let capture = Capture::load(&args.capture)?;
    let faces = load_faces(args.faces.as_deref())?;

    let mut session = Session::with_faces(faces);
    session
        .set_viewport(settings.viewport_width, settings.viewport_height)
        .context("Viewport negotiation failed")?;

    log::info!(
        "Replaying {} commands from {}",
        capture.commands.len(),
        args.capture.display()
    );

    let mut malformed = 0usize;
    for (index, command) in capture.commands.iter().enumerate() {
        if let Err(e) = session.handle_command(&command.name, &command.payload) {
            if e.is_fatal() {
                return Err(e).with_context(|| format!("Command #{index} ({})", command.name));
            }
            malformed += 1;
        }

        let mut animated = 0;
        for _ in 0..settings.ticks_per_command {
            animated += session.tick();
        }
        let repainted = session.grid_mut().take_dirty().len();
        log::debug!(
            "#{index} {}: {repainted} tiles to repaint, {animated} animation frames",
            command.name
        );

        if settings.print_every_frame {
            println!("#{index} {}", command.name);
            print!("{}", render::render_ascii(&mut session));
        }
    }

    if !settings.print_every_frame {
        print!("{}", render::render_ascii(&mut session));
    }

    if malformed > 0 {
        log::warn!("{malformed} commands had malformed payloads");
    }
    Ok(())
}

fn main() -> ExitCode {
    let Some(args) = parse_args() else {
        usage();
        return ExitCode::FAILURE;
    };

    let settings_path = args
        .settings
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE));
    let settings = load_settings(&settings_path);

    let log_file = settings.log_file.as_deref();
    if let Err(e) = cfview_core::initialize_logger(settings.level_filter(), log_file) {
        eprintln!("Failed to initialize logger: {e:#}");
        return ExitCode::FAILURE;
    }

    let result = if args.write_demo {
        write_demo(&args.capture, &settings)
    } else {
        replay(&args, &settings)
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
