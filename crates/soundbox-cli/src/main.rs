//! Soundbox CLI: load named sounds and drive playback from the console.
//!
//! Sounds given as `name=locator` pairs (or via `--manifest`) are fetched,
//! decoded, and converted to the output device rate up front; stdin commands
//! then start/stop/pause/seek playback of any of them.

mod cli;
mod console;

use std::io::{self, BufRead};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use console::Command;
use soundbox::{PlayerConfig, SoundPlayer};
use soundbox_types::SoundSource;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,soundbox=info")),
        )
        .init();

    if args.list_devices {
        soundbox::device::list_devices(&cpal::default_host())?;
        return Ok(());
    }

    let _ = ctrlc::set_handler(|| std::process::exit(130));

    let mut sources = Vec::new();
    for arg in &args.sounds {
        match cli::parse_sound_arg(arg) {
            Some(source) => sources.push(source),
            None => tracing::warn!(arg = %arg, "ignoring malformed sound argument (want name=locator)"),
        }
    }
    if let Some(path) = &args.manifest {
        sources.extend(read_manifest(path)?);
    }

    let mut player = SoundPlayer::with_config(PlayerConfig {
        device: args.device.clone(),
        http_timeout: Duration::from_secs(args.http_timeout_secs),
        ..PlayerConfig::default()
    });
    player.initialize()?;
    player.set_muted(args.muted);

    if !sources.is_empty() {
        let report = player.load(sources)?;
        tracing::info!(
            loaded = report.loaded.len(),
            failed = report.failed.len(),
            "load complete"
        );
        for failure in &report.failed {
            tracing::warn!(
                name = %failure.name,
                locator = %failure.locator,
                error = %failure.error,
                "not loaded"
            );
        }
    }

    run_console(&mut player)
}

fn read_manifest(path: &Path) -> Result<Vec<SoundSource>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read manifest {path:?}"))?;
    serde_json::from_str(&text).with_context(|| format!("parse manifest {path:?}"))
}

fn run_console(player: &mut SoundPlayer) -> Result<()> {
    println!("soundbox ready; type `help` for commands");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match console::parse_line(trimmed) {
            Ok(Command::Quit) => break,
            Ok(command) => dispatch(player, command),
            Err(message) => eprintln!("{message}"),
        }
    }

    player.stop()?;
    Ok(())
}

fn dispatch(player: &mut SoundPlayer, command: Command) {
    let result = match command {
        Command::Play {
            name,
            offset_seconds,
        } => player.play(&name, offset_seconds),
        Command::Pause => player.pause(),
        Command::Stop => player.stop(),
        Command::Seek { ms } => player.seek(ms),
        Command::Mute(muted) => {
            player.set_muted(muted);
            Ok(())
        }
        Command::Status => {
            match serde_json::to_string_pretty(&player.status()) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("status unavailable: {e}"),
            }
            Ok(())
        }
        Command::List => {
            print_library(player);
            Ok(())
        }
        Command::Help => {
            print_help();
            Ok(())
        }
        Command::Quit => Ok(()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
    }
}

fn print_library(player: &SoundPlayer) {
    let names = player.library().names();
    if names.is_empty() {
        println!("no sounds loaded");
        return;
    }
    for name in names {
        if let Some(sound) = player.library().get(&name) {
            println!(
                "{name}: {:.2}s, {} ch, {} Hz{}",
                sound.duration_seconds(),
                sound.channels,
                sound.sample_rate,
                sound
                    .codec
                    .as_deref()
                    .map(|c| format!(", {c}"))
                    .unwrap_or_default()
            );
        }
    }
}

fn print_help() {
    println!(
        "commands:\n  \
         play <name> [offset-seconds]  start a sound (resumes after pause)\n  \
         pause                         stop the stream, keep the offset\n  \
         stop                          stop the stream, reset the offset\n  \
         seek <position-ms>            restart the current sound at a position\n  \
         mute on|off                   gate new playback\n  \
         status                        print the session snapshot as JSON\n  \
         list                          print loaded sounds\n  \
         quit                          exit"
    );
}
