//! `shutdown-sound` — read or change the shutdown sound settings file.
//!
//! # Usage
//!
//! ```text
//! shutdown-sound [--file <PATH>] get [--json]
//! shutdown-sound [--file <PATH>] set --can-play <true|false> --theme <THEME> --event <EVENT>
//! ```
//!
//! `--file` defaults to `/tmp/deepin-shutdown-sound.ini` and can also be set
//! with the `SHUTDOWN_SOUND_FILE` environment variable.  Log output goes to
//! stderr and is controlled by `RUST_LOG` (default `warn`).

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use shutdown_sound_core::{ShutdownSoundConfig, ShutdownSoundSettings, DEFAULT_SHUTDOWN_SOUND_FILE};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Read or change the shutdown sound settings.
#[derive(Debug, Parser)]
#[command(
    name = "shutdown-sound",
    about = "Read or change the shutdown sound settings file",
    version
)]
struct Cli {
    /// Path of the settings key file.
    #[arg(
        long,
        global = true,
        default_value = DEFAULT_SHUTDOWN_SOUND_FILE,
        env = "SHUTDOWN_SOUND_FILE"
    )]
    file: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the current settings.
    Get {
        /// Print a JSON object instead of key=value lines.
        #[arg(long)]
        json: bool,
    },
    /// Replace the settings, creating the file if needed.
    Set {
        /// Whether the shutdown sound plays.
        #[arg(long, action = ArgAction::Set, required = true)]
        can_play: bool,

        /// Sound theme identifier.
        #[arg(long)]
        theme: String,

        /// Sound event name within the theme.
        #[arg(long)]
        event: String,
    },
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let config = ShutdownSoundConfig::new(cli.file);

    match cli.command {
        Command::Get { json } => {
            let settings = config
                .get()
                .context("could not read shutdown sound settings")?;
            let text = if json {
                render_json(&settings)?
            } else {
                render_plain(&settings)
            };
            out.write_all(text.as_bytes())?;
        }
        Command::Set {
            can_play,
            theme,
            event,
        } => {
            let settings = ShutdownSoundSettings {
                can_play,
                theme,
                event,
            };
            config
                .set(&settings)
                .context("could not write shutdown sound settings")?;
            info!("updated {}", config.path().display());
        }
    }
    Ok(())
}

fn render_plain(settings: &ShutdownSoundSettings) -> String {
    format!(
        "CanPlay={}\nSoundTheme={}\nSoundEvent={}\n",
        settings.can_play, settings.theme, settings.event
    )
}

fn render_json(settings: &ShutdownSoundSettings) -> anyhow::Result<String> {
    let mut text = serde_json::to_string_pretty(settings)?;
    text.push('\n');
    Ok(text)
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    // stdout carries command output, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_string(args: &[&str]) -> anyhow::Result<String> {
        let cli = Cli::try_parse_from(args)?;
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    // ── Argument parsing ──────────────────────────────────────────────────────

    #[test]
    fn test_cli_file_override_after_subcommand() {
        let cli = Cli::parse_from(["shutdown-sound", "get", "--file", "/tmp/other.ini"]);
        assert_eq!(cli.file, PathBuf::from("/tmp/other.ini"));
    }

    #[test]
    fn test_cli_get_json_flag() {
        let cli = Cli::parse_from(["shutdown-sound", "get", "--json"]);
        assert!(matches!(cli.command, Command::Get { json: true }));
    }

    #[test]
    fn test_cli_set_parses_false() {
        // Arrange / Act
        let cli = Cli::parse_from([
            "shutdown-sound",
            "set",
            "--can-play",
            "false",
            "--theme",
            "deepin",
            "--event",
            "shutdown",
        ]);

        // Assert
        match cli.command {
            Command::Set {
                can_play,
                theme,
                event,
            } => {
                assert!(!can_play);
                assert_eq!(theme, "deepin");
                assert_eq!(event, "shutdown");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_cli_set_requires_can_play() {
        let result = Cli::try_parse_from(["shutdown-sound", "set", "--theme", "t", "--event", "e"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_set_rejects_non_boolean_can_play() {
        let result = Cli::try_parse_from([
            "shutdown-sound",
            "set",
            "--can-play",
            "maybe",
            "--theme",
            "t",
            "--event",
            "e",
        ]);
        assert!(result.is_err());
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    #[test]
    fn test_render_plain_matches_key_file_names() {
        let s = ShutdownSoundSettings::new(true, "deepin", "shutdown");
        assert_eq!(
            render_plain(&s),
            "CanPlay=true\nSoundTheme=deepin\nSoundEvent=shutdown\n"
        );
    }

    #[test]
    fn test_render_json_is_parseable() {
        let s = ShutdownSoundSettings::new(false, "deepin", "shutdown");

        let json = render_json(&s).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["can_play"], false);
        assert_eq!(value["theme"], "deepin");
        assert_eq!(value["event"], "shutdown");
    }

    // ── run ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_run_set_then_get() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("sound.ini");
        let file = file.to_str().unwrap();

        // Act
        let set_out = run_to_string(&[
            "shutdown-sound",
            "--file",
            file,
            "set",
            "--can-play",
            "true",
            "--theme",
            "deepin",
            "--event",
            "shutdown",
        ])
        .expect("set");
        let get_out = run_to_string(&["shutdown-sound", "--file", file, "get"]).expect("get");

        // Assert
        assert!(set_out.is_empty());
        assert_eq!(get_out, "CanPlay=true\nSoundTheme=deepin\nSoundEvent=shutdown\n");
    }

    #[test]
    fn test_run_get_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("absent.ini");
        let file = file.to_str().unwrap();

        let err = run_to_string(&["shutdown-sound", "--file", file, "get"]).unwrap_err();

        let chain = format!("{err:#}");
        assert!(chain.contains("could not read shutdown sound settings"), "{chain}");
        assert!(chain.contains(file), "{chain}");
    }
}
