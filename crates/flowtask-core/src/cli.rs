use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

/// One `--rc key=value` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RcOverride {
    pub key: String,
    pub value: String,
}

fn parse_rc_override(raw: &str) -> anyhow::Result<RcOverride> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok(RcOverride {
            key: key.trim().to_owned(),
            value: value.trim().to_owned(),
        }),
        _ => bail!("--rc takes key=value, got {raw:?}"),
    }
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "flowtask",
    version,
    about = "FlowTask: drag-ordered task list and free-placement task canvas",
    disable_help_subcommand = true
)]
pub struct GlobalCli {
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    pub quiet: u8,

    #[arg(
        long = "rc",
        value_name = "KEY=VALUE",
        value_parser = parse_rc_override,
        action = ArgAction::Append,
        global = true
    )]
    pub rc_overrides: Vec<RcOverride>,

    #[arg(long = "flowtaskrc", global = true)]
    pub flowtaskrc: Option<PathBuf>,

    #[arg(long = "data", global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub mode: ModeCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ModeCommand {
    /// Ordered list, reordered by dragging one task onto another.
    List {
        #[command(subcommand)]
        command: Option<ListCommand>,
    },
    /// Free canvas, tasks placed anywhere inside the viewport.
    Canvas {
        #[command(subcommand)]
        command: Option<CanvasCommand>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct TextArgs {
    /// Task text; words are joined with spaces.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub words: Vec<String>,
}

impl TextArgs {
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListCommand {
    Show,
    Add(TextArgs),
    Delete { id: String },
    Toggle { id: String },
    /// Drop ID before TARGET, or at the end when TARGET is omitted.
    Move { id: String, target: Option<String> },
    Clear,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CanvasCommand {
    Show,
    Add(TextArgs),
    Delete {
        id: String,
    },
    /// Drag ID by (DX, DY); the result is kept inside the viewport.
    Drag {
        id: String,
        #[arg(allow_negative_numbers = true)]
        dx: f64,
        #[arg(allow_negative_numbers = true)]
        dy: f64,
    },
    /// Resize the viewport and pull every task back inside it.
    Resize {
        width: f64,
        height: f64,
    },
    Clear,
}

/// Default log level for the `-v` / `-q` counts; `-q` wins over `-v`.
fn default_level(verbose: u8, quiet: u8) -> LevelFilter {
    match (quiet, verbose) {
        (0, 0) => LevelFilter::WARN,
        (0, 1) => LevelFilter::INFO,
        (0, 2) => LevelFilter::DEBUG,
        (0, _) => LevelFilter::TRACE,
        (1, _) => LevelFilter::WARN,
        _ => LevelFilter::ERROR,
    }
}

/// Installs the stderr subscriber. `RUST_LOG` overrides the flag-derived level.
pub fn init_tracing(verbose: u8, quiet: u8) -> anyhow::Result<()> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(&directives)
                .with_context(|| format!("bad RUST_LOG value {directives:?}"))?
        }
        _ => EnvFilter::default().add_directive(default_level(verbose, quiet).into()),
    };

    let stderr_is_tty = std::io::stderr().is_terminal();
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(stderr_is_tty)
        .try_init()
        .is_err()
    {
        debug!("global subscriber already installed");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use tracing_subscriber::filter::LevelFilter;

    use super::{
        CanvasCommand, GlobalCli, ListCommand, ModeCommand, default_level, parse_rc_override,
    };

    #[test]
    fn quiet_beats_verbose() {
        assert_eq!(default_level(0, 0), LevelFilter::WARN);
        assert_eq!(default_level(2, 0), LevelFilter::DEBUG);
        assert_eq!(default_level(5, 0), LevelFilter::TRACE);
        assert_eq!(default_level(3, 2), LevelFilter::ERROR);
    }

    #[test]
    fn rc_override_needs_a_key() {
        let parsed = parse_rc_override(" item.width = 150 ").expect("valid override");
        assert_eq!(parsed.key, "item.width");
        assert_eq!(parsed.value, "150");
        assert!(parse_rc_override("=150").is_err());
        assert!(parse_rc_override("color").is_err());
    }

    #[test]
    fn parses_list_move_with_global_flags() {
        let cli = GlobalCli::parse_from([
            "flowtask", "list", "-vv", "--rc", "color=off", "move", "abc", "def",
        ]);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.rc_overrides[0].key, "color");
        match cli.mode {
            ModeCommand::List {
                command: Some(ListCommand::Move { id, target }),
            } => {
                assert_eq!(id, "abc");
                assert_eq!(target.as_deref(), Some("def"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_negative_canvas_offsets() {
        let cli = GlobalCli::parse_from(["flowtask", "canvas", "drag", "t1", "-40", "12.5"]);
        match cli.mode {
            ModeCommand::Canvas {
                command: Some(CanvasCommand::Drag { id, dx, dy }),
            } => {
                assert_eq!(id, "t1");
                assert_eq!(dx, -40.0);
                assert_eq!(dy, 12.5);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn add_joins_words() {
        let cli = GlobalCli::parse_from(["flowtask", "list", "add", "Buy", "oat", "milk"]);
        match cli.mode {
            ModeCommand::List {
                command: Some(ListCommand::Add(args)),
            } => assert_eq!(args.text(), "Buy oat milk"),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
