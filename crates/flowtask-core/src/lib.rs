pub mod board;
pub mod cli;
pub mod commands;
pub mod config;
pub mod drag;
pub mod geometry;
pub mod ids;
pub mod kv;
pub mod persistence;
pub mod render;
pub mod reorder;
pub mod store;
pub mod task;
pub mod viewport;

use std::ffi::OsString;

use anyhow::Context;
use clap::Parser;
use tracing::{
  debug,
  info
};

#[tracing::instrument(skip_all)]
pub fn run(
  raw_args: Vec<OsString>
) -> anyhow::Result<()> {
  let cli =
    cli::GlobalCli::parse_from(raw_args);

  cli::init_tracing(
    cli.verbose,
    cli.quiet
  )?;

  info!(
    verbose = cli.verbose,
    quiet = cli.quiet,
    "starting flowtask CLI"
  );

  let mut cfg = config::Config::load(
    cli.flowtaskrc.as_deref()
  )?;
  cfg.apply_overrides(
    cli
      .rc_overrides
      .into_iter()
      .map(|kv| (kv.key, kv.value))
  );
  debug!(sources = ?cfg.sources, "config resolved");

  let data_dir = cfg
    .data_dir(cli.data.as_deref())
    .context(
      "no usable data directory"
    )?;

  let store = kv::FileStore::open(
    &data_dir
  )
  .with_context(|| {
    format!(
      "failed to open store at {}",
      data_dir.display()
    )
  })?;

  let renderer =
    render::Renderer::new(&cfg)?;
  let mut out =
    std::io::stdout().lock();

  match cli.mode {
    | cli::ModeCommand::List {
      command
    } => commands::run_list(
      Box::new(store),
      cfg.viewport()?,
      &renderer,
      command.unwrap_or(
        cli::ListCommand::Show
      ),
      &mut out
    )?,
    | cli::ModeCommand::Canvas {
      command
    } => commands::run_canvas(
      Box::new(store),
      &cfg,
      &renderer,
      command.unwrap_or(
        cli::CanvasCommand::Show
      ),
      &mut out
    )?
  }

  info!("done");
  Ok(())
}
