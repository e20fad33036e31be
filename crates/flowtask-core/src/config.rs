use std::collections::BTreeMap;
use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow,
  bail
};
use tracing::{
  debug,
  info,
  trace,
  warn
};

use crate::geometry::Size;
use crate::store::{
  CanvasMode,
  StackLayout
};

const RC_ENV: &str = "FLOWTASKRC";
const RC_FILE: &str = ".flowtaskrc";

const DEFAULTS: &[(&str, &str)] = &[
  ("data.location", "~/.flowtask"),
  ("viewport.width", "1280"),
  ("viewport.height", "720"),
  ("item.width", "200"),
  ("item.height", "80"),
  ("stack.x", "20"),
  ("stack.spacing", "60"),
  ("color", "on")
];

/// Flat `key = value` settings, defaults first, then rc files, then
/// command-line overrides.
#[derive(Debug, Clone)]
pub struct Config {
  values:      BTreeMap<String, String>,
  pub sources: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    let values = DEFAULTS
      .iter()
      .map(|&(key, value)| {
        (key.to_owned(), value.to_owned())
      })
      .collect();
    Self {
      values,
      sources: Vec::new()
    }
  }
}

/// One meaningful rc line.
#[derive(Debug, PartialEq, Eq)]
enum RcLine<'a> {
  Setting {
    key:   &'a str,
    value: &'a str
  },
  Include(&'a str)
}

impl Config {
  /// Defaults merged with the first rc file found: `rc`, then
  /// `$FLOWTASKRC` (`/dev/null` disables), then `~/.flowtaskrc`.
  #[tracing::instrument]
  pub fn load(
    rc: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg = Self::default();
    match locate_rc(rc) {
      | Some(path) => {
        info!(rc = %path.display(), "reading flowtaskrc");
        cfg.merge_file(&path)?;
      }
      | None => {
        debug!("no flowtaskrc; built-in defaults only")
      }
    }
    Ok(cfg)
  }

  /// `--rc key=value` pairs; a leading `rc.` is accepted and dropped.
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (raw_key, value) in overrides {
      let key = match raw_key
        .strip_prefix("rc.")
      {
        | Some(stripped) => {
          stripped.to_owned()
        }
        | None => raw_key
      };
      debug!(%key, %value, "rc override");
      self.values.insert(key, value);
    }
  }

  pub fn get_bool(
    &self,
    key: &str
  ) -> anyhow::Result<Option<bool>> {
    self
      .values
      .get(key)
      .map(|raw| {
        parse_bool(raw).ok_or_else(|| {
          anyhow!(
            "{key} expects on/off, got \
             {raw:?}"
          )
        })
      })
      .transpose()
  }

  pub fn get_f64(
    &self,
    key: &str
  ) -> anyhow::Result<Option<f64>> {
    let Some(raw) = self.values.get(key)
    else {
      return Ok(None);
    };
    let number: f64 =
      raw.trim().parse().with_context(
        || {
          format!(
            "{key} expects a number, \
             got {raw:?}"
          )
        }
      )?;
    if number.is_nan()
      || number.is_infinite()
    {
      bail!(
        "{key} expects a finite \
         number, got {raw:?}"
      );
    }
    Ok(Some(number))
  }

  fn number(
    &self,
    key: &str
  ) -> anyhow::Result<f64> {
    self.get_f64(key)?.with_context(
      || format!("{key} is not set")
    )
  }

  pub fn viewport(
    &self
  ) -> anyhow::Result<Size> {
    let width =
      self.number("viewport.width")?;
    let height =
      self.number("viewport.height")?;
    Ok(Size::new(width, height))
  }

  /// Canvas settings with the configured footprint and stacking.
  pub fn canvas_mode(
    &self
  ) -> anyhow::Result<CanvasMode> {
    let footprint = Size::new(
      self.number("item.width")?,
      self.number("item.height")?
    );
    if footprint.width < 0.0
      || footprint.height < 0.0
    {
      bail!(
        "item size must not be \
         negative"
      );
    }

    let stack = StackLayout {
      x:       self.number("stack.x")?,
      spacing: self
        .number("stack.spacing")?
    };

    Ok(CanvasMode {
      viewport: self.viewport()?,
      footprint,
      stack
    })
  }

  /// Where the task files live: `dir` if given, else `data.location`.
  pub fn data_dir(
    &self,
    dir: Option<&Path>
  ) -> anyhow::Result<PathBuf> {
    if let Some(dir) = dir {
      return Ok(dir.to_path_buf());
    }
    let location = self
      .values
      .get("data.location")
      .context(
        "data.location is not set"
      )?;
    let dir =
      expand_home(Path::new(location));
    if dir.starts_with("~") {
      bail!(
        "cannot expand {location}: \
         no home directory"
      );
    }
    Ok(dir)
  }

  #[tracing::instrument(skip(self))]
  fn merge_file(
    &mut self,
    path: &Path
  ) -> anyhow::Result<()> {
    let path = expand_home(path);
    let text = fs::read_to_string(&path)
      .with_context(|| {
        format!(
          "cannot read rc file {}",
          path.display()
        )
      })?;
    self.sources.push(path.clone());

    let dir = path
      .parent()
      .unwrap_or(Path::new("."))
      .to_path_buf();

    for (idx, raw) in
      text.lines().enumerate()
    {
      let line = parse_rc_line(raw)
        .with_context(|| {
          format!(
            "{}:{}",
            path.display(),
            idx + 1
          )
        })?;

      match line {
        | None => {}
        | Some(RcLine::Setting {
          key,
          value
        }) => {
          trace!(key, value, "rc setting");
          self.values.insert(
            key.to_owned(),
            value.to_owned()
          );
        }
        | Some(RcLine::Include(
          target
        )) => {
          let target =
            dir.join(expand_home(
              Path::new(target)
            ));
          if self.sources.contains(&target)
          {
            warn!(include = %target.display(), "rc include loop ignored");
          } else if target.is_file() {
            self.merge_file(&target)?;
          } else {
            warn!(include = %target.display(), "rc include not found");
          }
        }
      }
    }

    Ok(())
  }
}

/// Blank and comment-only lines yield `None`; `#` starts a trailing comment.
fn parse_rc_line(
  raw: &str
) -> anyhow::Result<Option<RcLine<'_>>> {
  let line = raw
    .split_once('#')
    .map_or(raw, |(before, _)| before)
    .trim();
  if line.is_empty() {
    return Ok(None);
  }

  if let Some(target) =
    line.strip_prefix("include ")
  {
    let target = target.trim();
    if target.is_empty() {
      bail!("include needs a path");
    }
    return Ok(Some(RcLine::Include(
      target
    )));
  }

  match line.split_once('=') {
    | Some((key, value))
      if !key.trim().is_empty() =>
    {
      Ok(Some(RcLine::Setting {
        key:   key.trim(),
        value: value.trim()
      }))
    }
    | _ => {
      bail!(
        "expected `key = value`, got \
         {line:?}"
      )
    }
  }
}

fn locate_rc(
  explicit: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = explicit {
    return Some(path.to_path_buf());
  }
  match std::env::var_os(RC_ENV) {
    | Some(value) if value == "/dev/null" => {
      None
    }
    | Some(value) => {
      Some(PathBuf::from(value))
    }
    | None => dirs::home_dir()
      .map(|home| home.join(RC_FILE))
      .filter(|path| path.is_file())
  }
}

/// Replaces a leading `~` component with the home directory, when known.
fn expand_home(path: &Path) -> PathBuf {
  match (
    path.strip_prefix("~"),
    dirs::home_dir()
  ) {
    | (Ok(rest), Some(home)) => {
      home.join(rest)
    }
    | _ => path.to_path_buf()
  }
}

fn parse_bool(raw: &str) -> Option<bool> {
  match raw
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "on" | "yes" | "true" | "1" => {
      Some(true)
    }
    | "off" | "no" | "false" | "0" => {
      Some(false)
    }
    | _ => None
  }
}
