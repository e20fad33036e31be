use std::io::{IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::geometry::Size;
use crate::task::{PlacedTask, Task};

const YELLOW: &str = "33";
const GREEN: &str = "32";
const STRIKE: &str = "9";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

/// A cell's visible text plus an optional SGR code applied when colouring.
struct Cell {
    text: String,
    style: Option<&'static str>,
}

impl Cell {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
        }
    }

    fn styled(text: impl Into<String>, style: &'static str) -> Self {
        Self {
            text: text.into(),
            style: Some(style),
        }
    }
}

struct Table {
    headers: Vec<&'static str>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    fn new(headers: Vec<&'static str>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.text.width());
            }
        }
        widths
    }

    fn write<W: Write>(&self, out: &mut W, color: bool) -> anyhow::Result<()> {
        let widths = self.widths();

        let header = self
            .headers
            .iter()
            .zip(&widths)
            .map(|(h, w)| pad(h, *w))
            .collect::<Vec<_>>();
        writeln!(out, "{}", header.join(" ").trim_end())?;

        let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
        writeln!(out, "{}", rule.join(" "))?;

        for row in &self.rows {
            let line = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| {
                    let padded = pad(&cell.text, *w);
                    match cell.style {
                        Some(code) if color => {
                            let fill = padded.len() - cell.text.len();
                            format!("\x1b[{code}m{}\x1b[0m{}", cell.text, " ".repeat(fill))
                        }
                        _ => padded,
                    }
                })
                .collect::<Vec<_>>();
            writeln!(out, "{}", line.join(" ").trim_end())?;
        }
        Ok(())
    }
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(fill))
}

impl Renderer {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let color = cfg.get_bool("color")?.unwrap_or(true);
        Ok(Self {
            color: color && std::io::stdout().is_terminal(),
        })
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, out, tasks), fields(count = tasks.len()))]
    pub fn write_list<W: Write>(&self, mut out: W, tasks: &[Task]) -> anyhow::Result<()> {
        if tasks.is_empty() {
            writeln!(out, "No tasks yet.")?;
            return Ok(());
        }

        let mut table = Table::new(vec!["#", "ID", "Status", "Task"]);
        for (idx, task) in tasks.iter().enumerate() {
            let (status, text) = if task.completed {
                (
                    Cell::styled("done", GREEN),
                    Cell::styled(task.text.as_str(), STRIKE),
                )
            } else {
                (Cell::plain("pending"), Cell::plain(task.text.as_str()))
            };
            table.push(vec![
                Cell::plain((idx + 1).to_string()),
                Cell::styled(task.id.as_str(), YELLOW),
                status,
                text,
            ]);
        }
        table.write(&mut out, self.color)?;

        let done = tasks.iter().filter(|task| task.completed).count();
        writeln!(out, "\nTotal tasks: {} ({done} completed)", tasks.len())?;
        Ok(())
    }

    #[tracing::instrument(skip(self, out, tasks), fields(count = tasks.len()))]
    pub fn write_canvas<W: Write>(
        &self,
        mut out: W,
        tasks: &[PlacedTask],
        viewport: Size,
    ) -> anyhow::Result<()> {
        if tasks.is_empty() {
            writeln!(out, "No tasks yet.")?;
            return Ok(());
        }

        let mut table = Table::new(vec!["ID", "X", "Y", "Task"]);
        for task in tasks {
            table.push(vec![
                Cell::styled(task.id.as_str(), YELLOW),
                Cell::plain(format_coord(task.x)),
                Cell::plain(format_coord(task.y)),
                Cell::plain(task.text.as_str()),
            ]);
        }
        table.write(&mut out, self.color)?;

        writeln!(
            out,
            "\nViewport {}x{}, {} tasks",
            format_coord(viewport.width),
            format_coord(viewport.height),
            tasks.len()
        )?;
        Ok(())
    }
}

fn format_coord(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.1}")
    }
}
