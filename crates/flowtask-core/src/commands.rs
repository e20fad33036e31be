use std::io::Write;

use anyhow::anyhow;
use tracing::{debug, info, instrument};

use crate::board::{Board, CanvasBoard, ListBoard};
use crate::cli::{CanvasCommand, ListCommand};
use crate::config::Config;
use crate::drag::{DropTarget, InputEvent};
use crate::geometry::{Delta, Point, Size};
use crate::ids::UuidIds;
use crate::kv::KeyValueStore;
use crate::render::Renderer;
use crate::store::{ListMode, TaskStore};
use crate::task::{Entity, TaskId};

/// Resolves a user-typed id: exact match first, then a unique prefix.
///
/// Unknown ids are passed through untouched so the store treats them as
/// stale references.
pub fn resolve_id<T: Entity>(items: &[T], raw: &str) -> anyhow::Result<TaskId> {
    let raw = raw.trim();
    if let Some(exact) = items.iter().find(|item| item.id().as_str() == raw) {
        return Ok(exact.id().clone());
    }

    let mut matches = items
        .iter()
        .filter(|item| !raw.is_empty() && item.id().as_str().starts_with(raw));
    match (matches.next(), matches.next()) {
        (Some(only), None) => Ok(only.id().clone()),
        (Some(_), Some(_)) => Err(anyhow!("id prefix '{raw}' matches more than one task")),
        (None, _) => Ok(TaskId::new(raw)),
    }
}

fn report<W: Write>(out: &mut W, changed: bool, what: &str) -> anyhow::Result<()> {
    if changed {
        writeln!(out, "{what}.")?;
    } else {
        writeln!(out, "Nothing changed.")?;
    }
    Ok(())
}

#[instrument(skip(store, renderer, out))]
pub fn run_list<W: Write>(
    store: Box<dyn KeyValueStore>,
    viewport: Size,
    renderer: &Renderer,
    command: ListCommand,
    out: &mut W,
) -> anyhow::Result<()> {
    let tasks = TaskStore::open(ListMode, store, Box::new(UuidIds));
    let mut board: ListBoard = Board::new(tasks, viewport);

    match command {
        ListCommand::Show => {}
        ListCommand::Add(args) => {
            let changed = board.handle(InputEvent::Add(args.text()));
            report(out, changed, "Added task")?;
        }
        ListCommand::Delete { id } => {
            let id = resolve_id(board.store().items(), &id)?;
            let changed = board.handle(InputEvent::Delete(id));
            report(out, changed, "Deleted task")?;
        }
        ListCommand::Toggle { id } => {
            let id = resolve_id(board.store().items(), &id)?;
            let changed = board.handle(InputEvent::Toggle(id));
            report(out, changed, "Toggled task")?;
        }
        ListCommand::Move { id, target } => {
            let id = resolve_id(board.store().items(), &id)?;
            let drop = match target {
                Some(target) => DropTarget::OnTask(resolve_id(board.store().items(), &target)?),
                None => DropTarget::EmptySpace,
            };
            debug!(%id, ?drop, "replaying list drag");
            board.handle(InputEvent::DragStart {
                id: id.clone(),
                position: Point::default(),
            });
            let changed = board.handle(InputEvent::DragEnd { id, drop });
            report(out, changed, "Moved task")?;
        }
        ListCommand::Clear => {
            let changed = board.handle(InputEvent::ClearAll);
            report(out, changed, "Cleared all tasks")?;
        }
    }

    renderer.write_list(&mut *out, board.store().items())?;
    board.close();
    Ok(())
}

#[instrument(skip(store, cfg, renderer, out))]
pub fn run_canvas<W: Write>(
    store: Box<dyn KeyValueStore>,
    cfg: &Config,
    renderer: &Renderer,
    command: CanvasCommand,
    out: &mut W,
) -> anyhow::Result<()> {
    let mode = cfg.canvas_mode()?;
    let viewport = mode.viewport;
    let tasks = TaskStore::open(mode, store, Box::new(UuidIds));
    let mut board: CanvasBoard = Board::new(tasks, viewport);

    match command {
        CanvasCommand::Show => {}
        CanvasCommand::Add(args) => {
            let changed = board.handle(InputEvent::Add(args.text()));
            report(out, changed, "Added task")?;
        }
        CanvasCommand::Delete { id } => {
            let id = resolve_id(board.store().items(), &id)?;
            let changed = board.handle(InputEvent::Delete(id));
            report(out, changed, "Deleted task")?;
        }
        CanvasCommand::Drag { id, dx, dy } => {
            let id = resolve_id(board.store().items(), &id)?;
            let delta = Delta::new(dx, dy);
            let start = board.store().position_of(&id).unwrap_or_default();
            debug!(%id, dx, dy, "replaying canvas drag");
            board.handle(InputEvent::DragStart {
                id: id.clone(),
                position: start,
            });
            board.handle(InputEvent::DragMove {
                id: id.clone(),
                delta,
            });
            let changed = board.handle(InputEvent::DragEnd {
                id,
                drop: DropTarget::Offset(delta),
            });
            report(out, changed, "Moved task")?;
        }
        CanvasCommand::Resize { width, height } => {
            if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
                return Err(anyhow!("viewport size must be non-negative, got {width}x{height}"));
            }
            let changed = board.handle(InputEvent::Resize(Size::new(width, height)));
            report(out, changed, "Re-clamped tasks")?;
        }
        CanvasCommand::Clear => {
            let changed = board.handle(InputEvent::ClearAll);
            report(out, changed, "Cleared all tasks")?;
        }
    }

    let viewport = board.store().viewport();
    renderer.write_canvas(&mut *out, board.store().items(), viewport)?;
    board.close();
    info!(count = board.store().len(), "canvas command done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{resolve_id, run_canvas, run_list};
    use crate::cli::{CanvasCommand, ListCommand, TextArgs};
    use crate::config::Config;
    use crate::geometry::Size;
    use crate::kv::MemoryStore;
    use crate::persistence::{CANVAS_STORAGE_KEY, LIST_STORAGE_KEY};
    use crate::render::Renderer;
    use crate::task::{PlacedTask, Task, TaskId};

    fn text(words: &str) -> TextArgs {
        TextArgs {
            words: words.split(' ').map(str::to_string).collect(),
        }
    }

    fn list(kv: &MemoryStore, command: ListCommand) -> String {
        let mut out = Vec::new();
        run_list(
            Box::new(kv.clone()),
            Size::new(800.0, 600.0),
            &Renderer::plain(),
            command,
            &mut out,
        )
        .expect("list command");
        String::from_utf8(out).expect("utf8")
    }

    fn stored_list(kv: &MemoryStore) -> Vec<Task> {
        let raw = kv.raw(LIST_STORAGE_KEY).expect("snapshot");
        serde_json::from_str(&raw).expect("parse snapshot")
    }

    #[test]
    fn resolve_id_prefers_exact_then_unique_prefix() {
        let items = vec![
            Task::new(TaskId::from("ab"), "x".to_string()),
            Task::new(TaskId::from("abc"), "y".to_string()),
            Task::new(TaskId::from("zz9"), "z".to_string()),
        ];
        assert_eq!(resolve_id(&items, "ab").expect("exact").as_str(), "ab");
        assert_eq!(resolve_id(&items, "zz").expect("prefix").as_str(), "zz9");
        assert!(resolve_id(&items, "a").is_err());
        assert_eq!(resolve_id(&items, "nope").expect("stale").as_str(), "nope");
    }

    #[test]
    fn list_commands_persist_between_runs() {
        let kv = MemoryStore::new();
        list(&kv, ListCommand::Add(text("A")));
        list(&kv, ListCommand::Add(text("B")));
        list(&kv, ListCommand::Add(text("C")));

        let ids: Vec<String> = stored_list(&kv)
            .into_iter()
            .map(|t| t.id.as_str().to_string())
            .collect();
        let output = list(
            &kv,
            ListCommand::Move {
                id: ids[2].clone(),
                target: Some(ids[0].clone()),
            },
        );
        assert!(output.starts_with("Moved task."), "{output}");

        let order: Vec<String> = stored_list(&kv).into_iter().map(|t| t.text).collect();
        assert_eq!(order, ["C", "A", "B"]);
    }

    #[test]
    fn moving_onto_itself_changes_nothing() {
        let kv = MemoryStore::new();
        list(&kv, ListCommand::Add(text("only one")));
        let id = stored_list(&kv)[0].id.as_str().to_string();

        let output = list(
            &kv,
            ListCommand::Move {
                id: id.clone(),
                target: Some(id),
            },
        );
        assert!(output.starts_with("Nothing changed."), "{output}");
    }

    #[test]
    fn canvas_drag_and_resize_clamp() {
        let kv = MemoryStore::new();
        let cfg = Config::default();
        let run = |command: CanvasCommand| {
            let mut out = Vec::new();
            run_canvas(
                Box::new(kv.clone()),
                &cfg,
                &Renderer::plain(),
                command,
                &mut out,
            )
            .expect("canvas command");
            String::from_utf8(out).expect("utf8")
        };

        run(CanvasCommand::Add(text("Buy milk")));
        let stored: Vec<PlacedTask> =
            serde_json::from_str(&kv.raw(CANVAS_STORAGE_KEY).expect("snapshot"))
                .expect("parse");
        let id = stored[0].id.as_str().to_string();
        assert_eq!((stored[0].x, stored[0].y), (20.0, 0.0));

        run(CanvasCommand::Drag {
            id: id.clone(),
            dx: 480.0,
            dy: 500.0,
        });
        let output = run(CanvasCommand::Resize {
            width: 300.0,
            height: 300.0,
        });
        assert!(output.contains("100 220"), "{output}");
    }

    #[test]
    fn negative_viewport_is_rejected() {
        let mut out = Vec::new();
        let result = run_canvas(
            Box::new(MemoryStore::new()),
            &Config::default(),
            &Renderer::plain(),
            CanvasCommand::Resize {
                width: -1.0,
                height: 5.0,
            },
            &mut out,
        );
        assert!(result.is_err());
    }
}
