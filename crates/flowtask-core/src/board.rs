use tracing::{debug, info, instrument, trace};

use crate::drag::{ActiveDrag, DragSession, DropTarget, InputEvent};
use crate::geometry::{Point, Size};
use crate::store::{CanvasMode, ListMode, Mode, TaskStore};
use crate::task::TaskId;
use crate::viewport::ViewportWatcher;

/// The mode-specific half of board events: where a drag starts, how a drop
/// lands, what a resize means and whether tasks carry a completion flag.
pub trait BoardSurface {
    /// Origin to record for a drag of `id`, or `None` if `id` is unknown.
    fn drag_origin(&self, id: &TaskId, pointer: Point) -> Option<Point>;

    fn commit_drop(&mut self, drag: &ActiveDrag, drop: DropTarget) -> bool;

    fn on_resize(&mut self, viewport: Size) -> bool;

    /// Where the dragged item would land if released now.
    fn preview(&self, _drag: &ActiveDrag) -> Option<Point> {
        None
    }

    /// Flips the completion flag of `id`; `false` when the mode has none.
    fn toggle(&mut self, id: &TaskId) -> bool;
}

impl BoardSurface for TaskStore<ListMode> {
    fn drag_origin(&self, id: &TaskId, pointer: Point) -> Option<Point> {
        self.index_of(id).map(|_| pointer)
    }

    fn commit_drop(&mut self, drag: &ActiveDrag, drop: DropTarget) -> bool {
        match drop {
            DropTarget::OnTask(target) => self.reorder(&drag.dragged_id, Some(&target)),
            DropTarget::EmptySpace => self.reorder(&drag.dragged_id, None),
            DropTarget::Offset(_) => {
                debug!(id = %drag.dragged_id, "list drop without a target ignored");
                false
            }
        }
    }

    fn on_resize(&mut self, _viewport: Size) -> bool {
        false
    }

    fn toggle(&mut self, id: &TaskId) -> bool {
        self.toggle_complete(id)
    }
}

impl BoardSurface for TaskStore<CanvasMode> {
    fn drag_origin(&self, id: &TaskId, _pointer: Point) -> Option<Point> {
        self.position_of(id)
    }

    fn commit_drop(&mut self, drag: &ActiveDrag, drop: DropTarget) -> bool {
        let delta = match drop {
            DropTarget::Offset(delta) => delta,
            DropTarget::OnTask(_) | DropTarget::EmptySpace => drag.delta,
        };
        let Some(stored) = self.position_of(&drag.dragged_id) else {
            return false;
        };
        let target = stored.offset(delta);
        self.reposition(&drag.dragged_id, target.x, target.y)
    }

    fn on_resize(&mut self, viewport: Size) -> bool {
        self.clamp_all(viewport)
    }

    fn preview(&self, drag: &ActiveDrag) -> Option<Point> {
        let stored = self.position_of(&drag.dragged_id)?;
        Some(self.mode().clamp(stored.offset(drag.delta)))
    }

    fn toggle(&mut self, id: &TaskId) -> bool {
        debug!(%id, "canvas tasks have no completion state; toggle ignored");
        false
    }
}

/// Routes input notifications through the drag session into the store.
///
/// Events are applied one at a time in arrival order. After [`Board::close`]
/// every event is ignored.
pub struct Board<M: Mode> {
    store: TaskStore<M>,
    session: DragSession,
    watcher: ViewportWatcher,
    closed: bool,
}

pub type ListBoard = Board<ListMode>;
pub type CanvasBoard = Board<CanvasMode>;

impl<M> Board<M>
where
    M: Mode,
    TaskStore<M>: BoardSurface,
{
    pub fn new(mut store: TaskStore<M>, viewport: Size) -> Self {
        store.on_resize(viewport);
        Self {
            store,
            session: DragSession::Idle,
            watcher: ViewportWatcher::new(),
            closed: false,
        }
    }

    pub fn store(&self) -> &TaskStore<M> {
        &self.store
    }

    pub fn session(&self) -> &DragSession {
        &self.session
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Dragged id and projected position of the live drag, if any.
    pub fn preview(&self) -> Option<(&TaskId, Point)> {
        let drag = self.session.active()?;
        let at = self.store.preview(drag)?;
        Some((&drag.dragged_id, at))
    }

    /// Applies one notification. Returns whether the collection changed.
    #[instrument(skip(self))]
    pub fn handle(&mut self, event: InputEvent) -> bool {
        if self.closed {
            trace!("board closed; event dropped");
            return false;
        }

        match event {
            InputEvent::DragStart { id, position } => {
                if self.session.is_dragging() {
                    self.session.start(id, position);
                    return false;
                }
                match self.store.drag_origin(&id, position) {
                    Some(origin) => {
                        self.session.start(id, origin);
                    }
                    None => debug!(%id, "drag start for unknown id ignored"),
                }
                false
            }
            InputEvent::DragMove { id, delta } => {
                self.session.update(&id, delta);
                false
            }
            InputEvent::DragEnd { id, drop } => {
                let Some(drag) = self.session.finish(&id) else {
                    return false;
                };
                self.store.commit_drop(&drag, drop)
            }
            InputEvent::DragCancel { id } => {
                self.session.cancel(&id);
                false
            }
            InputEvent::Resize(size) => match self.watcher.resize(size) {
                Some(size) => self.store.on_resize(size),
                None => false,
            },
            InputEvent::Add(text) => self.store.add(&text).is_some(),
            InputEvent::Delete(id) => self.store.delete(&id),
            InputEvent::Toggle(id) => self.store.toggle(&id),
            InputEvent::ClearAll => self.store.clear_all(),
        }
    }

    /// Tears the surface down: any live drag is discarded and resizes stop.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.session.reset();
        self.watcher.detach();
        self.closed = true;
        info!(count = self.store.len(), "board closed");
    }
}
