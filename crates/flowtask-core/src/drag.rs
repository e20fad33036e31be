//! Drag gestures: the notifications an input adapter delivers and the
//! single-drag session they drive.
//!
//! A well-formed gesture is one `DragStart`, any number of `DragMove`s, then
//! either `DragEnd` or `DragCancel`. While a drag is live every notification
//! about another item is dropped, so overlapping gestures can never mutate two
//! items at once.

use tracing::{debug, trace};

use crate::geometry::{Delta, Point, Size};
use crate::task::TaskId;

/// Where a drag ended.
#[derive(Debug, Clone, PartialEq)]
pub enum DropTarget {
    /// Released over another task (list mode): insert before it.
    OnTask(TaskId),
    /// Released over no task (list mode): move to the end.
    EmptySpace,
    /// Total pointer travel since the start (canvas mode).
    Offset(Delta),
}

/// Everything the board reacts to, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    DragStart { id: TaskId, position: Point },
    /// `delta` is cumulative since the matching `DragStart`.
    DragMove { id: TaskId, delta: Delta },
    DragEnd { id: TaskId, drop: DropTarget },
    DragCancel { id: TaskId },
    Resize(Size),
    Add(String),
    Delete(TaskId),
    Toggle(TaskId),
    ClearAll,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveDrag {
    pub dragged_id: TaskId,
    pub origin: Point,
    pub delta: Delta,
}

impl ActiveDrag {
    pub fn current(&self) -> Point {
        self.origin.offset(self.delta)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragSession {
    #[default]
    Idle,
    Dragging(ActiveDrag),
}

impl DragSession {
    pub fn active(&self) -> Option<&ActiveDrag> {
        match self {
            DragSession::Idle => None,
            DragSession::Dragging(drag) => Some(drag),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragSession::Dragging(_))
    }

    pub fn dragged_id(&self) -> Option<&TaskId> {
        self.active().map(|drag| &drag.dragged_id)
    }

    /// Begins a drag unless one is already live; the first drag wins.
    pub fn start(&mut self, id: TaskId, origin: Point) -> bool {
        if let DragSession::Dragging(active) = self {
            debug!(active = %active.dragged_id, rejected = %id, "drag already in progress");
            return false;
        }
        trace!(%id, x = origin.x, y = origin.y, "drag started");
        *self = DragSession::Dragging(ActiveDrag {
            dragged_id: id,
            origin,
            delta: Delta::default(),
        });
        true
    }

    pub fn update(&mut self, id: &TaskId, delta: Delta) -> bool {
        match self {
            DragSession::Dragging(active) if &active.dragged_id == id => {
                active.delta = delta;
                true
            }
            _ => false,
        }
    }

    /// Ends the live drag for `id` and hands it back for committing.
    pub fn finish(&mut self, id: &TaskId) -> Option<ActiveDrag> {
        if self.dragged_id() != Some(id) {
            trace!(%id, "end for a drag that is not live");
            return None;
        }
        match std::mem::take(self) {
            DragSession::Dragging(active) => Some(active),
            DragSession::Idle => None,
        }
    }

    /// Discards the live drag for `id` without committing anything.
    pub fn cancel(&mut self, id: &TaskId) -> bool {
        if self.dragged_id() != Some(id) {
            return false;
        }
        *self = DragSession::Idle;
        debug!(%id, "drag cancelled");
        true
    }

    pub fn reset(&mut self) {
        *self = DragSession::Idle;
    }
}
