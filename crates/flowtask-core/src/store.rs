use std::collections::HashSet;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::geometry::{Point, Size, clamp_point};
use crate::ids::IdSource;
use crate::kv::KeyValueStore;
use crate::persistence::{CANVAS_STORAGE_KEY, LIST_STORAGE_KEY, PersistenceSync};
use crate::reorder::reorder;
use crate::task::{Entity, PlacedTask, Task, TaskId};

/// What differs between the ordered list and the free canvas.
pub trait Mode {
    type Entity: Entity + Clone + Serialize + DeserializeOwned;

    const STORAGE_KEY: &'static str;

    /// Builds the entity appended by `add`; `count` is the size before insertion.
    fn create(&self, id: TaskId, text: String, count: usize) -> Self::Entity;

    /// Brings a hydrated entity back within the mode's invariants.
    fn normalize(&self, _entity: &mut Self::Entity) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListMode;

impl Mode for ListMode {
    type Entity = Task;

    const STORAGE_KEY: &'static str = LIST_STORAGE_KEY;

    fn create(&self, id: TaskId, text: String, _count: usize) -> Task {
        Task::new(id, text)
    }
}

/// Where freshly added canvas items land: column `x`, one row per item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackLayout {
    pub x: f64,
    pub spacing: f64,
}

impl Default for StackLayout {
    fn default() -> Self {
        Self {
            x: 20.0,
            spacing: 60.0,
        }
    }
}

impl StackLayout {
    pub fn slot(&self, index: usize) -> Point {
        Point::new(self.x, index as f64 * self.spacing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasMode {
    pub viewport: Size,
    pub footprint: Size,
    pub stack: StackLayout,
}

impl CanvasMode {
    pub const DEFAULT_FOOTPRINT: Size = Size {
        width: 200.0,
        height: 80.0,
    };

    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            footprint: Self::DEFAULT_FOOTPRINT,
            stack: StackLayout::default(),
        }
    }

    pub fn clamp(&self, at: Point) -> Point {
        clamp_point(at, self.viewport, self.footprint)
    }
}

impl Mode for CanvasMode {
    type Entity = PlacedTask;

    const STORAGE_KEY: &'static str = CANVAS_STORAGE_KEY;

    fn create(&self, id: TaskId, text: String, count: usize) -> PlacedTask {
        PlacedTask::new(id, text, self.clamp(self.stack.slot(count)))
    }

    fn normalize(&self, entity: &mut PlacedTask) {
        entity.set_position(self.clamp(entity.position()));
    }
}

/// Owner of the task collection. Every change is mirrored to storage.
pub struct TaskStore<M: Mode> {
    mode: M,
    items: Vec<M::Entity>,
    ids: Box<dyn IdSource>,
    sync: PersistenceSync<M::Entity>,
}

pub type ListStore = TaskStore<ListMode>;
pub type CanvasStore = TaskStore<CanvasMode>;

impl<M: Mode> TaskStore<M> {
    /// Hydrates from `store`, falling back to an empty collection.
    #[tracing::instrument(skip_all, fields(key = M::STORAGE_KEY))]
    pub fn open(mode: M, store: Box<dyn KeyValueStore>, ids: Box<dyn IdSource>) -> Self {
        let sync = PersistenceSync::<M::Entity>::new(store, M::STORAGE_KEY);
        let loaded = sync.load();
        let loaded_count = loaded.len();

        let mut seen = HashSet::new();
        let mut items = Vec::with_capacity(loaded_count);
        for mut entity in loaded {
            if !seen.insert(entity.id().clone()) {
                warn!(id = %entity.id(), "dropping duplicate id from snapshot");
                continue;
            }
            mode.normalize(&mut entity);
            items.push(entity);
        }

        info!(loaded = loaded_count, kept = items.len(), "hydrated task store");
        Self {
            mode,
            items,
            ids,
            sync,
        }
    }

    pub fn mode(&self) -> &M {
        &self.mode
    }

    pub fn items(&self) -> &[M::Entity] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn index_of(&self, id: &TaskId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn get(&self, id: &TaskId) -> Option<&M::Entity> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn get_mut(&mut self, id: &TaskId) -> Option<&mut M::Entity> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    fn persist(&self) {
        self.sync.save(&self.items);
    }

    fn fresh_id(&mut self) -> TaskId {
        loop {
            let id = self.ids.next_id();
            if self.index_of(&id).is_none() {
                return id;
            }
            warn!(%id, "id source returned an id already in use; drawing again");
        }
    }

    /// Appends a task. Blank text is ignored and yields `None`.
    #[tracing::instrument(skip(self, text))]
    pub fn add(&mut self, text: &str) -> Option<TaskId> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            debug!("ignoring blank task text");
            return None;
        }

        let id = self.fresh_id();
        let entity = self
            .mode
            .create(id.clone(), trimmed.to_string(), self.items.len());
        self.items.push(entity);
        self.persist();

        debug!(%id, count = self.items.len(), "task added");
        Some(id)
    }

    #[tracing::instrument(skip(self, id), fields(id = %id))]
    pub fn delete(&mut self, id: &TaskId) -> bool {
        let Some(index) = self.index_of(id) else {
            debug!("delete of absent id ignored");
            return false;
        };
        self.items.remove(index);
        self.persist();
        true
    }

    #[tracing::instrument(skip(self))]
    pub fn clear_all(&mut self) -> bool {
        if self.items.is_empty() {
            return false;
        }
        let removed = self.items.len();
        self.items.clear();
        self.persist();
        info!(removed, "cleared all tasks");
        true
    }
}

impl TaskStore<ListMode> {
    #[tracing::instrument(skip(self, id), fields(id = %id))]
    pub fn toggle_complete(&mut self, id: &TaskId) -> bool {
        let Some(task) = self.get_mut(id) else {
            debug!("toggle of absent id ignored");
            return false;
        };
        task.completed = !task.completed;
        self.persist();
        true
    }

    /// Moves `dragged` before `target`, or to the end when `target` is `None`
    /// or stale. Dropping an item on itself does nothing.
    #[tracing::instrument(skip(self, dragged), fields(dragged = %dragged))]
    pub fn reorder(&mut self, dragged: &TaskId, target: Option<&TaskId>) -> bool {
        if target == Some(dragged) {
            debug!("drop on self ignored");
            return false;
        }
        if !reorder(&mut self.items, dragged, target) {
            return false;
        }
        self.persist();
        true
    }
}

impl TaskStore<CanvasMode> {
    pub fn viewport(&self) -> Size {
        self.mode.viewport
    }

    pub fn position_of(&self, id: &TaskId) -> Option<Point> {
        self.get(id).map(PlacedTask::position)
    }

    #[tracing::instrument(skip(self, id), fields(id = %id))]
    pub fn reposition(&mut self, id: &TaskId, x: f64, y: f64) -> bool {
        let at = self.mode.clamp(Point::new(x, y));
        let Some(task) = self.get_mut(id) else {
            debug!("reposition of absent id ignored");
            return false;
        };
        if task.position() == at {
            return false;
        }
        task.set_position(at);
        self.persist();
        debug!(x = at.x, y = at.y, "task repositioned");
        true
    }

    /// Records the new viewport and pulls every item back inside it.
    #[tracing::instrument(skip(self))]
    pub fn clamp_all(&mut self, viewport: Size) -> bool {
        self.mode.viewport = viewport;

        let mut moved = 0usize;
        for task in &mut self.items {
            let at = self.mode.clamp(task.position());
            if task.position() != at {
                task.set_position(at);
                moved += 1;
            }
        }

        if moved > 0 {
            self.persist();
        }
        debug!(moved, "re-clamped after resize");
        moved > 0
    }
}
