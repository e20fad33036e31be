use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

/// Anything a [`crate::store::TaskStore`] can hold.
pub trait Entity {
    fn id(&self) -> &TaskId;
    fn text(&self) -> &str;
}

/// List-mode entry. Order lives in the owning collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

impl Task {
    pub fn new(id: TaskId, text: String) -> Self {
        Self {
            id,
            text,
            completed: false,
        }
    }
}

impl Entity for Task {
    fn id(&self) -> &TaskId {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }
}

/// Canvas-mode entry with free placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedTask {
    pub id: TaskId,
    pub text: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl PlacedTask {
    pub fn new(id: TaskId, text: String, at: Point) -> Self {
        Self {
            id,
            text,
            x: at.x,
            y: at.y,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_position(&mut self, at: Point) {
        self.x = at.x;
        self.y = at.y;
    }
}

impl Entity for PlacedTask {
    fn id(&self) -> &TaskId {
        &self.id
    }

    fn text(&self) -> &str {
        &self.text
    }
}
