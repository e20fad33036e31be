use uuid::Uuid;

use crate::task::TaskId;

/// Source of fresh task ids, unique for the lifetime of the process.
pub trait IdSource {
    fn next_id(&mut self) -> TaskId;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdSource for UuidIds {
    fn next_id(&mut self) -> TaskId {
        TaskId::new(Uuid::new_v4().to_string())
    }
}

/// Deterministic ids (`t1`, `t2`, ...) for tests and scripted sessions.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new("t")
    }
}

impl IdSource for SequentialIds {
    fn next_id(&mut self) -> TaskId {
        let id = TaskId::new(format!("{}{}", self.prefix, self.next));
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{IdSource, SequentialIds, UuidIds};

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIds::default();
        assert_eq!(ids.next_id().as_str(), "t1");
        assert_eq!(ids.next_id().as_str(), "t2");
    }

    #[test]
    fn uuid_ids_do_not_repeat() {
        let mut ids = UuidIds;
        let seen: HashSet<_> = (0..64).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 64);
    }
}
