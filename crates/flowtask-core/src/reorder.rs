use tracing::trace;

use crate::task::{Entity, TaskId};

/// Moves `dragged` so it sits immediately before `target`.
///
/// A `None` target, or a target that no longer exists once the dragged item
/// is lifted out, appends to the end. An unknown `dragged` id leaves the
/// sequence untouched. Returns whether the sequence was touched at all.
///
/// Dropping an item onto itself is the caller's concern and must be filtered
/// out before calling this.
pub fn reorder<T: Entity>(items: &mut Vec<T>, dragged: &TaskId, target: Option<&TaskId>) -> bool {
    let Some(from) = items.iter().position(|item| item.id() == dragged) else {
        trace!(%dragged, "dragged id not in sequence");
        return false;
    };

    let moved = items.remove(from);
    let to = target
        .and_then(|target| items.iter().position(|item| item.id() == target))
        .unwrap_or(items.len());

    trace!(%dragged, from, to, "reordering");
    items.insert(to, moved);
    true
}

#[cfg(test)]
mod tests {
    use super::reorder;
    use crate::task::{Task, TaskId};

    fn seq(ids: &[&str]) -> Vec<Task> {
        ids.iter()
            .map(|id| Task::new(TaskId::from(*id), id.to_uppercase()))
            .collect()
    }

    fn ids(items: &[Task]) -> Vec<&str> {
        items.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn drop_before_earlier_target() {
        let mut items = seq(&["a", "b", "c"]);
        assert!(reorder(&mut items, &"c".into(), Some(&"a".into())));
        assert_eq!(ids(&items), ["c", "a", "b"]);
    }

    #[test]
    fn drop_before_later_target() {
        let mut items = seq(&["a", "b", "c", "d"]);
        reorder(&mut items, &"a".into(), Some(&"c".into()));
        assert_eq!(ids(&items), ["b", "a", "c", "d"]);
    }

    #[test]
    fn empty_space_appends() {
        let mut items = seq(&["a", "b", "c"]);
        reorder(&mut items, &"a".into(), None);
        assert_eq!(ids(&items), ["b", "c", "a"]);
    }

    #[test]
    fn stale_target_appends() {
        let mut items = seq(&["a", "b", "c"]);
        reorder(&mut items, &"b".into(), Some(&"gone".into()));
        assert_eq!(ids(&items), ["a", "c", "b"]);
    }

    #[test]
    fn unknown_dragged_is_untouched() {
        let mut items = seq(&["a", "b"]);
        assert!(!reorder(&mut items, &"zzz".into(), Some(&"a".into())));
        assert_eq!(ids(&items), ["a", "b"]);
    }

    #[test]
    fn preserves_members_and_relative_order_of_others() {
        let base = ["a", "b", "c", "d", "e"];
        for dragged in base {
            for target in base {
                if dragged == target {
                    continue;
                }
                let mut items = seq(&base);
                reorder(&mut items, &dragged.into(), Some(&target.into()));
                let after = ids(&items);

                let mut sorted = after.clone();
                sorted.sort_unstable();
                assert_eq!(sorted, base);

                let dragged_at = after.iter().position(|id| *id == dragged);
                let target_at = after.iter().position(|id| *id == target);
                assert_eq!(dragged_at.map(|i| i + 1), target_at);

                let others: Vec<_> = after.iter().filter(|id| **id != dragged).collect();
                let expected: Vec<_> = base.iter().filter(|id| **id != dragged).collect();
                assert_eq!(others, expected);
            }
        }
    }
}
