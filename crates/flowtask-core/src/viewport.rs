use tracing::{debug, trace};

use crate::geometry::Size;

/// Gates resize notifications for a board.
///
/// The watcher only decides whether a resize is delivered; the size itself is
/// recorded by the store that clamps against it. Once detached (the surface
/// was closed) resizes are swallowed so nothing mutates a store that is going
/// away.
#[derive(Debug, Clone)]
pub struct ViewportWatcher {
    attached: bool,
}

impl Default for ViewportWatcher {
    fn default() -> Self {
        Self { attached: true }
    }
}

impl ViewportWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Passes a resize through while attached.
    pub fn resize(&self, size: Size) -> Option<Size> {
        if !self.attached {
            trace!(width = size.width, height = size.height, "resize after detach ignored");
            return None;
        }
        debug!(width = size.width, height = size.height, "viewport resized");
        Some(size)
    }

    pub fn detach(&mut self) {
        self.attached = false;
    }
}
