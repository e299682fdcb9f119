//! Drag-overlay state

/// Nesting depth of drag gestures carrying files over the window.
///
/// The overlay is visible exactly when the depth is positive. Depth never
/// goes below zero, and a drop always resets it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    depth: u32,
}

impl DragState {
    pub fn new() -> Self {
        Self::default()
    }

    /// `dragenter`: only gestures carrying files count
    pub fn enter(&mut self, carries_files: bool) {
        if carries_files {
            self.depth = self.depth.saturating_add(1);
        }
    }

    /// `dragleave`: counted only when the pointer left the viewport
    pub fn leave(&mut self, left_viewport: bool) {
        if left_viewport {
            self.depth = self.depth.saturating_sub(1);
        }
    }

    /// `drop` anywhere, or an explicit reset
    pub fn reset(&mut self) {
        self.depth = 0;
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn overlay_visible(&self) -> bool {
        self.depth > 0
    }
}
