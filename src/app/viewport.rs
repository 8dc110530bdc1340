use std::ops::Range;

/// Selection and scroll position over a list that may be longer than the
/// screen.
///
/// After every public method `offset <= selected < offset + visible` holds
/// for non-empty lists, and `offset <= len.saturating_sub(visible)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub selected: usize,
    pub offset: usize,
    visible: usize,
}

impl Viewport {
    pub fn new(visible: usize) -> Self {
        Self {
            selected: 0,
            offset: 0,
            visible: visible.max(1),
        }
    }

    #[cfg(test)]
    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn reset(&mut self) {
        self.selected = 0;
        self.offset = 0;
    }

    /// Move the selection up one row. Returns whether it moved.
    pub fn up(&mut self) -> bool {
        if self.selected == 0 {
            return false;
        }
        self.selected -= 1;
        self.adjust();
        true
    }

    /// Move the selection down one row within `len` items.
    pub fn down(&mut self, len: usize) -> bool {
        if self.selected + 1 >= len {
            return false;
        }
        self.selected += 1;
        self.adjust();
        true
    }

    pub fn at_last(&self, len: usize) -> bool {
        len > 0 && self.selected + 1 == len
    }

    /// Scroll just enough to bring the selection back into view.
    /// Returns whether the offset changed.
    pub fn adjust(&mut self) -> bool {
        if self.selected < self.offset {
            self.offset = self.selected;
            true
        } else if self.selected >= self.offset + self.visible {
            self.offset = self.selected + 1 - self.visible;
            true
        } else {
            false
        }
    }

    /// Pull selection and offset back inside a list of `len` items.
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
        self.offset = self.offset.min(len.saturating_sub(self.visible));
        self.adjust();
    }

    /// New screen height for a list of `len` items.
    pub fn resize(&mut self, visible: usize, len: usize) {
        self.visible = visible.max(1);
        self.clamp(len);
    }

    /// Indices currently on screen.
    pub fn window(&self, len: usize) -> Range<usize> {
        let start = self.offset.min(len);
        start..(start + self.visible).min(len)
    }
}
