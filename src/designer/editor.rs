//! Editor view collaborator

use crate::document::SourcePosition;
use crate::position::{offset_to_position, position_to_offset};

/// The text view a designer is attached to.
pub trait EditorView {
    /// Current text snapshot.
    fn text(&self) -> String;

    /// Caret as a 1-based line/column.
    fn caret(&self) -> SourcePosition;

    fn move_caret_to(&mut self, position: SourcePosition);

    /// Scroll so that `position` is on screen.
    fn ensure_visible(&mut self, position: SourcePosition);

    /// Viewport size along the docking axis: height when `horizontal`,
    /// width otherwise.
    fn viewport_extent(&self, horizontal: bool) -> f64;
}

/// An editor backed by a string, for the CLI and tests.
#[derive(Debug, Clone)]
pub struct BufferEditor {
    text: String,
    caret: usize,
    visible: Option<SourcePosition>,
    viewport: (f64, f64),
}

impl BufferEditor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            caret: 0,
            visible: None,
            viewport: (800.0, 600.0),
        }
    }

    /// Viewport width and height.
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = (width, height);
        self
    }

    /// Replace the text; the caret is clamped to the new length.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.caret = self.caret.min(self.text.len());
        while !self.text.is_char_boundary(self.caret) {
            self.caret -= 1;
        }
    }

    /// Caret as a byte offset.
    pub fn caret_offset(&self) -> usize {
        self.caret
    }

    /// The last position passed to `ensure_visible`.
    pub fn visible(&self) -> Option<SourcePosition> {
        self.visible
    }
}

impl EditorView for BufferEditor {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn caret(&self) -> SourcePosition {
        offset_to_position(&self.text, self.caret)
    }

    fn move_caret_to(&mut self, position: SourcePosition) {
        self.caret = position_to_offset(&self.text, position);
    }

    fn ensure_visible(&mut self, position: SourcePosition) {
        self.visible = Some(position);
    }

    fn viewport_extent(&self, horizontal: bool) -> f64 {
        if horizontal {
            self.viewport.1
        } else {
            self.viewport.0
        }
    }
}
