//! In-memory rendering sink
//!
//! Keeps visuals as plain data. The CLI prints it, and tests use it to check
//! object identity across render passes.

use super::{
    Content, DialogFrame, RenderSink, VisualHandle, VisualKind, VisualProperties, VisualTag, DIALOG_HANDLE,
};
use crate::document::TextStyle;
use serde::Serialize;
use std::collections::HashMap;

/// A visual held by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visual {
    pub handle: VisualHandle,
    pub kind: VisualKind,
    pub x: f64,
    pub y: f64,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub hidden: bool,
    pub disabled: bool,
    pub right_aligned: bool,
    pub right_to_left: bool,
    pub content: Option<Content>,
    pub font: Option<TextStyle>,
    pub tag: Option<VisualTag>,
    /// Number of property refreshes received
    pub refreshes: usize,
}

impl Visual {
    fn new(handle: VisualHandle, kind: VisualKind) -> Self {
        Self {
            handle,
            kind,
            x: 0.0,
            y: 0.0,
            width: None,
            height: None,
            hidden: false,
            disabled: false,
            right_aligned: false,
            right_to_left: false,
            content: None,
            font: None,
            tag: None,
            refreshes: 0,
        }
    }

    /// Display text, if the content has any.
    pub fn text(&self) -> Option<&str> {
        match self.content.as_ref()? {
            Content::Label { text }
            | Content::Button { text }
            | Content::Toggle { text }
            | Content::CheckBox { text } => Some(&text.text),
            Content::RichText { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Serializable view of a [`MemorySink`].
#[derive(Debug, Serialize)]
pub struct Snapshot<'a> {
    pub dialog: Option<&'a DialogFrame>,
    pub scale: f64,
    pub selection: Option<VisualHandle>,
    pub visuals: Vec<&'a Visual>,
}

/// Visual tree kept in memory.
#[derive(Debug, Clone)]
pub struct MemorySink {
    next_handle: u64,
    visuals: HashMap<VisualHandle, Visual>,
    children: Vec<VisualHandle>,
    dialog: Option<DialogFrame>,
    selection: Option<VisualHandle>,
    scale: f64,
    created: usize,
    removed: usize,
}

impl Default for MemorySink {
    fn default() -> Self {
        Self {
            next_handle: 1,
            visuals: HashMap::new(),
            children: Vec::new(),
            dialog: None,
            selection: None,
            scale: 1.0,
            created: 0,
            removed: 0,
        }
    }
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visual(&self, handle: VisualHandle) -> Option<&Visual> {
        self.visuals.get(&handle)
    }

    /// Find a child by the control Id in its tag.
    pub fn find_by_id(&self, id: &str) -> Option<&Visual> {
        self.children
            .iter()
            .filter_map(|h| self.visuals.get(h))
            .find(|v| v.tag.as_ref().is_some_and(|t| t.id == id))
    }

    /// Children in z-order.
    pub fn visuals(&self) -> Vec<&Visual> {
        self.children
            .iter()
            .filter_map(|h| self.visuals.get(h))
            .collect()
    }

    pub fn dialog(&self) -> Option<&DialogFrame> {
        self.dialog.as_ref()
    }

    pub fn selection(&self) -> Option<VisualHandle> {
        self.selection
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Total visuals ever created.
    pub fn created_count(&self) -> usize {
        self.created
    }

    /// Total visuals ever removed.
    pub fn removed_count(&self) -> usize {
        self.removed
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            dialog: self.dialog.as_ref(),
            scale: self.scale,
            selection: self.selection,
            visuals: self.visuals(),
        }
    }

    /// Human-readable tree.
    pub fn describe(&self) -> String {
        let mut output = String::new();

        match &self.dialog {
            Some(dialog) => output.push_str(&format!(
                "Dialog {} {}x{} \"{}\"\n",
                dialog.id, dialog.width, dialog.height, dialog.title.text
            )),
            None => output.push_str("(no dialog)\n"),
        }

        for visual in self.visuals() {
            let marker = if self.selection == Some(visual.handle) { "*" } else { " " };
            let id = visual.tag.as_ref().map(|t| t.id.as_str()).unwrap_or("?");
            let size = match (visual.width, visual.height) {
                (Some(w), Some(h)) => format!(" {}x{}", w, h),
                _ => String::new(),
            };
            let text = visual
                .text()
                .map(|t| format!(" \"{}\"", t.replace('\n', "\\n")))
                .unwrap_or_default();
            let hidden = if visual.hidden { " (hidden)" } else { "" };

            output.push_str(&format!(
                "{} [{}] {} @ ({}, {}){}{}{}\n",
                marker,
                visual.kind.name(),
                id,
                visual.x,
                visual.y,
                size,
                text,
                hidden
            ));
        }

        output
    }
}

impl RenderSink for MemorySink {
    fn create(&mut self, kind: VisualKind) -> VisualHandle {
        let handle = VisualHandle(self.next_handle);
        self.next_handle += 1;
        self.visuals.insert(handle, Visual::new(handle, kind));
        self.children.push(handle);
        self.created += 1;
        handle
    }

    fn remove(&mut self, handle: VisualHandle) {
        if self.visuals.remove(&handle).is_some() {
            self.removed += 1;
        }
        self.children.retain(|h| *h != handle);
        if self.selection == Some(handle) {
            self.selection = None;
        }
    }

    fn apply(&mut self, handle: VisualHandle, properties: &VisualProperties) {
        let Some(visual) = self.visuals.get_mut(&handle) else {
            return;
        };
        let layout = &properties.layout;
        if let Some(x) = layout.x {
            visual.x = x;
        }
        if let Some(y) = layout.y {
            visual.y = y;
        }
        if layout.width.is_some() {
            visual.width = layout.width;
        }
        if layout.height.is_some() {
            visual.height = layout.height;
        }
        visual.hidden = layout.hidden;
        visual.disabled = layout.disabled;
        visual.right_aligned = layout.right_aligned;
        visual.right_to_left = layout.right_to_left;
        visual.content = Some(properties.content.clone());
        visual.font = Some(properties.font.clone());
        visual.refreshes += 1;
    }

    fn set_tag(&mut self, handle: VisualHandle, tag: VisualTag) {
        if let Some(visual) = self.visuals.get_mut(&handle) {
            visual.tag = Some(tag);
        }
    }

    fn tag(&self, handle: VisualHandle) -> Option<&VisualTag> {
        if let Some(dialog) = &self.dialog {
            if handle == DIALOG_HANDLE {
                return Some(&dialog.tag);
            }
        }
        self.visuals.get(&handle).and_then(|v| v.tag.as_ref())
    }

    fn set_dialog(&mut self, frame: &DialogFrame) {
        self.dialog = Some(frame.clone());
    }

    fn show_selection(&mut self, handle: Option<VisualHandle>) {
        self.selection = handle.filter(|h| self.visuals.contains_key(h));
    }

    fn arrange(&mut self, order: &[VisualHandle]) {
        let mut arranged: Vec<VisualHandle> = order
            .iter()
            .copied()
            .filter(|h| self.children.contains(h))
            .collect();
        for handle in &self.children {
            if !arranged.contains(handle) {
                arranged.push(*handle);
            }
        }
        self.children = arranged;
    }

    fn children(&self) -> Vec<VisualHandle> {
        self.children.clone()
    }

    fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }
}
