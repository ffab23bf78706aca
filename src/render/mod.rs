//! Rendering sink interface
//!
//! The core never draws. It creates, updates and removes visuals through a
//! [`RenderSink`], attaches a [`VisualTag`] to each one, and asks the sink to
//! outline the selected visual.

pub mod memory;

use crate::document::{FormattedText, NodeId, SourcePosition, TextStyle};
use serde::Serialize;

pub use memory::{MemorySink, Snapshot, Visual};

/// Opaque reference to a visual owned by the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct VisualHandle(pub u64);

/// Addresses the dialog surface and its caption. Sinks never hand it out
/// for a control.
pub const DIALOG_HANDLE: VisualHandle = VisualHandle(0);

/// The kind of visual object a control renders as.
///
/// An existing visual is only reused for a control that maps to the same kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum VisualKind {
    Label,
    RichText,
    Button,
    ToggleButton,
    CheckBox,
    Separator,
    ComboBox,
    Image,
    ProgressBar,
    RadioGroup,
}

impl VisualKind {
    pub fn name(&self) -> &'static str {
        match self {
            VisualKind::Label => "Label",
            VisualKind::RichText => "RichText",
            VisualKind::Button => "Button",
            VisualKind::ToggleButton => "ToggleButton",
            VisualKind::CheckBox => "CheckBox",
            VisualKind::Separator => "Separator",
            VisualKind::ComboBox => "ComboBox",
            VisualKind::Image => "Image",
            VisualKind::ProgressBar => "ProgressBar",
            VisualKind::RadioGroup => "RadioGroup",
        }
    }
}

/// Source node a visual was rendered from; read back for click-to-caret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VisualTag {
    #[serde(skip)]
    pub node: NodeId,
    pub id: String,
    pub position: Option<SourcePosition>,
}

/// Geometry and common flags.
///
/// `None` geometry leaves whatever value the visual already has.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub hidden: bool,
    pub disabled: bool,
    pub right_aligned: bool,
    pub right_to_left: bool,
}

/// One button of a radio group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadioButtonContent {
    pub value: String,
    pub text: FormattedText,
    pub layout: Layout,
}

/// Kind-specific content of a visual.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    Label { text: FormattedText },
    RichText { text: String, vertical_scroll: bool },
    Button { text: FormattedText },
    Toggle { text: FormattedText },
    CheckBox { text: FormattedText },
    Separator,
    ComboBox {
        items: Vec<String>,
        editable: bool,
        selected: Option<usize>,
    },
    Image { source: Option<String> },
    Progress { value: f64 },
    RadioGroup { buttons: Vec<RadioButtonContent> },
}

/// Full property set applied to a visual on every render pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualProperties {
    pub layout: Layout,
    pub content: Content,
    pub font: TextStyle,
}

/// The dialog surface: size, caption and the tag for the dialog node.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialogFrame {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub title: FormattedText,
    pub font: TextStyle,
    pub tag: VisualTag,
}

/// A panel that hosts the rendered dialog.
pub trait RenderSink {
    /// Construct a visual and add it to the dialog surface.
    fn create(&mut self, kind: VisualKind) -> VisualHandle;

    /// Remove a visual from the surface and drop it.
    fn remove(&mut self, handle: VisualHandle);

    /// Apply geometry, flags and content.
    fn apply(&mut self, handle: VisualHandle, properties: &VisualProperties);

    fn set_tag(&mut self, handle: VisualHandle, tag: VisualTag);

    fn tag(&self, handle: VisualHandle) -> Option<&VisualTag>;

    /// Size the dialog surface and set its caption.
    fn set_dialog(&mut self, frame: &DialogFrame);

    /// Outline the given visual, or clear the outline.
    fn show_selection(&mut self, handle: Option<VisualHandle>);

    /// Order children to match the given sequence (z-order follows source order).
    fn arrange(&mut self, order: &[VisualHandle]);

    /// Current children, in z-order.
    fn children(&self) -> Vec<VisualHandle>;

    /// Set the zoom factor of the dialog surface.
    fn set_scale(&mut self, scale: f64);
}
