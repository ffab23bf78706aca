//! Control type registry
//!
//! Turns a `Control` element into a [`ControlSpec`]: a closed [`ControlKind`]
//! carrying only what that kind renders, plus the shared layout. Rendering a
//! spec reuses a visual of the same [`VisualKind`] or creates one, applies
//! the full property set and tags it with the source node.

use crate::document::{
    FormattedText, LocalizationTable, NodeId, ParsedDocument, SourcePosition, TextEvaluator, TextStyle, TextStyles,
};
use crate::error::SkipReason;
use crate::render::{Content, Layout, RadioButtonContent, RenderSink, VisualHandle, VisualKind, VisualProperties, VisualTag};

/// Value shown by every progress bar.
const PROGRESS_VALUE: f64 = 50.0;

/// Which of the edit-like control types produced an [`ControlKind::Edit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditVariant {
    Edit,
    MaskedEdit,
    PathEdit,
}

/// One radio button of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct RadioButtonSpec {
    pub value: String,
    pub text: FormattedText,
    pub layout: Layout,
}

/// Supported control types and their content.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlKind {
    Text { text: FormattedText },
    Edit { variant: EditVariant, text: String, multiline: bool },
    ScrollableText { text: String },
    PushButton { text: FormattedText },
    CheckBox { text: FormattedText, push_like: bool },
    Line,
    ComboBox { items: Vec<String>, editable: bool },
    Bitmap { source: Option<String> },
    Icon { source: Option<String> },
    ProgressBar,
    RadioButtonGroup { buttons: Vec<RadioButtonSpec> },
    Unsupported(String),
}

impl ControlKind {
    /// The visual a control of this kind renders as.
    pub fn visual_kind(&self) -> Option<VisualKind> {
        let kind = match self {
            ControlKind::Text { .. } => VisualKind::Label,
            ControlKind::Edit { .. } | ControlKind::ScrollableText { .. } => VisualKind::RichText,
            ControlKind::PushButton { .. } => VisualKind::Button,
            ControlKind::CheckBox { push_like: true, .. } => VisualKind::ToggleButton,
            ControlKind::CheckBox { push_like: false, .. } => VisualKind::CheckBox,
            ControlKind::Line => VisualKind::Separator,
            ControlKind::ComboBox { .. } => VisualKind::ComboBox,
            ControlKind::Bitmap { .. } | ControlKind::Icon { .. } => VisualKind::Image,
            ControlKind::ProgressBar => VisualKind::ProgressBar,
            ControlKind::RadioButtonGroup { .. } => VisualKind::RadioGroup,
            ControlKind::Unsupported(_) => return None,
        };
        Some(kind)
    }

    fn content(&self) -> Option<Content> {
        let content = match self {
            ControlKind::Text { text } => Content::Label { text: text.clone() },
            ControlKind::Edit { text, multiline, .. } => Content::RichText {
                text: text.clone(),
                vertical_scroll: *multiline,
            },
            ControlKind::ScrollableText { text } => Content::RichText {
                text: text.clone(),
                vertical_scroll: true,
            },
            ControlKind::PushButton { text } => Content::Button { text: text.clone() },
            ControlKind::CheckBox { text, push_like: true } => Content::Toggle { text: text.clone() },
            ControlKind::CheckBox { text, push_like: false } => Content::CheckBox { text: text.clone() },
            ControlKind::Line => Content::Separator,
            ControlKind::ComboBox { items, editable } => Content::ComboBox {
                items: items.clone(),
                editable: *editable,
                selected: if items.is_empty() { None } else { Some(0) },
            },
            ControlKind::Bitmap { source } | ControlKind::Icon { source } => Content::Image {
                source: source.clone(),
            },
            ControlKind::ProgressBar => Content::Progress { value: PROGRESS_VALUE },
            ControlKind::RadioButtonGroup { buttons } => Content::RadioGroup {
                buttons: buttons
                    .iter()
                    .map(|b| RadioButtonContent {
                        value: b.value.clone(),
                        text: b.text.clone(),
                        layout: b.layout.clone(),
                    })
                    .collect(),
            },
            ControlKind::Unsupported(_) => return None,
        };
        Some(content)
    }
}

/// A control ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlSpec {
    pub id: String,
    pub type_name: String,
    pub node: NodeId,
    pub position: Option<SourcePosition>,
    pub layout: Layout,
    pub kind: ControlKind,
    pub font: TextStyle,
}

impl ControlSpec {
    pub fn visual_kind(&self) -> Option<VisualKind> {
        self.kind.visual_kind()
    }

    pub fn tag(&self) -> VisualTag {
        VisualTag {
            node: self.node,
            id: self.id.clone(),
            position: self.position,
        }
    }
}

/// Geometry and flags shared by every control, read from `node`.
pub fn read_layout(doc: &ParsedDocument, node: NodeId) -> Layout {
    let element = doc.element(node);
    Layout {
        x: element.optional_double("X"),
        y: element.optional_double("Y"),
        width: element.optional_double("Width"),
        height: element.optional_double("Height"),
        hidden: element.has_yes_flag("Hidden"),
        disabled: element.has_yes_flag("Disabled"),
        right_aligned: element.has_yes_flag("RightAligned"),
        right_to_left: element.has_yes_flag("RightToLeft"),
    }
}

/// Maps control types to their rendering.
#[derive(Debug, Clone, Default)]
pub struct ControlTypeRegistry {
    evaluator: TextEvaluator,
    styles: TextStyles,
}

impl ControlTypeRegistry {
    pub fn new(evaluator: TextEvaluator) -> Self {
        Self {
            evaluator,
            styles: TextStyles::default(),
        }
    }

    pub fn evaluator(&self) -> &TextEvaluator {
        &self.evaluator
    }

    /// Add user strings; they win over earlier tables.
    pub fn add_localization(&mut self, table: LocalizationTable) {
        self.evaluator.add_table(table);
    }

    /// Replace the text styles, usually after a reparse.
    pub fn set_styles(&mut self, styles: TextStyles) {
        self.styles = styles;
    }

    pub fn styles(&self) -> &TextStyles {
        &self.styles
    }

    /// Evaluated, style-split text of a node.
    pub fn formatted_text(&self, doc: &ParsedDocument, node: NodeId) -> Option<FormattedText> {
        doc.text_value(node)
            .map(|text| self.evaluator.evaluate_formatted(text))
    }

    /// Read a control node into a spec, or say why it cannot be rendered.
    pub fn classify(&self, doc: &ParsedDocument, node: NodeId) -> Result<ControlSpec, SkipReason> {
        let element = doc.element(node);

        let id = element.id().trim();
        if id.is_empty() {
            return Err(SkipReason::MissingId);
        }
        let type_name = element.attribute("Type").unwrap_or("").trim();
        if type_name.is_empty() {
            return Err(SkipReason::MissingType);
        }

        let formatted = self.formatted_text(doc, node);
        let font = self
            .styles
            .resolve(formatted.as_ref().and_then(|f| f.style.as_deref()));
        let display = formatted.clone().unwrap_or_else(|| FormattedText::parse(""));
        let rich_text = formatted
            .as_ref()
            .map(|f| f.text.clone())
            .unwrap_or_else(|| "\n".to_string());

        let mut layout = read_layout(doc, node);

        let kind = match type_name {
            "Text" => ControlKind::Text { text: display },
            "Edit" | "MaskedEdit" | "PathEdit" => ControlKind::Edit {
                variant: match type_name {
                    "MaskedEdit" => EditVariant::MaskedEdit,
                    "PathEdit" => EditVariant::PathEdit,
                    _ => EditVariant::Edit,
                },
                text: rich_text,
                multiline: element.has_yes_flag("Multiline"),
            },
            "ScrollableText" => ControlKind::ScrollableText { text: rich_text },
            "PushButton" => {
                if element.has_yes_flag("Bitmap") {
                    return Err(SkipReason::BitmapButtonNotSupported);
                }
                if element.has_yes_flag("Icon") {
                    return Err(SkipReason::IconButtonNotSupported);
                }
                if element.has_yes_flag("Image") {
                    return Err(SkipReason::ImageButtonNotSupported);
                }
                ControlKind::PushButton { text: display }
            }
            "CheckBox" => ControlKind::CheckBox {
                text: display,
                push_like: element.has_yes_flag("PushLike"),
            },
            "Line" => {
                layout.width = layout.width.map(|w| w.max(1.0));
                layout.height = layout.height.map(|h| h.max(1.0));
                ControlKind::Line
            }
            "ComboBox" => ControlKind::ComboBox {
                items: doc.combo_box_items(node),
                editable: !element.has_yes_flag("ComboList"),
            },
            "Bitmap" => ControlKind::Bitmap {
                source: formatted.map(|f| f.text),
            },
            "Icon" => ControlKind::Icon {
                source: formatted.map(|f| f.text),
            },
            "ProgressBar" => ControlKind::ProgressBar,
            "RadioButtonGroup" => ControlKind::RadioButtonGroup {
                buttons: doc
                    .radio_buttons(node)
                    .into_iter()
                    .map(|button| RadioButtonSpec {
                        value: doc.attribute(button, "Value").unwrap_or("").to_string(),
                        text: self
                            .formatted_text(doc, button)
                            .unwrap_or_else(|| FormattedText::parse("")),
                        layout: read_layout(doc, button),
                    })
                    .collect(),
            },
            other => ControlKind::Unsupported(other.to_string()),
        };

        if let ControlKind::Unsupported(name) = kind {
            return Err(SkipReason::UnknownType(name));
        }

        Ok(ControlSpec {
            id: id.to_string(),
            type_name: type_name.to_string(),
            node,
            position: doc.position(node),
            layout,
            kind,
            font,
        })
    }

    /// The full property set for a spec.
    pub fn properties(&self, spec: &ControlSpec) -> Option<VisualProperties> {
        Some(VisualProperties {
            layout: spec.layout.clone(),
            content: spec.kind.content()?,
            font: spec.font.clone(),
        })
    }

    /// Render `spec`, reusing `existing` when it has the same visual kind.
    ///
    /// Returns `None` only for unsupported kinds, which `classify` never
    /// produces.
    pub fn render<S: RenderSink>(
        &self,
        sink: &mut S,
        spec: &ControlSpec,
        existing: Option<(VisualHandle, VisualKind)>,
    ) -> Option<VisualHandle> {
        let kind = spec.visual_kind()?;
        let properties = self.properties(spec)?;

        let handle = match existing {
            Some((handle, existing_kind)) if existing_kind == kind => handle,
            _ => sink.create(kind),
        };
        sink.apply(handle, &properties);
        sink.set_tag(handle, spec.tag());
        Some(handle)
    }
}
