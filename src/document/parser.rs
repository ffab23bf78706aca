//! WiX dialog fragment parsing
//!
//! Loads XML into an owned element tree that keeps 1-based source positions,
//! and exposes the typed accessors the renderer needs.

use crate::error::{ParseError, RenderError};
use roxmltree::{Document, Node};

/// WiX v3 source namespace
pub const WIX_NAMESPACE: &str = "http://schemas.microsoft.com/wix/2006/wi";

/// WiX v3 localization namespace
pub const LOCALIZATION_NAMESPACE: &str = "http://schemas.microsoft.com/wix/2006/localization";

/// Element path of the single dialog, below the document root.
const DIALOG_PATH: [&str; 4] = ["Wix", "Fragment", "UI", "Dialog"];

/// Index of an element within a [`ParsedDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Position in source (1-based line and column of the element's `<`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct SourcePosition {
    pub line: u32,
    pub column: u32,
}

impl SourcePosition {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// One element of the parsed tree.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    /// Concatenated text of all descendants
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    position: Option<SourcePosition>,
}

impl XmlElement {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// True for an element named `name` in the given namespace.
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == Some(namespace)
    }

    pub fn is_wix(&self, name: &str) -> bool {
        self.is(WIX_NAMESPACE, name)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// The `Id` attribute, or an empty string.
    pub fn id(&self) -> &str {
        self.attribute("Id").unwrap_or("")
    }

    /// Numeric attribute value; `default` when missing or unparsable.
    pub fn double_attribute(&self, name: &str, default: f64) -> f64 {
        self.attribute(name)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
            .unwrap_or(default)
    }

    /// Like [`double_attribute`](Self::double_attribute) but `None` when unset.
    pub fn optional_double(&self, name: &str) -> Option<f64> {
        self.attribute(name)
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
    }

    /// `true` only for the literal `yes`, compared case-insensitively.
    pub fn has_yes_flag(&self, name: &str) -> bool {
        self.attribute(name)
            .is_some_and(|value| value.eq_ignore_ascii_case("yes"))
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn position(&self) -> Option<SourcePosition> {
        self.position
    }
}

/// A loaded XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDocument {
    elements: Vec<XmlElement>,
    root: Option<NodeId>,
}

impl ParsedDocument {
    /// Parse XML text, keeping whitespace and line information.
    pub fn load(text: &str) -> Result<Self, ParseError> {
        let doc = Document::parse(text).map_err(|e| ParseError::from_xml(&e))?;

        let mut parsed = ParsedDocument {
            elements: Vec::new(),
            root: None,
        };
        let root = parsed.push_element(&doc, doc.root_element(), None);
        parsed.root = Some(root);
        Ok(parsed)
    }

    fn push_element(&mut self, doc: &Document, node: Node, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.elements.len());
        let pos = doc.text_pos_at(node.range().start);

        let text: String = node
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();

        self.elements.push(XmlElement {
            name: node.tag_name().name().to_string(),
            namespace: node.tag_name().namespace().map(String::from),
            attributes: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            text,
            parent,
            children: Vec::new(),
            position: Some(SourcePosition::new(pos.row, pos.col)),
        });

        for child in node.children().filter(|c| c.is_element()) {
            let child_id = self.push_element(doc, child, Some(id));
            self.elements[id.0].children.push(child_id);
        }

        id
    }

    /// The document element.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Look up an element. Panics on an id from another document.
    pub fn element(&self, id: NodeId) -> &XmlElement {
        &self.elements[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&XmlElement> {
        self.elements.get(id.0)
    }

    /// Number of elements in the document.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Immediate element children of `parent` in the WiX namespace named `name`.
    pub fn wix_children<'a>(
        &'a self,
        parent: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.element(parent)
            .children
            .iter()
            .copied()
            .filter(move |&child| self.element(child).is_wix(name))
    }

    /// All elements at `Wix/Fragment/UI/Dialog`.
    pub fn dialog_nodes(&self) -> Vec<NodeId> {
        let Some(root) = self.root else {
            return Vec::new();
        };
        if !self.element(root).is_wix(DIALOG_PATH[0]) {
            return Vec::new();
        }

        let mut level = vec![root];
        for name in &DIALOG_PATH[1..] {
            level = level
                .iter()
                .flat_map(|&node| self.wix_children(node, name).collect::<Vec<_>>())
                .collect();
        }
        level
    }

    /// True when exactly one dialog exists at the fixed path.
    pub fn is_single_dialog_fragment(&self) -> bool {
        self.dialog_nodes().len() == 1
    }

    /// The single dialog element.
    ///
    /// Callers check [`is_single_dialog_fragment`](Self::is_single_dialog_fragment)
    /// first; zero or several dialogs are an error here.
    pub fn dialog_node(&self) -> Result<NodeId, RenderError> {
        match self.dialog_nodes().as_slice() {
            [dialog] => Ok(*dialog),
            _ => Err(RenderError::NotADialogFragment),
        }
    }

    /// The `UI` element that owns the dialog.
    pub fn ui_node(&self) -> Option<NodeId> {
        let dialog = self.dialog_node().ok()?;
        self.element(dialog).parent
    }

    /// Immediate `Control` children of `parent`, in document order.
    pub fn control_nodes(&self, parent: NodeId) -> Vec<NodeId> {
        self.wix_children(parent, "Control").collect()
    }

    /// Every control-bearing node of the dialog in document order: controls at
    /// any depth, radio button groups under controls, and their radio buttons.
    pub fn all_controls(&self) -> Vec<NodeId> {
        let Ok(dialog) = self.dialog_node() else {
            return Vec::new();
        };

        let mut result = Vec::new();
        self.collect_controls(dialog, &mut result);
        result
    }

    fn collect_controls(&self, node: NodeId, out: &mut Vec<NodeId>) {
        let parent = self.element(node);
        for &child in &parent.children {
            let element = self.element(child);
            let selected = element.is_wix("Control")
                || (element.is_wix("RadioButtonGroup") && parent.is_wix("Control"))
                || (element.is_wix("RadioButton") && parent.is_wix("RadioButtonGroup"));
            if selected {
                out.push(child);
            }
            self.collect_controls(child, out);
        }
    }

    /// Attribute value of `node`.
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node).attribute(name)
    }

    /// Numeric attribute of `node`, `default` when missing or unparsable.
    pub fn double_attribute(&self, node: NodeId, name: &str, default: f64) -> f64 {
        self.element(node).double_attribute(name, default)
    }

    pub fn has_yes_flag(&self, node: NodeId, name: &str) -> bool {
        self.element(node).has_yes_flag(name)
    }

    /// The `Text` attribute, or the value of a single nested `Text` element.
    ///
    /// The attribute wins when both are present. Several nested `Text`
    /// elements are ambiguous and yield `None`.
    pub fn text_value(&self, node: NodeId) -> Option<&str> {
        if let Some(text) = self.attribute(node, "Text") {
            return Some(text);
        }
        let mut texts = self.wix_children(node, "Text");
        match (texts.next(), texts.next()) {
            (Some(only), None) => Some(self.element(only).text()),
            _ => None,
        }
    }

    /// Items of a combo box, from `ComboBox/ListItem` `Text` (or `Value`).
    ///
    /// Sorted case-insensitively when the control is `Sorted`.
    pub fn combo_box_items(&self, node: NodeId) -> Vec<String> {
        let mut items: Vec<String> = self
            .wix_children(node, "ComboBox")
            .flat_map(|combo| self.wix_children(combo, "ListItem").collect::<Vec<_>>())
            .map(|item| {
                let element = self.element(item);
                element
                    .attribute("Text")
                    .or_else(|| element.attribute("Value"))
                    .unwrap_or("")
                    .to_string()
            })
            .collect();

        if self.has_yes_flag(node, "Sorted") {
            items.sort_by_key(|item| item.to_lowercase());
        }
        items
    }

    /// `RadioButton` elements nested in the control's `RadioButtonGroup`s.
    pub fn radio_buttons(&self, node: NodeId) -> Vec<NodeId> {
        self.wix_children(node, "RadioButtonGroup")
            .flat_map(|group| self.wix_children(group, "RadioButton").collect::<Vec<_>>())
            .collect()
    }

    /// The element's source position, if known.
    pub fn position(&self, node: NodeId) -> Option<SourcePosition> {
        self.get(node).and_then(|e| e.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="utf-8"?>
<Wix xmlns="{}">
  <Fragment>
    <UI>
{}
    </UI>
  </Fragment>
</Wix>"#,
            WIX_NAMESPACE, body
        )
    }

    fn dialog(controls: &str) -> String {
        wrap(&format!(
            r#"      <Dialog Id="Welcome" Width="370" Height="270" Title="Setup">
{}
      </Dialog>"#,
            controls
        ))
    }

    #[test]
    fn test_load_reports_parse_error() {
        let err = ParsedDocument::load("<Wix><Fragment></Wix>").unwrap_err();
        assert!(err.line >= 1);
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_single_dialog_fragment() {
        let doc = ParsedDocument::load(&dialog("")).unwrap();
        assert!(doc.is_single_dialog_fragment());
        let node = doc.dialog_node().unwrap();
        assert_eq!(doc.element(node).id(), "Welcome");
    }

    #[test]
    fn test_zero_dialogs_is_not_a_fragment() {
        let doc = ParsedDocument::load(&wrap("")).unwrap();
        assert!(!doc.is_single_dialog_fragment());
        assert_eq!(doc.dialog_node(), Err(RenderError::NotADialogFragment));
    }

    #[test]
    fn test_two_dialogs_is_not_a_fragment() {
        let doc = ParsedDocument::load(&wrap(
            r#"<Dialog Id="A" Width="1" Height="1" /><Dialog Id="B" Width="1" Height="1" />"#,
        ))
        .unwrap();
        assert!(!doc.is_single_dialog_fragment());
        assert!(doc.dialog_node().is_err());
    }

    #[test]
    fn test_dialog_outside_fixed_path_is_ignored() {
        let text = format!(
            r#"<Wix xmlns="{}"><Fragment><Dialog Id="A" /></Fragment></Wix>"#,
            WIX_NAMESPACE
        );
        let doc = ParsedDocument::load(&text).unwrap();
        assert!(!doc.is_single_dialog_fragment());
    }

    #[test]
    fn test_wrong_namespace_is_ignored() {
        let doc = ParsedDocument::load(
            r#"<Wix xmlns="http://wixtoolset.org/schemas/v4/wxs"><Fragment><UI><Dialog Id="A" /></UI></Fragment></Wix>"#,
        )
        .unwrap();
        assert!(!doc.is_single_dialog_fragment());
    }

    #[test]
    fn test_control_nodes_in_document_order() {
        let doc = ParsedDocument::load(&dialog(
            r#"<Control Id="C" Type="Text" />
<Control Id="A" Type="Text" />
<Publish Dialog="X" />
<Control Id="B" Type="Text" />"#,
        ))
        .unwrap();
        let dialog = doc.dialog_node().unwrap();
        let ids: Vec<&str> = doc
            .control_nodes(dialog)
            .into_iter()
            .map(|n| doc.element(n).id())
            .collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_all_controls_includes_radio_buttons() {
        let doc = ParsedDocument::load(&dialog(
            r#"<Control Id="Group" Type="RadioButtonGroup" Property="P">
  <RadioButtonGroup Property="P">
    <RadioButton Value="1" Text="One" />
    <RadioButton Value="2" Text="Two" />
  </RadioButtonGroup>
</Control>
<Control Id="Next" Type="PushButton" />"#,
        ))
        .unwrap();
        let names: Vec<&str> = doc
            .all_controls()
            .into_iter()
            .map(|n| doc.element(n).name())
            .collect();
        assert_eq!(
            names,
            vec!["Control", "RadioButtonGroup", "RadioButton", "RadioButton", "Control"]
        );
    }

    #[test]
    fn test_double_attribute() {
        let doc = ParsedDocument::load(&dialog(
            r#"<Control Id="A" Type="Text" X="12.5" Y="abc" Width=" 20 " />"#,
        ))
        .unwrap();
        let control = doc.control_nodes(doc.dialog_node().unwrap())[0];
        assert_eq!(doc.double_attribute(control, "X", 0.0), 12.5);
        assert_eq!(doc.double_attribute(control, "Y", 7.0), 7.0);
        assert_eq!(doc.double_attribute(control, "Height", 0.0), 0.0);
        assert_eq!(doc.double_attribute(control, "Width", 0.0), 20.0);
        assert_eq!(doc.element(control).optional_double("Height"), None);
    }

    #[test]
    fn test_has_yes_flag() {
        let doc = ParsedDocument::load(&dialog(
            r#"<Control Id="A" Type="Text" Hidden="Yes" Disabled="YES" Sunken="yes" Multiline="1" Sorted="true" />"#,
        ))
        .unwrap();
        let control = doc.control_nodes(doc.dialog_node().unwrap())[0];
        assert!(doc.has_yes_flag(control, "Hidden"));
        assert!(doc.has_yes_flag(control, "Disabled"));
        assert!(doc.has_yes_flag(control, "Sunken"));
        assert!(!doc.has_yes_flag(control, "Multiline"));
        assert!(!doc.has_yes_flag(control, "Sorted"));
        assert!(!doc.has_yes_flag(control, "RightAligned"));
    }

    #[test]
    fn test_text_value_attribute_wins() {
        let doc = ParsedDocument::load(&dialog(
            r#"<Control Id="A" Type="Text" Text="attr"><Text>child</Text></Control>
<Control Id="B" Type="Text"><Text>child text</Text></Control>
<Control Id="C" Type="Text" />"#,
        ))
        .unwrap();
        let controls = doc.control_nodes(doc.dialog_node().unwrap());
        assert_eq!(doc.text_value(controls[0]), Some("attr"));
        assert_eq!(doc.text_value(controls[1]), Some("child text"));
        assert_eq!(doc.text_value(controls[2]), None);
    }

    #[test]
    fn test_combo_box_items_sorted() {
        let doc = ParsedDocument::load(&dialog(
            r#"<Control Id="Combo" Type="ComboBox" Sorted="yes" Property="P">
  <ComboBox Property="P">
    <ListItem Value="b" Text="beta" />
    <ListItem Value="Alpha" />
    <ListItem Value="c" Text="Gamma" />
  </ComboBox>
</Control>"#,
        ))
        .unwrap();
        let control = doc.control_nodes(doc.dialog_node().unwrap())[0];
        assert_eq!(doc.combo_box_items(control), vec!["Alpha", "beta", "Gamma"]);
    }

    #[test]
    fn test_positions_are_one_based() {
        let text = format!(
            "<Wix xmlns=\"{}\">\n<Fragment>\n<UI>\n<Dialog Id=\"D\">\n  <Control Id=\"A\" />\n</Dialog>\n</UI>\n</Fragment>\n</Wix>",
            WIX_NAMESPACE
        );
        let doc = ParsedDocument::load(&text).unwrap();
        let dialog = doc.dialog_node().unwrap();
        assert_eq!(doc.position(dialog), Some(SourcePosition::new(4, 1)));
        let control = doc.control_nodes(dialog)[0];
        assert_eq!(doc.position(control), Some(SourcePosition::new(5, 3)));
    }

    #[test]
    fn test_ui_node() {
        let doc = ParsedDocument::load(&dialog("")).unwrap();
        let ui = doc.ui_node().unwrap();
        assert!(doc.element(ui).is_wix("UI"));
    }
}
