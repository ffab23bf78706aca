//! Localized strings and formatted text
//!
//! Control text may reference `!(loc.Name)` strings from `.wxl` files and
//! may start with a `{\Style}` or `{&Style}` prefix that selects a
//! `TextStyle` declared in the `UI` element.

use crate::document::parser::{ParsedDocument, LOCALIZATION_NAMESPACE};
use crate::error::ParseError;
use regex::{Captures, Regex};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::LazyLock;

/// `!(loc.Name)` reference; the name runs up to the first `)`.
static LOC_REFERENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"!\(loc\.([^)]*)\)").unwrap());

/// Strings shipped with the stock WixUI dialog set (en-us).
const BUILTIN_STRINGS: &[(&str, &str)] = &[
    ("WixUIBack", "&Back"),
    ("WixUINext", "&Next"),
    ("WixUICancel", "Cancel"),
    ("WixUIFinish", "&Finish"),
    ("WixUIRetry", "&Retry"),
    ("WixUIIgnore", "&Ignore"),
    ("WixUIYes", "&Yes"),
    ("WixUINo", "&No"),
    ("WixUIOK", "OK"),
    ("WixUIPrint", "&Print"),
    ("WixUIBrowse", "B&rowse..."),
    ("WixUIInstall", "&Install"),
    ("WixUIRepair", "&Repair"),
    ("WixUIRemove", "&Remove"),
    ("WixUIChange", "&Change..."),
    ("WelcomeDlg_Title", "[ProductName] Setup"),
    ("WelcomeDlgTitle", "{\\WixUI_Font_Bigger}Welcome to the [ProductName] Setup Wizard"),
    (
        "WelcomeDlgDescription",
        "The Setup Wizard will install [ProductName] on your computer. Click Next to continue or Cancel to exit the Setup Wizard.",
    ),
    ("ExitDialog_Title", "[ProductName] Setup"),
    ("ExitDialogTitle", "{\\WixUI_Font_Bigger}Completed the [ProductName] Setup Wizard"),
    ("ExitDialogDescription", "Click the Finish button to exit the Setup Wizard."),
    ("LicenseAgreementDlg_Title", "[ProductName] Setup"),
    ("LicenseAgreementDlgTitle", "{\\WixUI_Font_Title}End-User License Agreement"),
    (
        "LicenseAgreementDlgDescription",
        "Please read the following license agreement carefully",
    ),
    (
        "LicenseAgreementDlgLicenseAcceptedCheckBox",
        "I &accept the terms in the License Agreement",
    ),
    ("InstallDirDlg_Title", "[ProductName] Setup"),
    ("InstallDirDlgTitle", "{\\WixUI_Font_Title}Destination Folder"),
    (
        "InstallDirDlgDescription",
        "Click Next to install to the default folder or click Change to choose another.",
    ),
    ("InstallDirDlgFolderLabel", "Install [ProductName] to:"),
    ("ProgressDlg_Title", "[ProductName] Setup"),
    ("ProgressDlgTitleInstalling", "{\\WixUI_Font_Title}Installing [ProductName]"),
    ("ProgressDlgStatusLabel", "Status:"),
];

/// Strings keyed by Id, from one or more `WixLocalization` documents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizationTable {
    strings: HashMap<String, String>,
}

impl LocalizationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock WixUI strings.
    pub fn builtin() -> Self {
        Self {
            strings: BUILTIN_STRINGS
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Parse a `.wxl` document. Blank Ids are skipped, later duplicates win.
    pub fn from_wxl(text: &str) -> Result<Self, ParseError> {
        let doc = ParsedDocument::load(text)?;
        let mut table = Self::new();
        table.merge_document(&doc);
        Ok(table)
    }

    fn merge_document(&mut self, doc: &ParsedDocument) {
        let Some(root) = doc.root() else {
            return;
        };
        if !doc.element(root).is(LOCALIZATION_NAMESPACE, "WixLocalization") {
            return;
        }
        for &child in doc.element(root).children() {
            let element = doc.element(child);
            if !element.is(LOCALIZATION_NAMESPACE, "String") {
                continue;
            }
            let id = element.id();
            if id.trim().is_empty() {
                continue;
            }
            self.strings.insert(id.to_string(), element.text().to_string());
        }
    }

    /// Add all strings of `other`, replacing existing keys.
    pub fn extend(&mut self, other: LocalizationTable) {
        self.strings.extend(other.strings);
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.strings.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

/// Resolves localization references, user tables before the built-in set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEvaluator {
    user: LocalizationTable,
    builtin: LocalizationTable,
}

impl Default for TextEvaluator {
    fn default() -> Self {
        Self {
            user: LocalizationTable::new(),
            builtin: LocalizationTable::builtin(),
        }
    }
}

impl TextEvaluator {
    pub fn new(user: LocalizationTable) -> Self {
        Self {
            user,
            builtin: LocalizationTable::builtin(),
        }
    }

    pub fn add_table(&mut self, table: LocalizationTable) {
        self.user.extend(table);
    }

    pub fn lookup(&self, id: &str) -> Option<&str> {
        self.user.get(id).or_else(|| self.builtin.get(id))
    }

    /// Replace every `!(loc.Name)` with its string. Unknown names stay verbatim.
    pub fn evaluate(&self, text: &str) -> String {
        LOC_REFERENCE
            .replace_all(text, |caps: &Captures| match self.lookup(&caps[1]) {
                Some(value) => value.to_string(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Evaluate then split off a leading text style reference.
    pub fn evaluate_formatted(&self, text: &str) -> FormattedText {
        FormattedText::parse(&self.evaluate(text))
    }
}

/// Display text with the text style it selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedText {
    pub style: Option<String>,
    pub text: String,
}

impl FormattedText {
    /// Split a `{\Style}` / `{&Style}` prefix from `text`.
    pub fn parse(text: &str) -> Self {
        let prefix = text.strip_prefix("{\\").or_else(|| text.strip_prefix("{&"));
        if let Some(rest) = prefix {
            if let Some(end) = rest.find('}') {
                let style = &rest[..end];
                if !style.is_empty() {
                    return Self {
                        style: Some(style.to_string()),
                        text: rest[end + 1..].to_string(),
                    };
                }
            }
        }
        Self {
            style: None,
            text: text.to_string(),
        }
    }
}

/// A font as declared by a `TextStyle` element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub face: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub strike: bool,
    pub underline: bool,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            face: "Tahoma".to_string(),
            size: 8.0,
            bold: false,
            italic: false,
            strike: false,
            underline: false,
            red: 0,
            green: 0,
            blue: 0,
        }
    }
}

/// `TextStyle` declarations of a dialog fragment, keyed by Id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextStyles {
    styles: HashMap<String, TextStyle>,
}

impl TextStyles {
    /// Collect `TextStyle` elements under the dialog's `UI` element.
    pub fn from_document(doc: &ParsedDocument) -> Self {
        let mut styles = HashMap::new();
        if let Some(ui) = doc.ui_node() {
            for node in doc.wix_children(ui, "TextStyle") {
                let element = doc.element(node);
                let id = element.id();
                if id.is_empty() {
                    continue;
                }
                let defaults = TextStyle::default();
                let color = |name: &str| {
                    element
                        .attribute(name)
                        .and_then(|v| v.trim().parse::<u8>().ok())
                        .unwrap_or(0)
                };
                styles.insert(
                    id.to_string(),
                    TextStyle {
                        face: element
                            .attribute("FaceName")
                            .map(String::from)
                            .unwrap_or(defaults.face),
                        size: element.double_attribute("Size", defaults.size),
                        bold: element.has_yes_flag("Bold"),
                        italic: element.has_yes_flag("Italic"),
                        strike: element.has_yes_flag("Strike"),
                        underline: element.has_yes_flag("Underline"),
                        red: color("Red"),
                        green: color("Green"),
                        blue: color("Blue"),
                    },
                );
            }
        }
        Self { styles }
    }

    /// Resolve a style reference, falling back to the default font.
    pub fn resolve(&self, style: Option<&str>) -> TextStyle {
        style
            .and_then(|id| self.styles.get(id))
            .cloned()
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}
