//! Dialog document model
//!
//! Parsing, typed accessors, localization, and the lazily reparsed document.

pub mod dialog_document;
pub mod localization;
pub mod parser;

pub use dialog_document::DialogDocument;
pub use localization::{FormattedText, LocalizationTable, TextEvaluator, TextStyle, TextStyles};
pub use parser::{NodeId, ParsedDocument, SourcePosition, XmlElement, LOCALIZATION_NAMESPACE, WIX_NAMESPACE};
