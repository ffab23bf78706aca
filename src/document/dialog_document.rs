//! One open dialog source file
//!
//! Text changes only mark the document dirty; the XML is reparsed lazily the
//! next time it is requested. A failed reparse keeps the last good tree.

use crate::document::parser::ParsedDocument;
use crate::error::{ParseError, RenderError};
use crate::logging::{DebugContext, SharedLog};
use std::path::{Path, PathBuf};

/// The parsed state of one source file attached to one editor view.
pub struct DialogDocument {
    path: PathBuf,
    text: String,
    xml: ParsedDocument,
    dirty: bool,
    last_error: Option<ParseError>,
    generation: u64,
    log: SharedLog,
}

impl std::fmt::Debug for DialogDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogDocument")
            .field("path", &self.path)
            .field("dirty", &self.dirty)
            .field("generation", &self.generation)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl DialogDocument {
    /// Attach to a file if its text is a single-dialog WiX UI fragment.
    pub fn open(path: impl Into<PathBuf>, text: String, log: SharedLog) -> Result<Self, RenderError> {
        let path = path.into();

        let xml = match ParsedDocument::load(&text) {
            Ok(xml) => xml,
            Err(e) => {
                log.log(
                    DebugContext::DOCUMENT | DebugContext::WIX | DebugContext::EXCEPTIONS,
                    &format!("Failed to parse document {}: {}", path.display(), e),
                );
                return Err(e.into());
            }
        };

        if !xml.is_single_dialog_fragment() {
            log.log(
                DebugContext::DOCUMENT | DebugContext::WIX,
                &format!("{} is not a valid WiX UI document.", path.display()),
            );
            return Err(RenderError::NotADialogFragment);
        }

        log.log(
            DebugContext::DOCUMENT,
            &format!("Creating document entry for {}.", path.display()),
        );

        Ok(Self {
            path,
            text,
            xml,
            dirty: false,
            last_error: None,
            generation: 0,
            log,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current text snapshot.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text snapshot. Parsing is deferred until [`xml`](Self::xml).
    pub fn set_text(&mut self, text: String) {
        self.text = text;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Bumped by every successful reparse. Node ids are only comparable
    /// within one generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The error of the most recent reparse, cleared by a successful one.
    pub fn last_error(&self) -> Option<&ParseError> {
        self.last_error.as_ref()
    }

    /// The parsed tree, reparsing first when the text changed.
    pub fn xml(&mut self) -> &ParsedDocument {
        if self.dirty {
            self.dirty = false;
            match ParsedDocument::load(&self.text) {
                Ok(xml) => {
                    self.xml = xml;
                    self.last_error = None;
                    self.generation += 1;
                }
                Err(e) => {
                    self.log.log(
                        DebugContext::DOCUMENT | DebugContext::WIX | DebugContext::EXCEPTIONS,
                        &format!("Failed to parse {}: {}", self.path.display(), e),
                    );
                    self.last_error = Some(e);
                }
            }
        }
        &self.xml
    }

    /// The tree as of the last parse, without reparsing.
    pub fn cached_xml(&self) -> &ParsedDocument {
        &self.xml
    }
}
