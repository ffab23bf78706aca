//! Background analysis of a WiX project
//!
//! Opening a project queues every `.wxs` / `.wxl` file below its root and
//! starts one analyzer thread that works through the queue. The queue is
//! closed up front, so the thread ends when it runs dry or when the project
//! is cancelled, whichever comes first.

use crate::document::{LocalizationTable, ParsedDocument};
use crate::logging::{DebugContext, SharedLog};
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::thread::JoinHandle;
use walkdir::WalkDir;

/// File extensions the analyzer looks at.
const ANALYSABLE_EXTENSIONS: [&str; 2] = ["wxs", "wxl"];

/// What the analyzer found in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FileSummary {
    /// A single-dialog UI fragment
    Dialog { id: String, controls: usize },
    /// Any other WiX source
    Source,
    Localization { strings: usize },
    Failed { error: String },
}

/// Result for one analysed file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub summary: FileSummary,
}

/// Files below `root` the analyzer handles, sorted.
pub fn find_analysable_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    ANALYSABLE_EXTENSIONS
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                })
        })
        .collect();
    files.sort();
    files
}

/// Summarise one file.
pub fn analyze_file(path: &Path) -> FileSummary {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            return FileSummary::Failed {
                error: e.to_string(),
            }
        }
    };

    let is_localization = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wxl"));

    if is_localization {
        return match LocalizationTable::from_wxl(&text) {
            Ok(table) => FileSummary::Localization {
                strings: table.len(),
            },
            Err(e) => FileSummary::Failed {
                error: e.to_string(),
            },
        };
    }

    match ParsedDocument::load(&text) {
        Ok(doc) => match doc.dialog_node() {
            Ok(dialog) => FileSummary::Dialog {
                id: doc.element(dialog).id().to_string(),
                controls: doc.control_nodes(dialog).len(),
            },
            Err(_) => FileSummary::Source,
        },
        Err(e) => FileSummary::Failed {
            error: e.to_string(),
        },
    }
}

/// One project with its running analyzer.
pub struct WixProject {
    name: String,
    root: PathBuf,
    files: Vec<PathBuf>,
    cancel: Option<Sender<()>>,
    reports: Receiver<FileReport>,
    analyzer: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for WixProject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WixProject")
            .field("name", &self.name)
            .field("root", &self.root)
            .field("files", &self.files.len())
            .finish()
    }
}

impl WixProject {
    /// Queue the project's files and start analysing them.
    pub fn open(root: impl Into<PathBuf>, log: SharedLog) -> Self {
        let root = root.into();
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.display().to_string());

        let files = find_analysable_files(&root);

        let mut message = format!("Analyzing project {}:", name);
        let (queue_tx, queue_rx) = unbounded::<PathBuf>();
        for file in &files {
            message.push('\n');
            message.push_str(&file.display().to_string());
            // The receiver is alive here, so sending cannot fail.
            let _ = queue_tx.send(file.clone());
        }
        drop(queue_tx);
        log.log(DebugContext::WIX | DebugContext::DOCUMENT, &message);

        let (cancel_tx, cancel_rx) = unbounded::<()>();
        let (report_tx, report_rx) = unbounded::<FileReport>();

        let thread_name = name.clone();
        let thread_log = log.clone();
        let analyzer = std::thread::Builder::new()
            .name(format!("analyzer-{}", name))
            .spawn(move || analyze_queue(&thread_name, queue_rx, cancel_rx, report_tx, thread_log));

        let analyzer = match analyzer {
            Ok(handle) => Some(handle),
            Err(e) => {
                log.error(&format!("Failed to start analyzer for {}: {}", name, e));
                None
            }
        };

        Self {
            name,
            root,
            files,
            cancel: Some(cancel_tx),
            reports: report_rx,
            analyzer,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files queued for analysis.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Ask the analyzer to stop after the current file.
    pub fn cancel(&mut self) {
        self.cancel.take();
    }

    /// Reports produced so far.
    pub fn reports(&self) -> Vec<FileReport> {
        self.reports.try_iter().collect()
    }

    /// Wait for the analyzer to finish and return every report.
    pub fn finish(mut self) -> Vec<FileReport> {
        self.join();
        self.reports.try_iter().collect()
    }

    fn join(&mut self) {
        if let Some(handle) = self.analyzer.take() {
            if handle.join().is_err() {
                tracing::error!("Analyzer thread of {} panicked", self.name);
            }
        }
    }
}

impl Drop for WixProject {
    fn drop(&mut self) {
        self.cancel();
        self.join();
    }
}

/// Outcome of one wait on the queue.
enum Next {
    File(PathBuf),
    Completed,
    Cancelled,
}

fn analyze_queue(
    name: &str,
    queue: Receiver<PathBuf>,
    cancel: Receiver<()>,
    reports: Sender<FileReport>,
    log: SharedLog,
) {
    loop {
        let next = select! {
            recv(cancel) -> _ => Next::Cancelled,
            recv(queue) -> file => match file {
                Ok(file) => Next::File(file),
                Err(_) => Next::Completed,
            },
        };

        let file = match next {
            Next::File(file) => file,
            Next::Completed => break,
            Next::Cancelled => {
                log.log(DebugContext::WIX, &format!("Analyzer of {} cancelled.", name));
                break;
            }
        };

        log.log(
            DebugContext::WIX,
            &format!("Analyzer of {} analyzing {}.", name, file.display()),
        );
        let summary = analyze_file(&file);
        if let FileSummary::Failed { error } = &summary {
            log.log(
                DebugContext::WIX | DebugContext::EXCEPTIONS,
                &format!("Analyzer of {} failed on {}: {}", name, file.display(), error),
            );
        }
        if reports.send(FileReport { path: file, summary }).is_err() {
            break;
        }
    }
}

/// Open projects keyed by root directory.
#[derive(Debug, Default)]
pub struct ProjectRegistry {
    projects: HashMap<PathBuf, WixProject>,
}

impl ProjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The project at `root`, opening it on first use.
    pub fn get_or_open(&mut self, root: &Path, log: &SharedLog) -> &mut WixProject {
        self.projects
            .entry(root.to_path_buf())
            .or_insert_with(|| WixProject::open(root, log.clone()))
    }

    pub fn get(&self, root: &Path) -> Option<&WixProject> {
        self.projects.get(root)
    }

    /// Close a project, returning its reports.
    pub fn close(&mut self, root: &Path) -> Option<Vec<FileReport>> {
        self.projects.remove(root).map(WixProject::finish)
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}
