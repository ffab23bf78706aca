//! # wix-ui-designer
//!
//! Live preview core for WiX UI dialogs.
//!
//! Parses a `Wix/Fragment/UI/Dialog` source, renders its controls into a
//! pluggable [`RenderSink`], keeps visuals stable across edits by control
//! `Id`, maps the editor caret to the control under it and back, and
//! debounces bursts of edits into single updates.
//!
//! ## Features
//!
//! - Lazy reparse with last-good-tree fallback
//! - Closed set of control kinds; unsupported controls are skipped and logged
//! - Identity-preserving reconciliation of rendered controls
//! - Caret to control lookup and click-to-caret
//! - Debounce state machine over an injected scheduler
//! - `!(loc.Id)` localization and `TextStyle` fonts
//! - Background project analyzer
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use wix_ui_designer::{
//!     BufferEditor, DesignerConfig, DialogDesigner, MemorySink, NullLog, TextEvaluator,
//!     VirtualScheduler,
//! };
//!
//! let source = r#"<Wix xmlns="http://schemas.microsoft.com/wix/2006/wi">
//!   <Fragment><UI>
//!     <Dialog Id="Welcome" Width="370" Height="270" Title="Setup">
//!       <Control Id="Label1" Type="Text" Text="Hi" X="10" Y="10" />
//!     </Dialog>
//!   </UI></Fragment>
//! </Wix>"#;
//!
//! let designer = DialogDesigner::open(
//!     "Welcome.wxs",
//!     BufferEditor::new(source),
//!     MemorySink::new(),
//!     VirtualScheduler::new(),
//!     &DesignerConfig::default(),
//!     TextEvaluator::default(),
//!     Arc::new(NullLog),
//! )
//! .unwrap();
//!
//! assert_eq!(designer.rendered().ids(), &["Label1".to_string()]);
//! ```
//!
//! ## CLI Usage
//!
//! ```bash
//! # Render a dialog and print the visual tree
//! wix-ui-designer render WelcomeDlg.wxs --caret 12:5 --loc en-us.wxl
//!
//! # Re-render on every save
//! wix-ui-designer watch WelcomeDlg.wxs
//!
//! # Which control is at a position
//! wix-ui-designer locate WelcomeDlg.wxs 12 5
//!
//! # Analyse every .wxs/.wxl file of a project
//! wix-ui-designer analyze ./installer --format json
//! ```

pub mod coalescer;
pub mod config;
pub mod controls;
pub mod designer;
pub mod document;
pub mod error;
pub mod logging;
pub mod position;
pub mod project;
pub mod reconcile;
pub mod render;
pub mod watch;

pub use coalescer::{ChangeCoalescer, ChangeKind, DeadlineScheduler, Scheduler, TimerToken, UpdateKind, UpdatePlan, VirtualScheduler};
pub use config::{DesignerConfig, PanelPosition};
pub use controls::{ControlKind, ControlSpec, ControlTypeRegistry};
pub use designer::{BufferEditor, DialogDesigner, EditorView, PanelLayout, Zoom};
pub use document::{DialogDocument, LocalizationTable, NodeId, ParsedDocument, SourcePosition, TextEvaluator};
pub use error::{ConfigError, ParseError, RenderError, SkipReason};
pub use logging::{DebugContext, DesignerLog, MemoryLog, NullLog, SharedLog, TracingLog};
pub use position::{find_control_at, source_position};
pub use project::{FileReport, FileSummary, ProjectRegistry, WixProject};
pub use reconcile::{reconcile, ReconcilePlan, RenderedControl, RenderedSet};
pub use render::{MemorySink, RenderSink, VisualHandle, VisualKind};
pub use watch::FileWatcher;
