//! Live dialog preview attached to one editor view
//!
//! The designer owns the document, the rendered set and the coalescer.
//! Host events go in through the `on_*` methods; timers come back through
//! [`DialogDesigner::on_timer`]. Every render cycle is a failure boundary:
//! errors are logged and the previous visuals stay as they were.

pub mod editor;
pub mod panel;

pub use editor::{BufferEditor, EditorView};
pub use panel::{PanelLayout, Zoom};

use crate::coalescer::{ChangeCoalescer, ChangeKind, DeadlineScheduler, Scheduler, TimerToken, UpdateKind, UpdatePlan, VirtualScheduler};
use crate::config::{DesignerConfig, PanelPosition};
use crate::controls::ControlTypeRegistry;
use crate::document::{DialogDocument, LocalizationTable, NodeId, ParsedDocument, TextEvaluator, TextStyles};
use crate::error::{ConfigError, RenderError};
use crate::logging::{DebugContext, SharedLog};
use crate::position::find_control_at;
use crate::reconcile::{self, ReconcilePlan, RenderedSet};
use crate::render::{DialogFrame, RenderSink, VisualHandle, VisualTag};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Width and height of the dialog. Both must be positive integers.
pub fn dialog_size(doc: &ParsedDocument, dialog: NodeId) -> Result<(u32, u32), RenderError> {
    let read = |name: &str| {
        doc.attribute(dialog, name)
            .and_then(|value| value.trim().parse::<u32>().ok())
            .filter(|value| *value > 0)
            .ok_or(RenderError::InvalidDialogSize)
    };
    Ok((read("Width")?, read("Height")?))
}

/// Preview of one dialog document.
pub struct DialogDesigner<S: RenderSink, E: EditorView, T: Scheduler> {
    document: DialogDocument,
    editor: E,
    sink: S,
    scheduler: T,
    registry: ControlTypeRegistry,
    coalescer: ChangeCoalescer,
    rendered: RenderedSet,
    last_plan: Option<ReconcilePlan>,
    selected: Option<NodeId>,
    zoom: Zoom,
    panel: PanelLayout,
    log: SharedLog,
    closed: bool,
}

impl<S: RenderSink, E: EditorView, T: Scheduler> DialogDesigner<S, E, T> {
    /// Attach to an editor showing `path`, and render it once.
    ///
    /// Fails when the text is not a single-dialog WiX UI fragment; the
    /// designer then does not attach.
    pub fn open(
        path: impl Into<PathBuf>,
        editor: E,
        sink: S,
        scheduler: T,
        config: &DesignerConfig,
        evaluator: TextEvaluator,
        log: SharedLog,
    ) -> Result<Self, RenderError> {
        let document = DialogDocument::open(path, editor.text(), log.clone())?;

        let position = config.panel_position();
        let panel = PanelLayout::new(
            position,
            config.panel_size(),
            editor.viewport_extent(position.is_horizontal()),
            0.0,
        );

        let mut designer = Self {
            document,
            editor,
            sink,
            scheduler,
            registry: ControlTypeRegistry::new(evaluator),
            coalescer: ChangeCoalescer::from_config(config),
            rendered: RenderedSet::new(),
            last_plan: None,
            selected: None,
            zoom: Zoom::default(),
            panel,
            log,
            closed: false,
        };

        designer.log.log(
            DebugContext::MARGIN,
            &format!(
                "Creating margin for {} (viewport: {}, margin: {}).",
                designer.file_name(),
                designer.editor.viewport_extent(position.is_horizontal()),
                designer.panel.extent()
            ),
        );
        designer.update_controls();
        designer.update_selection();
        Ok(designer)
    }

    fn file_name(&self) -> String {
        self.document.path().display().to_string()
    }

    pub fn document(&self) -> &DialogDocument {
        &self.document
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }

    /// Mutable editor access; report changes through `on_text_changed` /
    /// `on_caret_moved` afterwards.
    pub fn editor_mut(&mut self) -> &mut E {
        &mut self.editor
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn scheduler(&self) -> &T {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut T {
        &mut self.scheduler
    }

    pub fn coalescer(&self) -> &ChangeCoalescer {
        &self.coalescer
    }

    pub fn rendered(&self) -> &RenderedSet {
        &self.rendered
    }

    /// The plan of the last successful render pass.
    pub fn last_plan(&self) -> Option<&ReconcilePlan> {
        self.last_plan.as_ref()
    }

    /// Selected control-bearing node of the current tree.
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Id of the selected node, or its name for nodes without one.
    pub fn selected_id(&self) -> Option<String> {
        let node = self.selected?;
        let element = self.document.cached_xml().get(node)?;
        let id = element.id();
        Some(if id.is_empty() { element.name().to_string() } else { id.to_string() })
    }

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn panel(&self) -> PanelLayout {
        self.panel
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// The editor text changed.
    pub fn on_text_changed(&mut self) {
        if self.closed {
            return;
        }
        self.document.set_text(self.editor.text());
        self.coalescer.notify(ChangeKind::DOCUMENT, &mut self.scheduler);
    }

    /// The caret moved.
    pub fn on_caret_moved(&mut self) {
        if self.closed {
            return;
        }
        self.coalescer.notify(ChangeKind::SELECTION, &mut self.scheduler);
    }

    /// Something outside the text changed how the dialog renders.
    pub fn on_structure_changed(&mut self) {
        if self.closed {
            return;
        }
        self.coalescer.notify(ChangeKind::STRUCTURE, &mut self.scheduler);
    }

    /// Add localized strings and schedule a re-render.
    pub fn add_localization(&mut self, table: LocalizationTable) {
        self.registry.add_localization(table);
        self.on_structure_changed();
    }

    /// Change the debounce interval. A zero delay is rejected.
    pub fn set_update_delay(&mut self, delay: Duration) -> Result<(), ConfigError> {
        self.coalescer.set_delay(delay)
    }

    /// A scheduled timer fired. Returns the work that ran.
    pub fn on_timer(&mut self, token: TimerToken) -> Option<UpdateKind> {
        if self.closed {
            return None;
        }
        let plan = self.coalescer.fire(token)?;
        self.run(plan);
        self.coalescer.finish();
        Some(plan.kind())
    }

    fn run(&mut self, plan: UpdatePlan) {
        if plan.reconcile {
            self.update_controls();
        }
        if plan.refresh_selection {
            self.update_selection();
        }
    }

    /// Render the document now, bypassing the timer.
    pub fn update_controls(&mut self) {
        if self.closed {
            return;
        }
        self.log.log(
            DebugContext::MARGIN,
            &format!("Updating controls for {}.", self.file_name()),
        );
        if let Err(e) = self.try_update_controls() {
            self.log.log(
                DebugContext::MARGIN | DebugContext::WIX | DebugContext::EXCEPTIONS,
                &format!("Failed to render WiX UI document: {}", e),
            );
        }
    }

    fn try_update_controls(&mut self) -> Result<(), RenderError> {
        self.document.xml();
        if let Some(error) = self.document.last_error() {
            return Err(error.clone().into());
        }
        let generation = self.document.generation();
        let xml = self.document.cached_xml();

        let dialog = xml.dialog_node()?;
        let (width, height) = dialog_size(xml, dialog)?;

        self.registry.set_styles(TextStyles::from_document(xml));
        let element = xml.element(dialog);
        let title = self
            .registry
            .evaluator()
            .evaluate_formatted(element.attribute("Title").unwrap_or(""));
        let frame = DialogFrame {
            id: element.id().to_string(),
            width,
            height,
            font: self.registry.styles().resolve(title.style.as_deref()),
            title,
            tag: VisualTag {
                node: dialog,
                id: element.id().to_string(),
                position: element.position(),
            },
        };

        let nodes = xml.control_nodes(dialog);
        let (specs, skipped) =
            reconcile::classify_controls(&self.registry, xml, &nodes, self.log.as_ref());
        let mut plan = reconcile::reconcile(&self.rendered, specs);
        plan.skipped = skipped;

        for id in &plan.duplicates {
            self.log.log(
                DebugContext::MARGIN | DebugContext::WIX,
                &format!("Control id {} is declared more than once; the last declaration wins.", id),
            );
        }

        self.sink.set_dialog(&frame);
        self.sink.set_scale(self.zoom.scale());
        let previous = std::mem::take(&mut self.rendered);
        self.rendered = reconcile::apply(
            &plan,
            previous,
            &mut self.sink,
            &self.registry,
            generation,
            self.log.as_ref(),
        );

        self.log.log(
            DebugContext::MARGIN,
            &format!(
                "Rendered {} controls for {} ({} created, {} removed, {} skipped).",
                self.rendered.len(),
                self.file_name(),
                plan.to_create.len(),
                plan.to_remove.len(),
                plan.skipped.len()
            ),
        );
        self.last_plan = Some(plan);

        // Visuals may have been recreated under the selection.
        self.show_selection();
        Ok(())
    }

    /// Recompute the selected node from the caret.
    pub fn update_selection(&mut self) {
        if self.closed {
            return;
        }
        let caret = self.editor.caret();
        let next = find_control_at(self.document.xml(), caret.line, caret.column);
        if next == self.selected {
            self.show_selection();
            return;
        }
        self.selected = next;

        let id = self.selected_id().unwrap_or_default();
        self.log.log(
            DebugContext::MARGIN,
            &format!("Selected control in {} changed to ({}).", self.file_name(), id),
        );
        self.show_selection();
    }

    /// The visual showing `node`: its own, or the nearest rendered ancestor's
    /// (radio buttons render inside their group's control).
    fn visual_for(&self, node: NodeId) -> Option<VisualHandle> {
        if self.rendered.generation() != self.document.generation() {
            return None;
        }
        let xml = self.document.cached_xml();
        let mut current = Some(node);
        while let Some(n) = current {
            if let Some(rendered) = self.rendered.find_by_node(n) {
                return Some(rendered.handle);
            }
            current = xml.get(n).and_then(|e| e.parent());
        }
        None
    }

    fn show_selection(&mut self) {
        let handle = self.selected.and_then(|node| self.visual_for(node));
        self.sink.show_selection(handle);
    }

    /// Visual currently outlined as selected.
    pub fn selected_visual(&self) -> Option<VisualHandle> {
        self.selected.and_then(|node| self.visual_for(node))
    }

    /// A visual was clicked: move the caret to its source element.
    ///
    /// Returns `false` when the visual carries no source position.
    pub fn click_to_caret(&mut self, handle: VisualHandle) -> bool {
        if self.closed {
            return false;
        }
        let Some(tag) = self.sink.tag(handle) else {
            return false;
        };
        let Some(position) = tag.position else {
            return false;
        };
        let id = tag.id.clone();

        self.log.log(
            DebugContext::MARGIN,
            &format!(
                "Control {} clicked, setting caret to ({}, {}).",
                id, position.line, position.column
            ),
        );
        self.editor.move_caret_to(position);
        self.editor.ensure_visible(position);
        self.on_caret_moved();
        true
    }

    /// Ctrl+wheel zoom. Returns the new scale when the zoom changed.
    pub fn on_wheel(&mut self, delta: i32, ctrl: bool) -> Option<f64> {
        if delta == 0 || !ctrl || self.closed {
            return None;
        }
        let change = self.zoom.wheel(delta)?;
        let scale = self.zoom.scale();
        self.sink.set_scale(scale);
        self.log.log(
            DebugContext::MARGIN,
            &format!("Rescaling by {} to {}.", change, scale),
        );
        Some(scale)
    }

    /// Dock the panel on another side.
    pub fn redock(&mut self, position: PanelPosition, current_width: f64, current_height: f64) {
        self.panel.redock(position, current_width, current_height);
        self.log.log(
            DebugContext::MARGIN,
            &format!(
                "Moving panel for {} to {:?} (size {}).",
                self.file_name(),
                position,
                self.panel.extent()
            ),
        );
    }

    /// Detach from the editor: stop the timer and drop every visual.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.log.log(
            DebugContext::MARGIN,
            &format!("Closing margin for {}.", self.file_name()),
        );
        self.coalescer.cancel(&mut self.scheduler);
        for handle in self.rendered.handles() {
            self.sink.remove(handle);
        }
        self.rendered = RenderedSet::new();
        self.sink.show_selection(None);
    }
}

impl<S: RenderSink, E: EditorView> DialogDesigner<S, E, VirtualScheduler> {
    /// Advance the virtual clock and run every timer that came due.
    pub fn advance(&mut self, by: Duration) -> Vec<UpdateKind> {
        let due = self.scheduler.advance(by);
        due.into_iter().filter_map(|token| self.on_timer(token)).collect()
    }
}

impl<S: RenderSink, E: EditorView> DialogDesigner<S, E, DeadlineScheduler> {
    /// Run every timer due at `now`.
    pub fn poll(&mut self, now: Instant) -> Vec<UpdateKind> {
        let due = self.scheduler.due(now);
        due.into_iter().filter_map(|token| self.on_timer(token)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{SourcePosition, WIX_NAMESPACE};
    use crate::logging::MemoryLog;
    use crate::render::{MemorySink, DIALOG_HANDLE};
    use std::sync::Arc;

    type TestDesigner = DialogDesigner<MemorySink, BufferEditor, VirtualScheduler>;

    const DELAY: Duration = Duration::from_millis(300);

    fn source(size: &str, controls: &str) -> String {
        format!(
            "<Wix xmlns=\"{}\">\n<Fragment>\n<UI>\n<Dialog Id=\"Welcome\" {} Title=\"[ProductName] Setup\">\n{}\n</Dialog>\n</UI>\n</Fragment>\n</Wix>",
            WIX_NAMESPACE, size, controls
        )
    }

    const TWO: &str = "<Control Id=\"Label1\" Type=\"Text\" Text=\"Hi\" X=\"10\" Y=\"10\" />\n<Control Id=\"Btn1\" Type=\"PushButton\" Text=\"OK\" X=\"10\" Y=\"40\" />";

    fn open(text: String) -> (TestDesigner, Arc<MemoryLog>) {
        let log = Arc::new(MemoryLog::new());
        let designer = DialogDesigner::open(
            "Welcome.wxs",
            BufferEditor::new(text),
            MemorySink::new(),
            VirtualScheduler::new(),
            &DesignerConfig::default(),
            TextEvaluator::default(),
            log.clone(),
        )
        .unwrap();
        (designer, log)
    }

    fn edit(designer: &mut TestDesigner, text: String) {
        designer.editor_mut().set_text(text);
        designer.on_text_changed();
    }

    #[test]
    fn test_dialog_size() {
        let doc = ParsedDocument::load(&source("Width=\"370\" Height=\"270\"", "")).unwrap();
        assert_eq!(dialog_size(&doc, doc.dialog_node().unwrap()), Ok((370, 270)));

        for size in ["Width=\"370\"", "Width=\"0\" Height=\"1\"", "Width=\"a\" Height=\"1\"", "Width=\"-5\" Height=\"1\""] {
            let doc = ParsedDocument::load(&source(size, "")).unwrap();
            assert_eq!(
                dialog_size(&doc, doc.dialog_node().unwrap()),
                Err(RenderError::InvalidDialogSize),
                "{}",
                size
            );
        }
    }

    #[test]
    fn test_open_renders_immediately() {
        let (designer, _) = open(source("Width=\"370\" Height=\"270\"", TWO));
        let dialog = designer.sink().dialog().unwrap();
        assert_eq!((dialog.width, dialog.height), (370, 270));
        assert_eq!(dialog.title.text, "[ProductName] Setup");
        assert_eq!(designer.rendered().ids(), &["Label1".to_string(), "Btn1".to_string()]);
    }

    #[test]
    fn test_open_rejects_non_dialog_documents() {
        let log = Arc::new(MemoryLog::new());
        let result = TestDesigner::open(
            "Product.wxs",
            BufferEditor::new(format!("<Wix xmlns=\"{}\"><Product /></Wix>", WIX_NAMESPACE)),
            MemorySink::new(),
            VirtualScheduler::new(),
            &DesignerConfig::default(),
            TextEvaluator::default(),
            log,
        );
        assert!(matches!(result, Err(RenderError::NotADialogFragment)));
    }

    #[test]
    fn test_edits_are_debounced() {
        let (mut designer, _) = open(source("Width=\"370\" Height=\"270\"", TWO));
        let created = designer.sink().created_count();

        for width in 300..305 {
            edit(&mut designer, source(&format!("Width=\"{}\" Height=\"270\"", width), TWO));
            assert!(designer.advance(Duration::from_millis(100)).is_empty());
        }
        assert_eq!(designer.sink().dialog().unwrap().width, 370);

        assert_eq!(designer.advance(DELAY), vec![UpdateKind::FullRebuild]);
        assert_eq!(designer.sink().dialog().unwrap().width, 304);
        assert_eq!(designer.sink().created_count(), created);
    }

    #[test]
    fn test_invalid_size_keeps_previous_visuals() {
        let (mut designer, log) = open(source("Width=\"370\" Height=\"270\"", TWO));
        let before = designer.sink().children();

        edit(&mut designer, source("Width=\"370\"", "<Control Id=\"Other\" Type=\"Text\" />"));
        designer.advance(DELAY);

        assert_eq!(designer.sink().children(), before);
        assert_eq!(designer.sink().dialog().unwrap().height, 270);
        assert!(log.contains("Failed to render WiX UI document: The dialog node has invalid size attributes."));
    }

    #[test]
    fn test_malformed_xml_keeps_previous_visuals() {
        let (mut designer, log) = open(source("Width=\"370\" Height=\"270\"", TWO));
        let before = designer.sink().children();

        edit(&mut designer, "<Wix><Fragment>".to_string());
        designer.advance(DELAY);
        assert_eq!(designer.sink().children(), before);
        assert!(log.contains("Failed to render WiX UI document: Failed to parse XML"));

        edit(&mut designer, source("Width=\"370\" Height=\"270\"", "<Control Id=\"Btn1\" Type=\"PushButton\" />"));
        designer.advance(DELAY);
        assert_eq!(designer.rendered().ids(), &["Btn1".to_string()]);
    }

    #[test]
    fn test_caret_selects_control() {
        let (mut designer, log) = open(source("Width=\"370\" Height=\"270\"", TWO));
        assert_eq!(designer.selected(), None);

        designer.editor_mut().move_caret_to(SourcePosition::new(6, 3));
        designer.on_caret_moved();
        assert_eq!(designer.advance(DELAY), vec![UpdateKind::SelectionOnly]);

        assert_eq!(designer.selected_id().as_deref(), Some("Btn1"));
        let btn = designer.rendered().get("Btn1").unwrap().handle;
        assert_eq!(designer.sink().selection(), Some(btn));
        assert!(log.contains("Selected control in Welcome.wxs changed to (Btn1)."));
    }

    #[test]
    fn test_selection_survives_rebuild() {
        let (mut designer, _) = open(source("Width=\"370\" Height=\"270\"", TWO));
        designer.editor_mut().move_caret_to(SourcePosition::new(5, 1));
        designer.on_caret_moved();
        designer.advance(DELAY);
        let label = designer.rendered().get("Label1").unwrap().handle;
        assert_eq!(designer.sink().selection(), Some(label));

        edit(&mut designer, source("Width=\"400\" Height=\"270\"", TWO));
        designer.advance(DELAY);
        assert_eq!(designer.selected_id().as_deref(), Some("Label1"));
        assert_eq!(designer.sink().selection(), Some(label));
    }

    #[test]
    fn test_radio_button_selects_group_visual() {
        let controls = "<Control Id=\"Group\" Type=\"RadioButtonGroup\" Property=\"P\">\n<RadioButtonGroup Property=\"P\">\n<RadioButton Value=\"1\" Text=\"One\" />\n</RadioButtonGroup>\n</Control>";
        let (mut designer, _) = open(source("Width=\"370\" Height=\"270\"", controls));
        designer.editor_mut().move_caret_to(SourcePosition::new(7, 5));
        designer.on_caret_moved();
        designer.advance(DELAY);

        assert_eq!(designer.selected_id().as_deref(), Some("RadioButton"));
        let group = designer.rendered().get("Group").unwrap().handle;
        assert_eq!(designer.selected_visual(), Some(group));
    }

    #[test]
    fn test_click_to_caret() {
        let (mut designer, log) = open(source("Width=\"370\" Height=\"270\"", TWO));
        let btn = designer.rendered().get("Btn1").unwrap().handle;

        assert!(designer.click_to_caret(btn));
        assert_eq!(designer.editor().caret(), SourcePosition::new(6, 1));
        assert_eq!(designer.editor().visible(), Some(SourcePosition::new(6, 1)));
        assert!(log.contains("Control Btn1 clicked, setting caret to (6, 1)."));

        designer.advance(DELAY);
        assert_eq!(designer.selected_id().as_deref(), Some("Btn1"));
    }

    #[test]
    fn test_click_on_dialog_moves_to_dialog() {
        let (mut designer, _) = open(source("Width=\"370\" Height=\"270\"", TWO));
        assert!(designer.click_to_caret(DIALOG_HANDLE));
        assert_eq!(designer.editor().caret(), SourcePosition::new(4, 1));
        assert!(!designer.click_to_caret(VisualHandle(999)));
    }

    #[test]
    fn test_wheel_zoom() {
        let (mut designer, log) = open(source("Width=\"370\" Height=\"270\"", TWO));
        assert_eq!(designer.on_wheel(120, false), None);
        assert_eq!(designer.on_wheel(0, true), None);

        let scale = designer.on_wheel(240, true).unwrap();
        assert!((scale - 1.2).abs() < 1e-9);
        assert!((designer.sink().scale() - 1.2).abs() < 1e-9);
        assert!(log.contains("Rescaling by"));
    }

    #[test]
    fn test_wheel_at_max_zoom_is_ignored() {
        let (mut designer, log) = open(source("Width=\"370\" Height=\"270\"", TWO));
        assert_eq!(designer.on_wheel(30 * 120, true), Some(4.0));
        let rescales = log.entries().iter().filter(|e| e.message.starts_with("Rescaling")).count();

        assert_eq!(designer.on_wheel(120, true), None);
        assert_eq!(designer.sink().scale(), 4.0);
        assert_eq!(
            log.entries().iter().filter(|e| e.message.starts_with("Rescaling")).count(),
            rescales
        );
    }

    #[test]
    fn test_localization_triggers_reconcile() {
        let (mut designer, _) = open(source(
            "Width=\"370\" Height=\"270\"",
            "<Control Id=\"Next\" Type=\"PushButton\" Text=\"!(loc.WixUINext)\" />",
        ));
        let next = designer.rendered().get("Next").unwrap().handle;
        assert_eq!(designer.sink().visual(next).unwrap().text(), Some("&Next"));

        let table = LocalizationTable::from_wxl(
            "<WixLocalization xmlns=\"http://schemas.microsoft.com/wix/2006/localization\"><String Id=\"WixUINext\">Weiter</String></WixLocalization>",
        )
        .unwrap();
        designer.add_localization(table);
        assert_eq!(designer.advance(DELAY), vec![UpdateKind::Reconcile]);
        assert_eq!(designer.sink().visual(next).unwrap().text(), Some("Weiter"));
    }

    #[test]
    fn test_update_delay_rejects_zero() {
        let (mut designer, _) = open(source("Width=\"370\" Height=\"270\"", TWO));
        assert!(matches!(
            designer.set_update_delay(Duration::ZERO),
            Err(ConfigError::NonPositiveUpdateInterval(_))
        ));
        assert_eq!(designer.coalescer().delay(), DELAY);

        designer.set_update_delay(Duration::from_millis(50)).unwrap();
        edit(&mut designer, source("Width=\"400\" Height=\"270\"", TWO));
        assert_eq!(designer.advance(Duration::from_millis(50)), vec![UpdateKind::FullRebuild]);
    }

    #[test]
    fn test_panel_uses_config() {
        let (designer, _) = open(source("Width=\"370\" Height=\"270\"", TWO));
        let panel = designer.panel();
        assert_eq!(panel.position(), PanelPosition::Top);
        assert!((panel.extent() - 0.4 * 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_close() {
        let (mut designer, log) = open(source("Width=\"370\" Height=\"270\"", TWO));
        edit(&mut designer, source("Width=\"400\" Height=\"270\"", TWO));
        designer.close();

        assert!(designer.is_closed());
        assert!(designer.sink().children().is_empty());
        assert_eq!(designer.scheduler().armed(), 0);
        assert!(designer.advance(DELAY).is_empty());
        assert!(log.contains("Closing margin for Welcome.wxs."));
    }
}
