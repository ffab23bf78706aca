//! Reconciliation of control specs against rendered visuals
//!
//! Identity is the control `Id` together with the visual kind its type maps
//! to. Matching visuals are refreshed in place; everything else is created
//! or removed. Properties are never diffed, every surviving visual gets the
//! full property set on each pass.
//!
//! The previous [`RenderedSet`] is consumed by [`apply`], which hands the next
//! one back to the caller.

use crate::controls::{ControlSpec, ControlTypeRegistry};
use crate::document::{NodeId, ParsedDocument, SourcePosition};
use crate::error::SkipReason;
use crate::logging::{DebugContext, DesignerLog};
use crate::render::{RenderSink, VisualHandle, VisualKind};
use std::collections::{HashMap, HashSet};

/// A visual produced by an earlier pass.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedControl {
    pub handle: VisualHandle,
    pub kind: VisualKind,
    pub node: NodeId,
    pub type_name: String,
}

/// Rendered controls keyed by Id, in render order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedSet {
    controls: HashMap<String, RenderedControl>,
    order: Vec<String>,
    generation: u64,
}

impl RenderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty set for nodes of the given document generation.
    pub fn with_generation(generation: u64) -> Self {
        Self {
            generation,
            ..Self::default()
        }
    }

    /// Document generation the node ids belong to.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn insert(&mut self, id: String, control: RenderedControl) {
        if self.controls.insert(id.clone(), control).is_none() {
            self.order.push(id);
        }
    }

    pub fn get(&self, id: &str) -> Option<&RenderedControl> {
        self.controls.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.controls.contains_key(id)
    }

    /// Ids in render order.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    /// Handles in render order.
    pub fn handles(&self) -> Vec<VisualHandle> {
        self.order
            .iter()
            .filter_map(|id| self.controls.get(id))
            .map(|c| c.handle)
            .collect()
    }

    /// The visual rendered from `node`, if any.
    pub fn find_by_node(&self, node: NodeId) -> Option<&RenderedControl> {
        self.order
            .iter()
            .filter_map(|id| self.controls.get(id))
            .find(|c| c.node == node)
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

/// A control that was left out, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedControl {
    pub node: NodeId,
    pub id: Option<String>,
    pub position: Option<SourcePosition>,
    pub reason: SkipReason,
}

/// What a render pass has to do.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcilePlan {
    /// Ids whose existing visual is refreshed in place
    pub to_update: Vec<String>,
    /// Ids that get a new visual
    pub to_create: Vec<String>,
    /// Ids whose previous visual is dropped
    pub to_remove: Vec<String>,
    pub skipped: Vec<SkippedControl>,
    /// Ids declared more than once; the last declaration is rendered
    pub duplicates: Vec<String>,
    specs: Vec<ControlSpec>,
}

impl ReconcilePlan {
    /// Specs to render, one per Id, in render order.
    pub fn specs(&self) -> &[ControlSpec] {
        &self.specs
    }

    /// True when the pass only refreshes existing visuals.
    pub fn is_stable(&self) -> bool {
        self.to_create.is_empty() && self.to_remove.is_empty()
    }
}

fn format_position(position: Option<SourcePosition>) -> String {
    match position {
        Some(pos) => format!("({}, {})", pos.line, pos.column),
        None => "(-1, -1)".to_string(),
    }
}

/// Classify the control nodes of a dialog, logging every skipped one.
pub fn classify_controls(
    registry: &ControlTypeRegistry,
    doc: &ParsedDocument,
    nodes: &[NodeId],
    log: &dyn DesignerLog,
) -> (Vec<ControlSpec>, Vec<SkippedControl>) {
    let mut specs = Vec::new();
    let mut skipped = Vec::new();

    for &node in nodes {
        match registry.classify(doc, node) {
            Ok(spec) => specs.push(spec),
            Err(reason) => {
                let element = doc.element(node);
                let position = doc.position(node);
                let at = format_position(position);
                let id = Some(element.id().trim())
                    .filter(|id| !id.is_empty())
                    .map(String::from);
                let type_name = element.attribute("Type").unwrap_or("");

                let message = match &reason {
                    SkipReason::MissingId => format!("Found control without id at {}!", at),
                    SkipReason::MissingType => format!("Found control without type at {}!", at),
                    SkipReason::UnknownType(name) => format!(
                        "Control {} at {} is of type {} which is not supported!",
                        element.id(),
                        at,
                        name
                    ),
                    other => format!(
                        "Failed to update control {} of type {}: {}",
                        element.id(),
                        type_name,
                        other
                    ),
                };
                log.log(DebugContext::MARGIN | DebugContext::WIX, &message);

                skipped.push(SkippedControl {
                    node,
                    id,
                    position,
                    reason,
                });
            }
        }
    }

    (specs, skipped)
}

/// Diff the current specs against the previous pass.
pub fn reconcile(previous: &RenderedSet, current: Vec<ControlSpec>) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();

    // Later duplicates win and take the later position.
    let mut specs: Vec<ControlSpec> = Vec::with_capacity(current.len());
    for spec in current {
        if let Some(index) = specs.iter().position(|s| s.id == spec.id) {
            specs.remove(index);
            if !plan.duplicates.contains(&spec.id) {
                plan.duplicates.push(spec.id.clone());
            }
        }
        specs.push(spec);
    }

    let current_kinds: HashMap<&str, Option<VisualKind>> = specs
        .iter()
        .map(|s| (s.id.as_str(), s.visual_kind()))
        .collect();

    for id in previous.ids() {
        let Some(rendered) = previous.get(id) else {
            continue;
        };
        match current_kinds.get(id.as_str()) {
            Some(Some(kind)) if *kind == rendered.kind => {}
            _ => plan.to_remove.push(id.clone()),
        }
    }

    for spec in &specs {
        let reusable = previous
            .get(&spec.id)
            .is_some_and(|rendered| Some(rendered.kind) == spec.visual_kind());
        if reusable {
            plan.to_update.push(spec.id.clone());
        } else {
            plan.to_create.push(spec.id.clone());
        }
    }

    plan.specs = specs;
    plan
}

/// Apply a plan: remove, then create and refresh, then restore source order.
pub fn apply<S: RenderSink>(
    plan: &ReconcilePlan,
    previous: RenderedSet,
    sink: &mut S,
    registry: &ControlTypeRegistry,
    generation: u64,
    log: &dyn DesignerLog,
) -> RenderedSet {
    for id in &plan.to_remove {
        if let Some(rendered) = previous.get(id) {
            sink.remove(rendered.handle);
        }
    }

    let updates: HashSet<&str> = plan.to_update.iter().map(String::as_str).collect();
    let mut next = RenderedSet::with_generation(generation);

    for spec in plan.specs() {
        let existing = if updates.contains(spec.id.as_str()) {
            previous.get(&spec.id).map(|c| (c.handle, c.kind))
        } else {
            None
        };

        let Some(kind) = spec.visual_kind() else {
            continue;
        };
        match registry.render(sink, spec, existing) {
            Some(handle) => next.insert(
                spec.id.clone(),
                RenderedControl {
                    handle,
                    kind,
                    node: spec.node,
                    type_name: spec.type_name.clone(),
                },
            ),
            None => log.log(
                DebugContext::MARGIN | DebugContext::WIX,
                &format!("Control {} of type {} produced no visual.", spec.id, spec.type_name),
            ),
        }
    }

    sink.arrange(&next.handles());
    next
}
