//! Canvas state, mutations and the interactive canvas controller.

use crate::config::CanvasConfig;
use crate::drag::{DragEngine, DragOutcome, DragState};
use crate::element::{
    Content, DEFAULT_INSERT_POSITION, Element, ElementId, ElementKind, PaletteEntry, Style,
};
use crate::history::HistoryBuffer;
use crate::input::{ESCAPE_KEY, KeyEvent, MouseButton, PointerEvent, PointerTarget};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Default project name for new documents.
pub const DEFAULT_PROJECT_NAME: &str = "Visionary Studio";

/// Errors from canvas mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("Element not found: {0}")]
    NotFound(ElementId),
    #[error("The page background cannot be deleted")]
    ForbiddenDeletion,
}

/// Result type for canvas mutations.
pub type MutationResult<T> = Result<T, MutationError>;

/// Target device class of the design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[default]
    Web,
    Mobile,
}

impl Platform {
    /// Canvas dimensions for this platform.
    pub fn canvas_size(self) -> Size {
        match self {
            Platform::Web => Size::new(1152.0, 648.0),
            Platform::Mobile => Size::new(375.0, 750.0),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Web => "web",
            Platform::Mobile => "mobile",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unit of persistence and history.
///
/// Mutations never modify a state in place; each one returns a new state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasState {
    /// Elements in insertion order; later elements draw on top.
    pub elements: Vec<Element>,
    pub platform: Platform,
    pub project_name: String,
    /// Style of the page root, addressed as `page-background`.
    #[serde(default)]
    pub page_style: Style,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_NAME)
    }
}

impl CanvasState {
    /// Create an empty web canvas.
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            elements: Vec::new(),
            platform: Platform::Web,
            project_name: project_name.into(),
            page_style: Style::page_default(),
        }
    }

    /// Find an element by id, including nested children.
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        find(&self.elements, id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.element(id).is_some()
    }

    /// Number of top-level elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// All ids in the document, depth first.
    pub fn ids(&self) -> Vec<&ElementId> {
        self.elements.iter().flat_map(|e| e.ids()).collect()
    }

    /// Append an element. A colliding or reserved id is replaced with a fresh one.
    pub fn with_inserted(&self, mut element: Element) -> Self {
        let mut next = self.clone();
        let mut seen: HashSet<ElementId> = self.ids().into_iter().cloned().collect();
        dedupe_ids(std::slice::from_mut(&mut element), &mut seen);
        next.elements.push(element);
        next
    }

    /// Merge `partial` into the target's style (or the page style).
    pub fn with_style(&self, target: &ElementId, partial: &Style) -> MutationResult<Self> {
        let mut next = self.clone();
        if target.is_page() {
            next.page_style.merge(partial);
        } else {
            find_mut(&mut next.elements, target)
                .ok_or_else(|| MutationError::NotFound(target.clone()))?
                .style
                .merge(partial);
        }
        Ok(next)
    }

    /// Replace the target's content.
    pub fn with_content(&self, target: &ElementId, content: Content) -> MutationResult<Self> {
        let mut next = self.clone();
        find_mut(&mut next.elements, target)
            .ok_or_else(|| MutationError::NotFound(target.clone()))?
            .content = content;
        Ok(next)
    }

    /// Move the target to `position`.
    pub fn with_position(&self, target: &ElementId, position: Point) -> MutationResult<Self> {
        let mut next = self.clone();
        find_mut(&mut next.elements, target)
            .ok_or_else(|| MutationError::NotFound(target.clone()))?
            .position = Some(position);
        Ok(next)
    }

    /// Replace the element with the same id as `element`.
    ///
    /// Position, children and lock state are kept when the replacement omits them.
    pub fn with_element(&self, mut element: Element) -> MutationResult<Self> {
        let mut next = self.clone();
        let slot = find_mut(&mut next.elements, &element.id)
            .ok_or_else(|| MutationError::NotFound(element.id.clone()))?;
        if element.position.is_none() {
            element.position = slot.position;
        }
        if element.children.is_empty() {
            element.children = std::mem::take(&mut slot.children);
        }
        element.locked |= slot.locked;
        *slot = element;
        Ok(next)
    }

    /// Remove the target element.
    pub fn without(&self, target: &ElementId) -> MutationResult<Self> {
        if target.is_page() {
            return Err(MutationError::ForbiddenDeletion);
        }
        let mut next = self.clone();
        if remove(&mut next.elements, target) {
            Ok(next)
        } else {
            Err(MutationError::NotFound(target.clone()))
        }
    }

    pub fn with_platform(&self, platform: Platform) -> Self {
        Self {
            platform,
            ..self.clone()
        }
    }

    /// Replace the whole element collection, and the page style if given.
    ///
    /// Duplicate or reserved ids in `elements` are replaced with fresh ones.
    pub fn with_layout(&self, mut elements: Vec<Element>, page_style: Option<Style>) -> Self {
        dedupe_ids(&mut elements, &mut HashSet::new());
        Self {
            elements,
            platform: self.platform,
            project_name: self.project_name.clone(),
            page_style: page_style.unwrap_or_else(|| self.page_style.clone()),
        }
    }

    /// Serialize the state to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a state from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn find<'a>(elements: &'a [Element], id: &ElementId) -> Option<&'a Element> {
    for element in elements {
        if &element.id == id {
            return Some(element);
        }
        if let Some(found) = find(&element.children, id) {
            return Some(found);
        }
    }
    None
}

fn find_mut<'a>(elements: &'a mut [Element], id: &ElementId) -> Option<&'a mut Element> {
    for element in elements.iter_mut() {
        if &element.id == id {
            return Some(element);
        }
        if let Some(found) = find_mut(&mut element.children, id) {
            return Some(found);
        }
    }
    None
}

fn remove(elements: &mut Vec<Element>, id: &ElementId) -> bool {
    if let Some(index) = elements.iter().position(|e| &e.id == id) {
        elements.remove(index);
        return true;
    }
    elements.iter_mut().any(|e| remove(&mut e.children, id))
}

fn dedupe_ids(elements: &mut [Element], seen: &mut HashSet<ElementId>) {
    for element in elements.iter_mut() {
        if element.id.is_page() || element.id.as_str().is_empty() || seen.contains(&element.id) {
            let fresh = ElementId::generate();
            log::debug!("Reassigning element id {} -> {}", element.id, fresh);
            element.id = fresh;
        }
        seen.insert(element.id.clone());
        dedupe_ids(&mut element.children, seen);
    }
}

/// What is currently selected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Selection {
    /// The page root.
    Page,
    Element(ElementId),
}

impl Selection {
    /// Map an id to a selection, treating the reserved id as the page.
    pub fn from_id(id: ElementId) -> Self {
        if id.is_page() {
            Selection::Page
        } else {
            Selection::Element(id)
        }
    }

    /// The id addressing this selection.
    pub fn id(&self) -> ElementId {
        match self {
            Selection::Page => ElementId::page(),
            Selection::Element(id) => id.clone(),
        }
    }
}

/// A row of the layer list.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub target: Selection,
    pub name: String,
    pub kind: Option<ElementKind>,
    pub selected: bool,
}

/// Identifies the document context an asynchronous request was issued against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestToken {
    revision: u64,
    epoch: u64,
    target: Option<ElementId>,
}

impl RequestToken {
    /// The element the request is scoped to, if any.
    pub fn target(&self) -> Option<&ElementId> {
        self.target.as_ref()
    }
}

/// The interactive canvas: current state, selection, drag engine and history.
///
/// `revision` increases with every committed mutation; `epoch` increases when
/// the whole document is replaced (layout regeneration, platform switch, reset).
#[derive(Debug, Clone)]
pub struct Canvas {
    state: CanvasState,
    selection: Option<Selection>,
    history: HistoryBuffer,
    drag: DragEngine,
    config: CanvasConfig,
    canvas_size: Option<Size>,
    revision: u64,
    epoch: u64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a canvas with an empty document and default configuration.
    pub fn new() -> Self {
        Self::with_state(CanvasState::default(), CanvasConfig::default())
    }

    pub fn with_config(config: CanvasConfig) -> Self {
        Self::with_state(CanvasState::default(), config)
    }

    /// Create a canvas around an existing state.
    pub fn with_state(state: CanvasState, config: CanvasConfig) -> Self {
        Self {
            state,
            selection: None,
            history: HistoryBuffer::new(config.history_capacity),
            drag: DragEngine::from_config(&config),
            config,
            canvas_size: None,
            revision: 0,
            epoch: 0,
        }
    }

    pub fn state(&self) -> &CanvasState {
        &self.state
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    /// Whether the host should keep window-scoped pointer listeners attached.
    pub fn captures_pointer(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Canvas dimensions used for clamping.
    pub fn canvas_size(&self) -> Size {
        self.canvas_size.unwrap_or_else(|| self.state.platform.canvas_size())
    }

    /// Override the canvas dimensions with the measured container size.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        self.canvas_size = Some(Size::new(width, height));
    }

    // --- Selection ---

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Select the page or an element. Unknown element ids are ignored.
    pub fn select(&mut self, selection: Selection) {
        if let Selection::Element(id) = &selection {
            if !self.state.contains(id) {
                log::debug!("Ignoring selection of missing element {}", id);
                return;
            }
        }
        self.selection = Some(selection);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// The selected element, if an element (not the page) is selected.
    pub fn selected_element(&self) -> Option<&Element> {
        match &self.selection {
            Some(Selection::Element(id)) => self.state.element(id),
            _ => None,
        }
    }

    pub fn is_page_selected(&self) -> bool {
        self.selection == Some(Selection::Page)
    }

    /// The layer list: the page root followed by elements in draw order.
    pub fn layers(&self) -> Vec<Layer> {
        let page = Layer {
            target: Selection::Page,
            name: "Environment".to_string(),
            kind: None,
            selected: self.is_page_selected(),
        };
        std::iter::once(page)
            .chain(self.state.elements.iter().map(|element| {
                let target = Selection::Element(element.id.clone());
                Layer {
                    selected: self.selection.as_ref() == Some(&target),
                    target,
                    name: element.name.clone(),
                    kind: Some(element.kind.clone()),
                }
            }))
            .collect()
    }

    // --- Mutations ---

    /// Replace the state and record it in history.
    fn commit(&mut self, state: CanvasState) {
        self.state = state;
        self.record_current();
    }

    fn record_current(&mut self) {
        self.revision += 1;
        self.history.record(&self.state);
    }

    /// Insert an element with a fresh id and select it.
    ///
    /// Elements without a position are placed at the default insertion point.
    pub fn insert_element(&mut self, mut template: Element) -> ElementId {
        template.id = ElementId::generate();
        if template.position.is_none() {
            template.position = Some(DEFAULT_INSERT_POSITION);
        }
        let id = template.id.clone();
        let next = self.state.with_inserted(template);
        self.commit(next);
        self.selection = Some(Selection::Element(id.clone()));
        log::debug!("Inserted element {}", id);
        id
    }

    /// Insert the default template of a palette entry.
    pub fn insert_from_palette(&mut self, entry: &PaletteEntry) -> ElementId {
        self.insert_element(entry.template())
    }

    /// Merge a partial style into an element or the page.
    ///
    /// Returns false (and records nothing) if the target does not exist.
    pub fn update_style(&mut self, target: &ElementId, partial: &Style) -> bool {
        self.apply(self.state.with_style(target, partial))
    }

    /// Replace an element's content.
    ///
    /// Returns false (and records nothing) if the target does not exist.
    pub fn update_content(&mut self, target: &ElementId, content: Content) -> bool {
        self.apply(self.state.with_content(target, content))
    }

    /// Delete an element, clearing the selection if it was selected.
    ///
    /// Returns `Ok(false)` if the element does not exist.
    pub fn delete_element(&mut self, target: &ElementId) -> MutationResult<bool> {
        match self.state.without(target) {
            Ok(next) => {
                if self.drag.state().dragged_element() == Some(target) {
                    self.drag.finish();
                }
                self.commit(next);
                if self.selection.as_ref().is_some_and(|s| !self.selection_exists(s)) {
                    self.selection = None;
                }
                Ok(true)
            }
            Err(MutationError::NotFound(id)) => {
                log::debug!("Delete of missing element {} ignored", id);
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// Delete the selected element, if any.
    pub fn delete_selected(&mut self) -> MutationResult<bool> {
        match self.selection.clone() {
            Some(selection) => self.delete_element(&selection.id()),
            None => Ok(false),
        }
    }

    /// Switch the target platform.
    pub fn set_platform(&mut self, platform: Platform) {
        if platform == self.state.platform {
            return;
        }
        self.finish_drag_silently();
        self.canvas_size = None;
        self.epoch += 1;
        let next = self.state.with_platform(platform);
        self.commit(next);
    }

    /// Replace the element collection (and optionally the page style).
    pub fn replace_layout(&mut self, elements: Vec<Element>, page_style: Option<Style>) {
        self.finish_drag_silently();
        self.epoch += 1;
        let next = self.state.with_layout(elements, page_style);
        self.commit(next);
        if self.selection.as_ref().is_some_and(|s| !self.selection_exists(s)) {
            self.selection = None;
        }
    }

    /// Replace a single element in place, matched by id.
    pub fn replace_element(&mut self, element: Element) -> bool {
        self.apply(self.state.with_element(element))
    }

    /// Start over with an empty document on the same platform.
    pub fn reset(&mut self) {
        self.finish_drag_silently();
        self.epoch += 1;
        self.selection = None;
        let next = CanvasState {
            platform: self.state.platform,
            ..CanvasState::new(self.state.project_name.clone())
        };
        self.commit(next);
    }

    fn apply(&mut self, result: MutationResult<CanvasState>) -> bool {
        match result {
            Ok(next) => {
                self.commit(next);
                true
            }
            Err(err) => {
                log::debug!("Mutation skipped: {}", err);
                false
            }
        }
    }

    fn selection_exists(&self, selection: &Selection) -> bool {
        match selection {
            Selection::Page => true,
            Selection::Element(id) => self.state.contains(id),
        }
    }

    fn finish_drag_silently(&mut self) {
        if let Some(session) = self.drag.finish() {
            log::debug!("Drag of {} abandoned", session.element_id);
        }
    }

    // --- Request staleness ---

    /// Capture the current document context for an asynchronous request.
    ///
    /// `target` scopes the request to one element; `None` scopes it to the
    /// whole document.
    pub fn request_token(&self, target: Option<ElementId>) -> RequestToken {
        RequestToken {
            revision: self.revision,
            epoch: self.epoch,
            target,
        }
    }

    /// Check whether a result for `token` may still be applied.
    ///
    /// Whole-document results require that nothing was committed since the
    /// request. Element-scoped results require the same epoch and that the
    /// target element still exists.
    pub fn accepts(&self, token: &RequestToken) -> bool {
        match &token.target {
            None => token.revision == self.revision && token.epoch == self.epoch,
            Some(id) => token.epoch == self.epoch && self.state.contains(id),
        }
    }

    // --- Dragging ---

    /// Pointer pressed on `target` at client position `pointer`.
    pub fn pointer_down(
        &mut self,
        target: PointerTarget,
        pointer: Point,
        container_origin: Point,
    ) -> DragOutcome {
        if self.drag.is_dragging() {
            // A release was missed; settle the previous gesture first.
            self.pointer_up();
        }

        let id = match target {
            PointerTarget::Page => {
                self.selection = None;
                return DragOutcome::SelectionCleared;
            }
            PointerTarget::Element(id) if id.is_page() => {
                self.selection = None;
                return DragOutcome::SelectionCleared;
            }
            PointerTarget::Element(id) => id,
        };

        let Some(element) = self.state.element(&id) else {
            return DragOutcome::Ignored;
        };
        let position = element.position.filter(|_| element.is_draggable());
        self.selection = Some(Selection::Element(id.clone()));

        let Some(position) = position else {
            return DragOutcome::Selected(id);
        };
        self.drag.begin(id.clone(), pointer, container_origin, position);
        log::debug!("Drag started on {}", id);
        DragOutcome::Started(id)
    }

    /// Pointer moved to client position `pointer`.
    ///
    /// Updates the dragged element's position without recording history.
    pub fn pointer_move(&mut self, pointer: Point, container_origin: Point) -> DragOutcome {
        let canvas_size = self.canvas_size();
        let Some((id, position)) = self.drag.update(pointer, container_origin, canvas_size) else {
            return DragOutcome::Ignored;
        };
        match self.state.with_position(&id, position) {
            Ok(next) => {
                self.state = next;
                DragOutcome::Moved { id, position }
            }
            Err(err) => {
                log::debug!("Drag target vanished: {}", err);
                self.drag.finish();
                DragOutcome::Ignored
            }
        }
    }

    /// Pointer released anywhere. Commits the drag to history exactly once.
    pub fn pointer_up(&mut self) -> DragOutcome {
        let Some(session) = self.drag.finish() else {
            return DragOutcome::Ignored;
        };
        if !self.state.contains(&session.element_id) {
            return DragOutcome::Ignored;
        }
        self.record_current();
        log::info!(
            "Moved {} to ({}, {})",
            session.element_id, session.current.x, session.current.y
        );
        DragOutcome::Committed(session.element_id)
    }

    /// Abort the drag and restore the element's pre-drag position.
    pub fn cancel_drag(&mut self) -> DragOutcome {
        let Some((id, origin)) = self.drag.cancel() else {
            return DragOutcome::Ignored;
        };
        match self.state.with_position(&id, origin) {
            Ok(next) => {
                self.state = next;
                DragOutcome::Cancelled(id)
            }
            Err(_) => DragOutcome::Ignored,
        }
    }

    /// Dispatch a pointer event. Only the left button drags.
    pub fn handle_pointer_event(
        &mut self,
        event: PointerEvent,
        container_origin: Point,
    ) -> DragOutcome {
        match event {
            PointerEvent::Down { position, button: MouseButton::Left, target } => {
                self.pointer_down(target, position, container_origin)
            }
            PointerEvent::Move { position } => self.pointer_move(position, container_origin),
            PointerEvent::Up { button: MouseButton::Left, .. } => self.pointer_up(),
            _ => DragOutcome::Ignored,
        }
    }

    /// Dispatch a key event. Escape cancels an active drag.
    pub fn handle_key_event(&mut self, event: &KeyEvent) -> DragOutcome {
        if event.is_press_of(ESCAPE_KEY) {
            self.cancel_drag()
        } else {
            DragOutcome::Ignored
        }
    }

    /// Release drag resources when the canvas view goes away.
    ///
    /// An active drag is committed as if the pointer had been released.
    pub fn teardown(&mut self) -> DragOutcome {
        self.pointer_up()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Palette;

    fn element(name: &str, x: f64, y: f64) -> Element {
        Element::new(ElementKind::Card, name, Content::Text(name.to_string()))
            .with_position(Point::new(x, y))
    }

    fn canvas_with(names: &[&str]) -> (Canvas, Vec<ElementId>) {
        let mut canvas = Canvas::new();
        let ids = names
            .iter()
            .map(|name| canvas.insert_element(element(name, 0.0, 0.0)))
            .collect();
        (canvas, ids)
    }

    #[test]
    fn test_insert_assigns_fresh_id_and_selects() {
        let mut canvas = Canvas::new();
        let template = element("Card", 10.0, 10.0);
        let template_id = template.id.clone();

        let id = canvas.insert_element(template);

        assert_ne!(id, template_id);
        assert_eq!(canvas.selection(), Some(&Selection::Element(id.clone())));
        assert_eq!(canvas.history().len(), 1);
        assert_eq!(canvas.state().element(&id).unwrap().name, "Card");
    }

    #[test]
    fn test_insert_defaults_position() {
        let mut canvas = Canvas::new();
        let id = canvas.insert_element(Element::new(ElementKind::Button, "Go", Content::default()));
        assert_eq!(canvas.state().element(&id).unwrap().position, Some(DEFAULT_INSERT_POSITION));
    }

    #[test]
    fn test_insert_delete_sequence_keeps_unique_ids() {
        let (mut canvas, ids) = canvas_with(&["a", "b", "c", "d"]);
        canvas.delete_element(&ids[1]).unwrap();
        canvas.delete_element(&ids[3]).unwrap();
        let e = canvas.insert_element(element("e", 0.0, 0.0));

        let remaining: Vec<_> = canvas.state().elements.iter().map(|el| el.id.clone()).collect();
        assert_eq!(remaining, vec![ids[0].clone(), ids[2].clone(), e]);
        let unique: HashSet<_> = remaining.iter().collect();
        assert_eq!(unique.len(), remaining.len());
    }

    #[test]
    fn test_update_style_merges_disjoint_partials() {
        let (mut canvas, ids) = canvas_with(&["a"]);
        let first = Style { color: Some("#fff".into()), ..Default::default() };
        let second = Style { padding: Some("4px".into()), ..Default::default() };

        assert!(canvas.update_style(&ids[0], &first));
        assert!(canvas.update_style(&ids[0], &second));

        let style = &canvas.state().element(&ids[0]).unwrap().style;
        assert_eq!(style.color.as_deref(), Some("#fff"));
        assert_eq!(style.padding.as_deref(), Some("4px"));
    }

    #[test]
    fn test_update_style_on_page() {
        let mut canvas = Canvas::new();
        let partial = Style { border_radius: Some("64px".into()), ..Default::default() };

        assert!(canvas.update_style(&ElementId::page(), &partial));

        let page = &canvas.state().page_style;
        assert_eq!(page.border_radius.as_deref(), Some("64px"));
        assert_eq!(page.background_color.as_deref(), Some("#09090b"));
    }

    #[test]
    fn test_update_missing_is_silent_noop() {
        let (mut canvas, _) = canvas_with(&["a"]);
        let before = canvas.state().clone();
        let history = canvas.history().len();

        assert!(!canvas.update_style(&ElementId::new("nope"), &Style::default()));
        assert!(!canvas.update_content(&ElementId::new("nope"), Content::default()));

        assert_eq!(canvas.state(), &before);
        assert_eq!(canvas.history().len(), history);
    }

    #[test]
    fn test_update_content_replaces() {
        let (mut canvas, ids) = canvas_with(&["a"]);
        assert!(canvas.update_content(&ids[0], Content::Text(String::new())));
        assert!(canvas.state().element(&ids[0]).unwrap().content.is_empty());
    }

    #[test]
    fn test_delete_page_forbidden() {
        let (mut canvas, _) = canvas_with(&["a"]);
        let before = canvas.state().clone();
        let history = canvas.history().len();

        let result = canvas.delete_element(&ElementId::page());

        assert_eq!(result, Err(MutationError::ForbiddenDeletion));
        assert_eq!(canvas.state(), &before);
        assert_eq!(canvas.history().len(), history);
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let (mut canvas, _) = canvas_with(&["a"]);
        let history = canvas.history().len();
        assert_eq!(canvas.delete_element(&ElementId::new("gone")), Ok(false));
        assert_eq!(canvas.history().len(), history);
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let (mut canvas, ids) = canvas_with(&["a", "b"]);
        canvas.select(Selection::Element(ids[1].clone()));

        assert_eq!(canvas.delete_selected(), Ok(true));
        assert!(canvas.selection().is_none());
        assert_eq!(canvas.state().len(), 1);
    }

    #[test]
    fn test_previous_state_is_not_mutated() {
        let (mut canvas, ids) = canvas_with(&["a"]);
        let before = canvas.state().clone();
        canvas.update_content(&ids[0], Content::Text("changed".into()));

        assert_eq!(before.element(&ids[0]).unwrap().content.as_str(), "a");
        assert_eq!(canvas.history().get(1).unwrap().state, before);
    }

    #[test]
    fn test_drag_gesture_commits_once() {
        let (mut canvas, ids) = canvas_with(&["a"]);
        let origin = Point::new(100.0, 50.0);
        let history = canvas.history().len();

        let outcome = canvas.pointer_down(PointerTarget::Element(ids[0].clone()), origin, origin);
        assert_eq!(outcome, DragOutcome::Started(ids[0].clone()));
        assert!(canvas.captures_pointer());

        for step in 1..=5 {
            let pointer = Point::new(origin.x + step as f64 * 10.0, origin.y + step as f64 * 10.0);
            canvas.pointer_move(pointer, origin);
        }
        canvas.pointer_move(Point::new(origin.x + 103.0, origin.y + 206.0), origin);
        assert_eq!(canvas.history().len(), history);

        assert_eq!(canvas.pointer_up(), DragOutcome::Committed(ids[0].clone()));
        assert_eq!(canvas.history().len(), history + 1);
        assert!(!canvas.captures_pointer());

        let committed = canvas.history().latest().unwrap();
        assert_eq!(
            committed.state.element(&ids[0]).unwrap().position,
            Some(Point::new(104.0, 208.0))
        );
    }

    #[test]
    fn test_drag_clamps_to_canvas_width() {
        let (mut canvas, ids) = canvas_with(&["a"]);
        canvas.set_canvas_size(1000.0, 600.0);

        canvas.pointer_down(PointerTarget::Element(ids[0].clone()), Point::ZERO, Point::ZERO);
        canvas.pointer_move(Point::new(1500.0, -20.0), Point::ZERO);
        canvas.pointer_up();

        let position = canvas.state().element(&ids[0]).unwrap().position;
        assert_eq!(position, Some(Point::new(960.0, 0.0)));
    }

    #[test]
    fn test_pointer_down_on_page_clears_selection() {
        let (mut canvas, ids) = canvas_with(&["a"]);
        canvas.select(Selection::Element(ids[0].clone()));

        let outcome = canvas.pointer_down(PointerTarget::Page, Point::ZERO, Point::ZERO);

        assert_eq!(outcome, DragOutcome::SelectionCleared);
        assert!(canvas.selection().is_none());
        assert!(!canvas.captures_pointer());
    }

    #[test]
    fn test_locked_element_selects_without_drag() {
        let mut canvas = Canvas::new();
        let mut locked = element("locked", 0.0, 0.0);
        locked.locked = true;
        let id = canvas.insert_element(locked);
        canvas.clear_selection();

        let target = PointerTarget::Element(id.clone());
        let outcome = canvas.pointer_down(target, Point::ZERO, Point::ZERO);

        assert_eq!(outcome, DragOutcome::Selected(id.clone()));
        assert_eq!(canvas.selection(), Some(&Selection::Element(id)));
        assert!(!canvas.captures_pointer());
    }

    #[test]
    fn test_pointer_up_without_drag_is_noop() {
        let (mut canvas, _) = canvas_with(&["a"]);
        let history = canvas.history().len();
        assert_eq!(canvas.pointer_up(), DragOutcome::Ignored);
        assert_eq!(canvas.pointer_up(), DragOutcome::Ignored);
        assert_eq!(canvas.history().len(), history);
    }

    #[test]
    fn test_escape_restores_position() {
        let mut canvas = Canvas::new();
        let id = canvas.insert_element(element("a", 40.0, 48.0));
        let history = canvas.history().len();

        let target = PointerTarget::Element(id.clone());
        canvas.pointer_down(target, Point::new(45.0, 50.0), Point::ZERO);
        canvas.pointer_move(Point::new(300.0, 300.0), Point::ZERO);
        let outcome = canvas.handle_key_event(&KeyEvent::Pressed(ESCAPE_KEY.to_string()));

        assert_eq!(outcome, DragOutcome::Cancelled(id.clone()));
        assert_eq!(canvas.state().element(&id).unwrap().position, Some(Point::new(40.0, 48.0)));
        assert_eq!(canvas.history().len(), history);
    }

    #[test]
    fn test_right_button_does_not_drag() {
        let (mut canvas, ids) = canvas_with(&["a"]);
        let event = PointerEvent::Down {
            position: Point::ZERO,
            button: MouseButton::Right,
            target: PointerTarget::Element(ids[0].clone()),
        };
        assert_eq!(canvas.handle_pointer_event(event, Point::ZERO), DragOutcome::Ignored);
        assert!(!canvas.captures_pointer());
    }

    #[test]
    fn test_deleting_dragged_element_ends_drag() {
        let (mut canvas, ids) = canvas_with(&["a"]);
        canvas.pointer_down(PointerTarget::Element(ids[0].clone()), Point::ZERO, Point::ZERO);
        canvas.delete_element(&ids[0]).unwrap();

        assert!(!canvas.captures_pointer());
        assert_eq!(canvas.pointer_up(), DragOutcome::Ignored);
    }

    #[test]
    fn test_teardown_commits_active_drag() {
        let (mut canvas, ids) = canvas_with(&["a"]);
        let history = canvas.history().len();
        canvas.pointer_down(PointerTarget::Element(ids[0].clone()), Point::ZERO, Point::ZERO);
        canvas.pointer_move(Point::new(16.0, 16.0), Point::ZERO);

        assert_eq!(canvas.teardown(), DragOutcome::Committed(ids[0].clone()));
        assert_eq!(canvas.history().len(), history + 1);
    }

    #[test]
    fn test_history_bounded_to_twenty() {
        let (mut canvas, ids) = canvas_with(&["a"]);
        for i in 0..25 {
            canvas.update_content(&ids[0], Content::Text(format!("v{i}")));
        }
        assert_eq!(canvas.history().len(), 20);
        assert_eq!(
            canvas.history().latest().unwrap().state.element(&ids[0]).unwrap().content.as_str(),
            "v24"
        );
    }

    #[test]
    fn test_layout_replacement_dedupes_ids() {
        let mut canvas = Canvas::new();
        let a = element("a", 0.0, 0.0);
        let mut b = element("b", 0.0, 0.0);
        b.id = a.id.clone();
        let mut c = element("c", 0.0, 0.0);
        c.id = ElementId::page();

        canvas.replace_layout(vec![a, b, c], None);

        let ids: HashSet<_> = canvas.state().ids().into_iter().collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.iter().any(|id| id.is_page()));
    }

    #[test]
    fn test_request_tokens() {
        let (mut canvas, ids) = canvas_with(&["a", "b"]);
        let layout = canvas.request_token(None);
        let scoped = canvas.request_token(Some(ids[0].clone()));
        assert!(canvas.accepts(&layout));
        assert!(canvas.accepts(&scoped));

        // An unrelated edit invalidates whole-document results only
        canvas.update_content(&ids[1], Content::Text("edit".into()));
        assert!(!canvas.accepts(&layout));
        assert!(canvas.accepts(&scoped));

        // Deleting the target invalidates the scoped result
        canvas.delete_element(&ids[0]).unwrap();
        assert!(!canvas.accepts(&scoped));
    }

    #[test]
    fn test_reset_invalidates_scoped_requests() {
        let (mut canvas, ids) = canvas_with(&["a"]);
        let scoped = canvas.request_token(Some(ids[0].clone()));
        canvas.reset();
        assert!(!canvas.accepts(&scoped));
        assert!(canvas.state().is_empty());
    }

    #[test]
    fn test_platform_switch_changes_bounds() {
        let mut canvas = Canvas::new();
        assert_eq!(canvas.canvas_size(), Size::new(1152.0, 648.0));
        canvas.set_platform(Platform::Mobile);
        assert_eq!(canvas.canvas_size(), Size::new(375.0, 750.0));
        assert_eq!(canvas.history().len(), 1);
    }

    #[test]
    fn test_layers_list() {
        let mut canvas = Canvas::new();
        let id = canvas.insert_from_palette(&Palette::builtin()[0]);

        let layers = canvas.layers();
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0].target, Selection::Page);
        assert_eq!(layers[1].target, Selection::Element(id));
        assert!(layers[1].selected);
    }

    #[test]
    fn test_state_json_roundtrip() {
        let (canvas, _) = canvas_with(&["a"]);
        let json = canvas.state().to_json().unwrap();
        assert!(json.contains("\"projectName\""));
        assert_eq!(&CanvasState::from_json(&json).unwrap(), canvas.state());
    }

    #[test]
    fn test_replace_keeps_children_when_omitted() {
        let mut card = element("card", 10.0, 10.0);
        card.children.push(element("child", 0.0, 0.0));
        let mut canvas = Canvas::new();
        let id = canvas.insert_element(card);

        let mut refined = element("card", 0.0, 0.0);
        refined.id = id.clone();
        refined.position = None;
        assert!(canvas.replace_element(refined));

        let stored = canvas.state().element(&id).unwrap();
        assert_eq!(stored.children.len(), 1);
        assert_eq!(stored.children[0].name, "child");
        assert_eq!(stored.position, Some(Point::new(10.0, 10.0)));
    }
}
