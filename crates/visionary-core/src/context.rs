//! Application context: owns the canvas, the component library and the
//! gateway, and applies asynchronous AI results with staleness checks.
//!
//! Each AI operation is split into a `begin_*` step that validates input and
//! returns a [`PendingRequest`] whose future owns everything it needs, and a
//! `finish_*` step that applies the [`CompletedRequest`]. Hosts run the future
//! on their own executor and keep handling canvas input in the meantime. The
//! plain async methods chain the two steps.

use crate::activity::ActivityLog;
use crate::canvas::{Canvas, RequestToken};
use crate::config::CanvasConfig;
use crate::element::{Content, Element, ElementId};
use crate::gateway::{Gateway, GatewayError, GatewayResult, LayoutResult};
use crate::library::{ComponentLibrary, LibraryComponent};
use crate::storage::{Storage, StorageError};
use crate::BoxFuture;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Top-level application phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Credentials are missing or were rejected; show the setup view.
    NeedsAuth,
    Ready,
}

/// Kind of AI request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Layout,
    RefineElement,
    GenerateImage,
    RefineImage,
    Component,
    Export,
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TaskKind::Layout => "layout generation",
            TaskKind::RefineElement => "element refinement",
            TaskKind::GenerateImage => "image generation",
            TaskKind::RefineImage => "image refinement",
            TaskKind::Component => "component generation",
            TaskKind::Export => "markup export",
        };
        f.write_str(name)
    }
}

/// User-visible progress indicator.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Idle,
    Generating(TaskKind),
    Error(String),
}

impl TaskStatus {
    pub fn is_generating(&self) -> bool {
        matches!(self, TaskStatus::Generating(_))
    }
}

/// Why a request could not be started.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("Prompt is empty")]
    EmptyPrompt,
    #[error("Another request is in progress")]
    Busy,
    #[error("Credentials required")]
    NeedsAuth,
    #[error("Element not found: {0}")]
    NotFound(ElementId),
    #[error("Element {0} does not hold an image")]
    NotAnImage(ElementId),
}

/// What happened when a completed request was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The result was merged into the document or library.
    Applied,
    /// The result no longer matched the document, or the request was cancelled.
    Discarded,
    /// The gateway call failed; nothing was changed.
    Failed(GatewayError),
    /// The result could not be persisted.
    StorageFailed(String),
}

/// Bookkeeping shared by a pending request and its completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTicket {
    id: u64,
    kind: TaskKind,
    token: RequestToken,
    target_name: Option<String>,
    prompt: String,
}

impl RequestTicket {
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn token(&self) -> &RequestToken {
        &self.token
    }
}

/// A started request whose future has not run yet.
pub struct PendingRequest<T> {
    ticket: RequestTicket,
    future: BoxFuture<'static, GatewayResult<T>>,
}

impl<T> PendingRequest<T> {
    pub fn ticket(&self) -> &RequestTicket {
        &self.ticket
    }

    /// Drive the gateway call to completion.
    pub async fn run(self) -> CompletedRequest<T> {
        let result = self.future.await;
        CompletedRequest {
            ticket: self.ticket,
            result,
        }
    }
}

/// A finished gateway call, ready to be applied.
pub struct CompletedRequest<T> {
    pub ticket: RequestTicket,
    pub result: GatewayResult<T>,
}

/// Owns the document, the component library and the AI gateway.
pub struct AppContext<S: Storage> {
    phase: Phase,
    canvas: Canvas,
    library: ComponentLibrary<S>,
    gateway: Arc<dyn Gateway>,
    status: TaskStatus,
    activity: ActivityLog,
    export: Option<String>,
    active_request: Option<u64>,
    next_request: u64,
}

impl<S: Storage> AppContext<S> {
    /// Build the context, reading the component library and checking credentials.
    ///
    /// A library that cannot be read is logged and treated as empty.
    pub async fn init(gateway: Arc<dyn Gateway>, storage: S, config: CanvasConfig) -> Self {
        let mut library = ComponentLibrary::empty(storage);
        if let Err(err) = library.reload().await {
            log::warn!("Component library unavailable, starting empty: {}", err);
        }
        let phase = if gateway.has_credentials().await {
            Phase::Ready
        } else {
            Phase::NeedsAuth
        };
        log::info!("Application ready (phase: {:?})", phase);

        Self {
            phase,
            canvas: Canvas::with_config(config),
            library,
            gateway,
            status: TaskStatus::Idle,
            activity: ActivityLog::new(),
            export: None,
            active_request: None,
            next_request: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    pub fn library(&self) -> &ComponentLibrary<S> {
        &self.library
    }

    pub fn status(&self) -> &TaskStatus {
        &self.status
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    /// The most recent exported source code.
    pub fn export(&self) -> Option<&str> {
        self.export.as_deref()
    }

    /// Hand new credentials to the gateway and leave the setup view.
    pub fn provide_credentials(&mut self, api_key: impl Into<String>) {
        self.gateway.set_api_key(api_key.into());
        self.phase = Phase::Ready;
        self.status = TaskStatus::Idle;
        log::info!("Credentials provided");
    }

    /// Clear an error indicator.
    pub fn dismiss_error(&mut self) {
        if matches!(self.status, TaskStatus::Error(_)) {
            self.status = TaskStatus::Idle;
        }
    }

    /// Abandon the in-flight request. Its result will be discarded.
    pub fn cancel_request(&mut self) {
        if let Some(id) = self.active_request.take() {
            log::debug!("Request {} cancelled", id);
            self.status = TaskStatus::Idle;
        }
    }

    /// Insert a copy of the library component at `index`.
    pub fn insert_from_library(&mut self, index: usize) -> Option<ElementId> {
        let element = self.library.instantiate(index)?;
        Some(self.canvas.insert_element(element))
    }

    /// Remove a library component.
    pub async fn remove_library_component(
        &mut self,
        index: usize,
    ) -> Result<Option<LibraryComponent>, StorageError> {
        self.library.remove(index).await
    }

    // --- Request plumbing ---

    fn check_ready(&self, prompt: &str) -> Result<(), RequestError> {
        if self.phase == Phase::NeedsAuth {
            return Err(RequestError::NeedsAuth);
        }
        if self.active_request.is_some() {
            return Err(RequestError::Busy);
        }
        if prompt.trim().is_empty() {
            return Err(RequestError::EmptyPrompt);
        }
        Ok(())
    }

    fn start<T>(
        &mut self,
        kind: TaskKind,
        target: Option<ElementId>,
        target_name: Option<String>,
        prompt: &str,
        future: BoxFuture<'static, GatewayResult<T>>,
    ) -> PendingRequest<T> {
        self.next_request += 1;
        let id = self.next_request;
        self.active_request = Some(id);
        self.status = TaskStatus::Generating(kind);
        self.activity.user(prompt, target_name.clone());
        log::debug!("Request {} started: {}", id, kind);

        PendingRequest {
            ticket: RequestTicket {
                id,
                kind,
                token: self.canvas.request_token(target),
                target_name,
                prompt: prompt.to_string(),
            },
            future,
        }
    }

    /// Close out a completed request, returning its value on success.
    fn settle<T>(
        &mut self,
        completed: CompletedRequest<T>,
    ) -> Result<(RequestTicket, T), ApplyOutcome> {
        let CompletedRequest { ticket, result } = completed;
        if self.active_request != Some(ticket.id) {
            log::debug!("Discarding result of cancelled request {}", ticket.id);
            return Err(ApplyOutcome::Discarded);
        }
        self.active_request = None;
        self.status = TaskStatus::Idle;

        match result {
            Ok(value) => Ok((ticket, value)),
            Err(err) => Err(self.fail(&ticket, err)),
        }
    }

    fn fail(&mut self, ticket: &RequestTicket, err: GatewayError) -> ApplyOutcome {
        log::warn!("{} failed: {}", ticket.kind, err);
        if err.is_auth() {
            self.phase = Phase::NeedsAuth;
            log::info!("Credentials rejected, awaiting new key");
        } else {
            self.status = TaskStatus::Error(err.to_string());
        }
        self.activity
            .agent(format!("The {} failed: {}", ticket.kind, err), ticket.target_name.clone());
        ApplyOutcome::Failed(err)
    }

    fn discard_stale(&self, ticket: &RequestTicket) -> bool {
        if self.canvas.accepts(&ticket.token) {
            return false;
        }
        log::debug!("Discarding stale {} result for \"{}\"", ticket.kind, ticket.prompt);
        true
    }

    fn image_target(&self, id: &ElementId) -> Result<(String, Content), RequestError> {
        let element = self
            .canvas
            .state()
            .element(id)
            .ok_or_else(|| RequestError::NotFound(id.clone()))?;
        if !element.kind.is_image() && !element.content.is_image() {
            return Err(RequestError::NotAnImage(id.clone()));
        }
        Ok((element.name.clone(), element.content.clone()))
    }

    // --- Layout ---

    /// Start regenerating the whole canvas from `prompt`.
    pub fn begin_generate_layout(
        &mut self,
        prompt: &str,
    ) -> Result<PendingRequest<LayoutResult>, RequestError> {
        self.check_ready(prompt)?;
        let gateway = Arc::clone(&self.gateway);
        let owned_prompt = prompt.to_string();
        let state = self.canvas.state().clone();
        let future: BoxFuture<'static, GatewayResult<LayoutResult>> = Box::pin(async move {
            gateway.generate_layout(&owned_prompt, state.platform, &state).await
        });
        Ok(self.start(TaskKind::Layout, None, None, prompt, future))
    }

    /// Replace the document with a generated layout, unless it changed meanwhile.
    pub fn finish_generate_layout(
        &mut self,
        completed: CompletedRequest<LayoutResult>,
    ) -> ApplyOutcome {
        let (ticket, layout) = match self.settle(completed) {
            Ok(settled) => settled,
            Err(outcome) => return outcome,
        };
        if self.discard_stale(&ticket) {
            return ApplyOutcome::Discarded;
        }
        let count = layout.elements.len();
        self.canvas.replace_layout(layout.elements, layout.page_style);
        self.activity.agent(format!("Generated a layout with {} elements", count), None);
        log::info!("Layout replaced ({} elements)", count);
        ApplyOutcome::Applied
    }

    pub async fn generate_layout(&mut self, prompt: &str) -> Result<ApplyOutcome, RequestError> {
        let pending = self.begin_generate_layout(prompt)?;
        let completed = pending.run().await;
        Ok(self.finish_generate_layout(completed))
    }

    // --- Element refinement ---

    /// Start reworking the element `id` according to `instruction`.
    pub fn begin_refine_element(
        &mut self,
        id: &ElementId,
        instruction: &str,
    ) -> Result<PendingRequest<Element>, RequestError> {
        self.check_ready(instruction)?;
        let element = self
            .canvas
            .state()
            .element(id)
            .cloned()
            .ok_or_else(|| RequestError::NotFound(id.clone()))?;
        let name = element.name.clone();
        let gateway = Arc::clone(&self.gateway);
        let owned_instruction = instruction.to_string();
        let future: BoxFuture<'static, GatewayResult<Element>> = Box::pin(async move {
            gateway.refine_element(&element, &owned_instruction).await
        });
        Ok(self.start(TaskKind::RefineElement, Some(id.clone()), Some(name), instruction, future))
    }

    /// Replace the target with its refined version, keeping its id.
    pub fn finish_refine_element(&mut self, completed: CompletedRequest<Element>) -> ApplyOutcome {
        let (ticket, mut element) = match self.settle(completed) {
            Ok(settled) => settled,
            Err(outcome) => return outcome,
        };
        let Some(target) = ticket.token.target().cloned() else {
            return ApplyOutcome::Discarded;
        };
        if self.discard_stale(&ticket) {
            return ApplyOutcome::Discarded;
        }
        element.id = target;
        if !self.canvas.replace_element(element) {
            return ApplyOutcome::Discarded;
        }
        let name = ticket.target_name.clone().unwrap_or_default();
        self.activity.agent(format!("Refined {}", name), ticket.target_name);
        ApplyOutcome::Applied
    }

    pub async fn refine_element(
        &mut self,
        id: &ElementId,
        instruction: &str,
    ) -> Result<ApplyOutcome, RequestError> {
        let pending = self.begin_refine_element(id, instruction)?;
        let completed = pending.run().await;
        Ok(self.finish_refine_element(completed))
    }

    // --- Images ---

    /// Start generating a new image for the image element `id`.
    pub fn begin_generate_image(
        &mut self,
        id: &ElementId,
        prompt: &str,
    ) -> Result<PendingRequest<String>, RequestError> {
        self.check_ready(prompt)?;
        let (name, _) = self.image_target(id)?;
        let gateway = Arc::clone(&self.gateway);
        let owned_prompt = prompt.to_string();
        let future: BoxFuture<'static, GatewayResult<String>> =
            Box::pin(async move { gateway.generate_image(&owned_prompt).await });
        Ok(self.start(TaskKind::GenerateImage, Some(id.clone()), Some(name), prompt, future))
    }

    /// Start editing the current image of element `id`.
    pub fn begin_refine_image(
        &mut self,
        id: &ElementId,
        instruction: &str,
    ) -> Result<PendingRequest<String>, RequestError> {
        self.check_ready(instruction)?;
        let (name, content) = self.image_target(id)?;
        // Only embedded image data can be edited; remote URLs are not fetched
        if !content.is_inline_image() {
            return Err(RequestError::NotAnImage(id.clone()));
        }
        let gateway = Arc::clone(&self.gateway);
        let image = content.as_str().to_string();
        let owned_instruction = instruction.to_string();
        let future: BoxFuture<'static, GatewayResult<String>> = Box::pin(async move {
            gateway.refine_image(&image, &owned_instruction).await
        });
        Ok(self.start(TaskKind::RefineImage, Some(id.clone()), Some(name), instruction, future))
    }

    /// Put a generated or refined image into the target element.
    pub fn finish_image(&mut self, completed: CompletedRequest<String>) -> ApplyOutcome {
        let (ticket, uri) = match self.settle(completed) {
            Ok(settled) => settled,
            Err(outcome) => return outcome,
        };
        let Some(target) = ticket.token.target().cloned() else {
            return ApplyOutcome::Discarded;
        };
        if self.discard_stale(&ticket) {
            return ApplyOutcome::Discarded;
        }
        if !self.canvas.update_content(&target, Content::ImageRef(uri)) {
            return ApplyOutcome::Discarded;
        }
        let name = ticket.target_name.clone().unwrap_or_default();
        self.activity.agent(format!("Updated the image on {}", name), ticket.target_name);
        ApplyOutcome::Applied
    }

    pub async fn generate_image(
        &mut self,
        id: &ElementId,
        prompt: &str,
    ) -> Result<ApplyOutcome, RequestError> {
        let pending = self.begin_generate_image(id, prompt)?;
        let completed = pending.run().await;
        Ok(self.finish_image(completed))
    }

    pub async fn refine_image(
        &mut self,
        id: &ElementId,
        instruction: &str,
    ) -> Result<ApplyOutcome, RequestError> {
        let pending = self.begin_refine_image(id, instruction)?;
        let completed = pending.run().await;
        Ok(self.finish_image(completed))
    }

    // --- Component library ---

    /// Start generating a reusable component from `description`.
    pub fn begin_create_component(
        &mut self,
        description: &str,
    ) -> Result<PendingRequest<Element>, RequestError> {
        self.check_ready(description)?;
        let gateway = Arc::clone(&self.gateway);
        let owned_description = description.to_string();
        let future: BoxFuture<'static, GatewayResult<Element>> = Box::pin(async move {
            gateway.generate_component_template(&owned_description).await
        });
        Ok(self.start(TaskKind::Component, None, None, description, future))
    }

    /// Save a generated template to the library under a fresh id.
    pub async fn finish_create_component(
        &mut self,
        completed: CompletedRequest<Element>,
    ) -> ApplyOutcome {
        let (ticket, mut template) = match self.settle(completed) {
            Ok(settled) => settled,
            Err(outcome) => return outcome,
        };
        template.id = ElementId::generate();
        template.position = None;
        let name = if template.name.trim().is_empty() {
            ticket.prompt.clone()
        } else {
            template.name.clone()
        };
        let component = LibraryComponent::new(name.clone(), ticket.prompt.clone(), template);
        match self.library.add(component).await {
            Ok(()) => {
                self.activity.agent(format!("Saved {} to the library", name), None);
                ApplyOutcome::Applied
            }
            Err(err) => {
                log::warn!("Failed to save component {}: {}", name, err);
                self.status = TaskStatus::Error(err.to_string());
                ApplyOutcome::StorageFailed(err.to_string())
            }
        }
    }

    pub async fn create_component(
        &mut self,
        description: &str,
    ) -> Result<ApplyOutcome, RequestError> {
        let pending = self.begin_create_component(description)?;
        let completed = pending.run().await;
        Ok(self.finish_create_component(completed).await)
    }

    // --- Export ---

    /// Start rendering the current elements to source code.
    pub fn begin_export_markup(&mut self) -> Result<PendingRequest<String>, RequestError> {
        const EXPORT_PROMPT: &str = "Export markup";
        self.check_ready(EXPORT_PROMPT)?;
        let gateway = Arc::clone(&self.gateway);
        let elements = self.canvas.state().elements.clone();
        let future: BoxFuture<'static, GatewayResult<String>> =
            Box::pin(async move { gateway.export_to_markup(&elements).await });
        Ok(self.start(TaskKind::Export, None, None, EXPORT_PROMPT, future))
    }

    /// Store exported source code. Export is a read of the document, so a
    /// result is kept even if the canvas changed meanwhile.
    pub fn finish_export_markup(&mut self, completed: CompletedRequest<String>) -> ApplyOutcome {
        match self.settle(completed) {
            Ok((_, code)) => {
                self.export = Some(code);
                ApplyOutcome::Applied
            }
            Err(outcome) => outcome,
        }
    }

    pub async fn export_markup(&mut self) -> Result<ApplyOutcome, RequestError> {
        let pending = self.begin_export_markup()?;
        let completed = pending.run().await;
        Ok(self.finish_export_markup(completed))
    }
}
