//! Visionary Studio Core Library
//!
//! Platform-agnostic document model, editing engine and AI orchestration for
//! the Visionary Studio UI designer.

pub mod activity;
pub mod canvas;
pub mod config;
pub mod context;
pub mod drag;
pub mod element;
pub mod gateway;
pub mod history;
pub mod input;
pub mod library;
pub mod snap;
pub mod storage;
pub mod time;

pub use activity::{ActionRole, ActivityLog, AiAction, QUICK_PROMPTS, QuickPrompt};
pub use canvas::{
    Canvas, CanvasState, Layer, MutationError, MutationResult, Platform, RequestToken, Selection,
};
pub use config::CanvasConfig;
pub use context::{
    AppContext, ApplyOutcome, CompletedRequest, PendingRequest, Phase, RequestError, RequestTicket,
    TaskKind, TaskStatus,
};
pub use drag::{DragEngine, DragOutcome, DragSession, DragState};
pub use element::{
    Content, Element, ElementId, ElementKind, PAGE_BACKGROUND_ID, Palette, PaletteEntry, Style,
};
pub use gateway::{Gateway, GatewayError, GatewayResult, LayoutResult};
pub use history::{HistoryBuffer, HistoryEntry};
pub use input::{KeyEvent, MouseButton, PointerEvent, PointerTarget};
pub use library::{ComponentLibrary, LibraryComponent, LIBRARY_STORAGE_KEY};
pub use snap::{SnapResult, constrain_position, snap_to_grid};
pub use storage::{MemoryStorage, Storage, StorageError, StorageResult};

pub use kurbo;

use std::future::Future;
use std::pin::Pin;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// `Send + Sync` on native targets, no bound on WASM where everything is
/// single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait MaybeSendSync: Send + Sync {}
#[cfg(not(target_arch = "wasm32"))]
impl<T: Send + Sync + ?Sized> MaybeSendSync for T {}

/// `Send + Sync` on native targets, no bound on WASM where everything is
/// single-threaded.
#[cfg(target_arch = "wasm32")]
pub trait MaybeSendSync {}
#[cfg(target_arch = "wasm32")]
impl<T: ?Sized> MaybeSendSync for T {}
