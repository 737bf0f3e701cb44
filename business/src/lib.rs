//! Generation controller, history store and QR rendering behind QR Genie.

mod color;
mod config;
mod controller;
mod download;
mod error;
mod history;
mod render;
mod request;
mod storage;

pub use color::{DEFAULT_FG_COLOR, Rgba, TRANSPARENT, WHITE, parse_hex, to_hex};
pub use config::BusinessConfig;
pub use controller::{
    DOWNLOAD_FAILED_TITLE, DownloadTarget, GenerationController, NO_PREVIEW_MESSAGE,
    NO_PREVIEW_TITLE, Notification, NotificationKind, Preview, RENDER_FAILED_MESSAGE,
    RENDER_FAILED_TITLE, RenderJob, STORAGE_DEGRADED_MESSAGE, STORAGE_DEGRADED_TITLE,
};
pub use download::{DownloadSink, MemorySink, SavedFile, download_filename};
pub use error::{
    DownloadError, Field, GenerateError, PersistenceError, RenderError, ValidationErrors,
};
pub use history::{
    HISTORY_KEY, HistoryList, HistoryRecord, HistoryStore, MAX_HISTORY, display_timestamp,
    iso_timestamp,
};
pub use render::{DEFAULT_MARGIN, QrCodeRenderer, QrRenderer, RenderOptions, RenderedImage};
pub use request::{
    COLOR_INVALID, GenerationRequest, MAX_SIZE, QrSize, SIZE_INVALID, SIZE_TOO_LARGE,
    TEXT_REQUIRED,
};
pub use storage::{KeyValueStore, MemoryStore};

#[cfg(not(target_arch = "wasm32"))]
pub use download::DirectorySink;
#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;

#[cfg(target_arch = "wasm32")]
pub use download::BrowserDownload;
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStorage;
