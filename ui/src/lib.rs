//! egui front end of QR Genie, for native windows and the browser.

#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod pages;
pub mod render_queue;
pub mod state;
pub mod utils;
pub mod widgets;

pub use app::QrGenieApp;
