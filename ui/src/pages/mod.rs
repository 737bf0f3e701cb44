//! Pages of the application. QR Genie has a single page.

mod home_page;

pub use home_page::home_page;
