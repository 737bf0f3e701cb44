pub mod colors;
pub mod texture;
