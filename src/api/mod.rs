pub mod render;

pub use render::{handle_render, __path_handle_render, X_IMAGE_HEIGHT, X_IMAGE_WIDTH};
