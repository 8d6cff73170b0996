//! Raster image access
//!
//! This module provides:
//! - `ImageSource` trait for abstracting where images come from
//! - `LocalImageSource` for probing image files on disk

mod local;
mod service;
mod types;

pub use local::{LocalImageSource, RASTER_EXTENSIONS};
pub use service::ImageSource;
pub use types::{ImageError, ImageInfo};
