//! Calendar image rendering.
//!
//! # Responsibility
//! - Package guild state into a render-ready descriptor (`request`).
//! - Rasterize descriptors into PNG bytes behind the `Rasterizer` seam (`png`).
//!
//! # Invariants
//! - Request building is pure; only rasterizers produce bytes.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod png;
pub mod request;

pub use png::PngRasterizer;
pub use request::{build_render_request, RenderRequest, MAX_RENDERED_EVENTS};

/// File name attached to every posted calendar image.
pub const CALENDAR_FILE_NAME: &str = "calendar.png";

#[derive(Debug)]
pub enum RenderError {
    /// Image encoding failed.
    Encode(image::ImageError),
    /// Descriptor cannot be drawn (e.g. weekday out of range).
    InvalidRequest(String),
}

impl Display for RenderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode calendar image: {err}"),
            Self::InvalidRequest(message) => write!(f, "invalid render request: {message}"),
        }
    }
}

impl Error for RenderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) => Some(err),
            Self::InvalidRequest(_) => None,
        }
    }
}

impl From<image::ImageError> for RenderError {
    fn from(value: image::ImageError) -> Self {
        Self::Encode(value)
    }
}

/// Turns a render descriptor into encoded image bytes.
pub trait Rasterizer {
    fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError>;
}

impl<T: Rasterizer + ?Sized> Rasterizer for &T {
    fn render(&self, request: &RenderRequest) -> Result<Vec<u8>, RenderError> {
        (**self).render(request)
    }
}
