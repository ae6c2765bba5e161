use crate::bitmap::{PaintMode, PixelFormat};
use crate::compositor::RenderMode;

/// Failures reported by drawing and compositing operations.
///
/// Geometric no-ops (empty rects, fully clipped blits) are never errors.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GraphicsError {
    #[error("pixel format mismatch: expected {expected:?}, found {found:?}")]
    FormatMismatch { expected: PixelFormat, found: PixelFormat },

    #[error("paint mode {mode:?} is not supported by the {target} backend")]
    UnsupportedMode { mode: PaintMode, target: &'static str },

    #[error("{0} is not supported by this target")]
    Unsupported(&'static str),

    #[error("invalid surface: {0}")]
    InvalidSurface(String),

    #[error("font not found: {0:?}")]
    FontNotFound(String),

    #[error("no offscreen buffer allocated")]
    NoOffscreen,

    #[error("operation requires render mode {expected:?}, compositor is in {actual:?}")]
    WrongRenderMode { expected: RenderMode, actual: RenderMode },
}

pub type Result<T, E = GraphicsError> = core::result::Result<T, E>;
