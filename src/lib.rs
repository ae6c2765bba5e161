//! coregfx
//!
//! A small 2D software renderer: rectangles, lines, gradients, text and bitmap blits into
//! RGBA8888, RGB565 or 1-bit buffers, or into an external command stream. A
//! [`FrameCompositor`] tracks dirty regions and manages offscreen or double buffers.
//!
//! Design rule: keep this file thin.

pub mod bitmap;
pub mod color;
pub mod compositor;
pub mod error;
pub mod font;
pub mod geometry;
pub mod region;
pub mod render;
pub mod util;

pub use bitmap::{Bitmap, BitmapMode, PaintMode, PixelFormat, PixelSurface, SurfaceMut, SurfaceRef};
pub use color::{Color, NativePixel, Rgba};
pub use compositor::{FrameCompositor, Painter, RenderMode};
pub use error::{GraphicsError, Result};
pub use font::{BitmapFont, Font, FontProvider, FontRegistry, Glyph, NoFonts, INVERT_COLOR};
pub use geometry::{Point, Rect};
pub use region::Region;
pub use render::device::{ColorDevice, MonoDevice, RenderDevice, Rgb565Device};
pub use render::{
    Alignment, CommandDevice, CommandExecutor, CommandPacket, CommandRenderer, CommandSink, Direction, DrawMode,
    Graphics, RenderState, Renderer, SinkCommand,
};
pub use util::config::RenderConfig;
pub use util::logging::init_logger;
