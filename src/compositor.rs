//! Dirty-region tracking and offscreen/flip buffer management.
//!
//! Design rule: the compositor owns the buffers and the dirty bookkeeping; painting itself
//! is delegated to a [`Painter`] through the format-matching backend.

use crate::bitmap::{Bitmap, PixelFormat};
use crate::error::{GraphicsError, Result};
use crate::font::FontProvider;
use crate::geometry::{Point, Rect};
use crate::region::Region;
use crate::render::device::{ColorDevice, MonoDevice, RenderDevice, Rgb565Device};
use crate::render::{CommandDevice, CommandSink, DrawMode, Graphics, Renderer};
use crate::util::config::RenderConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RenderMode {
    /// No buffers; frames stream to a [`CommandSink`].
    External,
    #[default]
    Offscreen,
    /// Two buffers, alternated every redraw.
    Flip,
}

impl RenderMode {
    pub const fn buffer_count(self) -> usize {
        match self {
            RenderMode::External => 0,
            RenderMode::Offscreen => 1,
            RenderMode::Flip => 2,
        }
    }
}

/// Scene callback run once per dirty rect.
///
/// The graphics clip is already set to `update_rect`; drawing outside it has no effect.
pub trait Painter {
    fn paint(&mut self, graphics: &mut dyn Graphics, update_rect: Rect);
}

impl<F> Painter for F
where
    F: FnMut(&mut dyn Graphics, Rect),
{
    fn paint(&mut self, graphics: &mut dyn Graphics, update_rect: Rect) {
        (*self)(graphics, update_rect)
    }
}

pub struct FrameCompositor {
    target: Rect,
    format: PixelFormat,
    mode: RenderMode,
    buffers: Vec<Bitmap>,
    active: usize,
    dirty: Region,
    last_dirty: Region,
    default_mode: DrawMode,
}

impl FrameCompositor {
    pub fn new(width: i32, height: i32, format: PixelFormat, mode: RenderMode) -> Self {
        let mut compositor = Self {
            target: Rect::default(),
            format,
            mode,
            buffers: Vec::new(),
            active: 0,
            dirty: Region::new(),
            last_dirty: Region::new(),
            default_mode: DrawMode::empty(),
        };
        compositor.resize(width, height);
        compositor
    }

    pub fn from_config(width: i32, height: i32, config: &RenderConfig) -> Self {
        let mut compositor = Self::new(width, height, config.pixel_format, config.render_mode);
        if config.antialias {
            compositor.default_mode = DrawMode::ANTIALIAS;
        }
        compositor
    }

    /// Adopt caller-allocated buffers. Flip mode needs `second`, of the same size and format.
    pub fn with_buffers(first: Bitmap, second: Option<Bitmap>, mode: RenderMode) -> Result<Self> {
        let mut buffers = vec![first];
        match (mode, second) {
            (RenderMode::External, _) => {
                return Err(GraphicsError::InvalidSurface("external mode takes no buffers".into()));
            }
            (RenderMode::Offscreen, Some(_)) => {
                return Err(GraphicsError::InvalidSurface("offscreen mode takes one buffer".into()));
            }
            (RenderMode::Offscreen, None) => {}
            (RenderMode::Flip, None) => {
                return Err(GraphicsError::InvalidSurface("flip mode needs two buffers".into()));
            }
            (RenderMode::Flip, Some(second)) => {
                if second.format() != buffers[0].format() {
                    return Err(GraphicsError::FormatMismatch {
                        expected: buffers[0].format(),
                        found: second.format(),
                    });
                }
                if second.size() != buffers[0].size() {
                    return Err(GraphicsError::InvalidSurface(format!(
                        "flip buffers differ in size: {:?} vs {:?}",
                        buffers[0].size(),
                        second.size()
                    )));
                }
                buffers.push(second);
            }
        }

        let target = buffers[0].size();
        let mut dirty = Region::new();
        dirty.join(target);
        Ok(Self {
            target,
            format: buffers[0].format(),
            mode,
            buffers,
            active: 0,
            dirty,
            last_dirty: Region::new(),
            default_mode: DrawMode::empty(),
        })
    }

    /// Reallocate the buffers for a new target size and schedule a full redraw.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.target = Rect::from_size(width.max(0), height.max(0));
        self.buffers = (0..self.mode.buffer_count())
            .map(|_| Bitmap::new(self.target.width(), self.target.height(), self.format))
            .collect();
        self.active = 0;
        self.dirty.set_empty();
        self.last_dirty.set_empty();
        self.invalidate_all();
        log::debug!(
            "compositor: {}x{} {:?}, {:?} ({} buffers)",
            self.target.width(),
            self.target.height(),
            self.format,
            self.mode,
            self.buffers.len()
        );
    }

    pub fn size(&self) -> Rect {
        self.target
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn render_mode(&self) -> RenderMode {
        self.mode
    }

    pub fn default_mode(&self) -> DrawMode {
        self.default_mode
    }

    /// Drawing flags every dirty rect starts with.
    pub fn set_default_mode(&mut self, mode: DrawMode) {
        self.default_mode = mode;
    }

    pub fn invalidate(&mut self, rect: Rect) {
        let mut rect = rect;
        if rect.bound(self.target) {
            self.dirty.join(rect);
        }
    }

    pub fn invalidate_all(&mut self) {
        self.invalidate(self.target);
    }

    /// Scroll the content of `rect` by `delta` inside the offscreen buffer and invalidate
    /// the strips it uncovers.
    ///
    /// Only a single offscreen buffer can be scrolled in place.
    pub fn scroll(&mut self, rect: Rect, delta: Point) -> Result<()> {
        if self.mode != RenderMode::Offscreen {
            return Err(GraphicsError::WrongRenderMode { expected: RenderMode::Offscreen, actual: self.mode });
        }
        let Some(buffer) = self.buffers.first_mut() else {
            return Err(GraphicsError::NoOffscreen);
        };
        buffer.access_for_write().scroll_rect(rect, delta);

        let rows = if delta.y < 0 {
            Rect::new(rect.left, rect.bottom + delta.y, rect.right, rect.bottom)
        } else {
            Rect::new(rect.left, rect.top, rect.right, rect.top + delta.y)
        };
        let cols = if delta.x < 0 {
            Rect::new(rect.right + delta.x, rect.top, rect.right, rect.bottom)
        } else {
            Rect::new(rect.left, rect.top, rect.left + delta.x, rect.bottom)
        };
        if !rows.is_empty() {
            self.invalidate(rows);
        }
        if !cols.is_empty() {
            self.invalidate(cols);
        }
        log::trace!("scroll {rect:?} by {delta:?}");
        Ok(())
    }

    pub fn dirty_region(&self) -> &Region {
        &self.dirty
    }

    pub fn last_dirty_region(&self) -> &Region {
        &self.last_dirty
    }

    /// The buffer holding the most recently completed frame.
    pub fn active_buffer(&self) -> Option<&Bitmap> {
        self.buffers.get(self.active)
    }

    /// The buffer the next [`redraw`](Self::redraw) paints into.
    pub fn next_render_buffer(&self) -> Option<&Bitmap> {
        match self.mode {
            RenderMode::Flip => self.buffers.get(self.active ^ 1),
            _ => self.buffers.get(self.active),
        }
    }

    /// Repaint the dirty region into the offscreen buffer.
    pub fn redraw(&mut self, painter: &mut dyn Painter, fonts: &dyn FontProvider) -> Result<()> {
        if self.mode == RenderMode::External {
            return Err(GraphicsError::WrongRenderMode { expected: RenderMode::Offscreen, actual: self.mode });
        }
        if self.buffers.is_empty() {
            return Err(GraphicsError::NoOffscreen);
        }
        if self.dirty.is_empty() {
            return Ok(());
        }
        if self.mode == RenderMode::Flip {
            self.flip()?;
        }

        let dirty = self.dirty.clone();
        let default_mode = self.default_mode;
        let buffer = &mut self.buffers[self.active];
        log::trace!("redraw into buffer {}: {:?}", self.active, dirty.rects());
        match buffer.format() {
            PixelFormat::Rgba8888 => {
                let device = ColorDevice::new(buffer.access_for_write())?;
                paint_region(device, fonts, &dirty, default_mode, painter);
            }
            PixelFormat::Rgb565 => {
                let device = Rgb565Device::new(buffer.access_for_write())?;
                paint_region(device, fonts, &dirty, default_mode, painter);
            }
            PixelFormat::Mono1 => {
                let device = MonoDevice::new(buffer.access_for_write())?;
                paint_region(device, fonts, &dirty, default_mode, painter);
            }
        }
        self.dirty.set_empty();
        Ok(())
    }

    /// Stream the dirty region to `sink` as absolute drawing commands.
    pub fn redraw_to(
        &mut self,
        sink: &mut dyn CommandSink,
        painter: &mut dyn Painter,
        fonts: &dyn FontProvider,
    ) -> Result<()> {
        if self.mode != RenderMode::External {
            return Err(GraphicsError::WrongRenderMode { expected: RenderMode::External, actual: self.mode });
        }
        if self.dirty.is_empty() {
            return Ok(());
        }
        let device = CommandDevice::new(sink, self.target, self.format.is_monochrome());
        paint_region(device, fonts, &self.dirty, self.default_mode, painter);
        self.dirty.set_empty();
        Ok(())
    }

    /// Make the other buffer active and bring it up to date outside the new dirty region.
    fn flip(&mut self) -> Result<()> {
        let previous = self.active;
        self.active ^= 1;
        if self.dirty == self.last_dirty {
            return Ok(());
        }
        if !self.last_dirty.is_empty() {
            let (src, dst) = buffer_pair(&mut self.buffers, previous, self.active);
            if self.last_dirty == self.target {
                dst.copy_from(src)?;
                log::trace!("flip: full copy forward");
            } else {
                let mut stale = self.last_dirty.clone();
                stale.exclude_region(&self.dirty);
                for rect in stale.rects() {
                    dst.copy_rect_from(src, *rect)?;
                }
                log::trace!("flip: copied forward {:?}", stale.rects());
            }
        }
        self.last_dirty = self.dirty.clone();
        Ok(())
    }
}

fn buffer_pair(buffers: &mut [Bitmap], src: usize, dst: usize) -> (&Bitmap, &mut Bitmap) {
    if src < dst {
        let (head, tail) = buffers.split_at_mut(dst);
        (&head[src], &mut tail[0])
    } else {
        let (head, tail) = buffers.split_at_mut(src);
        (&tail[0], &mut head[dst])
    }
}

fn paint_region<D: RenderDevice>(
    device: D,
    fonts: &dyn FontProvider,
    region: &Region,
    mode: DrawMode,
    painter: &mut dyn Painter,
) {
    let mut graphics = Renderer::new(device, fonts);
    for rect in region.rects() {
        graphics.set_origin(Point::ZERO);
        graphics.set_clip(*rect);
        graphics.set_mode(mode);
        painter.paint(&mut graphics, *rect);
    }
}
