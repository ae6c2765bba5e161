use crate::font::FontProvider;
use crate::geometry::Rect;
use crate::render::device::RenderDevice;
use crate::render::frame::{CommandPacket, SinkCommand};
use crate::render::{Graphics, RenderState, Renderer};

use core::sync::atomic::{AtomicU32, Ordering};

static BITMAP_WARN_COUNT: AtomicU32 = AtomicU32::new(0);
static FONT_WARN_COUNT: AtomicU32 = AtomicU32::new(0);
const WARN_LIMIT: u32 = 8;

fn warn_limited(counter: &AtomicU32) -> bool {
    counter.fetch_add(1, Ordering::Relaxed) < WARN_LIMIT
}

/// Outcome of one replay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub replayed: usize,
    pub skipped: usize,
}

/// Plays a recorded [`CommandPacket`] back onto a pixel device.
///
/// Clip and mode commands are honored; fills and lines go straight to the device; strings are drawn
/// through the font provider. Bitmap commands carry no pixels and are skipped with a warning.
#[derive(Debug, Default)]
pub struct CommandExecutor {
    frames: u32,
}

impl CommandExecutor {
    pub fn new() -> Self {
        Self { frames: 0 }
    }

    /// Packets replayed so far.
    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn execute<D: RenderDevice + ?Sized>(
        &mut self,
        packet: &CommandPacket,
        device: &mut D,
        fonts: &dyn FontProvider,
    ) -> ReplayStats {
        let bounds = device.bounds();
        let mut state = RenderState::new(bounds);
        let mut stats = ReplayStats::default();

        for cmd in &packet.cmds {
            match cmd {
                SinkCommand::SetClip { rect } => {
                    let mut clip = *rect;
                    if !clip.bound(bounds) {
                        clip = Rect::default();
                    }
                    state.clip = clip;
                }
                SinkCommand::SetMode { mode } => state.mode = *mode,
                SinkCommand::FillRect { rect, color } => {
                    let mut r = *rect;
                    if r.bound(state.clip) {
                        device.fill_rect_absolute(&state, r, *color);
                    }
                }
                SinkCommand::HorizontalLine { y, x0, x1, color } => {
                    device.draw_horizontal_line_absolute(&state, *y, *x0, *x1, *color);
                }
                SinkCommand::VerticalLine { x, y0, y1, color } => {
                    device.draw_vertical_line_absolute(&state, *x, *y0, *y1, *color);
                }
                SinkCommand::Line { p0, p1, color } => {
                    device.draw_line_absolute(&state, *p0, *p1, *color);
                }
                SinkCommand::DrawString { font, pos, text, color } => {
                    let resolved = fonts.font(font).or_else(|| fonts.default_font(device.is_monochrome()));
                    let Some(resolved) = resolved else {
                        if warn_limited(&FONT_WARN_COUNT) {
                            log::warn!("replay: font {font:?} not available, string skipped");
                        }
                        stats.skipped += 1;
                        continue;
                    };
                    let mut graphics = Renderer::new(&mut *device, fonts);
                    graphics.set_clip(state.clip);
                    graphics.set_mode(state.mode);
                    resolved.render(&mut graphics, *pos, text, *color);
                }
                SinkCommand::DrawBitmap { dst, src_rect, .. } => {
                    if warn_limited(&BITMAP_WARN_COUNT) {
                        log::warn!("replay: bitmap at {dst:?} ({src_rect:?}) has no pixels in the packet; skipped");
                    }
                    stats.skipped += 1;
                    continue;
                }
            }
            stats.replayed += 1;
        }

        self.frames += 1;
        log::trace!("replay #{}: {} replayed, {} skipped", self.frames, stats.replayed, stats.skipped);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::{Bitmap, PixelFormat};
    use crate::color::Color;
    use crate::font::NoFonts;
    use crate::geometry::Point;
    use crate::render::command::CommandDevice;
    use crate::render::device::ColorDevice;
    use crate::render::DrawMode;

    #[test]
    fn replay_matches_direct_rendering() {
        let scene = |g: &mut dyn Graphics| {
            g.fill_rect(Rect::new(0, 0, 8, 8), Color::BLUE);
            g.set_clip(Rect::new(2, 2, 6, 6));
            g.fill_rect(Rect::new(0, 0, 8, 8), Color::RED);
            g.draw_line(Point::new(0, 7), Point::new(7, 0), Color::WHITE);
            g.draw_rect(Rect::new(1, 1, 7, 7), Color::GREEN);
        };

        let mut direct = Bitmap::new(8, 8, PixelFormat::Rgba8888);
        {
            let mut g = Renderer::new(ColorDevice::new(direct.access_for_write()).unwrap(), &NoFonts);
            scene(&mut g);
        }

        let mut packet = CommandPacket::new();
        {
            let mut g = Renderer::new(CommandDevice::new(&mut packet, Rect::from_size(8, 8), false), &NoFonts);
            scene(&mut g);
        }
        let mut replayed = Bitmap::new(8, 8, PixelFormat::Rgba8888);
        let mut device = ColorDevice::new(replayed.access_for_write()).unwrap();
        let mut exec = CommandExecutor::new();
        let stats = exec.execute(&packet, &mut device, &NoFonts);
        drop(device);

        assert_eq!(stats.skipped, 0);
        assert_eq!(exec.frames(), 1);
        assert_eq!(replayed.access_for_read().bytes(), direct.access_for_read().bytes());
    }

    #[test]
    fn replay_keeps_the_recorded_draw_mode() {
        let scene = |g: &mut dyn Graphics| {
            g.fill_rect(Rect::new(0, 0, 12, 12), Color::BLUE);
            g.set_mode(DrawMode::ANTIALIAS);
            g.draw_line(Point::new(0, 1), Point::new(11, 6), Color::WHITE);
            g.set_mode(DrawMode::empty());
            g.draw_line(Point::new(0, 11), Point::new(11, 3), Color::RED);
        };

        let mut direct = Bitmap::new(12, 12, PixelFormat::Rgba8888);
        {
            let mut g = Renderer::new(ColorDevice::new(direct.access_for_write()).unwrap(), &NoFonts);
            scene(&mut g);
        }

        let mut packet = CommandPacket::new();
        {
            let mut g = Renderer::new(CommandDevice::new(&mut packet, Rect::from_size(12, 12), false), &NoFonts);
            scene(&mut g);
        }
        let mut replayed = Bitmap::new(12, 12, PixelFormat::Rgba8888);
        let mut device = ColorDevice::new(replayed.access_for_write()).unwrap();
        CommandExecutor::new().execute(&packet, &mut device, &NoFonts);
        drop(device);

        assert_eq!(replayed.access_for_read().bytes(), direct.access_for_read().bytes());
    }

    #[test]
    fn bitmaps_and_unknown_fonts_are_skipped() {
        let mut packet = CommandPacket::new();
        packet.cmds.push(SinkCommand::DrawBitmap {
            dst: Point::ZERO,
            src_rect: Rect::from_size(2, 2),
            format: PixelFormat::Rgba8888,
            size: Rect::from_size(2, 2),
        });
        packet.cmds.push(SinkCommand::DrawString {
            font: "gone".into(),
            pos: Point::ZERO,
            text: "hi".into(),
            color: Color::WHITE,
        });
        let mut bm = Bitmap::new(2, 2, PixelFormat::Rgba8888);
        let mut device = ColorDevice::new(bm.access_for_write()).unwrap();
        let stats = CommandExecutor::new().execute(&packet, &mut device, &NoFonts);
        assert_eq!(stats, ReplayStats { replayed: 0, skipped: 2 });
    }
}
