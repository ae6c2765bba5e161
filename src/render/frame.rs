use crate::bitmap::{Bitmap, PixelFormat};
use crate::color::Color;
use crate::font::Font;
use crate::geometry::{Point, Rect};
use crate::render::command::CommandSink;
use crate::render::DrawMode;

/// One recorded sink call, in absolute coordinates.
#[derive(Clone, Debug, PartialEq)]
pub enum SinkCommand {
    SetClip { rect: Rect },
    SetMode { mode: DrawMode },
    FillRect { rect: Rect, color: Color },
    HorizontalLine { y: i32, x0: i32, x1: i32, color: Color },
    VerticalLine { x: i32, y0: i32, y1: i32, color: Color },
    Line { p0: Point, p1: Point, color: Color },
    /// Fonts are recorded by name and resolved again on replay.
    DrawString { font: String, pos: Point, text: String, color: Color },
    /// Geometry only; the packet does not keep the source pixels.
    DrawBitmap { dst: Point, src_rect: Rect, format: PixelFormat, size: Rect },
}

/// A command sink that records everything it receives.
#[derive(Clone, Debug, Default)]
pub struct CommandPacket {
    pub cmds: Vec<SinkCommand>,
}

impl CommandPacket {
    pub fn new() -> Self {
        Self { cmds: Vec::new() }
    }

    pub fn reset(&mut self) {
        self.cmds.clear();
    }

    pub fn len(&self) -> usize {
        self.cmds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cmds.is_empty()
    }
}

impl CommandSink for CommandPacket {
    fn set_clip(&mut self, rect: Rect) {
        self.cmds.push(SinkCommand::SetClip { rect });
    }

    fn set_mode(&mut self, mode: DrawMode) {
        self.cmds.push(SinkCommand::SetMode { mode });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.cmds.push(SinkCommand::FillRect { rect, color });
    }

    fn draw_horizontal_line(&mut self, y: i32, x0: i32, x1: i32, color: Color) {
        self.cmds.push(SinkCommand::HorizontalLine { y, x0, x1, color });
    }

    fn draw_vertical_line(&mut self, x: i32, y0: i32, y1: i32, color: Color) {
        self.cmds.push(SinkCommand::VerticalLine { x, y0, y1, color });
    }

    fn draw_line(&mut self, p0: Point, p1: Point, color: Color) {
        self.cmds.push(SinkCommand::Line { p0, p1, color });
    }

    fn draw_string(&mut self, font: &dyn Font, pos: Point, text: &str, color: Color) {
        self.cmds.push(SinkCommand::DrawString {
            font: font.name().to_owned(),
            pos,
            text: text.to_owned(),
            color,
        });
    }

    fn draw_bitmap(&mut self, dst: Point, bitmap: &Bitmap, src_rect: Rect) {
        self.cmds.push(SinkCommand::DrawBitmap { dst, src_rect, format: bitmap.format(), size: bitmap.size() });
    }
}
