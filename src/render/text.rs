//! Text placement: anchors and greedy word wrap. Glyph drawing belongs to the font.

use crate::font::Font;
use crate::geometry::{Point, Rect};
use crate::render::Alignment;

const TAB_SPACES: &str = "        ";

/// Top-left pen position for `text` aligned inside `rect`.
///
/// Each axis is read as a whole: conflicting flags on one axis (`RIGHT | H_CENTER`) anchor
/// that axis at the left or top.
pub(crate) fn anchor(font: &dyn Font, rect: Rect, text: &str, alignment: Alignment) -> Point {
    let mut pos = rect.left_top();
    let horizontal = alignment & Alignment::H_MASK;
    if horizontal == Alignment::RIGHT {
        pos.x = rect.right - font.string_width(text);
    } else if horizontal == Alignment::H_CENTER {
        pos.x = rect.left + (rect.width() - font.string_width(text)) / 2;
    }
    let vertical = alignment & Alignment::V_MASK;
    if vertical == Alignment::BOTTOM {
        pos.y = rect.bottom - font.line_height();
    } else if vertical == Alignment::V_CENTER {
        pos.y = rect.top + (rect.height() - font.line_height()) / 2;
    }
    pos
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Line {
    pub rect: Rect,
    pub text: String,
}

/// Split `text` on line feeds and wrap each paragraph at spaces to `bounds.width()`.
///
/// Each line gets a `line_height` tall rect. Layout stops when a paragraph would start below
/// or right of `bounds`, or when wrapping pushes a line's top to `bounds.bottom`.
pub(crate) fn layout_lines(font: &dyn Font, bounds: Rect, text: &str) -> Vec<Line> {
    let line_height = font.line_height();
    let mut line_rect = Rect::new(bounds.left, bounds.top, bounds.right, bounds.top + line_height);
    let mut lines = Vec::new();

    'paragraphs: for paragraph in text.split('\n') {
        if line_rect.top > bounds.bottom || line_rect.left > bounds.right {
            log::debug!("text layout: {line_rect:?} starts outside {bounds:?}, stopping");
            break;
        }

        let mut current = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let word = word.replace('\t', TAB_SPACES);
            if current.is_empty() {
                current = word;
                continue;
            }
            let candidate = format!("{current} {word}");
            if font.string_width(&candidate) <= bounds.width() {
                current = candidate;
                continue;
            }
            lines.push(Line { rect: line_rect, text: core::mem::replace(&mut current, word) });
            line_rect = line_rect.offset(Point::new(0, line_height));
            if line_rect.top >= bounds.bottom {
                break 'paragraphs;
            }
        }
        if !current.is_empty() {
            lines.push(Line { rect: line_rect, text: current });
        }
        line_rect = line_rect.offset(Point::new(0, line_height));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::render::Graphics;

    /// Every character 1 px wide, lines 2 px tall.
    struct Fixed;

    impl Font for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn line_height(&self) -> i32 {
            2
        }

        fn string_width(&self, text: &str) -> i32 {
            text.chars().count() as i32
        }

        fn render(&self, _graphics: &mut dyn Graphics, _pos: Point, _text: &str, _color: Color) {}
    }

    fn texts(lines: &[Line]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn anchors_follow_alignment() {
        let r = Rect::new(10, 20, 30, 30);
        assert_eq!(anchor(&Fixed, r, "abcd", Alignment::LEFT_TOP), Point::new(10, 20));
        assert_eq!(anchor(&Fixed, r, "abcd", Alignment::RIGHT | Alignment::BOTTOM), Point::new(26, 28));
        assert_eq!(anchor(&Fixed, r, "abcd", Alignment::CENTER), Point::new(18, 24));
    }

    #[test]
    fn conflicting_flags_fall_back_to_left_top() {
        let r = Rect::new(10, 20, 30, 30);
        let both_h = Alignment::RIGHT | Alignment::H_CENTER;
        assert_eq!(anchor(&Fixed, r, "abcd", both_h), Point::new(10, 20));
        assert_eq!(anchor(&Fixed, r, "abcd", both_h | Alignment::BOTTOM), Point::new(10, 28));
        let both_v = Alignment::BOTTOM | Alignment::V_CENTER;
        assert_eq!(anchor(&Fixed, r, "abcd", Alignment::RIGHT | both_v), Point::new(26, 20));
    }

    #[test]
    fn wraps_greedily_at_spaces() {
        let lines = layout_lines(&Fixed, Rect::new(0, 0, 7, 100), "aa bb cc dd");
        assert_eq!(texts(&lines), vec!["aa bb", "cc dd"]);
        assert_eq!(lines[1].rect, Rect::new(0, 2, 7, 4));
    }

    #[test]
    fn line_feeds_start_new_paragraphs() {
        let lines = layout_lines(&Fixed, Rect::new(0, 0, 50, 100), "one\ntwo\n\nfour");
        assert_eq!(texts(&lines), vec!["one", "two", "four"]);
        assert_eq!(lines[2].rect.top, 6);
    }

    #[test]
    fn long_word_gets_its_own_line_once() {
        let lines = layout_lines(&Fixed, Rect::new(0, 0, 3, 100), "a abcdef b");
        assert_eq!(texts(&lines), vec!["a", "abcdef", "b"]);
    }

    #[test]
    fn tabs_expand_to_eight_spaces() {
        let lines = layout_lines(&Fixed, Rect::new(0, 0, 50, 100), "a\tb");
        assert_eq!(texts(&lines), vec!["a        b"]);
    }

    #[test]
    fn stops_at_bottom() {
        let lines = layout_lines(&Fixed, Rect::new(0, 0, 2, 4), "aa bb cc dd");
        assert_eq!(texts(&lines), vec!["aa", "bb"]);
    }

    #[test]
    fn start_outside_bounds_draws_nothing() {
        let lines = layout_lines(&Fixed, Rect::new(5, 0, 3, 4), "x");
        assert!(lines.is_empty());
    }
}
