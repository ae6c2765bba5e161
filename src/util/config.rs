use std::path::Path;
use std::str::FromStr;

use crate::bitmap::PixelFormat;
use crate::compositor::RenderMode;

pub const DEFAULT_CONFIG_PATH: &str = "coregfx.cfg";

/// Renderer settings read from a `key = value` file.
///
/// ```text
/// # coregfx.cfg
/// render_mode = flip
/// pixel_format = rgb565
/// antialias = on
/// log_level = debug
/// ```
///
/// Unknown keys and unparsable values are ignored with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderConfig {
    pub render_mode: RenderMode,
    pub pixel_format: PixelFormat,
    pub antialias: bool,
    pub log_level: log::LevelFilter,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            render_mode: RenderMode::Offscreen,
            pixel_format: PixelFormat::Rgba8888,
            antialias: false,
            log_level: log::LevelFilter::Info,
        }
    }
}

impl RenderConfig {
    pub fn parse(text: &str) -> Self {
        let mut cfg = Self::default();

        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().unwrap_or("").trim();
            let value = parts.next().unwrap_or("").trim();

            if key.eq_ignore_ascii_case("render_mode") {
                match parse_render_mode(value) {
                    Some(mode) => cfg.render_mode = mode,
                    None => log::warn!("config: unknown render_mode {value:?}"),
                }
            } else if key.eq_ignore_ascii_case("pixel_format") {
                match parse_pixel_format(value) {
                    Some(format) => cfg.pixel_format = format,
                    None => log::warn!("config: unknown pixel_format {value:?}"),
                }
            } else if key.eq_ignore_ascii_case("antialias") {
                cfg.antialias = parse_bool(value);
            } else if key.eq_ignore_ascii_case("log_level") {
                match log::LevelFilter::from_str(value) {
                    Ok(level) => cfg.log_level = level,
                    Err(_) => log::warn!("config: unknown log_level {value:?}"),
                }
            } else {
                log::warn!("config: unknown key {key:?}");
            }
        }

        cfg
    }

    /// Read `path`; a missing or unreadable file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let cfg = Self::parse(&text);
                log::debug!("config: loaded {}: {cfg:?}", path.display());
                cfg
            }
            Err(err) => {
                log::info!("config: {} not read ({err}); using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn load_default() -> Self {
        Self::load(DEFAULT_CONFIG_PATH)
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "on" | "ON" | "yes" | "YES")
}

fn parse_render_mode(value: &str) -> Option<RenderMode> {
    [("external", RenderMode::External), ("offscreen", RenderMode::Offscreen), ("flip", RenderMode::Flip)]
        .into_iter()
        .find(|(name, _)| value.eq_ignore_ascii_case(name))
        .map(|(_, mode)| mode)
}

fn parse_pixel_format(value: &str) -> Option<PixelFormat> {
    [
        ("rgba8888", PixelFormat::Rgba8888),
        ("rgb565", PixelFormat::Rgb565),
        ("mono", PixelFormat::Mono1),
        ("mono1", PixelFormat::Mono1),
    ]
    .into_iter()
    .find(|(name, _)| value.eq_ignore_ascii_case(name))
    .map(|(_, format)| format)
}
