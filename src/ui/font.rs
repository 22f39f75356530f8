use crate::core::gfx::Canvas;
use log::{debug, info, warn};
use rusttype::{Font, Scale, point};
use std::path::{Path, PathBuf};

/// Probed in order when no font path is configured. CJK-capable faces first
/// since every card label is Chinese.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/google-noto-cjk/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/wenquanyi/wqy-microhei/wqy-microhei.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "/System/Library/Fonts/STHeiti Light.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
];

/// Glyph rasterizer over an optional font. Without a font every draw is a
/// no-op, so a missing font never fails a render.
pub struct TextPainter {
    font: Option<Font<'static>>,
}

impl TextPainter {
    pub const fn disabled() -> Self {
        Self { font: None }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Option<Self> {
        Font::try_from_vec(bytes).map(|font| Self { font: Some(font) })
    }

    /// Loads `configured` if set, otherwise the first loadable system font.
    pub fn load(configured: Option<&Path>) -> Self {
        let candidates: Vec<PathBuf> = match configured {
            Some(path) => vec![path.to_path_buf()],
            None => SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
        };
        for path in &candidates {
            let Ok(bytes) = std::fs::read(path) else {
                continue;
            };
            match Self::from_bytes(bytes) {
                Some(painter) => {
                    info!("Loaded card font '{}'.", path.display());
                    return painter;
                }
                None => warn!("'{}' is not a usable font file.", path.display()),
            }
        }
        warn!("No usable font found; cards will be rendered without text.");
        Self::disabled()
    }

    #[cfg(test)]
    pub const fn is_enabled(&self) -> bool {
        self.font.is_some()
    }

    /// Advance width of `text` at `px` pixels.
    pub fn measure(&self, text: &str, px: f32) -> f32 {
        let Some(font) = &self.font else {
            return 0.0;
        };
        let scale = Scale::uniform(px);
        font.layout(text, scale, point(0.0, 0.0))
            .last()
            .map_or(0.0, |g| {
                g.position().x + g.unpositioned().h_metrics().advance_width
            })
    }

    /// Draws `text` with its baseline at `baseline_y`, like canvas `fillText`.
    pub fn draw(
        &self,
        canvas: &mut Canvas,
        text: &str,
        px: f32,
        x: f32,
        baseline_y: f32,
        color: [f32; 4],
    ) {
        let Some(font) = &self.font else {
            debug!("Skipping text '{text}': no font loaded.");
            return;
        };
        if text.is_empty() || !(x.is_finite() && baseline_y.is_finite()) {
            return;
        }
        let scale = Scale::uniform(px);
        for glyph in font.layout(text, scale, point(x, baseline_y)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, v| {
                if v <= 0.0 {
                    return;
                }
                canvas.blend_pixel(bb.min.x + gx as i32, bb.min.y + gy as i32, color, v);
            });
        }
    }
}
