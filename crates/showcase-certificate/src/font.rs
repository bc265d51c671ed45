use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use tracing::{info, warn};

const GLYPH_PX: u32 = 8;

/// A typeface at a fixed size.
///
/// `TrueType` is the preferred font loaded from disk. `Bitmap` is the built-in
/// 8×8 font used when the TrueType file is missing or unreadable; each glyph
/// pixel is drawn as a `scale`×`scale` block.
pub enum Face {
    TrueType { font: FontVec, size: f32 },
    Bitmap { scale: u32 },
}

impl Face {
    /// Load a TrueType face, or fall back to the bitmap font sized to roughly match `size`.
    pub fn load_or_fallback(path: &Path, size: f32) -> Self {
        match std::fs::read(path)
            .map_err(anyhow::Error::from)
            .and_then(|bytes| FontVec::try_from_vec(bytes).map_err(anyhow::Error::from))
        {
            Ok(font) => {
                info!("Loaded certificate font {}", path.display());
                Face::TrueType { font, size }
            }
            Err(e) => {
                warn!("Font {} unavailable ({}), using built-in bitmap font", path.display(), e);
                Face::bitmap_for(size)
            }
        }
    }

    pub fn bitmap_for(size: f32) -> Self {
        let scale = (size / GLYPH_PX as f32).round().max(1.0) as u32;
        Face::Bitmap { scale }
    }

    /// Draw `text` centred on (`cx`, `cy`), shrinking it to fit within `max_width`.
    pub fn draw_centered(
        &self,
        image: &mut RgbImage,
        color: Rgb<u8>,
        cx: i32,
        cy: i32,
        max_width: u32,
        text: &str,
    ) {
        match self {
            Face::TrueType { font, size } => {
                let mut scale = PxScale::from(*size);
                let (mut w, mut h) = text_size(scale, font, text);
                if w > max_width {
                    scale = PxScale::from(*size * max_width as f32 / w as f32);
                    (w, h) = text_size(scale, font, text);
                }
                let x = cx - (w / 2) as i32;
                let y = cy - (h / 2) as i32;
                draw_text_mut(image, color, x, y, scale, font, text);
            }
            Face::Bitmap { scale } => {
                let glyphs: Vec<[u8; 8]> = text.chars().map(glyph).collect();
                let count = glyphs.len().max(1) as u32;
                let fit = (max_width / (count * GLYPH_PX)).max(1);
                let scale = (*scale).min(fit);

                let w = count * GLYPH_PX * scale;
                let h = GLYPH_PX * scale;
                let x0 = cx - (w / 2) as i32;
                let y0 = cy - (h / 2) as i32;

                for (i, rows) in glyphs.iter().enumerate() {
                    let gx = x0 + (i as u32 * GLYPH_PX * scale) as i32;
                    for (row, bits) in rows.iter().enumerate() {
                        for col in 0..GLYPH_PX {
                            // bit 0 is the leftmost pixel
                            if bits & (1 << col) == 0 {
                                continue;
                            }
                            let px = gx + (col * scale) as i32;
                            let py = y0 + (row as u32 * scale) as i32;
                            draw_filled_rect_mut(image, Rect::at(px, py).of_size(scale, scale), color);
                        }
                    }
                }
            }
        }
    }
}

fn glyph(c: char) -> [u8; 8] {
    BASIC_FONTS
        .get(c)
        .or_else(|| LATIN_FONTS.get(c))
        .or_else(|| BASIC_FONTS.get('?'))
        .unwrap_or([0; 8])
}
