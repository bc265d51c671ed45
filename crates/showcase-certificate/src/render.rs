use std::io::Cursor;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::font::Face;

pub const WIDTH: u32 = 1200;
pub const HEIGHT: u32 = 800;

const TITLE_SIZE: f32 = 60.0;
const TEXT_SIZE: f32 = 30.0;

const FRAME_INSET: i32 = 50;
const FRAME_WIDTH: u32 = 5;
const TEXT_MAX_WIDTH: u32 = WIDTH - 2 * (FRAME_INSET as u32 + 40);

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const BLUE: Rgb<u8> = Rgb([0, 102, 204]);

/// Snapshot fields printed on a certificate.
#[derive(Debug, Clone)]
pub struct CertificateFields<'a> {
    pub student_name: &'a str,
    pub project_name: &'a str,
    pub roll_number: &'a str,
    pub issued_at: DateTime<Utc>,
}

pub struct CertificateRenderer {
    title: Face,
    text: Face,
}

impl CertificateRenderer {
    /// Load the title and body fonts. Each falls back to the bitmap font independently.
    pub fn load(title_font: &Path, text_font: &Path) -> Self {
        Self {
            title: Face::load_or_fallback(title_font, TITLE_SIZE),
            text: Face::load_or_fallback(text_font, TEXT_SIZE),
        }
    }

    /// Renderer that only uses the built-in bitmap font.
    pub fn builtin() -> Self {
        Self {
            title: Face::bitmap_for(TITLE_SIZE),
            text: Face::bitmap_for(TEXT_SIZE),
        }
    }

    pub fn render(&self, fields: &CertificateFields<'_>) -> RgbImage {
        let mut image = RgbImage::from_pixel(WIDTH, HEIGHT, WHITE);

        // Frame from (50,50) to (1150,750), drawn inward
        let outer_w = WIDTH - 2 * FRAME_INSET as u32 + 1;
        let outer_h = HEIGHT - 2 * FRAME_INSET as u32 + 1;
        for i in 0..FRAME_WIDTH {
            let rect = Rect::at(FRAME_INSET + i as i32, FRAME_INSET + i as i32)
                .of_size(outer_w - 2 * i, outer_h - 2 * i);
            draw_hollow_rect_mut(&mut image, rect, BLUE);
        }

        let roll = format!("Roll Number: {}", fields.roll_number);
        let issued = format!("Issued on: {}", fields.issued_at.format("%B %d, %Y"));

        let lines: [(&Face, Rgb<u8>, i32, &str); 7] = [
            (&self.title, BLUE, 150, "Certificate of Achievement"),
            (&self.text, BLACK, 250, "This is to certify that"),
            (&self.title, BLUE, 320, fields.student_name),
            (&self.text, BLACK, 400, &roll),
            (&self.text, BLACK, 460, "has successfully completed the project"),
            (&self.title, BLUE, 530, fields.project_name),
            (&self.text, BLACK, 630, &issued),
        ];

        let cx = (WIDTH / 2) as i32;
        for (face, color, cy, text) in lines {
            face.draw_centered(&mut image, color, cx, cy, TEXT_MAX_WIDTH, text);
        }

        image
    }

    pub fn render_png(&self, fields: &CertificateFields<'_>) -> Result<Vec<u8>> {
        let image = self.render(fields);
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}
