//! Certificate renderer.
//!
//! Draws the fixed 1200×800 completion certificate from the snapshot fields
//! stored at approval time. Output depends only on the fields and on which
//! fonts were loaded, so the PNG is regenerated on every download.

pub mod font;
pub mod render;

pub use font::Face;
pub use render::{CertificateFields, CertificateRenderer, HEIGHT, WIDTH};
