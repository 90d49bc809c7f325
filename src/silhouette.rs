// Turns decoded images into Silhouettes (alpha only).
// A silhouette is loaded once per shape and dropped when the host switches shapes.

use std::path::Path;

use image::RgbaImage;
use tracing::info;

use crate::error::Result;
use crate::types::Silhouette;

/// Keep only the alpha channel of an RGBA image.
pub fn from_rgba(img: &RgbaImage) -> Result<Silhouette> {
    let (w, h) = img.dimensions();
    let alpha: Vec<u8> = img.pixels().map(|p| p[3]).collect();
    Silhouette::new(w as usize, h as usize, alpha)
}

/// Decode an image file (PNG etc.) into a silhouette.
pub fn load(path: impl AsRef<Path>) -> Result<Silhouette> {
    let path = path.as_ref();
    let img = image::open(path)?.to_rgba8();
    let silhouette = from_rgba(&img)?;
    info!(
        path = %path.display(),
        width = silhouette.width,
        height = silhouette.height,
        "loaded silhouette"
    );
    Ok(silhouette)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn keeps_alpha_channel_only() {
        let mut img = RgbaImage::new(3, 2);
        img.put_pixel(1, 0, Rgba([10, 20, 30, 200]));
        img.put_pixel(2, 1, Rgba([255, 255, 255, 5]));
        let s = from_rgba(&img).unwrap();
        assert_eq!((s.width, s.height), (3, 2));
        assert_eq!(s.alpha(1, 0), 200);
        assert_eq!(s.alpha(2, 1), 5);
        assert_eq!(s.alpha(0, 0), 0);
    }

    #[test]
    fn missing_file_is_a_load_error() {
        assert!(load("/definitely/not/here.png").is_err());
    }
}
