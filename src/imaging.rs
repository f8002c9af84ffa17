/// Image probing and display previews
///
/// Dimensions are read from the file header only. Previews are bounded
/// thumbnails, optionally framed in the annotation status color.
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use std::path::Path;

use crate::error::{AnnotatorError, Result};

/// Longest edge of a display preview
pub const PREVIEW_SIZE: u32 = 500;

/// Width of the status frame drawn around previews
pub const BORDER_WIDTH: u32 = 5;

/// Frame color for annotated images
pub const ANNOTATED_COLOR: Rgba<u8> = Rgba([0, 128, 0, 255]);

/// Frame color for images without a record
pub const UNANNOTATED_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);

/// Read the pixel dimensions of the image at `path`
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(path).map_err(|source| AnnotatorError::Image {
        path: path.to_path_buf(),
        source,
    })
}

/// Format dimensions the way records store them
pub fn format_dimensions((width, height): (u32, u32)) -> String {
    format!("{}x{}", width, height)
}

/// Load `path` as a preview no larger than `PREVIEW_SIZE` on either edge
///
/// When `frame` is given the preview is surrounded by a `BORDER_WIDTH`
/// border of that color.
pub fn render_preview(path: &Path, frame: Option<Rgba<u8>>) -> Result<RgbaImage> {
    let img = image::open(path).map_err(|source| AnnotatorError::Image {
        path: path.to_path_buf(),
        source,
    })?;

    let preview = shrink_to_fit(img).to_rgba8();
    Ok(match frame {
        Some(color) => add_border(&preview, color),
        None => preview,
    })
}

/// Frame color for an image's annotation status
pub fn status_color(annotated: bool) -> Rgba<u8> {
    if annotated {
        ANNOTATED_COLOR
    } else {
        UNANNOTATED_COLOR
    }
}

fn shrink_to_fit(img: DynamicImage) -> DynamicImage {
    if img.width() <= PREVIEW_SIZE && img.height() <= PREVIEW_SIZE {
        return img;
    }
    img.thumbnail(PREVIEW_SIZE, PREVIEW_SIZE)
}

fn add_border(img: &RgbaImage, color: Rgba<u8>) -> RgbaImage {
    let mut framed = RgbaImage::from_pixel(
        img.width() + 2 * BORDER_WIDTH,
        img.height() + 2 * BORDER_WIDTH,
        color,
    );
    imageops::replace(&mut framed, img, BORDER_WIDTH as i64, BORDER_WIDTH as i64);
    framed
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use tempfile::TempDir;

    #[test]
    fn test_probe_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("face.png");
        RgbImage::new(64, 48).save(&path).unwrap();

        assert_eq!(probe_dimensions(&path).unwrap(), (64, 48));
        assert_eq!(format_dimensions((64, 48)), "64x48");
    }

    #[test]
    fn test_probe_rejects_non_image() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fake.jpg");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(matches!(probe_dimensions(&path), Err(AnnotatorError::Image { .. })));
    }

    #[test]
    fn test_preview_is_bounded_and_framed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wide.png");
        RgbImage::new(1000, 250).save(&path).unwrap();

        let preview = render_preview(&path, Some(ANNOTATED_COLOR)).unwrap();
        assert_eq!(preview.dimensions(), (510, 135));
        assert_eq!(*preview.get_pixel(0, 0), ANNOTATED_COLOR);

        let plain = render_preview(&path, None).unwrap();
        assert_eq!(plain.dimensions(), (500, 125));
    }

    #[test]
    fn test_small_images_are_not_upscaled() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.png");
        RgbImage::new(20, 10).save(&path).unwrap();

        let preview = render_preview(&path, Some(status_color(false))).unwrap();
        assert_eq!(preview.dimensions(), (30, 20));
        assert_eq!(*preview.get_pixel(29, 19), UNANNOTATED_COLOR);
    }
}
