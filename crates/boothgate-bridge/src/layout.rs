// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page layout for multi-picture prints.
//
// A print with `copies > 1` is one sheet carrying the picture `copies` times,
// so the printer receives a single composed document and the page budget
// counts exactly what comes out of the printer.

use std::io::Cursor;
use std::path::Path;

use boothgate_core::error::{BoothError, Result};
use image::{ImageFormat, Rgb, RgbImage, imageops};
use tracing::{debug, instrument};

/// Columns and rows used to tile `pictures` copies on one page.
pub fn grid(pictures: u32) -> (u32, u32) {
    let pictures = pictures.max(1);
    let cols = f64::from(pictures).sqrt().ceil() as u32;
    (cols, pictures.div_ceil(cols))
}

/// Tile the picture at `path` `pictures` times on a white page and encode it
/// as JPEG.
#[instrument(skip_all, fields(path = %path.display(), pictures))]
pub fn compose_page(path: &Path, pictures: u32) -> Result<Vec<u8>> {
    let picture = image::open(path)
        .map_err(|err| BoothError::Image(format!("failed to open {}: {err}", path.display())))?
        .to_rgb8();

    let (cols, rows) = grid(pictures);
    let (width, height) = picture.dimensions();
    let mut page = RgbImage::from_pixel(width * cols, height * rows, Rgb([255, 255, 255]));

    for index in 0..pictures.max(1) {
        let x = i64::from((index % cols) * width);
        let y = i64::from((index / cols) * height);
        imageops::overlay(&mut page, &picture, x, y);
    }

    let mut buffer = Vec::new();
    page.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
        .map_err(|err| BoothError::Image(format!("failed to encode page: {err}")))?;

    debug!(cols, rows, bytes = buffer.len(), "page composed");
    Ok(buffer)
}

/// MIME type announced for a picture sent as-is.
pub fn document_format(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_stays_close_to_square() {
        assert_eq!(grid(0), (1, 1));
        assert_eq!(grid(1), (1, 1));
        assert_eq!(grid(2), (2, 1));
        assert_eq!(grid(3), (2, 2));
        assert_eq!(grid(4), (2, 2));
        assert_eq!(grid(5), (3, 2));
    }

    #[test]
    fn two_pictures_share_one_page() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("shot.png");
        RgbImage::from_pixel(4, 3, Rgb([10, 20, 30]))
            .save(&path)
            .expect("save");

        let page = compose_page(&path, 2).expect("compose");
        let decoded = image::load_from_memory(&page).expect("decode");
        assert_eq!((decoded.width(), decoded.height()), (8, 3));
    }

    #[test]
    fn missing_picture_is_an_image_error() {
        let err = compose_page(Path::new("/nonexistent/shot.jpg"), 2).expect_err("should fail");
        assert!(matches!(err, BoothError::Image(_)));
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(document_format(Path::new("/tmp/a.JPG")), "image/jpeg");
        assert_eq!(document_format(Path::new("/tmp/a.png")), "image/png");
        assert_eq!(document_format(Path::new("/tmp/a")), "application/octet-stream");
    }
}
