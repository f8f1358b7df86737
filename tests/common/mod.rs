use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub fn jpeg_bytes(img: DynamicImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img.to_rgb8())
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Jpeg)
        .unwrap();
    buf
}

pub fn qr_image(text: &str) -> GrayImage {
    let code = qrcode::QrCode::new(text.as_bytes()).unwrap();
    code.render::<Luma<u8>>().build()
}

pub fn solid_gray_jpeg(width: u32, height: u32, level: u8) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([level, level, level]));
    jpeg_bytes(DynamicImage::ImageRgb8(img))
}

pub fn qr_jpeg(text: &str) -> Vec<u8> {
    jpeg_bytes(DynamicImage::ImageLuma8(qr_image(text)))
}

/// Two QR codes side by side on a white canvas, `left` then `right`.
pub fn two_qr_jpeg(left: &str, right: &str) -> Vec<u8> {
    let a = qr_image(left);
    let b = qr_image(right);
    let gap = 64;
    let width = a.width() + gap + b.width();
    let height = a.height().max(b.height());
    let mut canvas = GrayImage::from_pixel(width, height, Luma([255]));
    image::imageops::replace(&mut canvas, &a, 0, 0);
    image::imageops::replace(&mut canvas, &b, (a.width() + gap) as i64, 0);
    jpeg_bytes(DynamicImage::ImageLuma8(canvas))
}

/// Fixture file in the temp dir, removed on drop.
pub struct TempJpeg {
    path: PathBuf,
}

impl TempJpeg {
    pub fn new(name: &str, bytes: &[u8]) -> Self {
        let path = std::env::temp_dir().join(format!("qr-scan-{}-{}.jpg", std::process::id(), name));
        std::fs::write(&path, bytes).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempJpeg {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
