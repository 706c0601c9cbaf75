//! Container metadata supplied alongside the decoded pixels
//!
//! Only the fields the Metadata Signal extractor needs are modelled: container format,
//! encoded byte size, and declared dimensions. Parsing the container itself is the
//! decoder's job.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Image container format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageFormat {
    /// JPEG / JFIF
    Jpeg,
    /// Portable Network Graphics
    Png,
    /// Graphics Interchange Format
    Gif,
    /// WebP
    Webp,
    /// Windows bitmap
    Bmp,
    /// TIFF
    Tiff,
    /// AV1 Image File Format
    Avif,
    /// Anything else, or not reported
    Unknown,
}

impl ImageFormat {
    /// Parse a MIME type such as `image/jpeg`
    ///
    /// # Example
    ///
    /// ```
    /// use pixelcheck::io::metadata::ImageFormat;
    ///
    /// assert_eq!(ImageFormat::from_mime_type("image/jpeg"), ImageFormat::Jpeg);
    /// assert_eq!(ImageFormat::from_mime_type("IMAGE/PNG"), ImageFormat::Png);
    /// assert_eq!(ImageFormat::from_mime_type("text/plain"), ImageFormat::Unknown);
    /// ```
    pub fn from_mime_type(mime: &str) -> Self {
        let mime = mime.trim().to_ascii_lowercase();
        match mime.strip_prefix("image/") {
            Some(subtype) => Self::from_extension(subtype),
            None => ImageFormat::Unknown,
        }
    }

    /// Parse a file extension (with or without the leading dot)
    pub fn from_extension(ext: &str) -> Self {
        let ext = ext.trim().trim_start_matches('.').to_ascii_lowercase();
        match ext.as_str() {
            "jpeg" | "jpg" | "jpe" | "jfif" | "pjpeg" => ImageFormat::Jpeg,
            "png" | "apng" => ImageFormat::Png,
            "gif" => ImageFormat::Gif,
            "webp" => ImageFormat::Webp,
            "bmp" | "x-ms-bmp" => ImageFormat::Bmp,
            "tif" | "tiff" => ImageFormat::Tiff,
            "avif" => ImageFormat::Avif,
            _ => ImageFormat::Unknown,
        }
    }

    /// Upper-case display name (e.g. "JPEG")
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "JPEG",
            ImageFormat::Png => "PNG",
            ImageFormat::Gif => "GIF",
            ImageFormat::Webp => "WEBP",
            ImageFormat::Bmp => "BMP",
            ImageFormat::Tiff => "TIFF",
            ImageFormat::Avif => "AVIF",
            ImageFormat::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How aggressively the file appears to be compressed, judged from bytes per pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompressionLevel {
    /// Heavily compressed JPEG (< 0.5 bytes/pixel)
    High,
    /// PNG under 2 bytes/pixel
    Medium,
    /// Everything else
    Low,
}

/// Metadata record for one image file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    /// Container format
    pub format: ImageFormat,
    /// Encoded file size in bytes
    pub byte_size: u64,
    /// Declared width in pixels
    pub width: u32,
    /// Declared height in pixels
    pub height: u32,
}

impl ImageMetadata {
    /// Create a metadata record
    pub fn new(format: ImageFormat, byte_size: u64, width: u32, height: u32) -> Self {
        Self {
            format,
            byte_size,
            width,
            height,
        }
    }

    /// Declared pixel count
    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Encoded bytes per declared pixel (0.0 when dimensions are unknown)
    pub fn bytes_per_pixel(&self) -> f64 {
        let pixels = self.pixel_count();
        if pixels == 0 {
            0.0
        } else {
            self.byte_size as f64 / pixels as f64
        }
    }

    /// Width / height, or `None` when the height is zero
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.height == 0 {
            None
        } else {
            Some(self.width as f64 / self.height as f64)
        }
    }

    /// Dimensions as "WxH"
    pub fn dimensions(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// Coarse compression estimate for display
    pub fn compression_level(&self) -> CompressionLevel {
        let bpp = self.bytes_per_pixel();
        match self.format {
            ImageFormat::Jpeg if bpp < 0.5 => CompressionLevel::High,
            ImageFormat::Png if bpp < 2.0 => CompressionLevel::Medium,
            _ => CompressionLevel::Low,
        }
    }

    /// File size in human-readable units (e.g. "1.5 MB")
    pub fn human_size(&self) -> String {
        format_file_size(self.byte_size)
    }
}

/// Format a byte count with binary units, keeping at most two decimals
///
/// # Example
///
/// ```
/// use pixelcheck::io::metadata::format_file_size;
///
/// assert_eq!(format_file_size(0), "0 Bytes");
/// assert_eq!(format_file_size(1536), "1.5 KB");
/// assert_eq!(format_file_size(3 * 1024 * 1024), "3 MB");
/// ```
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(ImageFormat::from_extension(".JPG"), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_extension("webp"), ImageFormat::Webp);
        assert_eq!(ImageFormat::from_extension("heic"), ImageFormat::Unknown);
        assert_eq!(ImageFormat::from_mime_type("image/svg+xml"), ImageFormat::Unknown);
    }

    #[test]
    fn test_bytes_per_pixel() {
        let meta = ImageMetadata::new(ImageFormat::Jpeg, 2_000_000, 1000, 1000);
        assert!((meta.bytes_per_pixel() - 2.0).abs() < 1e-12);

        let unknown = ImageMetadata::new(ImageFormat::Jpeg, 2_000_000, 0, 0);
        assert_eq!(unknown.bytes_per_pixel(), 0.0);
        assert_eq!(unknown.aspect_ratio(), None);
    }

    #[test]
    fn test_compression_level() {
        let jpeg = ImageMetadata::new(ImageFormat::Jpeg, 100_000, 1000, 1000);
        assert_eq!(jpeg.compression_level(), CompressionLevel::High);

        let png = ImageMetadata::new(ImageFormat::Png, 1_000_000, 1000, 1000);
        assert_eq!(png.compression_level(), CompressionLevel::Medium);

        let big_png = ImageMetadata::new(ImageFormat::Png, 4_000_000, 1000, 1000);
        assert_eq!(big_png.compression_level(), CompressionLevel::Low);
    }

    #[test]
    fn test_format_file_size_units() {
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1_258_291), "1.2 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024 * 1024), "5120 GB");
    }
}
