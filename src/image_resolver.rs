//! Locating and validating images referenced from a document.
//!
//! Every failure is reported as an [`ImageError`]; the renderer treats all of
//! them the same way and leaves the image out.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, ImageReader};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image not found: '{}'", path.display())]
    Missing { path: PathBuf },

    #[error("cannot read image '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt image '{}': {detail}", path.display())]
    Corrupt { path: PathBuf, detail: String },

    #[error("unsupported image format for '{}': {format}", path.display())]
    Unsupported { path: PathBuf, format: String },
}

/// Encodings the PDF backend can embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
}

impl ImageKind {
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::Gif => "gif",
        }
    }
}

/// A decoded-and-verified image ready to be placed on a page.
#[derive(Debug, Clone)]
pub struct ResolvedImage {
    pub path: PathBuf,
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
}

impl ResolvedImage {
    /// Height for a given display width, preserving aspect ratio.
    pub fn height_for_width(&self, width: f64) -> f64 {
        width * f64::from(self.height_px) / f64::from(self.width_px)
    }
}

/// Resolves image references relative to the source document's directory.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    base_dir: PathBuf,
}

impl ImageResolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute path of `relative` against the base directory.
    pub fn resolve_path(&self, relative: &str) -> PathBuf {
        let joined = self.base_dir.join(relative);
        std::path::absolute(&joined).unwrap_or(joined)
    }

    /// Load and fully decode the image so nothing can fail later at embed
    /// time.
    pub fn resolve(&self, relative: &str) -> Result<ResolvedImage, ImageError> {
        let path = self.resolve_path(relative);
        if !path.is_file() {
            return Err(ImageError::Missing { path });
        }

        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) => return Err(ImageError::Unreadable { path, source }),
        };

        let reader = match ImageReader::new(Cursor::new(&bytes)).with_guessed_format() {
            Ok(reader) => reader,
            Err(source) => return Err(ImageError::Unreadable { path, source }),
        };

        let kind = match reader.format() {
            Some(ImageFormat::Png) => ImageKind::Png,
            Some(ImageFormat::Jpeg) => ImageKind::Jpeg,
            Some(ImageFormat::Gif) => ImageKind::Gif,
            Some(other) => {
                return Err(ImageError::Unsupported {
                    path,
                    format: format!("{other:?}"),
                });
            }
            None => {
                return Err(ImageError::Unsupported {
                    path,
                    format: "unrecognized".to_string(),
                });
            }
        };

        let decoded = match reader.decode() {
            Ok(decoded) => decoded,
            Err(e) => {
                return Err(ImageError::Corrupt {
                    path,
                    detail: e.to_string(),
                });
            }
        };

        let (width_px, height_px) = (decoded.width(), decoded.height());
        if width_px == 0 || height_px == 0 {
            return Err(ImageError::Corrupt {
                path,
                detail: "zero-sized image".to_string(),
            });
        }

        debug!(
            "Resolved image {} ({}x{} {:?})",
            path.display(),
            width_px,
            height_px,
            kind
        );

        Ok(ResolvedImage {
            path,
            kind,
            bytes,
            width_px,
            height_px,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        image::RgbImage::new(width, height)
            .save(dir.join(name))
            .unwrap();
    }

    #[test]
    fn resolves_relative_to_base() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("img")).unwrap();
        write_png(&dir.path().join("img"), "shot.png", 40, 20);

        let resolver = ImageResolver::new(dir.path());
        let image = resolver.resolve("img/shot.png").unwrap();
        assert_eq!(image.kind, ImageKind::Png);
        assert_eq!((image.width_px, image.height_px), (40, 20));
        assert!(image.path.is_absolute());
        assert_eq!(image.height_for_width(180.0), 90.0);
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = ImageResolver::new(dir.path());
        assert!(matches!(
            resolver.resolve("nope.png"),
            Err(ImageError::Missing { .. })
        ));
    }

    #[test]
    fn directory_is_missing_not_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("folder.png")).unwrap();
        let resolver = ImageResolver::new(dir.path());
        assert!(matches!(
            resolver.resolve("folder.png"),
            Err(ImageError::Missing { .. })
        ));
    }

    #[test]
    fn truncated_png_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.png"), b"\x89PNG\r\n\x1a\nnot really").unwrap();
        let resolver = ImageResolver::new(dir.path());
        assert!(matches!(
            resolver.resolve("bad.png"),
            Err(ImageError::Corrupt { .. })
        ));
    }

    #[test]
    fn unknown_bytes_are_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.png"), b"plain text, not an image").unwrap();
        let resolver = ImageResolver::new(dir.path());
        assert!(matches!(
            resolver.resolve("notes.png"),
            Err(ImageError::Unsupported { .. })
        ));
    }
}
