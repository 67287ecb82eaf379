//! A single decoded media item — one source file, one or more raster frames.
//!
//! Decoding happens eagerly at construction time; a [`MediaItem`] is
//! immutable afterwards and is discarded wholesale when the collection
//! reloads.  Frames are stored as raw RGBA8 buffers so nothing in this
//! module depends on the UI toolkit.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use image::codecs::gif::GifDecoder;
use image::AnimationDecoder;
use thiserror::Error;

use super::metadata::ItemMeta;

/// Description shown when neither `metadata.json` nor the file supplies one.
pub const NO_DESCRIPTION: &str = "No description available.";

// ---------------------------------------------------------------------------
// MediaError
// ---------------------------------------------------------------------------

/// Errors that can occur while decoding a single media file.
///
/// A decode error excludes that one file from the collection; it is never
/// fatal to a load.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("{path} decoded to zero frames")]
    NoFrames { path: PathBuf },
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// One decoded raster frame as a raw RGBA8 pixel buffer.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Unmultiplied RGBA8 pixels, row-major, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl Frame {
    fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            rgba: img.into_raw(),
        }
    }
}

// ---------------------------------------------------------------------------
// MediaItem
// ---------------------------------------------------------------------------

/// One loadable media file: its path, decoded frames, and display metadata.
#[derive(Debug, Clone)]
pub struct MediaItem {
    path: PathBuf,
    frames: Vec<Frame>,
    display_name: String,
    description: String,
}

impl MediaItem {
    /// Decode the file at `path` into a [`MediaItem`].
    ///
    /// GIF files decode every frame of the animation; all other recognized
    /// formats decode a single frame.  `meta` supplies the display name and
    /// description; when absent they fall back to the file name and a fixed
    /// placeholder.
    ///
    /// # Errors
    ///
    /// Returns a [`MediaError`] when the file cannot be opened or decoded.
    pub fn decode(path: &Path, meta: Option<&ItemMeta>) -> Result<Self, MediaError> {
        let frames = if path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("gif"))
        {
            Self::decode_gif(path)?
        } else {
            Self::decode_static(path)?
        };

        if frames.is_empty() {
            return Err(MediaError::NoFrames {
                path: path.to_path_buf(),
            });
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let display_name = meta
            .and_then(|m| m.name.clone())
            .unwrap_or_else(|| file_name.clone());
        let description = meta
            .and_then(|m| m.desc.clone())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        Ok(Self {
            path: path.to_path_buf(),
            frames,
            display_name,
            description,
        })
    }

    fn decode_gif(path: &Path) -> Result<Vec<Frame>, MediaError> {
        let file = File::open(path).map_err(|source| MediaError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let decoder = GifDecoder::new(BufReader::new(file)).map_err(|source| {
            MediaError::Decode {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let frames = decoder
            .into_frames()
            .collect_frames()
            .map_err(|source| MediaError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(frames
            .into_iter()
            .map(|f| Frame::from_rgba_image(f.into_buffer()))
            .collect())
    }

    fn decode_static(path: &Path) -> Result<Vec<Frame>, MediaError> {
        let img = image::open(path).map_err(|source| MediaError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(vec![Frame::from_rgba_image(img.to_rgba8())])
    }

    /// Source file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name of the source path (used in the status line).
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Decoded frames; length ≥ 1.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// `true` when the item has more than one frame.
    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    /// Display name from metadata, falling back to the file name.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Description from metadata, falling back to [`NO_DESCRIPTION`].
    pub fn description(&self) -> &str {
        &self.description
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
        img.save(&path).expect("write png");
        path
    }

    #[test]
    fn static_image_decodes_to_single_frame() {
        let dir = tempdir().expect("temp dir");
        let path = write_png(dir.path(), "one.png", 4, 3);

        let item = MediaItem::decode(&path, None).expect("decode");
        assert_eq!(item.frames().len(), 1);
        assert!(!item.is_animated());
        assert_eq!(item.frames()[0].width, 4);
        assert_eq!(item.frames()[0].height, 3);
        assert_eq!(item.frames()[0].rgba.len(), 4 * 3 * 4);
    }

    #[test]
    fn metadata_overrides_name_and_description() {
        let dir = tempdir().expect("temp dir");
        let path = write_png(dir.path(), "worker1.png", 2, 2);

        let meta = ItemMeta {
            name: Some("Worker 1".into()),
            desc: Some("Short bio.".into()),
        };
        let item = MediaItem::decode(&path, Some(&meta)).expect("decode");
        assert_eq!(item.display_name(), "Worker 1");
        assert_eq!(item.description(), "Short bio.");
    }

    #[test]
    fn missing_metadata_falls_back_to_file_name() {
        let dir = tempdir().expect("temp dir");
        let path = write_png(dir.path(), "plain.png", 2, 2);

        let item = MediaItem::decode(&path, None).expect("decode");
        assert_eq!(item.display_name(), "plain.png");
        assert_eq!(item.description(), NO_DESCRIPTION);
    }

    #[test]
    fn unreadable_file_is_a_decode_error() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"not an image at all").expect("write");

        let err = MediaItem::decode(&path, None).unwrap_err();
        assert!(matches!(err, MediaError::Decode { .. }));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = MediaItem::decode(Path::new("/nonexistent/x.gif"), None).unwrap_err();
        // GIF path goes through File::open first.
        assert!(matches!(err, MediaError::Open { .. }));
    }
}
