//! Writes rendered frames as numbered image files.

use crate::CliError;
use deepzoom_compute::RenderResult;
use image::ImageFormat;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum FrameFormat {
    #[default]
    Jpg,
    Png,
}

impl FrameFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FrameFormat::Jpg => "jpg",
            FrameFormat::Png => "png",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            FrameFormat::Jpg => ImageFormat::Jpeg,
            FrameFormat::Png => ImageFormat::Png,
        }
    }
}

/// Output directory for one run: `frame_000000.jpg`, `frame_000001.jpg`, ...
///
/// With stats enabled every frame also gets a `frame_<index>.json` with
/// its [`FrameStats`](deepzoom_compute::FrameStats).
#[derive(Clone, Debug)]
pub struct FrameSink {
    dir: PathBuf,
    format: FrameFormat,
    write_stats: bool,
}

impl FrameSink {
    pub fn new(dir: impl Into<PathBuf>, format: FrameFormat) -> Result<Self, CliError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            format,
            write_stats: false,
        })
    }

    pub fn with_stats(mut self, write_stats: bool) -> Self {
        self.write_stats = write_stats;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn frame_path(&self, index: u64) -> PathBuf {
        self.dir
            .join(format!("frame_{:06}.{}", index, self.format.extension()))
    }

    pub fn stats_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame_{:06}.json", index))
    }

    /// Write one frame. Returns the image path, or `None` when the frame
    /// has no image.
    pub fn write(&self, index: u64, result: &RenderResult) -> Result<Option<PathBuf>, CliError> {
        if self.write_stats {
            let json = serde_json::to_string_pretty(&result.stats)?;
            fs::write(self.stats_path(index), json)?;
        }

        let Some(image) = &result.image else {
            log::warn!("Frame {} has no image, nothing written", index);
            return Ok(None);
        };
        let path = self.frame_path(index);
        image.save_with_format(&path, self.format.image_format())?;
        log::debug!("Wrote {}", path.display());
        Ok(Some(path))
    }
}
