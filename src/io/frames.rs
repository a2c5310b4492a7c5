use std::fs;
use std::path::PathBuf;

use image::{ImageFormat, RgbImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::color::unpack_rgb;
use crate::error::FrameIoError;

/// Format des images de la séquence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameFormat {
    #[default]
    Png,
    Bmp,
}

impl FrameFormat {
    pub fn extension(self) -> &'static str {
        match self {
            FrameFormat::Png => "png",
            FrameFormat::Bmp => "bmp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            FrameFormat::Png => ImageFormat::Png,
            FrameFormat::Bmp => ImageFormat::Bmp,
        }
    }

    #[allow(dead_code)]
    pub fn from_cli_name(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "png" => Some(FrameFormat::Png),
            "bmp" => Some(FrameFormat::Bmp),
            _ => None,
        }
    }
}

/// Convertit un buffer de couleurs `0x00RRGGBB` en image RGB.
///
/// La conversion est parallélisée sur les pixels.
pub fn packed_to_rgb_image(pixels: &[u32], width: u32, height: u32) -> Result<RgbImage, FrameIoError> {
    let too_small = || FrameIoError::BufferSize {
        width,
        height,
        actual: pixels.len(),
    };
    if pixels.len() != width as usize * height as usize {
        return Err(too_small());
    }

    let buffer: Vec<u8> = pixels
        .par_iter()
        .flat_map_iter(|&pixel| {
            let (r, g, b) = unpack_rgb(pixel);
            [r, g, b]
        })
        .collect();

    RgbImage::from_raw(width, height, buffer).ok_or_else(too_small)
}

/// Destination des frames : `<dir>/<prefix><index>.<ext>`.
#[derive(Clone, Debug)]
pub struct FrameSink {
    dir: PathBuf,
    prefix: String,
    format: FrameFormat,
}

impl FrameSink {
    /// Prépare le dossier de sortie (créé s'il n'existe pas).
    pub fn create(
        dir: impl Into<PathBuf>,
        prefix: impl Into<String>,
        format: FrameFormat,
    ) -> Result<Self, FrameIoError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: prefix.into(),
            format,
        })
    }

    pub fn path_for(&self, index: u64) -> PathBuf {
        self.dir
            .join(format!("{}{}.{}", self.prefix, index, self.format.extension()))
    }

    /// Encode la frame `index` et renvoie le chemin écrit.
    pub fn save(&self, index: u64, pixels: &[u32], width: u32, height: u32) -> Result<PathBuf, FrameIoError> {
        let img = packed_to_rgb_image(pixels, width, height)?;
        let path = self.path_for(index);
        img.save_with_format(&path, self.format.image_format())?;
        log::info!("Frame {} sauvegardée: {}", index, path.display());
        Ok(path)
    }
}
