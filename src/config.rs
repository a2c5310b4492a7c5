use std::fs;
use std::path::{Path, PathBuf};

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RenderError};
use crate::fractal::definitions::{
    default_worker_count, start_zoom, AUTOZOOM_RATE, AUTOZOOM_TARGET, DEFAULT_HEIGHT, DEFAULT_WIDTH,
    DETAIL_FACTOR, START_CENTER, WORKER_OFFSET, ZOOM_FACTOR,
};
use crate::fractal::Viewport;
use crate::io::FrameFormat;
use crate::session::ZoomSettings;

/// Configuration complète de l'application.
///
/// Les champs absents d'un fichier TOML prennent les valeurs par défaut de
/// `fractal::definitions`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub width: u32,
    pub height: u32,
    /// Centre de départ `[re, im]`.
    pub start_center: [f64; 2],
    /// Zoom de départ ; dérivé de la largeur si absent.
    pub start_zoom: Option<f64>,
    /// Démarre en zoom automatique sur `autozoom_target`.
    pub autozoom: bool,
    pub autozoom_target: [f64; 2],
    pub autozoom_rate: f64,
    pub zoom_factor: f64,
    pub detail_factor: f64,
    /// Nombre de workers explicite ; sinon cœurs logiques + `worker_offset`.
    pub workers: Option<usize>,
    pub worker_offset: usize,
    pub save_frames: bool,
    pub output_dir: PathBuf,
    pub frame_prefix: String,
    pub frame_format: FrameFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            start_center: [START_CENTER.re, START_CENTER.im],
            start_zoom: None,
            autozoom: true,
            autozoom_target: [AUTOZOOM_TARGET.re, AUTOZOOM_TARGET.im],
            autozoom_rate: AUTOZOOM_RATE,
            zoom_factor: ZOOM_FACTOR,
            detail_factor: DETAIL_FACTOR,
            workers: None,
            worker_offset: WORKER_OFFSET,
            save_frames: true,
            output_dir: PathBuf::from("images"),
            frame_prefix: "frame".to_string(),
            frame_format: FrameFormat::Png,
        }
    }
}

impl AppConfig {
    /// Charge et valide un fichier TOML.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        log::info!("Configuration chargée depuis {}", path.display());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejette toute configuration qui ne permet pas de rendre une frame.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        self.start_viewport().validate()?;
        self.initial_viewport().validate()?;
        if !self.detail_factor.is_finite() || self.detail_factor <= 0.0 {
            return Err(RenderError::InvalidDetail(self.detail_factor));
        }
        for (name, value) in [("zoom_factor", self.zoom_factor), ("autozoom_rate", self.autozoom_rate)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(RenderError::InvalidZoomSetting { name, value });
            }
        }
        if self.workers == Some(0) {
            return Err(RenderError::NoWorkers);
        }
        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        self.workers
            .unwrap_or_else(|| default_worker_count(self.worker_offset))
    }

    pub fn start_viewport(&self) -> Viewport {
        Viewport {
            center: Complex64::new(self.start_center[0], self.start_center[1]),
            zoom: self.start_zoom.unwrap_or_else(|| start_zoom(self.width)),
        }
    }

    /// Viewport de la première frame : la cible du zoom automatique s'il est
    /// actif, sinon le viewport de départ.
    pub fn initial_viewport(&self) -> Viewport {
        let start = self.start_viewport();
        if self.autozoom {
            Viewport {
                center: Complex64::new(self.autozoom_target[0], self.autozoom_target[1]),
                zoom: start.zoom,
            }
        } else {
            start
        }
    }

    pub fn zoom_settings(&self) -> ZoomSettings {
        ZoomSettings {
            zoom_factor: self.zoom_factor,
            autozoom_rate: self.autozoom_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.worker_count() > WORKER_OFFSET);
        assert_eq!(config.start_viewport().center, START_CENTER);
        assert_eq!(config.initial_viewport().center, AUTOZOOM_TARGET);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            width = 640
            height = 480
            autozoom = false
            workers = 3
            frame_format = "bmp"
            "#,
        )
        .unwrap();
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.worker_count(), 3);
        assert_eq!(config.frame_format, FrameFormat::Bmp);
        assert_eq!(config.detail_factor, DETAIL_FACTOR);
        assert_eq!(config.initial_viewport(), config.start_viewport());
        assert_eq!(config.start_viewport().zoom, start_zoom(640));
    }

    #[test]
    fn test_explicit_start_viewport() {
        let config = AppConfig::from_toml(
            r#"
            autozoom = false
            start_center = [0.25, -0.1]
            start_zoom = 1500.0
            "#,
        )
        .unwrap();
        let viewport = config.initial_viewport();
        assert_eq!(viewport.center, Complex64::new(0.25, -0.1));
        assert_eq!(viewport.zoom, 1500.0);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            AppConfig::from_toml("width = 0"),
            Err(ConfigError::Invalid(RenderError::InvalidDimensions { .. }))
        ));
        assert!(matches!(
            AppConfig::from_toml("start_zoom = -3.0"),
            Err(ConfigError::Invalid(RenderError::InvalidZoom(_)))
        ));
        assert!(matches!(
            AppConfig::from_toml("workers = 0"),
            Err(ConfigError::Invalid(RenderError::NoWorkers))
        ));
        assert!(matches!(
            AppConfig::from_toml("autozoom_rate = 0.0"),
            Err(ConfigError::Invalid(RenderError::InvalidZoomSetting { name: "autozoom_rate", .. }))
        ));
        assert!(matches!(
            AppConfig::from_toml("detail_factor = -1.0"),
            Err(ConfigError::Invalid(RenderError::InvalidDetail(_)))
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(AppConfig::from_toml("width = \"large\""), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_missing_file() {
        let result = AppConfig::load(Path::new("/nonexistent/mandelzoom.toml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
