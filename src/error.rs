use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::render::Band;

/// Panne d'un worker, capturée à la frontière de sa bande.
#[derive(Clone, Debug, PartialEq)]
pub struct BandFault {
    pub index: usize,
    pub band: Band,
    pub message: String,
}

impl fmt::Display for BandFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "bande {} (lignes {}..{}): {}",
            self.index, self.band.start, self.band.end, self.message
        )
    }
}

/// Erreurs du rendu d'une frame.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("dimensions invalides: {width}x{height} (largeur et hauteur doivent être > 0)")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("zoom invalide: {0} (doit être fini et > 0)")]
    InvalidZoom(f64),

    #[error("centre invalide: ({re}, {im})")]
    InvalidCenter { re: f64, im: f64 },

    #[error("facteur de détail invalide: {0}")]
    InvalidDetail(f64),

    #[error("réglage de zoom invalide: {name} = {value}")]
    InvalidZoomSetting { name: &'static str, value: f64 },

    #[error("nombre de workers invalide: 0")]
    NoWorkers,

    #[error("taille de buffer invalide: {actual} pixels, attendu {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("impossible de créer le pool de threads: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error("{} bande(s) en échec: {}", .0.len(), join_faults(.0))]
    WorkerFaults(Vec<BandFault>),
}

fn join_faults(faults: &[BandFault]) -> String {
    faults
        .iter()
        .map(|fault| fault.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Erreurs d'écriture des frames sur disque.
#[derive(Debug, Error)]
pub enum FrameIoError {
    #[error("erreur d'E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("encodage image: {0}")]
    Image(#[from] image::ImageError),

    #[error("buffer de {actual} pixels incompatible avec une image {width}x{height}")]
    BufferSize { width: u32, height: u32, actual: usize },
}

/// Erreurs de chargement de la configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("lecture de {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration TOML invalide: {0}")]
    Parse(#[from] toml::de::Error),

    #[allow(dead_code)]
    #[error("format d'image inconnu: '{0}' (options: png, bmp)")]
    UnknownFormat(String),

    #[error(transparent)]
    Invalid(#[from] RenderError),
}
