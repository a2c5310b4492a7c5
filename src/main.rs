use std::path::PathBuf;

use clap::Parser;
use num_complex::Complex64;

mod color;
mod config;
mod error;
mod fractal;
mod io;
mod render;
#[allow(dead_code)] // entrées souris/clavier utilisées par la GUI
mod session;

use config::AppConfig;
use error::ConfigError;
use io::{FrameFormat, FrameSink};
use render::BandScheduler;
use session::Session;

/// Rendu en ligne de commande de l'ensemble de Mandelbrot, avec séquence
/// de zoom automatique enregistrée image par image.
///
/// Exemple d'utilisation :
///   mandelzoom-cli --width 1920 --height 1080 --frames 300 --output-dir images
#[derive(Parser, Debug)]
#[command(
    name = "mandelzoom-cli",
    about = "Rendu multi-thread de l'ensemble de Mandelbrot et export d'une séquence de zoom",
    version
)]
struct Cli {
    /// Fichier de configuration TOML (les options ci-dessous sont prioritaires)
    #[arg(long, value_name = "FICHIER")]
    config: Option<PathBuf>,

    /// Largeur de l'image en pixels
    #[arg(long)]
    width: Option<u32>,

    /// Hauteur de l'image en pixels
    #[arg(long)]
    height: Option<u32>,

    /// Partie réelle du centre
    #[arg(long, allow_hyphen_values = true)]
    center_x: Option<f64>,

    /// Partie imaginaire du centre
    #[arg(long, allow_hyphen_values = true)]
    center_y: Option<f64>,

    /// Zoom initial (pixels par unité du plan complexe)
    #[arg(long)]
    zoom: Option<f64>,

    /// Nombre de workers (par défaut: cœurs logiques + worker-offset)
    #[arg(long)]
    workers: Option<usize>,

    /// Workers ajoutés au nombre de cœurs logiques
    #[arg(long)]
    worker_offset: Option<usize>,

    /// Coefficient k de maxiter = (W/2) * k * log10(zoom)
    #[arg(long)]
    detail: Option<f64>,

    /// Nombre de frames de zoom automatique après la frame 0
    #[arg(long, default_value_t = 0)]
    frames: u64,

    /// Multiplicateur de zoom entre deux frames
    #[arg(long)]
    zoom_rate: Option<f64>,

    /// Centre la séquence sur la cible du zoom automatique
    #[arg(long)]
    autozoom_target: bool,

    /// Dossier de sortie des images
    #[arg(long, value_name = "DOSSIER")]
    output_dir: Option<PathBuf>,

    /// Préfixe des fichiers (frame -> frame0.png, frame1.png, ...)
    #[arg(long)]
    prefix: Option<String>,

    /// Format des images (png, bmp)
    #[arg(long)]
    format: Option<String>,
}

impl Cli {
    /// Fusionne fichier de configuration et options de la ligne de commande.
    fn into_config(self) -> Result<(AppConfig, u64), ConfigError> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)?,
            // Sans fichier, la séquence part de la vue d'ensemble
            None => AppConfig {
                autozoom: false,
                ..AppConfig::default()
            },
        };
        if self.autozoom_target {
            config.autozoom = true;
            if self.center_x.is_some() || self.center_y.is_some() {
                log::warn!("--center-x/--center-y ignorés pour la première frame: --autozoom-target centre sur la cible");
            }
        }

        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.center_x.is_some() || self.center_y.is_some() {
            let [re, im] = config.start_center;
            config.start_center = [self.center_x.unwrap_or(re), self.center_y.unwrap_or(im)];
        }
        if let Some(zoom) = self.zoom {
            config.start_zoom = Some(zoom);
        }
        if let Some(workers) = self.workers {
            config.workers = Some(workers);
        }
        if let Some(offset) = self.worker_offset {
            config.worker_offset = offset;
        }
        if let Some(detail) = self.detail {
            config.detail_factor = detail;
        }
        if let Some(rate) = self.zoom_rate {
            config.autozoom_rate = rate;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(prefix) = self.prefix {
            config.frame_prefix = prefix;
        }
        if let Some(format) = &self.format {
            config.frame_format =
                FrameFormat::from_cli_name(format).ok_or_else(|| ConfigError::UnknownFormat(format.clone()))?;
        }

        config.validate()?;
        Ok((config, self.frames))
    }
}

fn run(config: &AppConfig, frames: u64) -> Result<(), Box<dyn std::error::Error>> {
    let scheduler = BandScheduler::new(config.worker_count())?;
    let sink = FrameSink::create(&config.output_dir, config.frame_prefix.clone(), config.frame_format)?;
    let mut session = Session::from_config(config);
    let mut pixels = vec![0u32; config.width as usize * config.height as usize];

    let Complex64 { re, im } = session.viewport().center;
    log::info!(
        "Rendu {}x{} centré sur ({}, {}), {} workers, {} frame(s)",
        config.width,
        config.height,
        re,
        im,
        scheduler.worker_count(),
        frames + 1
    );

    let params = session.frame_params(config.detail_factor)?;
    scheduler.render_frame(&params, &mut pixels)?;
    sink.save(session.frame_index(), &pixels, config.width, config.height)?;

    for _ in 0..frames {
        session.advance_autozoom();
        let params = session.frame_params(config.detail_factor)?;
        scheduler.render_frame(&params, &mut pixels)?;
        let index = session.commit_frame();
        sink.save(index, &pixels, config.width, config.height)?;
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let (config, frames) = match cli.into_config() {
        Ok(parsed) => parsed,
        Err(e) => {
            log::error!("Configuration invalide: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&config, frames) {
        log::error!("Erreur lors du rendu: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fractal::definitions::{AUTOZOOM_TARGET, START_CENTER};

    fn parse(args: &[&str]) -> Result<(AppConfig, u64), ConfigError> {
        let mut argv = vec!["mandelzoom-cli"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap().into_config()
    }

    #[test]
    fn test_run_writes_numbered_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let (config, frames) = parse(&[
            "--width", "16", "--height", "12", "--workers", "3", "--frames", "2", "--output-dir", out,
        ])
        .unwrap();
        assert_eq!(frames, 2);

        run(&config, frames).unwrap();
        for index in 0..=2 {
            assert!(dir.path().join(format!("frame{index}.png")).exists(), "frame{index}.png manquante");
        }
        assert!(!dir.path().join("frame3.png").exists());
    }

    #[test]
    fn test_run_single_frame_bmp() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let (config, frames) = parse(&[
            "--width", "9", "--height", "5", "--workers", "2", "--format", "bmp", "--prefix", "sc", "--output-dir", out,
        ])
        .unwrap();
        run(&config, frames).unwrap();
        assert!(dir.path().join("sc0.bmp").exists());
        assert!(!dir.path().join("sc1.bmp").exists());
    }

    #[test]
    fn test_flags_override_defaults() {
        let (config, frames) = parse(&[
            "--width", "320", "--center-x", "-1.25", "--zoom", "800", "--detail", "0.1", "--zoom-rate", "1.05",
        ])
        .unwrap();
        assert_eq!(frames, 0);
        assert_eq!(config.width, 320);
        assert_eq!(config.height, AppConfig::default().height);
        assert_eq!(config.start_center, [-1.25, START_CENTER.im]);
        assert_eq!(config.start_zoom, Some(800.0));
        assert_eq!(config.detail_factor, 0.1);
        assert_eq!(config.autozoom_rate, 1.05);
        // Sans fichier ni --autozoom-target : départ sur la vue d'ensemble
        assert!(!config.autozoom);
        assert_eq!(config.initial_viewport().center.re, -1.25);
    }

    #[test]
    fn test_autozoom_target_takes_precedence_over_center() {
        let (config, _) = parse(&["--autozoom-target", "--center-x", "0.3"]).unwrap();
        assert!(config.autozoom);
        assert_eq!(config.initial_viewport().center, AUTOZOOM_TARGET);
        assert_eq!(config.start_viewport().center.re, 0.3);
    }

    #[test]
    fn test_unknown_format_rejected() {
        let result = parse(&["--format", "gif"]);
        assert!(matches!(result, Err(ConfigError::UnknownFormat(name)) if name == "gif"));
    }

    #[test]
    fn test_invalid_flag_value_rejected() {
        assert!(matches!(parse(&["--workers", "0"]), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse(&["--zoom", "0"]), Err(ConfigError::Invalid(_))));
    }
}
