use std::path::PathBuf;

use clap::Parser;

mod color;
mod config;
mod error;
mod fractal;
mod gui;
mod io;
mod render;
mod session;

use config::AppConfig;
use gui::MandelzoomApp;

/// Visualiseur interactif : clic gauche pour zoomer, clic droit pour
/// dézoomer, Espace pour revenir au départ, A pour le zoom automatique,
/// Échap pour quitter.
#[derive(Parser, Debug)]
#[command(name = "mandelzoom-gui", version)]
struct Cli {
    /// Fichier de configuration TOML
    #[arg(long, value_name = "FICHIER")]
    config: Option<PathBuf>,

    /// Démarre sur la vue d'ensemble, sans zoom automatique
    #[arg(long)]
    no_autozoom: bool,

    /// N'enregistre pas les frames sur disque
    #[arg(long)]
    no_save: bool,

    /// Nombre de workers (par défaut: cœurs logiques + décalage configuré)
    #[arg(long)]
    workers: Option<usize>,
}

fn load_config(cli: &Cli) -> Result<AppConfig, error::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if cli.no_autozoom {
        config.autozoom = false;
    }
    if cli.no_save {
        config.save_frames = false;
    }
    if cli.workers.is_some() {
        config.workers = cli.workers;
    }
    config.validate()?;
    Ok(config)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Message plus informatif si l'initialisation graphique échoue
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let msg = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "Panic inconnu".to_string());

        if msg.contains("wgpu") || msg.contains("EGL") || msg.contains("DISPLAY") {
            log::error!("Initialisation graphique impossible: {msg}");
            log::error!("Vérifiez l'affichage disponible (echo $DISPLAY) ou forcez un backend: WGPU_BACKEND=gl");
        }

        default_hook(panic_info);
    }));

    let cli = Cli::parse();
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Configuration invalide: {e}");
            std::process::exit(1);
        }
    };

    let inner_size = [config.width as f32, config.height as f32 + 32.0];
    let app = match MandelzoomApp::new(config) {
        Ok(app) => app,
        Err(e) => {
            log::error!("Initialisation du rendu impossible: {e}");
            std::process::exit(1);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Mandelzoom")
            .with_inner_size(inner_size),
        hardware_acceleration: eframe::HardwareAcceleration::Preferred,
        renderer: eframe::Renderer::Wgpu,
        ..Default::default()
    };

    if let Err(e) = eframe::run_native("Mandelzoom", options, Box::new(move |_cc| Box::new(app))) {
        log::error!("Erreur lors du lancement de l'application: {e}");
        std::process::exit(1);
    }
}
