use std::time::Instant;

use egui::{Context, Key, TextureHandle, TextureOptions};

use crate::config::AppConfig;
use crate::error::{FrameIoError, RenderError};
use crate::gui::texture::packed_to_color_image;
use crate::io::FrameSink;
use crate::render::BandScheduler;
use crate::session::{InputEvent, PointerButton, Session, SessionAction};

/// Application egui : affiche la frame courante, traduit clics et touches
/// en nouveaux viewports et pilote le zoom automatique.
///
/// Le rendu est synchrone dans `update` : la boucle d'événements attend la
/// fin de chaque frame avant de la présenter.
pub struct MandelzoomApp {
    config: AppConfig,
    session: Session,
    scheduler: BandScheduler,
    pixels: Vec<u32>,
    texture: Option<TextureHandle>,
    sink: Option<FrameSink>,

    needs_render: bool,
    save_pending: bool,
    // Pas de zoom automatique en attente de rendu
    autozoom_step_pending: bool,
    last_max_iterations: u32,

    // Métriques
    last_render_time: Option<f64>, // en secondes
    last_error: Option<String>,
}

impl MandelzoomApp {
    pub fn new(config: AppConfig) -> Result<Self, RenderError> {
        let scheduler = BandScheduler::new(config.worker_count())?;
        let session = Session::from_config(&config);
        let pixels = vec![0u32; config.width as usize * config.height as usize];

        let sink = if config.save_frames {
            match FrameSink::create(&config.output_dir, config.frame_prefix.clone(), config.frame_format) {
                Ok(sink) => Some(sink),
                Err(e) => {
                    log::error!(
                        "Dossier {} inutilisable, frames non sauvegardées: {}",
                        config.output_dir.display(),
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        log::info!(
            "Fenêtre {}x{}, {} workers, zoom automatique {}",
            config.width,
            config.height,
            scheduler.worker_count(),
            if session.autozoom() { "actif" } else { "inactif" }
        );

        Ok(Self {
            config,
            session,
            scheduler,
            pixels,
            texture: None,
            // La frame 0 est toujours rendue et sauvegardée au démarrage
            needs_render: true,
            save_pending: true,
            autozoom_step_pending: false,
            sink,
            last_max_iterations: 0,
            last_render_time: None,
            last_error: None,
        })
    }

    /// Prépare la frame suivante du zoom automatique. Son index n'est
    /// réservé qu'une fois le rendu réussi.
    fn queue_autozoom_step(&mut self) {
        self.session.advance_autozoom();
        self.needs_render = true;
        self.save_pending = true;
        self.autozoom_step_pending = true;
    }

    /// Rend la frame du viewport courant et la sauvegarde si demandé.
    /// Renvoie `false` si le rendu a échoué.
    fn render_current(&mut self) -> bool {
        self.needs_render = false;
        let save = std::mem::take(&mut self.save_pending);
        let new_frame = std::mem::take(&mut self.autozoom_step_pending);

        let start = Instant::now();
        let result = self
            .session
            .frame_params(self.config.detail_factor)
            .and_then(|params| {
                self.scheduler.render_frame(&params, &mut self.pixels)?;
                Ok(params)
            });

        let params = match result {
            Ok(params) => params,
            Err(e) => {
                log::error!("Rendu impossible: {e}");
                self.last_error = Some(e.to_string());
                if self.session.autozoom() {
                    self.session.handle(InputEvent::ToggleAutozoom);
                }
                return false;
            }
        };
        self.last_render_time = Some(start.elapsed().as_secs_f64());
        self.last_max_iterations = params.max_iterations;
        self.last_error = None;
        if new_frame {
            self.session.commit_frame();
        }

        if save {
            if let Err(e) = self.save_frame() {
                log::error!("Erreur export frame {}: {}", self.session.frame_index(), e);
                self.last_error = Some(e.to_string());
            }
        }
        true
    }

    fn save_frame(&self) -> Result<(), FrameIoError> {
        if let Some(sink) = &self.sink {
            sink.save(
                self.session.frame_index(),
                &self.pixels,
                self.session.width(),
                self.session.height(),
            )?;
        }
        Ok(())
    }

    /// Met à jour la texture egui à partir du buffer de pixels.
    fn update_texture(&mut self, ctx: &Context) {
        let image = packed_to_color_image(&self.pixels, self.session.width(), self.session.height());
        match &mut self.texture {
            Some(texture) => texture.set(image, TextureOptions::NEAREST),
            None => {
                self.texture = Some(ctx.load_texture("mandelbrot", image, TextureOptions::NEAREST));
            }
        }
    }

    fn apply(&mut self, event: InputEvent, ctx: &Context) {
        match self.session.handle(event) {
            SessionAction::Redraw => self.needs_render = true,
            SessionAction::Continue => {}
            SessionAction::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }
    }

    fn key_events(ctx: &Context) -> Vec<InputEvent> {
        ctx.input(|i| {
            let mut events = Vec::new();
            // Espace: retour au viewport de départ
            if i.key_pressed(Key::Space) {
                events.push(InputEvent::Reset);
            }
            if i.key_pressed(Key::A) {
                events.push(InputEvent::ToggleAutozoom);
            }
            if i.key_pressed(Key::Escape) {
                events.push(InputEvent::Quit);
            }
            events
        })
    }
}

impl eframe::App for MandelzoomApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        for event in Self::key_events(ctx) {
            self.apply(event, ctx);
        }

        // Zoom automatique : une nouvelle frame sauvegardée par passage
        if self.session.autozoom() && !self.needs_render {
            self.queue_autozoom_step();
        }

        if self.needs_render && self.render_current() {
            self.update_texture(ctx);
        }

        // Barre d'état en bas
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let viewport = self.session.viewport();
                ui.label(format!("Centre: ({:.15}, {:.15})", viewport.center.re, viewport.center.im));
                ui.separator();
                ui.label(format!("Zoom: {:.3e}", viewport.zoom));
                ui.separator();
                ui.label(format!("Itérations: {}", self.last_max_iterations));
                ui.separator();
                ui.label(format!("Workers: {}", self.scheduler.worker_count()));

                if let Some(time) = self.last_render_time {
                    ui.separator();
                    ui.label(format!("Temps: {:.0} ms", time * 1000.0));
                }
                if self.session.autozoom() {
                    ui.separator();
                    ui.label(format!("Zoom auto (frame {})", self.session.frame_index()));
                }
                if let Some(error) = &self.last_error {
                    ui.separator();
                    ui.colored_label(egui::Color32::RED, error);
                }
            });
        });

        // Clic traité après l'affichage pour ne pas emprunter la texture
        let mut click = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                let Some(texture) = &self.texture else {
                    ui.spinner();
                    return;
                };

                let image_size = egui::Vec2::new(
                    self.session.width() as f32,
                    self.session.height() as f32,
                );
                let available_size = ui.available_size();
                // Ajuster la taille pour tenir dans l'espace disponible
                let scale = (available_size.x / image_size.x)
                    .min(available_size.y / image_size.y)
                    .min(1.0);
                let display_size = image_size * scale;

                let response = ui.add(
                    egui::Image::new(texture)
                        .fit_to_exact_size(display_size)
                        .sense(egui::Sense::click()),
                );
                let image_rect = response.rect;

                let button = if response.clicked() {
                    Some(PointerButton::Primary)
                } else if response.secondary_clicked() {
                    Some(PointerButton::Secondary)
                } else if response.middle_clicked() {
                    Some(PointerButton::Middle)
                } else {
                    None
                };

                if let (Some(button), Some(pos)) = (button, response.interact_pointer_pos()) {
                    // Coordonnées fenêtre -> coordonnées pixel de l'image
                    let local_pos = pos - image_rect.min;
                    let x = (local_pos.x / image_rect.width()) * image_size.x;
                    let y = (local_pos.y / image_rect.height()) * image_size.y;
                    click = Some(InputEvent::Click {
                        x: x as f64,
                        y: y as f64,
                        button,
                    });
                }
            });
        });

        if let Some(event) = click {
            self.apply(event, ctx);
            ctx.request_repaint();
        }

        if self.session.autozoom() {
            ctx.request_repaint();
        }
    }
}
