//! État de la session interactive : viewport courant, zoom automatique
//! et compteur de frames, possédé par la boucle de contrôle.

pub mod input;

pub use input::{InputEvent, PointerButton, SessionAction};

use crate::config::AppConfig;
use crate::error::RenderError;
use crate::fractal::{FrameParams, Viewport};

/// Réglages des zooms souris et automatique.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomSettings {
    pub zoom_factor: f64,
    pub autozoom_rate: f64,
}

#[derive(Clone, Debug)]
pub struct Session {
    width: u32,
    height: u32,
    start: Viewport,
    viewport: Viewport,
    autozoom: bool,
    frame_index: u64,
    settings: ZoomSettings,
}

impl Session {
    pub fn new(
        width: u32,
        height: u32,
        start: Viewport,
        initial: Viewport,
        autozoom: bool,
        settings: ZoomSettings,
    ) -> Self {
        Self {
            width,
            height,
            start,
            viewport: initial,
            autozoom,
            frame_index: 0,
            settings,
        }
    }

    /// Session initiale décrite par une configuration déjà validée.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.width,
            config.height,
            config.start_viewport(),
            config.initial_viewport(),
            config.autozoom,
            config.zoom_settings(),
        )
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn autozoom(&self) -> bool {
        self.autozoom
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Paramètres de la prochaine frame (instantané du viewport courant).
    pub fn frame_params(&self, detail: f64) -> Result<FrameParams, RenderError> {
        FrameParams::new(self.width, self.height, self.viewport, detail)
    }

    pub fn handle(&mut self, event: InputEvent) -> SessionAction {
        match event {
            InputEvent::Click { x, y, button } => {
                // Tout clic recentre sur le pixel visé, avec la projection du rendu
                let center = self.viewport.pixel_to_complex(x, y, self.width, self.height);
                if center.re.is_finite() && center.im.is_finite() {
                    self.viewport.center = center;
                } else {
                    log::warn!("Clic hors du plan représentable à ce zoom, centre conservé");
                }
                let zoom = self.viewport.zoom;
                self.viewport.zoom = match button {
                    PointerButton::Primary => clamp_zoom(zoom * zoom_in_factor(zoom, self.settings.zoom_factor)),
                    PointerButton::Secondary => clamp_zoom(zoom / self.settings.zoom_factor),
                    PointerButton::Middle => zoom,
                };
                log::debug!(
                    "Clic {:?} en ({:.1}, {:.1}) -> centre ({}, {}), zoom {}",
                    button,
                    x,
                    y,
                    self.viewport.center.re,
                    self.viewport.center.im,
                    self.viewport.zoom
                );
                SessionAction::Redraw
            }
            InputEvent::Reset => {
                self.viewport = self.start;
                SessionAction::Redraw
            }
            InputEvent::ToggleAutozoom => {
                self.autozoom = !self.autozoom;
                log::info!("Zoom automatique {}", if self.autozoom { "activé" } else { "désactivé" });
                SessionAction::Continue
            }
            InputEvent::Quit => SessionAction::Quit,
        }
    }

    /// Avance d'un pas de zoom automatique. Le compteur de frames ne bouge
    /// pas : voir `commit_frame`.
    pub fn advance_autozoom(&mut self) {
        self.viewport.zoom = clamp_zoom(self.viewport.zoom * self.settings.autozoom_rate);
    }

    /// Réserve l'index de la frame qui vient d'être rendue avec succès.
    pub fn commit_frame(&mut self) -> u64 {
        self.frame_index += 1;
        self.frame_index
    }
}

/// Facteur du zoom avant : `zoom_factor + log10(zoom)`, jamais sous 1 pour
/// que le zoom reste positif aux très faibles grossissements.
fn zoom_in_factor(zoom: f64, zoom_factor: f64) -> f64 {
    (zoom_factor + zoom.log10()).max(1.0)
}

fn clamp_zoom(zoom: f64) -> f64 {
    if zoom.is_nan() {
        f64::MIN_POSITIVE
    } else {
        zoom.clamp(f64::MIN_POSITIVE, f64::MAX)
    }
}

#[cfg(test)]
mod tests {
    use num_complex::Complex64;

    use super::*;

    fn session(center: Complex64, zoom: f64) -> Session {
        let start = Viewport::new(Complex64::new(-0.5, 0.0), 100.0).unwrap();
        let initial = Viewport::new(center, zoom).unwrap();
        Session::new(
            200,
            100,
            start,
            initial,
            false,
            ZoomSettings { zoom_factor: 4.0, autozoom_rate: 1.01 },
        )
    }

    #[test]
    fn test_click_recenters_with_forward_mapping() {
        let mut session = session(Complex64::new(0.3, -0.2), 50.0);
        let before = session.viewport();
        let action = session.handle(InputEvent::Click { x: 37.0, y: 81.0, button: PointerButton::Middle });
        assert_eq!(action, SessionAction::Redraw);
        assert_eq!(session.viewport().center, before.pixel_to_complex(37.0, 81.0, 200, 100));
        assert_eq!(session.viewport().center, Complex64::new(0.3 + (37.0 - 100.0) / 50.0, -0.2 + (81.0 - 50.0) / 50.0));
        assert_eq!(session.viewport().zoom, 50.0);
    }

    #[test]
    fn test_primary_click_zoom_grows_with_zoom() {
        let mut session = session(Complex64::new(0.0, 0.0), 1000.0);
        session.handle(InputEvent::Click { x: 100.0, y: 50.0, button: PointerButton::Primary });
        // 1000 * (4 + log10(1000)) = 7000
        assert!((session.viewport().zoom - 7000.0).abs() < 1e-6);
        assert_eq!(session.viewport().center, Complex64::new(0.0, 0.0));
    }

    #[test]
    fn test_secondary_click_zooms_out() {
        let mut session = session(Complex64::new(0.0, 0.0), 1000.0);
        session.handle(InputEvent::Click { x: 100.0, y: 50.0, button: PointerButton::Secondary });
        assert_eq!(session.viewport().zoom, 250.0);
    }

    #[test]
    fn test_zoom_stays_positive() {
        let mut session = session(Complex64::new(0.0, 0.0), 1e-6);
        session.handle(InputEvent::Click { x: 100.0, y: 50.0, button: PointerButton::Primary });
        assert!(session.viewport().zoom > 0.0);
        assert!(session.viewport().validate().is_ok());

        for _ in 0..2000 {
            session.handle(InputEvent::Click { x: 100.0, y: 50.0, button: PointerButton::Secondary });
        }
        assert!(session.viewport().zoom > 0.0);
    }

    #[test]
    fn test_reset_restores_start_viewport() {
        let mut session = session(Complex64::new(0.3, 0.3), 5000.0);
        assert_eq!(session.handle(InputEvent::Reset), SessionAction::Redraw);
        assert_eq!(session.viewport(), Viewport::new(Complex64::new(-0.5, 0.0), 100.0).unwrap());
    }

    #[test]
    fn test_toggle_and_quit() {
        let mut session = session(Complex64::new(0.0, 0.0), 10.0);
        assert!(!session.autozoom());
        assert_eq!(session.handle(InputEvent::ToggleAutozoom), SessionAction::Continue);
        assert!(session.autozoom());
        session.handle(InputEvent::ToggleAutozoom);
        assert!(!session.autozoom());
        assert_eq!(session.handle(InputEvent::Quit), SessionAction::Quit);
    }

    #[test]
    fn test_click_at_tiny_zoom_keeps_finite_center() {
        let mut session = session(Complex64::new(0.1, -0.1), f64::MIN_POSITIVE);
        session.handle(InputEvent::Click { x: 0.0, y: 99.0, button: PointerButton::Middle });
        assert_eq!(session.viewport().center, Complex64::new(0.1, -0.1));
        assert!(session.viewport().validate().is_ok());
        assert!(session.frame_params(0.06).is_ok());

        // Le clic au centre exact reste représentable
        session.handle(InputEvent::Click { x: 100.0, y: 50.0, button: PointerButton::Secondary });
        assert!(session.viewport().validate().is_ok());
    }

    #[test]
    fn test_autozoom_step_does_not_consume_frame_index() {
        let mut session = session(Complex64::new(0.0, 0.0), 100.0);
        session.advance_autozoom();
        assert_eq!(session.frame_index(), 0);
        assert!((session.viewport().zoom - 101.0).abs() < 1e-9);
    }

    #[test]
    fn test_autozoom_advances_zoom_and_frame_index() {
        let mut session = session(Complex64::new(0.0, 0.0), 100.0);
        assert_eq!(session.frame_index(), 0);
        session.advance_autozoom();
        assert_eq!(session.commit_frame(), 1);
        session.advance_autozoom();
        assert_eq!(session.commit_frame(), 2);
        assert!((session.viewport().zoom - 100.0 * 1.01 * 1.01).abs() < 1e-9);
        // Le reset garde le compteur pour ne pas écraser les frames sauvegardées
        session.handle(InputEvent::Reset);
        assert_eq!(session.frame_index(), 2);
    }

    #[test]
    fn test_frame_params_snapshot() {
        let session = session(Complex64::new(-0.5, 0.0), 40.0);
        let params = session.frame_params(0.06).unwrap();
        assert_eq!((params.width, params.height), (200, 100));
        assert_eq!(params.viewport, session.viewport());
    }
}
