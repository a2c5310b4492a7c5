use num_complex::Complex64;

use crate::error::RenderError;
use crate::fractal::definitions::MAX_ITERATION_CEILING;

/// Fenêtre d'observation du plan complexe : un centre et un zoom
/// exprimé en pixels par unité du plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub center: Complex64,
    pub zoom: f64,
}

impl Viewport {
    /// Construit un viewport validé (centre fini, zoom fini et > 0).
    #[allow(dead_code)]
    pub fn new(center: Complex64, zoom: f64) -> Result<Self, RenderError> {
        let viewport = Self { center, zoom };
        viewport.validate()?;
        Ok(viewport)
    }

    pub fn validate(&self) -> Result<(), RenderError> {
        if !self.center.re.is_finite() || !self.center.im.is_finite() {
            return Err(RenderError::InvalidCenter {
                re: self.center.re,
                im: self.center.im,
            });
        }
        if !self.zoom.is_finite() || self.zoom <= 0.0 {
            return Err(RenderError::InvalidZoom(self.zoom));
        }
        Ok(())
    }

    /// Projection pixel -> plan complexe.
    ///
    /// `c = center + ((x - W/2) / zoom, (y - H/2) / zoom)` avec les moitiés
    /// calculées en division entière. Le pas imaginaire est identique au pas
    /// réel (pixels carrés) et l'axe imaginaire descend avec l'écran.
    ///
    /// Les coordonnées pixel sont flottantes pour que les clics souris
    /// passent par exactement la même formule que le rendu.
    pub fn pixel_to_complex(&self, x: f64, y: f64, width: u32, height: u32) -> Complex64 {
        let half_w = (width / 2) as f64;
        let half_h = (height / 2) as f64;
        Complex64::new(
            self.center.re + (x - half_w) / self.zoom,
            self.center.im + (y - half_h) / self.zoom,
        )
    }
}

/// Nombre maximal d'itérations pour un zoom donné :
/// `floor((W/2) * detail * log10(zoom))`, borné à `[1, MAX_ITERATION_CEILING]`.
///
/// Dépend uniquement du zoom et de la largeur : calculé une fois par frame.
pub fn max_iterations(width: u32, zoom: f64, detail: f64) -> u32 {
    let raw = ((width / 2) as f64 * detail * zoom.log10()).floor();
    if raw.is_nan() || raw < 1.0 {
        1
    } else if raw >= MAX_ITERATION_CEILING as f64 {
        MAX_ITERATION_CEILING
    } else {
        raw as u32
    }
}

/// Instantané immuable des paramètres d'une frame, lu par tous les workers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameParams {
    pub width: u32,
    pub height: u32,
    pub viewport: Viewport,
    pub max_iterations: u32,
}

impl FrameParams {
    /// Valide la requête de rendu et calcule la borne d'itérations de la frame.
    pub fn new(width: u32, height: u32, viewport: Viewport, detail: f64) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        if !detail.is_finite() || detail <= 0.0 {
            return Err(RenderError::InvalidDetail(detail));
        }
        viewport.validate()?;
        Ok(Self {
            width,
            height,
            viewport,
            max_iterations: max_iterations(width, viewport.zoom, detail),
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn pixel_to_complex(&self, x: u32, y: u32) -> Complex64 {
        self.viewport
            .pixel_to_complex(x as f64, y as f64, self.width, self.height)
    }
}

/// État transitoire d'un pixel après itération.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EscapeSample {
    pub iteration: u32,
    pub z: Complex64,
}
