use num_complex::Complex64;

/// Rayon d'échappement : `|z| < BAILOUT` continue, `|z| >= BAILOUT` s'arrête.
pub const BAILOUT: f64 = 2.0;

/// Borne d'itérations la plus haute acceptée ; un point intérieur sort de
/// la boucle avec `n = borne + 1`, qui doit tenir dans un `u32`.
pub const MAX_ITERATION_CEILING: u32 = u32::MAX - 1;

/// Centre de départ (vue d'ensemble).
pub const START_CENTER: Complex64 = Complex64 { re: -0.5, im: 0.0 };

/// Point visé par le zoom automatique.
pub const AUTOZOOM_TARGET: Complex64 = Complex64 {
    re: -1.315180982097868,
    im: 0.073481649996795,
};

/// Facteur de zoom des clics (gauche: `+ log10(zoom)`, droit: division).
pub const ZOOM_FACTOR: f64 = 4.0;

/// Multiplicateur de zoom appliqué avant chaque frame du zoom automatique.
pub const AUTOZOOM_RATE: f64 = 1.01;

/// Coefficient `k` de `maxiter = (W/2) * k * log10(zoom)`.
pub const DETAIL_FACTOR: f64 = 0.06;

/// Workers ajoutés au nombre de cœurs logiques.
pub const WORKER_OFFSET: usize = 20;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 720;

const START_ZOOM_RATIO: f64 = 0.25296875;
const START_ZOOM_MARGIN: f64 = 200.0;

/// Zoom de départ pour une largeur donnée : `W * 0.25296875 - 200`.
/// Pour les petites largeurs la marge rendrait le zoom négatif, on
/// retombe alors sur `W * 0.25296875`.
pub fn start_zoom(width: u32) -> f64 {
    let scaled = width as f64 * START_ZOOM_RATIO;
    let zoom = scaled - START_ZOOM_MARGIN;
    if zoom >= 1.0 {
        zoom
    } else {
        scaled.max(1.0)
    }
}

/// Nombre de workers recommandé : cœurs logiques + `offset`.
pub fn default_worker_count(offset: usize) -> usize {
    num_cpus::get().saturating_add(offset).max(1)
}
