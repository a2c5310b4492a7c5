use crate::color::color_for_sample;
use crate::error::RenderError;
use crate::fractal::{iterate_point, FrameParams};
use crate::render::Band;

/// Couleur empaquetée du pixel `(x, y)` pour la frame décrite par `params`.
pub fn pixel_color(params: &FrameParams, x: u32, y: u32) -> u32 {
    let c = params.pixel_to_complex(x, y);
    let sample = iterate_point(c, params.max_iterations);
    color_for_sample(sample, params.max_iterations)
}

/// Peint les lignes `band` de l'image dans `pixels`, qui ne contient que
/// ces lignes (`band.len() * width` valeurs, ligne `band.start` en tête).
pub fn render_band(params: &FrameParams, band: Band, pixels: &mut [u32]) {
    let width = params.width as usize;
    debug_assert_eq!(pixels.len(), band.len() * width);

    for (y, row) in band.rows().zip(pixels.chunks_mut(width)) {
        for (x, pixel) in row.iter_mut().enumerate() {
            *pixel = pixel_color(params, x as u32, y as u32);
        }
    }
}

/// Rendu de référence mono-thread de toute l'image.
#[allow(dead_code)]
pub fn render_frame_serial(params: &FrameParams, pixels: &mut [u32]) -> Result<(), RenderError> {
    let expected = params.pixel_count();
    if pixels.len() != expected {
        return Err(RenderError::BufferSize {
            expected,
            actual: pixels.len(),
        });
    }
    let band = Band {
        start: 0,
        end: params.height as usize,
    };
    render_band(params, band, pixels);
    Ok(())
}
