use num_complex::Complex64;

use crate::fractal::EscapeSample;

/// Couleur des points de l'ensemble (noir).
pub const BACKGROUND: u32 = 0x000000;

/// Sinusoïde d'un canal : `(1 + f(frequency * C + phase)) * AMPLITUDE`.
#[derive(Clone, Copy, Debug)]
struct ChannelWave {
    frequency: f64,
    phase: f64,
    cosine: bool,
}

const AMPLITUDE: f64 = 127.0;

// R = (1 + sin(0.07 C + 5)) * 127
// G = (1 + cos(0.05 C)) * 127
// B = (1 + sin(0.05 C)) * 127
const RED: ChannelWave = ChannelWave { frequency: 0.07, phase: 5.0, cosine: false };
const GREEN: ChannelWave = ChannelWave { frequency: 0.05, phase: 0.0, cosine: true };
const BLUE: ChannelWave = ChannelWave { frequency: 0.05, phase: 0.0, cosine: false };

impl ChannelWave {
    fn level(self, smooth: f64) -> u8 {
        let angle = self.frequency * smooth + self.phase;
        let wave = if self.cosine { angle.cos() } else { angle.sin() };
        // Résultat dans [0, 254] ; `as` sature (NaN -> 0)
        ((1.0 + wave) * AMPLITUDE) as u8
    }
}

/// Valeur d'échappement lissée `C = n - log2(ln|z| / ln 2)`.
///
/// Si le résultat n'est pas fini (|z| infini ou nul), on garde `n`.
pub fn smooth_iteration(iteration: u32, z: Complex64) -> f64 {
    let n = iteration as f64;
    let smooth = n - (z.norm().ln() / std::f64::consts::LN_2).log2();
    if smooth.is_finite() {
        smooth
    } else {
        n
    }
}

/// Couleur RGB d'une valeur lissée, via trois sinusoïdes déphasées.
pub fn wave_rgb(smooth: f64) -> (u8, u8, u8) {
    (RED.level(smooth), GREEN.level(smooth), BLUE.level(smooth))
}

/// Couleur empaquetée `0x00RRGGBB` d'un échantillon.
pub fn color_for_sample(sample: EscapeSample, max_iterations: u32) -> u32 {
    if sample.iteration >= max_iterations {
        return BACKGROUND;
    }
    let (r, g, b) = wave_rgb(smooth_iteration(sample.iteration, sample.z));
    pack_rgb(r, g, b)
}

pub fn pack_rgb(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

pub fn unpack_rgb(pixel: u32) -> (u8, u8, u8) {
    ((pixel >> 16) as u8, (pixel >> 8) as u8, pixel as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_set_is_background() {
        let sample = EscapeSample { iteration: 100, z: Complex64::new(0.1, 0.1) };
        assert_eq!(color_for_sample(sample, 100), BACKGROUND);
        let sample = EscapeSample { iteration: 101, z: Complex64::new(0.1, 0.1) };
        assert_eq!(color_for_sample(sample, 100), BACKGROUND);
    }

    #[test]
    fn test_smooth_iteration_reference_value() {
        // |z| = 4 : log2(ln 4 / ln 2) = log2(2) = 1
        let smooth = smooth_iteration(3, Complex64::new(4.0, 0.0));
        assert!((smooth - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_smooth_iteration_non_finite_falls_back() {
        assert_eq!(smooth_iteration(7, Complex64::new(f64::INFINITY, 0.0)), 7.0);
        assert_eq!(smooth_iteration(7, Complex64::new(0.0, 0.0)), 7.0);
    }

    #[test]
    fn test_wave_channels_at_zero() {
        // C = 0 : R = (1 + sin 5) * 127, G = 254, B = 127
        let (r, g, b) = wave_rgb(0.0);
        assert_eq!(r, ((1.0 + 5.0f64.sin()) * 127.0) as u8);
        assert_eq!(g, 254);
        assert_eq!(b, 127);
    }

    #[test]
    fn test_escaped_color_is_deterministic() {
        let sample = EscapeSample { iteration: 12, z: Complex64::new(3.0, -1.5) };
        let first = color_for_sample(sample, 200);
        let second = color_for_sample(sample, 200);
        assert_eq!(first, second);
        assert_eq!(first >> 24, 0);
    }

    #[test]
    fn test_pack_unpack() {
        let pixel = pack_rgb(0x12, 0x34, 0x56);
        assert_eq!(pixel, 0x123456);
        assert_eq!(unpack_rgb(pixel), (0x12, 0x34, 0x56));
    }
}
