use num_complex::Complex64;

use crate::fractal::definitions::{BAILOUT, MAX_ITERATION_CEILING};
use crate::fractal::EscapeSample;

/// Test rapide d'appartenance : cardioïde principale ou bulbe de période 2.
///
/// Évite la boucle d'itération sur les grandes zones intérieures.
pub fn in_main_cardioid_or_bulb(c: Complex64) -> bool {
    let x = c.re;
    let y = c.im;
    let y2 = y * y;
    let cardioid = ((x - 0.25) * (x - 0.25) + y2) * (x * x + x / 2.0 + y2 - 0.1875) < y2 / 4.0;
    let bulb = (x + 1.0) * (x + 1.0) + y2 < 0.0625;
    cardioid || bulb
}

/// Itère `z ← z² + c` depuis `z = c` tant que `n <= max_iter` et `|z| < 2`.
///
/// Un `|z|` qui déborde vers l'infini compte comme échappé : la norme
/// infinie n'est pas `< 2` et la boucle s'arrête.
///
/// La borne est plafonnée à `MAX_ITERATION_CEILING` : le compteur atteint au
/// plus `u32::MAX` et ne déborde jamais.
pub fn escape_iterate(c: Complex64, max_iter: u32) -> EscapeSample {
    let bound = max_iter.min(MAX_ITERATION_CEILING);
    let mut z = c;
    let mut n = 0u32;
    while n <= bound && z.norm() < BAILOUT {
        z = z * z + c;
        n += 1;
    }
    EscapeSample { iteration: n, z }
}

/// Noyau par point : pré-test cardioïde/bulbe puis itération.
/// Les points du pré-test reçoivent directement `max_iter`.
pub fn iterate_point(c: Complex64, max_iter: u32) -> EscapeSample {
    if in_main_cardioid_or_bulb(c) {
        return EscapeSample { iteration: max_iter, z: c };
    }
    escape_iterate(c, max_iter)
}
