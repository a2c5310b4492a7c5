use egui::{Color32, ColorImage};

use crate::color::unpack_rgb;

/// Convertit un buffer `0x00RRGGBB` en ColorImage egui pour affichage.
pub fn packed_to_color_image(pixels: &[u32], width: u32, height: u32) -> ColorImage {
    let pixels = pixels
        .iter()
        .map(|&pixel| {
            let (r, g, b) = unpack_rgb(pixel);
            Color32::from_rgb(r, g, b)
        })
        .collect();

    ColorImage {
        size: [width as usize, height as usize],
        pixels,
    }
}
