use image::{Rgba, RgbaImage};

/// Fill every pixel of `surface` with `colour`.
pub fn clear_surface(surface: &mut RgbaImage, colour: Rgba<u8>) {
    for pixel in surface.pixels_mut() {
        *pixel = colour;
    }
}
