//! Icon generation for the system tray.

/// Icon size in pixels.
pub const ICON_SIZE: u32 = 32;

const BACKGROUND: (u8, u8, u8) = (45, 110, 200);

/// Generate the headphone tray icon as RGBA data.
pub fn generate_headphone_icon() -> Vec<u8> {
    let size = ICON_SIZE as usize;
    let mut rgba = vec![0u8; size * size * 4];

    let center = size as f32 / 2.0;
    let radius = size as f32 / 2.0 - 2.0;
    let (r, g, b) = BACKGROUND;

    // Filled circle background with anti-aliased edge
    for y in 0..size {
        for x in 0..size {
            let idx = (y * size + x) * 4;
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - center;
            let dist = (dx * dx + dy * dy).sqrt();

            let alpha = if dist < radius {
                255
            } else if dist < radius + 1.0 {
                ((radius + 1.0 - dist) * 255.0) as u8
            } else {
                continue;
            };

            rgba[idx] = r;
            rgba[idx + 1] = g;
            rgba[idx + 2] = b;
            rgba[idx + 3] = alpha;
        }
    }

    draw_headphones(&mut rgba, size);
    rgba
}

/// Draw a white headband arc with two ear cups.
fn draw_headphones(rgba: &mut [u8], size: usize) {
    let center = size as f32 / 2.0;
    let band_radius = size as f32 * 0.28;
    let band_y = center + 1.0;

    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy = y as f32 + 0.5 - band_y;
            let dist = (dx * dx + dy * dy).sqrt();

            // Upper half ring
            let on_band = dy <= 0.0 && (dist - band_radius).abs() < 1.5;

            // Ear cups below the band ends
            let cup_top = band_y;
            let cup_bottom = band_y + size as f32 * 0.22;
            let cup_width = size as f32 * 0.14;
            let fy = y as f32 + 0.5;
            let in_cup_rows = fy >= cup_top && fy <= cup_bottom;
            let left_cup = (dx + band_radius).abs() < cup_width / 2.0 + 0.5;
            let right_cup = (dx - band_radius).abs() < cup_width / 2.0 + 0.5;

            if on_band || (in_cup_rows && (left_cup || right_cup)) {
                let idx = (y * size + x) * 4;
                if rgba[idx + 3] > 0 {
                    rgba[idx] = 255;
                    rgba[idx + 1] = 255;
                    rgba[idx + 2] = 255;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_dimensions() {
        let rgba = generate_headphone_icon();
        assert_eq!(rgba.len(), (ICON_SIZE * ICON_SIZE * 4) as usize);
    }

    #[test]
    fn test_corners_transparent_and_glyph_drawn() {
        let rgba = generate_headphone_icon();
        assert_eq!(rgba[3], 0);

        let white = rgba
            .chunks_exact(4)
            .filter(|px| px[0] == 255 && px[1] == 255 && px[2] == 255 && px[3] > 0)
            .count();
        assert!(white > 0);
    }
}
