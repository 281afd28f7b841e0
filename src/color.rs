use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

// ---------------------------------------------------------------------------
// Categorical palette
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            to_color32(Hsl::new(hue, 0.75, 0.55).into_color())
        })
        .collect()
}

/// Colours for a fixed list of series labels, assigned in order.
#[derive(Debug, Clone)]
pub struct SeriesColors {
    colors: Vec<Color32>,
}

impl SeriesColors {
    pub fn new(n: usize) -> Self {
        SeriesColors {
            colors: generate_palette(n),
        }
    }

    pub fn get(&self, i: usize) -> Color32 {
        self.colors.get(i).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Diverging scale for correlations
// ---------------------------------------------------------------------------

/// Maps a correlation in `[-1, 1]` onto blue → neutral → red.
/// Undefined cells are dark grey.
pub fn correlation_color(r: Option<f64>) -> Color32 {
    let Some(r) = r else {
        return Color32::from_gray(60);
    };
    let t = r.clamp(-1.0, 1.0) as f32;
    let (hue, saturation, lightness): (f32, f32, f32) = if t < 0.0 {
        (220.0, 0.7, 0.45)
    } else {
        (5.0, 0.75, 0.5)
    };
    // Same hue at both ends so the blend only changes saturation/lightness.
    let neutral: Hsl = Hsl::new(hue, 0.0, 0.35);
    let end: Hsl = Hsl::new(hue, saturation, lightness);
    to_color32(neutral.mix(end, t.abs()).into_color())
}

fn to_color32(rgb: Srgb) -> Color32 {
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colors() {
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        for (i, a) in p.iter().enumerate() {
            for b in &p[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn series_colors_fall_back_to_gray() {
        let colors = SeriesColors::new(2);
        assert_ne!(colors.get(0), colors.get(1));
        assert_eq!(colors.get(7), Color32::GRAY);
    }

    #[test]
    fn correlation_scale_ends_differ() {
        let neg = correlation_color(Some(-1.0));
        let pos = correlation_color(Some(1.0));
        assert_ne!(neg, pos);
        assert!(neg.b() > neg.r());
        assert!(pos.r() > pos.b());
        assert_eq!(correlation_color(None), Color32::from_gray(60));
    }
}
