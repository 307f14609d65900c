//! Color and width policies for black-spot segments.

/// RGBA color as consumed by deck.gl accessors.
pub type Rgba = [u8; 4];

pub const RED: Rgba = [255, 0, 0, 255];
pub const WHITE: Rgba = [255, 255, 255, 255];

/// Base path width; start/end markers scale it.
pub const BASE_WIDTH: u32 = 2;

/// Lowest and highest severity of a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityRange {
    pub min: f64,
    pub max: f64,
}

impl SeverityRange {
    /// Returns `None` for an empty iterator.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values.into_iter().fold(None, |acc, v| match acc {
            None => Some(Self { min: v, max: v }),
            Some(r) => Some(Self {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }
}

/// Maps a severity score onto a white → red gradient.
///
/// | Value            | Color                                   |
/// |------------------|-----------------------------------------|
/// | == max           | `[255, 0, 0, 255]`                      |
/// | == min           | `[255, 255, 255, 255]`                  |
/// | otherwise        | `[255, trunc(255 × (1 − ratio)), 0, 255]` |
///
/// where `ratio = (value − min) / (max − min)`. Max is checked first, so a
/// layer whose segments all share one score is drawn red.
pub fn line_color(value: f64, range: SeverityRange) -> Rgba {
    if value == range.max {
        RED
    } else if value == range.min {
        WHITE
    } else {
        let ratio = (value - range.min) / (range.max - range.min);
        let green = (255.0 * (1.0 - ratio)) as u8;
        [255, green, 0, 255]
    }
}

/// Path width from the `Start or End` marker.
///
/// A marker containing `E` wins over one containing `S`; anything else,
/// including a missing marker, gets [`BASE_WIDTH`].
pub fn line_width(marker: Option<&str>) -> u32 {
    match marker {
        Some(m) if m.contains('E') => BASE_WIDTH * 48,
        Some(m) if m.contains('S') => BASE_WIDTH * 38,
        _ => BASE_WIDTH,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_color_gradient() {
        let range = SeverityRange::from_values([1.0, 5.0, 10.0]).unwrap();

        assert_eq!(line_color(1.0, range), WHITE);
        assert_eq!(line_color(10.0, range), RED);
        assert_eq!(line_color(5.0, range), [255, 141, 0, 255]);
    }

    #[test]
    fn test_line_color_flat_range_is_red() {
        let range = SeverityRange { min: 3.0, max: 3.0 };
        assert_eq!(line_color(3.0, range), RED);
    }

    #[test]
    fn test_line_width_markers() {
        assert_eq!(line_width(Some("E")), 96);
        assert_eq!(line_width(Some("S")), 76);
        assert_eq!(line_width(None), 2);
        assert_eq!(line_width(Some("M")), 2);
        assert_eq!(line_width(Some("S,E")), 96);
    }

    #[test]
    fn test_severity_range_empty() {
        assert_eq!(SeverityRange::from_values(Vec::new()), None);
    }
}
