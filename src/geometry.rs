// ── Logical geometry & DPI scaling ────────────────────────────────────────────
//
// Window placement is specified in logical (96-DPI) units and converted to
// physical pixels exactly once, at creation time, using the target monitor's
// scale factor.  After creation the platform supplies physical coordinates
// directly (WM_DPICHANGED), so nothing here is reapplied later.

/// A point in logical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Point {
    pub(crate) x: i32,
    pub(crate) y: i32,
}

/// A size in logical units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Size {
    pub(crate) width: i32,
    pub(crate) height: i32,
}

/// Scale one logical value to physical pixels.
///
/// All four placement values (x, y, width, height) go through this same
/// rule: multiply, then round half-away-from-zero (`f64::round`).  Zero and
/// negative values get no special casing; a window whose logical origin is
/// on a secondary monitor to the left of the primary scales the same way.
pub(crate) fn scale(value: i32, factor: f64) -> i32 {
    (f64::from(value) * factor).round() as i32
}

impl Point {
    pub(crate) fn scaled(self, factor: f64) -> Self {
        Self {
            x: scale(self.x, factor),
            y: scale(self.y, factor),
        }
    }
}

impl Size {
    pub(crate) fn scaled(self, factor: f64) -> Self {
        Self {
            width: scale(self.width, factor),
            height: scale(self.height, factor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_at_base_dpi() {
        assert_eq!(scale(0, 1.0), 0);
        assert_eq!(scale(600, 1.0), 600);
        assert_eq!(scale(-150, 1.0), -150);
    }

    #[test]
    fn canonical_150_percent_example() {
        // origin (100, 100), size (600, 400) at 144 DPI → factor 1.5.
        let origin = Point { x: 100, y: 100 }.scaled(1.5);
        let size = Size {
            width: 600,
            height: 400,
        }
        .scaled(1.5);
        assert_eq!(origin, Point { x: 150, y: 150 });
        assert_eq!(
            size,
            Size {
                width: 900,
                height: 600
            }
        );
    }

    #[test]
    fn rounds_to_nearest() {
        // 125% scaling: 7 * 1.25 = 8.75 → 9; 2 * 1.25 = 2.5 → 3.
        assert_eq!(scale(7, 1.25), 9);
        assert_eq!(scale(2, 1.25), 3);
        // 150% scaling: 99 * 1.5 = 148.5 → 149 (half rounds away from zero).
        assert_eq!(scale(99, 1.5), 149);
    }

    #[test]
    fn negative_values_round_away_from_zero() {
        // A logical origin left of the primary monitor.
        assert_eq!(scale(-10, 1.5), -15);
        // -25 * 1.1 = -27.5 → -28, mirroring the positive half-up rule.
        assert_eq!(scale(-25, 1.1), -28);
    }

    #[test]
    fn point_and_size_scale_uniformly() {
        let p = Point { x: -100, y: 50 }.scaled(2.0);
        assert_eq!(p, Point { x: -200, y: 100 });
        let s = Size {
            width: 640,
            height: 480,
        }
        .scaled(1.75);
        assert_eq!(
            s,
            Size {
                width: 1120,
                height: 840
            }
        );
    }
}
