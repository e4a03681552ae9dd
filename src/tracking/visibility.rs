//! Visibility box.
//!
//! Optional axis-aligned area outside of which samples are ignored.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in world coordinates. Edges are inside.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct VisibilityBox {
    /// Left edge
    pub min_x: f64,
    /// Right edge
    pub max_x: f64,
    /// Bottom edge
    pub min_y: f64,
    /// Top edge
    pub max_y: f64,
}

impl VisibilityBox {
    /// Square of half-width `radius` centered on (`x`, `y`).
    pub fn around(x: f64, y: f64, radius: f64) -> Self {
        Self {
            min_x: x - radius,
            max_x: x + radius,
            min_y: y - radius,
            max_y: y + radius,
        }
    }

    /// Is (`x`, `y`) inside the box?
    #[inline]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_around() {
        let b = VisibilityBox::around(100.0, -50.0, 10.0);
        assert_eq!(b.min_x, 90.0);
        assert_eq!(b.max_x, 110.0);
        assert_eq!(b.min_y, -60.0);
        assert_eq!(b.max_y, -40.0);
    }

    #[test]
    fn test_contains_edges_inclusive() {
        let b = VisibilityBox::around(0.0, 0.0, 5.0);
        assert!(b.contains(0.0, 0.0));
        assert!(b.contains(5.0, -5.0));
        assert!(!b.contains(5.1, 0.0));
        assert!(!b.contains(0.0, -5.1));
    }

    #[test]
    fn test_nan_is_outside() {
        let b = VisibilityBox::around(0.0, 0.0, 5.0);
        assert!(!b.contains(f64::NAN, 0.0));
    }
}
