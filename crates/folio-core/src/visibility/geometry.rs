//! Rectangle math for hosts that have no native intersection observer

use serde::{Deserialize, Serialize};

use super::{IntersectionEntry, Margin};
use crate::dom::ElementId;

/// Axis-aligned box in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    #[serde(default)]
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }
}

/// The visible scrolling area
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// The viewport grown (positive) or shrunk (negative) by `margin`
    pub fn root_rect(&self, margin: &Margin) -> Rect {
        let top = self.scroll_y - margin.top;
        let bottom = self.scroll_y + self.height + margin.bottom;
        let left = -margin.left;
        let right = self.width + margin.right;
        Rect::new(left, top, right - left, bottom - top)
    }
}

/// Compute what an intersection observer would report for `rect`
///
/// Edge-adjacent boxes count as intersecting with a ratio of zero. A
/// zero-area target that intersects reports a ratio of one.
pub fn intersection_entry(
    target: ElementId,
    rect: Rect,
    viewport: &Viewport,
    margin: &Margin,
) -> IntersectionEntry {
    let root = viewport.root_rect(margin);
    if root.width < 0.0 || root.height < 0.0 {
        return IntersectionEntry::outside(target);
    }

    let overlap_w = rect.right().min(root.right()) - rect.x.max(root.x);
    let overlap_h = rect.bottom().min(root.bottom()) - rect.y.max(root.y);
    if overlap_w < 0.0 || overlap_h < 0.0 {
        return IntersectionEntry::outside(target);
    }

    let area = rect.width * rect.height;
    let ratio = if area > 0.0 {
        (overlap_w * overlap_h / area).clamp(0.0, 1.0)
    } else {
        1.0
    };

    IntersectionEntry {
        target,
        is_intersecting: true,
        intersection_ratio: ratio,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(scroll_y: f64) -> Viewport {
        Viewport {
            scroll_y,
            width: 1000.0,
            height: 800.0,
        }
    }

    #[test]
    fn test_fully_visible() {
        let entry = intersection_entry(
            ElementId(1),
            Rect::new(0.0, 100.0, 500.0, 200.0),
            &viewport(0.0),
            &Margin::default(),
        );
        assert!(entry.is_intersecting);
        assert!((entry.intersection_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_half_visible() {
        // Element spans 700..900, viewport 0..800
        let entry = intersection_entry(
            ElementId(1),
            Rect::new(0.0, 700.0, 500.0, 200.0),
            &viewport(0.0),
            &Margin::default(),
        );
        assert!((entry.intersection_ratio - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_negative_bottom_margin_shrinks_root() {
        // Element spans 760..860; with -50 bottom the root ends at 750
        let margin = Margin {
            bottom: -50.0,
            ..Margin::default()
        };
        let entry = intersection_entry(
            ElementId(2),
            Rect::new(0.0, 760.0, 500.0, 100.0),
            &viewport(0.0),
            &margin,
        );
        assert!(!entry.is_intersecting);

        let entry = intersection_entry(
            ElementId(2),
            Rect::new(0.0, 760.0, 500.0, 100.0),
            &viewport(100.0),
            &margin,
        );
        assert!(entry.is_intersecting);
        assert!((entry.intersection_ratio - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_below_viewport() {
        let entry = intersection_entry(
            ElementId(3),
            Rect::new(0.0, 2000.0, 500.0, 100.0),
            &viewport(0.0),
            &Margin::default(),
        );
        assert!(!entry.is_intersecting);
        assert_eq!(entry.intersection_ratio, 0.0);
    }
}
