use serde::{Deserialize, Serialize};

/// A rectangle describing position and size.
///
/// Carries the derived edges alongside left/top/width/height so receivers
/// can read whichever form they need without recomputing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub bottom: f64,
    pub right: f64,
    pub x: f64,
    pub y: f64,
}

impl LayoutRect {
    /// Build a rect from left, top, width and height.
    pub fn ltwh(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
            bottom: top + height,
            right: left + width,
            x: left,
            y: top,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ltwh_fills_derived_edges() {
        let rect = LayoutRect::ltwh(10.0, 20.0, 300.0, 250.0);
        assert_eq!(rect.right, 310.0);
        assert_eq!(rect.bottom, 270.0);
        assert_eq!(rect.x, 10.0);
        assert_eq!(rect.y, 20.0);
    }

    #[test]
    fn serializes_all_edges() {
        let value = serde_json::to_value(LayoutRect::ltwh(1.0, 2.0, 3.0, 4.0)).unwrap();
        for key in ["left", "top", "width", "height", "bottom", "right", "x", "y"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["bottom"], 6.0);
    }
}
