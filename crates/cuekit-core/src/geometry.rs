//! Normalized detection geometry.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in normalized `[0, 1]` frame coordinates.
///
/// Every field is optional: some detectors report no location at all and
/// aggregated boxes may only resolve some dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BoundingBox {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl BoundingBox {
    /// Create a fully resolved rectangle.
    #[inline]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left: Some(left),
            top: Some(top),
            width: Some(width),
            height: Some(height),
        }
    }

    /// A box with no location.
    pub const EMPTY: Self = Self {
        left: None,
        top: None,
        width: None,
        height: None,
    };

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.left.is_none() && self.top.is_none() && self.width.is_none() && self.height.is_none()
    }

    /// Horizontal center, `left + width / 2`.
    #[inline]
    pub fn center_x(&self) -> Option<f64> {
        Some(self.left? + self.width? / 2.0)
    }

    /// Vertical center, `top + height / 2`.
    #[inline]
    pub fn center_y(&self) -> Option<f64> {
        Some(self.top? + self.height? / 2.0)
    }

    /// Euclidean distance between the centers of two boxes, if both resolve.
    pub fn center_distance(&self, other: &Self) -> Option<f64> {
        let dx = self.center_x()? - other.center_x()?;
        let dy = self.center_y()? - other.center_y()?;
        Some((dx * dx + dy * dy).sqrt())
    }
}
