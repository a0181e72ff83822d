use serde::{Deserialize, Serialize};

/// Milliseconds on the host's monotonic clock.
///
/// Time is always passed in explicitly so that physics stays deterministic
/// under test and replay.
pub type Timestamp = f64;

/// Normalized four-way direction input. Directions are independent; how
/// opposing directions combine is up to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirectionState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl DirectionState {
    pub fn is_idle(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}

/// Errors for world, surface or chunk geometry that cannot be rendered.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("{what} is not finite")]
    NonFinite { what: &'static str },
    #[error("{what} must be positive, got {value}")]
    NonPositive { what: &'static str, value: f64 },
    #[error("inverted {axis} range: min {min} > max {max}")]
    InvertedRange { axis: &'static str, min: f64, max: f64 },
    #[error("world {width}x{height} cannot be rendered in halves under the {ceiling} surface ceiling")]
    TooLarge {
        width: u32,
        height: u32,
        ceiling: u32,
    },
}

/// Inclusive range on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn clamp(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }
}

/// Axis-aligned rectangle an entity is confined to.
///
/// Read-only once built; construction rejects inverted or non-finite ranges
/// so that clamping is always well defined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    x: AxisRange,
    y: AxisRange,
}

impl Bounds {
    pub fn new(x: AxisRange, y: AxisRange) -> Result<Self, GeometryError> {
        check_range("x", x)?;
        check_range("y", y)?;
        Ok(Self { x, y })
    }

    /// `[0, width] x [0, height]`.
    pub fn world(dimensions: Dimensions) -> Self {
        Self {
            x: AxisRange {
                min: 0.0,
                max: f64::from(dimensions.width),
            },
            y: AxisRange {
                min: 0.0,
                max: f64::from(dimensions.height),
            },
        }
    }

    pub fn x(&self) -> AxisRange {
        self.x
    }

    pub fn y(&self) -> AxisRange {
        self.y
    }

    /// These bounds moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: AxisRange {
                min: self.x.min + dx,
                max: self.x.max + dx,
            },
            y: AxisRange {
                min: self.y.min + dy,
                max: self.y.max + dy,
            },
        }
    }
}

fn check_range(axis: &'static str, range: AxisRange) -> Result<(), GeometryError> {
    if !range.min.is_finite() || !range.max.is_finite() {
        return Err(GeometryError::NonFinite { what: axis });
    }
    if range.min > range.max {
        return Err(GeometryError::InvertedRange {
            axis,
            min: range.min,
            max: range.max,
        });
    }
    Ok(())
}

/// Integer pixel dimensions of a surface, viewport or world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Validate both sides are non-zero.
    pub fn ensure_positive(self, what: &'static str) -> Result<Self, GeometryError> {
        if self.width == 0 {
            return Err(GeometryError::NonPositive { what, value: 0.0 });
        }
        if self.height == 0 {
            return Err(GeometryError::NonPositive { what, value: 0.0 });
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: f64, max: f64) -> AxisRange {
        AxisRange { min, max }
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = Bounds::new(range(10.0, 0.0), range(0.0, 1.0)).unwrap_err();
        assert!(matches!(err, GeometryError::InvertedRange { axis: "x", .. }));
    }

    #[test]
    fn non_finite_bounds_are_rejected() {
        assert!(Bounds::new(range(0.0, f64::INFINITY), range(0.0, 1.0)).is_err());
        assert!(Bounds::new(range(0.0, 1.0), range(f64::NAN, 1.0)).is_err());
    }

    #[test]
    fn world_bounds_span_dimensions() {
        let b = Bounds::world(Dimensions::new(600, 400));
        assert_eq!(b.x(), range(0.0, 600.0));
        assert_eq!(b.y(), range(0.0, 400.0));
    }

    #[test]
    fn translated_shifts_both_ends() {
        let b = Bounds::world(Dimensions::new(100, 50)).translated(-10.0, -5.0);
        assert_eq!(b.x(), range(-10.0, 90.0));
        assert_eq!(b.y(), range(-5.0, 45.0));
    }

    #[test]
    fn degenerate_range_is_allowed() {
        let b = Bounds::new(range(5.0, 5.0), range(0.0, 0.0)).unwrap();
        assert!(b.x().contains(5.0));
        assert_eq!(b.y().clamp(3.0), 0.0);
    }

    #[test]
    fn zero_dimensions_fail_positivity_check() {
        assert!(Dimensions::new(0, 10).ensure_positive("world").is_err());
        assert!(Dimensions::new(10, 10).ensure_positive("world").is_ok());
    }
}
