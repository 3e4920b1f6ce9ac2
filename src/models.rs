use std::fmt;
use std::str::FromStr;

/// A pixel position in image coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coordinate {
    pub x: u16,
    pub y: u16,
}

impl Coordinate {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Axis-aligned rectangle derived from a segmentation mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rectangle {
    pub left_up: Coordinate,
    pub right_down: Coordinate,
}

impl Rectangle {
    pub fn new(left_up: Coordinate, right_down: Coordinate) -> Self {
        Self { left_up, right_down }
    }

    pub fn width(&self) -> u16 {
        self.right_down.x.abs_diff(self.left_up.x)
    }

    pub fn height(&self) -> u16 {
        self.right_down.y.abs_diff(self.left_up.y)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LeftUp={}, RightDown={}", self.left_up, self.right_down)
    }
}

/// How the corner tuple returned by the model library is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CornerLayout {
    /// `((x0, x1), (y0, y1))`
    #[default]
    Axes,
    /// `((x0, y0), (x1, y1))`
    Points,
}

/// Parameters forwarded to the corner extraction call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerParams {
    /// Angle tolerance in degrees when merging collinear contour points
    pub tolerance: i32,
    /// Sample every n-th contour point
    pub per_corner: i32,
    pub scale: ScaleFactor,
}

impl Default for CornerParams {
    fn default() -> Self {
        Self {
            tolerance: 10,
            per_corner: 21,
            scale: ScaleFactor::default(),
        }
    }
}

/// Horizontal and vertical shrink factor applied to the detected box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor {
    pub x: f32,
    pub y: f32,
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self { x: 0.95, y: 0.95 }
    }
}

impl fmt::Display for ScaleFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for ScaleFactor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y but got '{}'", s))?;
        let parse = |v: &str| {
            let value: f32 = v
                .trim()
                .parse()
                .map_err(|e| format!("invalid scale component '{}': {}", v.trim(), e))?;
            if value.is_finite() && value > 0.0 {
                Ok(value)
            } else {
                Err(format!("scale component must be positive, got {}", value))
            }
        };
        Ok(Self {
            x: parse(x)?,
            y: parse(y)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rectangle_display_matches_cli_output() {
        let rect = Rectangle::new(Coordinate::new(10, 20), Coordinate::new(200, 300));
        assert_eq!(rect.to_string(), "LeftUp=(10,20), RightDown=(200,300)");
        assert_eq!(rect.width(), 190);
        assert_eq!(rect.height(), 280);
    }

    #[test]
    fn scale_factor_parses_pair() {
        let scale: ScaleFactor = "0.9, 0.8".parse().unwrap();
        assert_eq!(scale, ScaleFactor { x: 0.9, y: 0.8 });
    }

    #[test]
    fn scale_factor_rejects_bad_input() {
        assert!("0.9".parse::<ScaleFactor>().is_err());
        assert!("a,b".parse::<ScaleFactor>().is_err());
        assert!("0,1".parse::<ScaleFactor>().is_err());
    }

    #[test]
    fn corner_params_default_to_library_defaults() {
        let params = CornerParams::default();
        assert_eq!(params.tolerance, 10);
        assert_eq!(params.per_corner, 21);
        assert_eq!(params.scale.to_string(), "0.95,0.95");
    }
}
