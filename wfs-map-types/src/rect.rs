use approx::{AbsDiffEq, RelativeEq};
use num_traits::{FromPrimitive, Num};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding rectangle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect<N = f64> {
    /// Minimum x (longitude for geographic coordinates).
    pub x_min: N,
    /// Minimum y (latitude for geographic coordinates).
    pub y_min: N,
    /// Maximum x.
    pub x_max: N,
    /// Maximum y.
    pub y_max: N,
}

impl<N: Num + Copy + PartialOrd + FromPrimitive> Rect<N> {
    /// Creates a new rectangle. The caller is responsible for `min <= max` on both axes.
    pub fn new(x_min: N, y_min: N, x_max: N, y_max: N) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Degenerate rectangle containing a single point.
    pub fn from_point(x: N, y: N) -> Self {
        Self {
            x_min: x,
            y_min: y,
            x_max: x,
            y_max: y,
        }
    }

    /// Smallest rectangle containing all the given `(x, y)` pairs. Returns `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = (N, N)>) -> Option<Self> {
        let mut points = points.into_iter();
        let (x, y) = points.next()?;
        Some(points.fold(Self::from_point(x, y), |rect, (x, y)| {
            rect.merge(Self::from_point(x, y))
        }))
    }

    /// Minimum x.
    pub fn x_min(&self) -> N {
        self.x_min
    }

    /// Maximum x.
    pub fn x_max(&self) -> N {
        self.x_max
    }

    /// Minimum y.
    pub fn y_min(&self) -> N {
        self.y_min
    }

    /// Maximum y.
    pub fn y_max(&self) -> N {
        self.y_max
    }

    /// Width of the rectangle.
    pub fn width(&self) -> N {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    pub fn height(&self) -> N {
        self.y_max - self.y_min
    }

    /// Returns true if the rectangle has zero width or zero height.
    pub fn is_degenerate(&self) -> bool {
        self.width() == N::zero() || self.height() == N::zero()
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            x_min: if self.x_min < other.x_min {
                self.x_min
            } else {
                other.x_min
            },
            y_min: if self.y_min < other.y_min {
                self.y_min
            } else {
                other.y_min
            },
            x_max: if self.x_max > other.x_max {
                self.x_max
            } else {
                other.x_max
            },
            y_max: if self.y_max > other.y_max {
                self.y_max
            } else {
                other.y_max
            },
        }
    }

    /// Merges all rectangles into one. Returns `None` for an empty iterator.
    pub fn merge_all(rects: impl IntoIterator<Item = Self>) -> Option<Self> {
        rects.into_iter().reduce(|acc, rect| acc.merge(rect))
    }

    /// Returns true if the point lies inside the rectangle or on its boundary.
    pub fn contains(&self, x: N, y: N) -> bool {
        self.x_min <= x && self.x_max >= x && self.y_min <= y && self.y_max >= y
    }

    /// Center point of the rectangle as `(x, y)`.
    pub fn center(&self) -> (N, N) {
        let two = N::one() + N::one();
        (
            (self.x_min + self.x_max) / two,
            (self.y_min + self.y_max) / two,
        )
    }

    /// Scales width and height by `factor` keeping the center in place.
    ///
    /// `magnify(1.2)` adds 10% of the size on each side, 20% in total.
    pub fn magnify(&self, factor: N) -> Self {
        let two = N::one() + N::one();
        let (cx, cy) = self.center();
        let half_width = self.width() / two * factor;
        let half_height = self.height() / two * factor;
        Self {
            x_min: cx - half_width,
            x_max: cx + half_width,
            y_min: cy - half_height,
            y_max: cy + half_height,
        }
    }
}

impl AbsDiffEq for Rect<f64> {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.x_min.abs_diff_eq(&other.x_min, epsilon)
            && self.y_min.abs_diff_eq(&other.y_min, epsilon)
            && self.x_max.abs_diff_eq(&other.x_max, epsilon)
            && self.y_max.abs_diff_eq(&other.y_max, epsilon)
    }
}

impl RelativeEq for Rect<f64> {
    fn default_max_relative() -> Self::Epsilon {
        f64::default_max_relative()
    }

    fn relative_eq(
        &self,
        other: &Self,
        epsilon: Self::Epsilon,
        max_relative: Self::Epsilon,
    ) -> bool {
        self.x_min.relative_eq(&other.x_min, epsilon, max_relative)
            && self.y_min.relative_eq(&other.y_min, epsilon, max_relative)
            && self.x_max.relative_eq(&other.x_max, epsilon, max_relative)
            && self.y_max.relative_eq(&other.y_max, epsilon, max_relative)
    }
}
