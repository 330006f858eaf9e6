use nalgebra::{Unit, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

use super::Scalar;
use crate::geometry::vector::Vector;

/// Comparison tolerance for the float mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Coincidence distance. Coordinates within `epsilon` are equal, and
    /// `sin` of an angle below `epsilon` counts as parallel.
    pub epsilon: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self { epsilon: 1e-10 }
    }
}

impl Tolerance {
    pub fn new(epsilon: f64) -> Self {
        Self { epsilon }
    }
}

impl Scalar for f64 {
    type Context = Tolerance;

    fn from_i64(v: i64) -> Self {
        v as f64
    }

    fn is_zero_in(&self, ctx: &Tolerance) -> bool {
        self.abs() <= ctx.epsilon
    }

    fn is_negligible_squared_in(&self, scale: &f64, ctx: &Tolerance) -> bool {
        self.abs() <= ctx.epsilon * ctx.epsilon * scale.abs()
    }

    fn sqrt_in(&self, _ctx: &Tolerance) -> Self {
        self.max(0.0).sqrt()
    }

    fn sin_cos_in(&self, _ctx: &Tolerance) -> (Self, Self) {
        self.sin_cos()
    }

    fn round_in(&self, _ctx: &Tolerance) -> Self {
        *self
    }

    fn working(ctx: &Tolerance) -> Tolerance {
        *ctx
    }

    fn rotate_vector(
        v: &Vector<f64>,
        axis: &Vector<f64>,
        theta: &f64,
        _ctx: &Tolerance,
    ) -> Vector<f64> {
        let axis = Unit::new_normalize(Vector3::new(axis.dx, axis.dy, axis.dz));
        let rotated =
            UnitQuaternion::from_axis_angle(&axis, *theta) * Vector3::new(v.dx, v.dy, v.dz);
        Vector::new(rotated.x, rotated.y, rotated.z)
    }
}
