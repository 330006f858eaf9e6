//! Precision policy for the exact (rational) mode.
//!
//! A [`Precision`] is an order of magnitude plus a [`RoundingMode`]: results
//! that cannot be represented exactly are rounded to a multiple of `10^oom`.
//! Rounding happens once, at the irrational step. Intermediate series and
//! roots are carried at a finer working precision.

use std::cmp::Ordering;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use serde::{Deserialize, Serialize};

use super::Scalar;
use crate::geometry::vector::Vector;

/// Extra decimal digits carried by intermediate irrational computations.
const GUARD_DIGITS: u32 = 8;

/// Decimal rounding rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Away from zero.
    Up,
    /// Towards zero.
    Down,
    /// Towards positive infinity.
    Ceiling,
    /// Towards negative infinity.
    Floor,
    /// Nearest, ties away from zero.
    #[default]
    HalfUp,
    /// Nearest, ties towards zero.
    HalfDown,
    /// Nearest, ties to the even neighbour.
    HalfEven,
}

/// Order of magnitude and rounding rule for exact-mode irrational results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    /// Results are rounded to a multiple of `10^oom`.
    pub oom: i32,
    pub rounding: RoundingMode,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            oom: -16,
            rounding: RoundingMode::HalfUp,
        }
    }
}

impl Precision {
    pub fn new(oom: i32, rounding: RoundingMode) -> Self {
        Self { oom, rounding }
    }

    /// The same policy with `digits` more decimal places.
    pub fn refined(&self, digits: u32) -> Self {
        Self {
            oom: self.oom.saturating_sub(digits as i32),
            rounding: self.rounding,
        }
    }

    /// Working precision for intermediate steps: finer, ties to even.
    fn working(&self) -> Self {
        Self {
            oom: self.oom.saturating_sub(GUARD_DIGITS as i32),
            rounding: RoundingMode::HalfEven,
        }
    }

    /// `10^oom` as a rational.
    pub fn unit(&self) -> BigRational {
        pow10(self.oom)
    }

    /// Round `x` to a multiple of `10^oom`.
    pub fn round(&self, x: &BigRational) -> BigRational {
        let unit = self.unit();
        let k = round_to_integer(&(x / &unit), self.rounding);
        BigRational::from_integer(k) * unit
    }

    /// Square root of `x`.
    ///
    /// Rational roots (`sqrt(9/4)`) are returned exactly. Irrational roots are
    /// rounded to `10^oom`; a root smaller than the precision rounds per the
    /// rounding rule, possibly to zero. Negative input yields zero.
    pub fn sqrt(&self, x: &BigRational) -> BigRational {
        if !x.is_positive() {
            return BigRational::zero();
        }
        if let Some(root) = exact_sqrt(x) {
            return root;
        }
        let unit = self.unit();
        // sqrt(y) == sqrt(x) / unit, strictly between s and s + 1.
        let y = x / (&unit * &unit);
        let s = y.floor().to_integer().sqrt();
        let up = match self.rounding {
            RoundingMode::Up | RoundingMode::Ceiling => true,
            RoundingMode::Down | RoundingMode::Floor => false,
            RoundingMode::HalfUp | RoundingMode::HalfDown | RoundingMode::HalfEven => {
                let mid = BigRational::from_integer(s.clone()) + half();
                y > &mid * &mid
            }
        };
        let k = if up { s + BigInt::one() } else { s };
        BigRational::from_integer(k) * unit
    }

    /// Pi, via Machin's formula `pi = 16 atan(1/5) - 4 atan(1/239)`.
    pub fn pi(&self) -> BigRational {
        let work = self.working();
        let pi = BigRational::from_integer(16.into()) * atan_inv(5, &work)
            - BigRational::from_integer(4.into()) * atan_inv(239, &work);
        self.round(&pi)
    }

    /// `(sin theta, cos theta)` for `theta` in radians, each rounded once.
    pub fn sin_cos(&self, theta: &BigRational) -> (BigRational, BigRational) {
        let (s, c) = self.working().sin_cos_unrounded(theta);
        (self.round(&s), self.round(&c))
    }

    fn sin_cos_unrounded(&self, theta: &BigRational) -> (BigRational, BigRational) {
        let two_pi = |p: &Precision| BigRational::from_integer(2.into()) * p.pi();
        // Reduce into [-pi, pi]; the error in 2pi grows with the turn count.
        let turns = round_to_integer(&(theta / two_pi(self)), RoundingMode::HalfEven);
        let extra = turns.magnitude().to_string().len() as u32;
        let x = theta - BigRational::from_integer(turns) * two_pi(&self.refined(extra));
        let x2 = &x * &x;

        let mut sin = x.clone();
        let mut term = x;
        let mut n: i64 = 1;
        loop {
            let div = BigRational::from_integer(((2 * n) * (2 * n + 1)).into());
            term = self.round(&(-(term * &x2) / div));
            if term.is_zero() {
                break;
            }
            sin += &term;
            n += 1;
        }

        let mut cos = BigRational::one();
        let mut term = BigRational::one();
        let mut n: i64 = 1;
        loop {
            let div = BigRational::from_integer(((2 * n - 1) * (2 * n)).into());
            term = self.round(&(-(term * &x2) / div));
            if term.is_zero() {
                break;
            }
            cos += &term;
            n += 1;
        }
        (sin, cos)
    }
}

fn half() -> BigRational {
    BigRational::new(BigInt::one(), 2.into())
}

fn pow10(exp: i32) -> BigRational {
    let magnitude = num_traits::pow(BigInt::from(10), exp.unsigned_abs() as usize);
    if exp >= 0 {
        BigRational::from_integer(magnitude)
    } else {
        BigRational::new(BigInt::one(), magnitude)
    }
}

/// Round a rational to an integer under `mode`.
fn round_to_integer(x: &BigRational, mode: RoundingMode) -> BigInt {
    let floor = x.floor().to_integer();
    let frac = x - BigRational::from_integer(floor.clone());
    if frac.is_zero() {
        return floor;
    }
    let ceil = &floor + BigInt::one();
    let positive = x.is_positive();
    match mode {
        RoundingMode::Floor => floor,
        RoundingMode::Ceiling => ceil,
        RoundingMode::Down => {
            if positive { floor } else { ceil }
        }
        RoundingMode::Up => {
            if positive { ceil } else { floor }
        }
        RoundingMode::HalfUp | RoundingMode::HalfDown | RoundingMode::HalfEven => {
            match frac.cmp(&half()) {
                Ordering::Less => floor,
                Ordering::Greater => ceil,
                Ordering::Equal => match mode {
                    RoundingMode::HalfUp => {
                        if positive { ceil } else { floor }
                    }
                    RoundingMode::HalfDown => {
                        if positive { floor } else { ceil }
                    }
                    _ => {
                        if floor.is_even() { floor } else { ceil }
                    }
                },
            }
        }
    }
}

fn exact_sqrt(x: &BigRational) -> Option<BigRational> {
    let n = x.numer().sqrt();
    let d = x.denom().sqrt();
    if &(&n * &n) == x.numer() && &(&d * &d) == x.denom() {
        Some(BigRational::new(n, d))
    } else {
        None
    }
}

/// `atan(1/n)` by its alternating series, terms rounded at `work`.
fn atan_inv(n: i64, work: &Precision) -> BigRational {
    let inv = BigRational::new(BigInt::one(), n.into());
    let inv2 = &inv * &inv;
    let mut power = inv;
    let mut sum = BigRational::zero();
    let mut k: i64 = 0;
    loop {
        let term = work.round(&(&power / BigRational::from_integer((2 * k + 1).into())));
        if term.is_zero() {
            break;
        }
        if k % 2 == 0 {
            sum += term;
        } else {
            sum -= term;
        }
        power = work.round(&(power * &inv2));
        k += 1;
    }
    sum
}

impl Scalar for BigRational {
    type Context = Precision;

    fn from_i64(v: i64) -> Self {
        BigRational::from_integer(v.into())
    }

    fn is_zero_in(&self, _ctx: &Precision) -> bool {
        self.is_zero()
    }

    fn is_negligible_squared_in(&self, _scale: &Self, _ctx: &Precision) -> bool {
        self.is_zero()
    }

    fn sqrt_in(&self, ctx: &Precision) -> Self {
        ctx.sqrt(self)
    }

    fn sin_cos_in(&self, ctx: &Precision) -> (Self, Self) {
        ctx.sin_cos(self)
    }

    fn round_in(&self, ctx: &Precision) -> Self {
        ctx.round(self)
    }

    fn working(ctx: &Precision) -> Precision {
        ctx.working()
    }

    /// Rodrigues' formula with a non-unit axis `a`:
    /// `v cos + (a x v) sin / |a| + a (a . v)(1 - cos) / |a|^2`.
    /// Only `1/|a|`, `sin` and `cos` are irrational; they are carried at the
    /// working precision and each coordinate is rounded once at the end.
    fn rotate_vector(
        v: &Vector<Self>,
        axis: &Vector<Self>,
        theta: &Self,
        ctx: &Precision,
    ) -> Vector<Self> {
        let work = ctx.working();
        let norm2 = axis.magnitude_squared();
        let inv_norm = work.sqrt(&(BigRational::one() / &norm2));
        let (sin, cos) = work.sin_cos_unrounded(theta);
        let along = axis.dot(v) * (BigRational::one() - &cos) / norm2;
        let rotated = v.scale(&cos) + axis.cross(v).scale(&(sin * inv_norm)) + axis.scale(&along);
        Vector::new(
            ctx.round(&rotated.dx),
            ctx.round(&rotated.dy),
            ctx.round(&rotated.dz),
        )
    }
}
