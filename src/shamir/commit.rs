// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    curve::{CurvePoint, POINT_LENGTH},
    errors::Result,
    serialization::{put_point, take_point, BuildBytes, ParseBytes, Persist, LENGTH_BYTES},
};
use k256::Scalar;
use serde::{Deserialize, Serialize};

/// A polynomial in the exponent: the ordered curve points
/// `[C_0, C_1, ..., C_{t-1}]` commit to the coefficients of a degree-`t-1`
/// polynomial, and `t` is the reconstruction threshold of the sharing the
/// commitment binds.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct Commitment {
    points: Vec<CurvePoint>,
}

impl Commitment {
    /// An empty commitment with room for `capacity` coefficients.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Build a commitment directly from coefficient points.
    pub fn from_points(points: Vec<CurvePoint>) -> Self {
        Self { points }
    }

    /// Append the next-higher-degree coefficient.
    pub fn append(&mut self, point: CurvePoint) {
        self.points.push(point);
    }

    /// Number of coefficients, equal to the reconstruction threshold.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the commitment has no coefficients.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The coefficient points, lowest degree first.
    pub fn coefficients(&self) -> &[CurvePoint] {
        &self.points
    }

    /// Evaluate the polynomial at `x`: `C_0 + x * C_1 + x^2 * C_2 + ...`.
    ///
    /// Right-to-left Horner; each step is one constant-time scalar
    /// multiplication and one point addition.
    pub fn eval(&self, x: &Scalar) -> CurvePoint {
        let mut sum = CurvePoint::IDENTITY;
        for coefficient in self.points.iter().rev() {
            sum = sum.multiply_by_scalar(x);
            sum = sum + *coefficient;
        }
        sum
    }

    /// Scale every coefficient by `scalar`.
    pub fn scale(&mut self, scalar: &Scalar) {
        for point in &mut self.points {
            *point = point.multiply_by_scalar(scalar);
        }
    }

    /// Add another commitment of the same length, pointwise.
    pub fn add(&mut self, other: &Commitment) {
        assert_eq!(
            self.points.len(),
            other.points.len(),
            "commitment lengths must match for pointwise addition"
        );
        for (point, rhs) in self.points.iter_mut().zip(&other.points) {
            *point = *point + *rhs;
        }
    }
}

impl Persist for Commitment {
    fn size_hint(&self) -> usize {
        LENGTH_BYTES + self.points.len() * POINT_LENGTH
    }

    fn persist(&self, out: &mut BuildBytes) -> Result<()> {
        out.put_u32(self.points.len() as u32, "commitment length")?;
        for point in &self.points {
            put_point(out, point, "commitment coefficient")?;
        }
        Ok(())
    }

    fn restore(input: &mut ParseBytes<'_>) -> Result<Self> {
        let len = input.take_u32("commitment length")?;
        let mut points = Vec::new();
        for _ in 0..len {
            points.push(take_point(input, "commitment coefficient")?);
        }
        Ok(Self { points })
    }
}
