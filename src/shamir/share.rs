// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    curve::{CurvePoint, SCALAR_LENGTH},
    errors::Result,
    serialization::{put_scalar, take_scalar, BuildBytes, ParseBytes, Persist},
    shamir::Commitment,
};
use k256::Scalar;
use serde::{Deserialize, Serialize};
use zeroize::ZeroizeOnDrop;

/// A batch of verifiable shares, as sent in one directed opening.
pub type VerifiableShares = Vec<VerifiableShare>;

/// A Shamir share bound to a public [`Commitment`] by a Pedersen
/// decommitment scalar.
///
/// The `index` is the evaluation point of the share holder, a non-zero
/// element of the scalar field. Shares are immutable once created except
/// for [`scale`](VerifiableShare::scale), which the zero-generation variant
/// of the protocol applies uniformly to value and decommitment. The value
/// and decommitment are secret material, so shares scrub themselves when
/// dropped.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, ZeroizeOnDrop)]
pub struct VerifiableShare {
    index: Scalar,
    value: Scalar,
    decommit: Scalar,
}

impl VerifiableShare {
    /// Assemble a share from its evaluation point, value and decommitment.
    pub fn new(index: Scalar, value: Scalar, decommit: Scalar) -> Self {
        Self {
            index,
            value,
            decommit,
        }
    }

    /// The evaluation point this share belongs to.
    pub fn index(&self) -> Scalar {
        self.index
    }

    /// The plain Shamir share value.
    pub fn value(&self) -> Scalar {
        self.value
    }

    /// The Pedersen decommitment scalar.
    pub fn decommit(&self) -> Scalar {
        self.decommit
    }

    /// Check this share against `commitment` under the Pedersen parameter
    /// `h`: valid when `value * G + decommit * h == commitment.eval(index)`.
    pub fn verify(&self, commitment: &Commitment, h: &CurvePoint) -> bool {
        let opening = CurvePoint::GENERATOR.multiply_by_scalar(&self.value)
            + h.multiply_by_scalar(&self.decommit);
        opening == commitment.eval(&self.index)
    }

    /// Scale value and decommitment by `scalar`, leaving the index untouched.
    pub fn scale(&mut self, scalar: &Scalar) {
        self.value *= scalar;
        self.decommit *= scalar;
    }
}

impl Persist for VerifiableShare {
    fn size_hint(&self) -> usize {
        3 * SCALAR_LENGTH
    }

    fn persist(&self, out: &mut BuildBytes) -> Result<()> {
        put_scalar(out, &self.index, "share index")?;
        put_scalar(out, &self.value, "share value")?;
        put_scalar(out, &self.decommit, "share decommitment")?;
        Ok(())
    }

    fn restore(input: &mut ParseBytes<'_>) -> Result<Self> {
        let index = take_scalar(input, "share index")?;
        let value = take_scalar(input, "share value")?;
        let decommit = take_scalar(input, "share decommitment")?;
        Ok(Self {
            index,
            value,
            decommit,
        })
    }
}
