// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Polynomial evaluation helpers for combining BRNG outputs.
//!
//! A row of `c` sub-shares (all held by the same participant) is treated as
//! the coefficient vector of a polynomial and evaluated at a peer's index
//! `j`, component-wise over share values and decommitments. The analogous
//! combination of the row's commitments yields the commitment that binds
//! the evaluated share, since both sides are linear in the coefficients.

use crate::shamir::{Commitment, VerifiableShare};
use k256::Scalar;

/// Evaluate a row of sub-shares as a polynomial at `to`:
/// `row[0] + to * row[1] + to^2 * row[2] + ...`, component-wise over the
/// share values and decommitments.
///
/// The result keeps the row's index (the holding participant's own index);
/// it is that participant's contribution to peer `to`'s reconstruction.
/// Powers of `to` are accumulated by Horner's rule, so the combination is
/// constant-time in the scalar inputs.
///
/// # Panics
/// If `row` is empty.
pub fn share_of_share(to: &Scalar, row: &[VerifiableShare]) -> VerifiableShare {
    assert!(!row.is_empty(), "cannot combine an empty row of shares");
    let mut value = Scalar::ZERO;
    let mut decommit = Scalar::ZERO;
    for share in row.iter().rev() {
        value = value * to + share.value();
        decommit = decommit * to + share.decommit();
    }
    VerifiableShare::new(row[0].index(), value, decommit)
}

/// Evaluate a row of commitments as a polynomial at `to`:
/// `row[0] + to * row[1] + to^2 * row[2] + ...`, pointwise over the
/// commitment coefficients.
///
/// This is the commitment counterpart of [`share_of_share`]: a share
/// combined at `to` opens the commitment combined at `to`.
///
/// # Panics
/// If `row` is empty or its commitments do not all have the same length.
pub fn share_commitment(to: &Scalar, row: &[Commitment]) -> Commitment {
    assert!(!row.is_empty(), "cannot combine an empty row of commitments");
    let mut acc = row[row.len() - 1].clone();
    for commitment in row[..row.len() - 1].iter().rev() {
        acc.scale(to);
        acc.add(commitment);
    }
    acc
}
