// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Verifiable secret sharing building blocks.
//!
//! A [`VerifiableShare`] is a Shamir share together with a Pedersen
//! decommitment scalar, and a [`Commitment`] is the matching polynomial in
//! the exponent: an ordered sequence of curve points, one per coefficient.
//! A share `(i, v, d)` opens a commitment `C` when
//! `v * G + d * h == C.eval(i)`, where `G` is the group generator and `h`
//! the Pedersen parameter. The binding is what lets the opener accept
//! shares from untrusted peers without seeing the underlying secrets.

mod commit;
mod share;

pub use commit::Commitment;
pub use share::{VerifiableShare, VerifiableShares};
