// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Per-participant core of a distributed random number generation protocol
//! for threshold MPC over secp256k1.
//!
//! A fixed set of participants jointly produce a batch of unbiased,
//! verifiably-shared random secrets (or, with one algebraic twist, sharings
//! of zero) without any single party learning them. This crate implements
//! the piece that runs inside each participant:
//!
//! - [`shamir`]: verifiable Shamir shares and Pedersen commitment
//!   polynomials.
//! - [`open`]: the opening sub-protocol, which verifies directed openings
//!   from peers and reconstructs the batch of secrets at the threshold.
//! - [`rng`]: the top-level state machine, which turns a biased-RNG output
//!   batch into per-peer directed openings and local commitments, and
//!   drives the opener to completion.
//!
//! Production of the biased-RNG input and delivery of openings between
//! machines are the calling application's concern; all methods here are
//! synchronous and every state transition reports an event for the caller
//! to dispatch on. State machines can be checkpointed with the
//! budget-checked binary codec in [`Persist`].
//!
//! # Example
//! ```ignore
//! use mpc_rng::rng::{RngEvent, RngParticipant};
//!
//! // One BRNG output batch per protocol invocation.
//! let (event, mut participant, directed_openings, output_commitments) =
//!     RngParticipant::new(
//!         own_index, indices, batch_size, threshold, h,
//!         sets_of_shares, sets_of_commitments, /* is_zero: */ false,
//!     );
//! assert_eq!(event, RngEvent::SharesConstructed);
//!
//! // Send each remaining directed opening to its addressee, then feed
//! // peer openings in as the transport delivers them.
//! for opening in transport {
//!     if let RngEvent::RngsReconstructed(shares) =
//!         participant.transition_open(&opening)
//!     {
//!         // shares[i] opens output_commitments[i] at own_index.
//!         break;
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod errors;
pub mod open;
pub mod rng;
pub mod shamir;

mod curve;
mod serialization;
#[cfg(test)]
pub(crate) mod utils;

pub use curve::{CurvePoint, POINT_LENGTH, SCALAR_LENGTH};
pub use serialization::{BuildBytes, ParseBytes, Persist};
