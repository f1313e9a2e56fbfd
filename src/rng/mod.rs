// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Types and functions related to the random number generation protocol.
//!
//! A fixed set of `n` participants, identified by distinct non-zero scalar
//! indices, jointly produce a batch of `b` unbiased random secrets, shared
//! with reconstruction threshold `k`, without any single party learning
//! them. With the `is_zero` twist the same machinery produces verifiable
//! sharings of zero, used as masks by higher-level protocols.
//!
//! # High-level protocol description
//! Each participant starts from the output of a prior biased random number
//! generation (BRNG) step: `b` sets of `k` verifiable sub-sharings (`k - 1`
//! for zero generation) and their Pedersen commitments.
//! - On construction, the participant combines each set of sub-shares into
//!   one directed opening per peer by evaluating the shares as a polynomial
//!   at the peer's index, and combines the commitments analogously to learn
//!   both the commitments to the final secrets and the commitments its own
//!   opener will verify incoming openings against. Its own directed opening
//!   is consumed immediately.
//! - The transport layer delivers each remaining directed opening to its
//!   addressee. Incoming openings are handed to
//!   [`RngParticipant::transition_open`] in any order; invalid, duplicate or
//!   late batches are ignored.
//! - Once `k` distinct valid openings (including the participant's own) have
//!   arrived, the underlying opener interpolates them at zero and the
//!   participant emits its `b` reconstructed verifiable shares, which open
//!   the returned output commitments at the participant's index.
//!
//! Every state transition returns an [`RngEvent`] so the caller can drive
//! the transport and observe protocol completion.

pub mod compute;
mod participant;

pub use participant::{DirectedOpening, RngEvent, RngParticipant};
