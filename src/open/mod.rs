// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Types and functions related to the opening sub-protocol.
//!
//! An [`Opener`] is fixed over a batch of commitments, a participant index
//! set and a Pedersen parameter. Peers contribute directed openings, which
//! are batches of verifiable shares all evaluated at the contributing
//! peer's own index. The opener verifies every share in a batch against the
//! corresponding commitment before buffering anything, counts each sender
//! at most once, and reconstructs all batch elements by Lagrange
//! interpolation at zero as soon as the reconstruction threshold of
//! distinct valid senders is reached.

mod opener;

pub use opener::{OpenEvent, Opener};
