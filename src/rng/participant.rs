// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    curve::{CurvePoint, SCALAR_LENGTH},
    errors::Result,
    open::{OpenEvent, Opener},
    rng::compute,
    serialization::{put_scalar, take_scalar, BuildBytes, ParseBytes, Persist, LENGTH_BYTES},
    shamir::{Commitment, VerifiableShare, VerifiableShares},
};
use k256::{elliptic_curve::Field, Scalar};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};
use zeroize::ZeroizeOnDrop;

/// Outcome of a state transition of an [`RngParticipant`].
///
/// This is a closed vocabulary; every transition returns exactly one event
/// and callers dispatch on the variant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RngEvent {
    /// The BRNG share sets were absent or had the wrong batch size, so only
    /// the commitments were processed. The participant waits for openings
    /// from its peers, but contributed none of its own.
    CommitmentsConstructed,
    /// The BRNG share sets were usable: directed openings were constructed
    /// for every peer and the participant's own opening was consumed.
    SharesConstructed,
    /// BRNG shares were supplied outside the construction step and ignored.
    SharesIgnored,
    /// A peer's directed opening verified and was buffered.
    OpeningsAdded,
    /// A peer's directed opening was malformed, failed verification, was a
    /// duplicate, or arrived after reconstruction. State is unchanged.
    OpeningsIgnored,
    /// The threshold was reached and the batch of random (or zero) secrets
    /// has been reconstructed as verifiable shares at this participant's
    /// index.
    RngsReconstructed(VerifiableShares),
}

/// The batch of shares a participant must send to one specific peer: the
/// participant's contribution to that peer's reconstruction.
///
/// The shares are secret until delivered, so the batch scrubs itself when
/// dropped; the addressee index is public routing data.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, ZeroizeOnDrop)]
pub struct DirectedOpening {
    #[zeroize(skip)]
    to: Scalar,
    shares: VerifiableShares,
}

impl DirectedOpening {
    /// Index of the peer this opening is addressed to.
    pub fn to(&self) -> Scalar {
        self.to
    }

    /// The shares to deliver, one per batch element. Empty when the
    /// participant's own BRNG shares were unusable.
    pub fn shares(&self) -> &[VerifiableShare] {
        &self.shares
    }
}

/// Per-participant state machine of the random number generation protocol.
///
/// A participant is created from the participant's BRNG output batch and
/// immediately transitions out of its initial state; see
/// [`RngParticipant::new`]. From then on it is driven purely by
/// [`transition_open`](RngParticipant::transition_open) as the transport
/// delivers peers' directed openings, and reports every step through an
/// [`RngEvent`].
///
/// The machine is synchronous and single-owner: no locks, no background
/// work. Run one instance per protocol invocation; independent instances
/// may run on independent threads.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RngParticipant {
    /// This participant's own index.
    index: Scalar,
    /// The indices of all participants, our own included.
    indices: Vec<Scalar>,
    /// Number of secrets generated by one protocol invocation.
    batch_size: u32,
    /// Reconstruction threshold `k`: the minimum number of distinct valid
    /// openings needed to reconstruct each secret.
    threshold: u32,
    /// The opening sub-protocol. Its phase also encodes this machine's
    /// logical state: waiting for openings, or done.
    opener: Opener,
}

impl RngParticipant {
    /// Create the state machine from this participant's BRNG output batch
    /// and immediately transition it.
    ///
    /// `sets_of_shares` holds `batch_size` rows of `k` verifiable sub-shares
    /// (`k - 1` when `is_zero`), all at this participant's own index, and
    /// `sets_of_commitments` the matching commitment rows. An empty (or
    /// wrong-batch-size) `sets_of_shares` is a legitimate runtime condition,
    /// e.g. the participant's BRNG shares were dropped in transit; the
    /// machine then processes the commitments only and relies entirely on
    /// peer openings. A malformed commitment batch, by contrast, is a
    /// configuration error and panics.
    ///
    /// Returns the transition event, the machine, the directed openings for
    /// the transport to deliver (ours already consumed), and the commitments
    /// to the `batch_size` final secrets. With `threshold == 1` the event is
    /// already [`RngEvent::RngsReconstructed`] carrying the share batch.
    ///
    /// # Panics
    /// On malformed input that indicates an integration bug: wrong
    /// commitment batch size or row lengths, a usable share set with a
    /// wrong-length row, `batch_size` or `threshold` of zero, `is_zero` with
    /// `threshold < 2`, or an index set that is not a duplicate-free list of
    /// non-zero scalars containing `own_index`.
    #[instrument(skip_all)]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        own_index: Scalar,
        indices: Vec<Scalar>,
        batch_size: u32,
        threshold: u32,
        h: CurvePoint,
        sets_of_shares: Vec<VerifiableShares>,
        sets_of_commitments: Vec<Vec<Commitment>>,
        is_zero: bool,
    ) -> (RngEvent, RngParticipant, Vec<DirectedOpening>, Vec<Commitment>) {
        assert!(batch_size >= 1, "batch size must be at least 1");
        assert!(threshold >= 1, "threshold must be at least 1");
        if is_zero {
            assert!(
                threshold >= 2,
                "zero generation requires a threshold of at least 2"
            );
        }
        assert!(
            indices.iter().all(|index| !bool::from(index.is_zero())),
            "participant indices must be non-zero"
        );
        for (position, index) in indices.iter().enumerate() {
            assert!(
                !indices[..position].contains(index),
                "participant indices must be distinct"
            );
        }
        let own_position = indices
            .iter()
            .position(|index| *index == own_index)
            .expect("own index must be one of the participant indices");

        // The BRNG batch holds k sub-sharings per element for RNG and k - 1
        // for RZG, where the missing degree-0 term forces the secret to zero.
        let row_len = (if is_zero { threshold - 1 } else { threshold }) as usize;
        let b = batch_size as usize;

        assert_eq!(sets_of_commitments.len(), b, "invalid sets of commitments");
        for row in &sets_of_commitments {
            assert_eq!(row.len(), row_len, "invalid sets of commitments");
            for commitment in row {
                assert_eq!(
                    commitment.len(),
                    threshold as usize,
                    "invalid sets of commitments"
                );
            }
        }

        // Share sets of the wrong batch size are treated as absent; rows of
        // the wrong length inside a usable set are fatal.
        let ignore_shares = sets_of_shares.len() != sets_of_commitments.len();
        if !ignore_shares {
            for row in &sets_of_shares {
                assert_eq!(row.len(), row_len, "invalid set of shares");
            }
        }

        // Commitments to the final secrets, and the locally evaluated
        // commitments that drive the opener's verification.
        let mut output_commitments = Vec::with_capacity(b);
        let mut opener_commitments = Vec::with_capacity(b);
        for row in &sets_of_commitments {
            let mut output = Commitment::with_capacity(threshold as usize);
            if is_zero {
                output.append(CurvePoint::IDENTITY);
            }
            for commitment in row {
                output.append(commitment.coefficients()[0]);
            }

            let mut local = compute::share_commitment(&own_index, row);
            if is_zero {
                local.scale(&own_index);
            }
            output_commitments.push(output);
            opener_commitments.push(local);
        }

        let directed_openings: Vec<DirectedOpening> = indices
            .iter()
            .map(|to| {
                let shares = if ignore_shares {
                    Vec::new()
                } else {
                    sets_of_shares
                        .iter()
                        .map(|row| {
                            let mut share = compute::share_of_share(to, row);
                            if is_zero {
                                share.scale(to);
                            }
                            share
                        })
                        .collect()
                };
                DirectedOpening { to: *to, shares }
            })
            .collect();

        let opener = Opener::new(opener_commitments, indices.clone(), h);
        let mut participant = Self {
            index: own_index,
            indices,
            batch_size,
            threshold,
            opener,
        };

        if ignore_shares {
            info!("BRNG share sets were unusable; constructed commitments only");
            return (
                RngEvent::CommitmentsConstructed,
                participant,
                directed_openings,
                output_commitments,
            );
        }

        // Our own directed opening never touches the transport; consume it
        // right away.
        let own_batch = directed_openings[own_position].shares.clone();
        let event = participant.opener.handle_share_batch(&own_batch);
        match event {
            // Only possible with a threshold of one.
            OpenEvent::Done {
                secrets,
                decommitments,
            } => {
                let shares = participant.wrap_reconstructed(secrets, decommitments);
                (
                    RngEvent::RngsReconstructed(shares),
                    participant,
                    directed_openings,
                    output_commitments,
                )
            }
            _ => (
                RngEvent::SharesConstructed,
                participant,
                directed_openings,
                output_commitments,
            ),
        }
    }

    /// Handle one peer's directed opening.
    ///
    /// `openings` must hold one share per batch element, all at the sending
    /// peer's index. The k-th distinct valid opening (counting our own)
    /// completes the protocol and returns
    /// [`RngEvent::RngsReconstructed`] with the `batch_size` reconstructed
    /// shares at our own index; until then valid openings return
    /// [`RngEvent::OpeningsAdded`] and everything else
    /// [`RngEvent::OpeningsIgnored`].
    #[instrument(skip_all)]
    pub fn transition_open(&mut self, openings: &[VerifiableShare]) -> RngEvent {
        match self.opener.handle_share_batch(openings) {
            OpenEvent::Done {
                secrets,
                decommitments,
            } => {
                info!("Reconstructed the batch of random number shares");
                RngEvent::RngsReconstructed(self.wrap_reconstructed(secrets, decommitments))
            }
            OpenEvent::SharesAdded => RngEvent::OpeningsAdded,
            OpenEvent::Ignored => RngEvent::OpeningsIgnored,
        }
    }

    /// Handle a BRNG output batch outside the construction step.
    ///
    /// Construction is the only moment this machine accepts BRNG shares, so
    /// this always returns [`RngEvent::SharesIgnored`] and leaves state
    /// untouched. It exists so late or repeated BRNG deliveries surface as
    /// an explicit event rather than an error.
    pub fn transition_shares(
        &mut self,
        _sets_of_shares: &[VerifiableShares],
        _sets_of_commitments: &[Vec<Commitment>],
        _is_zero: bool,
    ) -> RngEvent {
        error!("Ignoring BRNG shares supplied after construction");
        RngEvent::SharesIgnored
    }

    /// Number of participants in the protocol.
    pub fn n(&self) -> usize {
        self.indices.len()
    }

    /// Number of random numbers generated by one protocol invocation.
    pub fn batch_size(&self) -> u32 {
        self.batch_size
    }

    /// The reconstruction threshold `k`.
    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// This participant's own index.
    pub fn index(&self) -> Scalar {
        self.index
    }

    /// The indices of all participants.
    pub fn indices(&self) -> &[Scalar] {
        &self.indices
    }

    /// Whether the machine has reconstructed its share batch.
    pub fn is_done(&self) -> bool {
        self.opener.is_done()
    }

    /// Attach our own index to the reconstructed secrets and decommitments.
    fn wrap_reconstructed(
        &self,
        secrets: Vec<Scalar>,
        decommitments: Vec<Scalar>,
    ) -> VerifiableShares {
        secrets
            .into_iter()
            .zip(decommitments)
            .map(|(secret, decommitment)| VerifiableShare::new(self.index, secret, decommitment))
            .collect()
    }
}

impl Persist for RngParticipant {
    fn size_hint(&self) -> usize {
        SCALAR_LENGTH
            + LENGTH_BYTES
            + self.indices.len() * SCALAR_LENGTH
            + LENGTH_BYTES
            + LENGTH_BYTES
            + self.opener.size_hint()
    }

    fn persist(&self, out: &mut BuildBytes) -> Result<()> {
        put_scalar(out, &self.index, "participant index")?;
        out.put_u32(self.indices.len() as u32, "participant indices")?;
        for index in &self.indices {
            put_scalar(out, index, "participant indices")?;
        }
        out.put_u32(self.batch_size, "batch size")?;
        out.put_u32(self.threshold, "threshold")?;
        self.opener.persist(out)
    }

    fn restore(input: &mut ParseBytes<'_>) -> Result<Self> {
        let index = take_scalar(input, "participant index")?;
        let num_indices = input.take_u32("participant indices")?;
        let mut indices = Vec::new();
        for _ in 0..num_indices {
            indices.push(take_scalar(input, "participant indices")?);
        }
        let batch_size = input.take_u32("batch size")?;
        let threshold = input.take_u32("threshold")?;
        let opener = Opener::restore(input)?;
        Ok(Self {
            index,
            indices,
            batch_size,
            threshold,
            opener,
        })
    }
}
