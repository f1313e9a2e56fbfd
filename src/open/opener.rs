// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

use crate::{
    curve::{CurvePoint, POINT_LENGTH, SCALAR_LENGTH},
    errors::{CallerError, Result},
    serialization::{
        put_point, put_scalar, take_point, take_scalar, BuildBytes, ParseBytes, Persist,
        LENGTH_BYTES,
    },
    shamir::{Commitment, VerifiableShare, VerifiableShares},
};
use k256::Scalar;
use tracing::error;
use zeroize::ZeroizeOnDrop;

/// Outcome of handling one directed opening, returned by
/// [`Opener::handle_share_batch`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum OpenEvent {
    /// The batch was malformed, failed verification, came from an unknown
    /// or already-seen sender, or arrived after reconstruction. Nothing was
    /// buffered.
    Ignored,
    /// The batch verified and was buffered; more senders are needed.
    SharesAdded,
    /// The batch was the final one needed. Every batch element has been
    /// reconstructed by interpolating the buffered shares at zero.
    Done {
        /// The reconstructed secret for each batch element.
        secrets: Vec<Scalar>,
        /// The reconstructed decommitment scalar for each batch element.
        decommitments: Vec<Scalar>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Waiting,
    Done,
}

/// State machine that collects directed openings and reconstructs a batch
/// of secrets once enough distinct senders have contributed.
///
/// The commitment batch, index set and Pedersen parameter are fixed at
/// construction. The reconstruction threshold is the commitment length.
/// Buffering is all-or-nothing per batch: a rejected batch leaves the
/// opener bit-identical to its prior state.
///
/// The buffered shares open other players' secrets once combined, so they
/// are scrubbed when the opener is dropped. Everything else is public
/// protocol data.
#[derive(Clone, Eq, PartialEq, ZeroizeOnDrop)]
pub struct Opener {
    /// One commitment per batch element; incoming shares are verified
    /// against these.
    #[zeroize(skip)]
    commitments: Vec<Commitment>,
    /// Indices of all participants allowed to contribute.
    #[zeroize(skip)]
    indices: Vec<Scalar>,
    /// The Pedersen commitment scheme parameter.
    #[zeroize(skip)]
    h: CurvePoint,
    /// Verified shares per batch element, in sender-acceptance order.
    share_bufs: Vec<VerifiableShares>,
    /// Senders already counted, in acceptance order.
    #[zeroize(skip)]
    seen: Vec<Scalar>,
    #[zeroize(skip)]
    phase: Phase,
}

impl Opener {
    /// Create an opener over one commitment per batch element.
    ///
    /// # Panics
    /// If the commitment batch is empty, the commitments do not all have
    /// the same non-zero length, or `indices` is empty.
    pub fn new(commitments: Vec<Commitment>, indices: Vec<Scalar>, h: CurvePoint) -> Self {
        assert!(
            !commitments.is_empty(),
            "opener requires a non-empty commitment batch"
        );
        let threshold = commitments[0].len();
        assert!(threshold >= 1, "commitments must have at least one point");
        for commitment in &commitments {
            assert_eq!(
                commitment.len(),
                threshold,
                "commitments must all have the same length"
            );
        }
        assert!(!indices.is_empty(), "opener requires participant indices");

        let share_bufs = vec![Vec::with_capacity(threshold); commitments.len()];
        Self {
            commitments,
            indices,
            h,
            share_bufs,
            seen: Vec::with_capacity(threshold),
            phase: Phase::Waiting,
        }
    }

    /// Number of secrets the opener will reconstruct.
    pub fn batch_size(&self) -> usize {
        self.commitments.len()
    }

    /// Number of distinct valid senders needed to reconstruct.
    pub fn threshold(&self) -> usize {
        self.commitments[0].len()
    }

    /// Number of senders whose openings have been accepted so far.
    pub fn num_openings(&self) -> usize {
        self.seen.len()
    }

    /// Whether the opener has reconstructed and stopped accepting input.
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Handle one sender's directed opening.
    ///
    /// The batch must have exactly one share per batch element, all carrying
    /// the sender's index, and every share must open the corresponding
    /// commitment at that index. Anything else returns
    /// [`OpenEvent::Ignored`] without touching state.
    pub fn handle_share_batch(&mut self, batch: &[VerifiableShare]) -> OpenEvent {
        if self.phase == Phase::Done {
            return OpenEvent::Ignored;
        }
        if batch.len() != self.batch_size() {
            error!(
                "Ignoring opening batch of length {} (batch size is {})",
                batch.len(),
                self.batch_size()
            );
            return OpenEvent::Ignored;
        }

        let sender = batch[0].index();
        if batch.iter().any(|share| share.index() != sender) {
            error!("Ignoring opening batch with inconsistent sender indices");
            return OpenEvent::Ignored;
        }
        if !self.indices.contains(&sender) {
            error!("Ignoring opening batch from an unknown sender");
            return OpenEvent::Ignored;
        }
        if self.seen.contains(&sender) {
            error!("Ignoring duplicate opening batch");
            return OpenEvent::Ignored;
        }

        // Verify the whole batch before buffering any of it.
        for (share, commitment) in batch.iter().zip(&self.commitments) {
            if !share.verify(commitment, &self.h) {
                error!("Ignoring opening batch with a share that fails verification");
                return OpenEvent::Ignored;
            }
        }

        for (buf, share) in self.share_bufs.iter_mut().zip(batch) {
            buf.push(share.clone());
        }
        self.seen.push(sender);

        if self.seen.len() < self.threshold() {
            return OpenEvent::SharesAdded;
        }
        self.reconstruct()
    }

    /// Interpolate every buffered batch element at zero. Called exactly once,
    /// when the threshold-th sender is accepted.
    fn reconstruct(&mut self) -> OpenEvent {
        let coefficients: Vec<Scalar> = self
            .seen
            .iter()
            .map(|sender| lagrange_coefficient_at_zero(sender, &self.seen))
            .collect();

        let mut secrets = Vec::with_capacity(self.batch_size());
        let mut decommitments = Vec::with_capacity(self.batch_size());
        for buf in &self.share_bufs {
            let mut secret = Scalar::ZERO;
            let mut decommitment = Scalar::ZERO;
            for (share, coefficient) in buf.iter().zip(&coefficients) {
                secret += share.value() * coefficient;
                decommitment += share.decommit() * coefficient;
            }
            secrets.push(secret);
            decommitments.push(decommitment);
        }

        self.phase = Phase::Done;
        OpenEvent::Done {
            secrets,
            decommitments,
        }
    }
}

/// Compute the Lagrange basis coefficient for `my_point` over `points`,
/// evaluated at zero.
///
/// The coefficients depend only on the sender indices, never on secret
/// material.
fn lagrange_coefficient_at_zero(my_point: &Scalar, points: &[Scalar]) -> Scalar {
    let mut result = Scalar::ONE;
    for point in points {
        if point != my_point {
            let numerator = Scalar::ZERO - point;
            let denominator = my_point - point;
            // Sender indices are distinct, so the difference is non-zero.
            let inverse = Option::<Scalar>::from(denominator.invert()).unwrap();
            result *= numerator * inverse;
        }
    }
    result
}

// Manual Debug: the buffered shares open other players' secrets once
// combined, so they are redacted.
impl std::fmt::Debug for Opener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Opener")
            .field("commitments", &self.commitments)
            .field("indices", &self.indices)
            .field("h", &self.h)
            .field("seen", &self.seen)
            .field("phase", &self.phase)
            .field("share_bufs", &"[redacted]")
            .finish()
    }
}

impl Persist for Opener {
    fn size_hint(&self) -> usize {
        let commitments: usize = self.commitments.iter().map(Persist::size_hint).sum();
        let share_bufs: usize = self
            .share_bufs
            .iter()
            .map(|buf| LENGTH_BYTES + buf.len() * 3 * SCALAR_LENGTH)
            .sum();
        LENGTH_BYTES
            + commitments
            + LENGTH_BYTES
            + self.indices.len() * SCALAR_LENGTH
            + POINT_LENGTH
            + LENGTH_BYTES
            + share_bufs
            + LENGTH_BYTES
            + self.seen.len() * SCALAR_LENGTH
            + 1
    }

    fn persist(&self, out: &mut BuildBytes) -> Result<()> {
        out.put_u32(self.commitments.len() as u32, "commitment batch")?;
        for commitment in &self.commitments {
            commitment.persist(out)?;
        }
        out.put_u32(self.indices.len() as u32, "opener indices")?;
        for index in &self.indices {
            put_scalar(out, index, "opener indices")?;
        }
        put_point(out, &self.h, "pedersen parameter")?;
        out.put_u32(self.share_bufs.len() as u32, "share buffers")?;
        for buf in &self.share_bufs {
            out.put_u32(buf.len() as u32, "share buffer")?;
            for share in buf {
                share.persist(out)?;
            }
        }
        out.put_u32(self.seen.len() as u32, "seen senders")?;
        for sender in &self.seen {
            put_scalar(out, sender, "seen senders")?;
        }
        let phase = match self.phase {
            Phase::Waiting => 0u8,
            Phase::Done => 1u8,
        };
        out.put_bytes(&[phase], "opener phase")
    }

    fn restore(input: &mut ParseBytes<'_>) -> Result<Self> {
        let num_commitments = input.take_u32("commitment batch")?;
        let mut commitments = Vec::new();
        for _ in 0..num_commitments {
            commitments.push(Commitment::restore(input)?);
        }
        let num_indices = input.take_u32("opener indices")?;
        let mut indices = Vec::new();
        for _ in 0..num_indices {
            indices.push(take_scalar(input, "opener indices")?);
        }
        let h = take_point(input, "pedersen parameter")?;
        let num_bufs = input.take_u32("share buffers")?;
        let mut share_bufs = Vec::new();
        for _ in 0..num_bufs {
            let num_shares = input.take_u32("share buffer")?;
            let mut buf = Vec::new();
            for _ in 0..num_shares {
                buf.push(VerifiableShare::restore(input)?);
            }
            share_bufs.push(buf);
        }
        let num_seen = input.take_u32("seen senders")?;
        let mut seen = Vec::new();
        for _ in 0..num_seen {
            seen.push(take_scalar(input, "seen senders")?);
        }
        let phase = match input.take_bytes(1, "opener phase")?[0] {
            0 => Phase::Waiting,
            1 => Phase::Done,
            _ => {
                error!("Persisted opener phase tag is out of range");
                Err(CallerError::DeserializationFailed("opener phase"))?
            }
        };
        Ok(Self {
            commitments,
            indices,
            h,
            share_bufs,
            seen,
            phase,
        })
    }
}
