// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Test utility functions: seeded randomness and BRNG-shaped input
//! generators for driving the state machines.

pub(crate) mod testing {
    use crate::{
        curve::CurvePoint,
        rng::compute,
        shamir::{Commitment, VerifiableShare, VerifiableShares},
    };
    use k256::{
        elliptic_curve::{Field, Group},
        Scalar,
    };
    use rand::{
        rngs::{OsRng, StdRng},
        Rng, SeedableRng,
    };

    /// Returns an rng to be used for testing. This will print the rng seed
    /// to stderr so that if a test fails, the failing seed can be recovered
    /// and used for debugging.
    pub(crate) fn init_testing() -> StdRng {
        let mut seeder = OsRng;
        let seed = seeder.gen();
        eprintln!(
            "To re-run test with the same randomness, use init_testing_with_seed() with the following seed:"
        );
        eprintln!("\t{seed:?}");
        StdRng::from_seed(seed)
    }

    /// A seeded version of [`init_testing`]. Use this to reproduce a run
    /// that failed with a specific RNG seed.
    ///
    /// **Additionally, turns on logging by default.** Avoid calling as part
    /// of a normal unit test execution; several tests purposely feed the
    /// machines bad input, and the resulting error events are confusing
    /// next to passing test output.
    #[allow(unused)]
    pub(crate) fn init_testing_with_seed(seed: [u8; 32]) -> StdRng {
        use tracing_subscriber::{
            filter::Targets, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
        };

        let logging_level = EnvFilter::from_default_env()
            .max_level_hint()
            .unwrap()
            .into_level()
            .unwrap();

        // Only capture logging events from this crate.
        let targets = Targets::new().with_target("mpc_rng", logging_level);
        let stdout_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_filter(targets);

        // It's okay if this fails. It just means logging has already been
        // set up for this thread.
        let _ = tracing_subscriber::registry().with(stdout_layer).try_init();

        StdRng::from_seed(seed)
    }

    pub(crate) fn random_scalar(rng: &mut StdRng) -> Scalar {
        Scalar::random(rng)
    }

    pub(crate) fn random_point(rng: &mut StdRng) -> CurvePoint {
        CurvePoint(k256::ProjectivePoint::random(rng))
    }

    /// Sample `n` distinct non-zero participant indices.
    pub(crate) fn random_indices(n: usize, rng: &mut StdRng) -> Vec<Scalar> {
        let mut indices: Vec<Scalar> = Vec::with_capacity(n);
        while indices.len() < n {
            let candidate = Scalar::random(&mut *rng);
            if bool::from(candidate.is_zero()) || indices.contains(&candidate) {
                continue;
            }
            indices.push(candidate);
        }
        indices
    }

    /// Sample a random degree-`k - 1` value polynomial, a matching masking
    /// polynomial and the Pedersen commitment to both.
    fn random_polynomial(
        k: usize,
        h: &CurvePoint,
        rng: &mut StdRng,
    ) -> (Vec<Scalar>, Vec<Scalar>, Commitment) {
        let values: Vec<Scalar> = (0..k).map(|_| random_scalar(rng)).collect();
        let masks: Vec<Scalar> = (0..k).map(|_| random_scalar(rng)).collect();
        let commitment = Commitment::from_points(
            values
                .iter()
                .zip(&masks)
                .map(|(value, mask)| {
                    CurvePoint::GENERATOR.multiply_by_scalar(value) + h.multiply_by_scalar(mask)
                })
                .collect(),
        );
        (values, masks, commitment)
    }

    fn eval_polynomial(coefficients: &[Scalar], x: &Scalar) -> Scalar {
        let mut sum = Scalar::ZERO;
        for coefficient in coefficients.iter().rev() {
            sum = sum * x + coefficient;
        }
        sum
    }

    fn polynomial_share(values: &[Scalar], masks: &[Scalar], index: &Scalar) -> VerifiableShare {
        VerifiableShare::new(
            *index,
            eval_polynomial(values, index),
            eval_polynomial(masks, index),
        )
    }

    /// Sample one threshold-`k` Pedersen sharing, evaluated at every index.
    pub(crate) fn random_sharing(
        indices: &[Scalar],
        k: usize,
        h: &CurvePoint,
        rng: &mut StdRng,
    ) -> (VerifiableShares, Commitment) {
        let (values, masks, commitment) = random_polynomial(k, h, rng);
        let shares = indices
            .iter()
            .map(|index| polynomial_share(&values, &masks, index))
            .collect();
        (shares, commitment)
    }

    /// One player's BRNG output: `b` rows of `c` threshold-`k` sub-shares
    /// at `index`, with the matching commitment rows.
    pub(crate) fn brng_output_batch(
        index: &Scalar,
        b: usize,
        c: usize,
        k: usize,
        h: &CurvePoint,
        rng: &mut StdRng,
    ) -> (Vec<VerifiableShares>, Vec<Vec<Commitment>>) {
        let mut sets_of_shares = Vec::with_capacity(b);
        let mut sets_of_commitments = Vec::with_capacity(b);
        for _ in 0..b {
            let mut share_row = Vec::with_capacity(c);
            let mut commitment_row = Vec::with_capacity(c);
            for _ in 0..c {
                let (values, masks, commitment) = random_polynomial(k, h, rng);
                share_row.push(polynomial_share(&values, &masks, index));
                commitment_row.push(commitment);
            }
            sets_of_shares.push(share_row);
            sets_of_commitments.push(commitment_row);
        }
        (sets_of_shares, sets_of_commitments)
    }

    /// A full BRNG output for the whole network: every player's share rows
    /// over the same `b * c` sub-sharings, plus the common commitment rows.
    pub(crate) fn network_shares_batch(
        indices: &[Scalar],
        b: usize,
        c: usize,
        k: usize,
        h: &CurvePoint,
        rng: &mut StdRng,
    ) -> (Vec<Vec<VerifiableShares>>, Vec<Vec<Commitment>>) {
        let mut sets_by_player = vec![vec![VerifiableShares::new(); b]; indices.len()];
        let mut sets_of_commitments = Vec::with_capacity(b);
        for element in 0..b {
            let mut commitment_row = Vec::with_capacity(c);
            for _ in 0..c {
                let (values, masks, commitment) = random_polynomial(k, h, rng);
                commitment_row.push(commitment);
                for (position, player) in indices.iter().enumerate() {
                    sets_by_player[position][element].push(polynomial_share(
                        &values,
                        &masks,
                        player,
                    ));
                }
            }
            sets_of_commitments.push(commitment_row);
        }
        (sets_by_player, sets_of_commitments)
    }

    /// Generate a full BRNG output and derive, for every player, the
    /// directed opening that player would send to `to_index`. Returns
    /// `to_index`'s own share rows, the common commitment rows, and the
    /// openings keyed by sending player.
    pub(crate) fn rng_shares_batch(
        indices: &[Scalar],
        to_index: &Scalar,
        b: usize,
        k: usize,
        h: &CurvePoint,
        is_zero: bool,
        rng: &mut StdRng,
    ) -> (
        Vec<VerifiableShares>,
        Vec<Vec<Commitment>>,
        Vec<(Scalar, VerifiableShares)>,
    ) {
        let c = if is_zero { k - 1 } else { k };
        let (sets_by_player, sets_of_commitments) =
            network_shares_batch(indices, b, c, k, h, rng);

        let openings_by_player = indices
            .iter()
            .zip(&sets_by_player)
            .map(|(player, rows)| {
                let batch = rows
                    .iter()
                    .map(|row| {
                        let mut share = compute::share_of_share(to_index, row);
                        if is_zero {
                            share.scale(to_index);
                        }
                        share
                    })
                    .collect();
                (*player, batch)
            })
            .collect();

        let own_position = indices
            .iter()
            .position(|index| index == to_index)
            .expect("to_index must be a participant index");
        (
            sets_by_player[own_position].clone(),
            sets_of_commitments,
            openings_by_player,
        )
    }
}
