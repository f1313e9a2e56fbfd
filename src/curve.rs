//! Secp256k1 group and scalar-field helpers.
//!
//! All protocol arithmetic happens over the secp256k1 scalar field
//! ([`k256::Scalar`]) and group. Scalar and point operations from the `k256`
//! crate are constant-time, which the share and commitment evaluation paths
//! rely on.

use crate::errors::{CallerError, Result};
use generic_array::GenericArray;
use k256::{
    elliptic_curve::{group::GroupEncoding, AffinePoint, PrimeField},
    Scalar,
};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::error;
use zeroize::Zeroize;

/// Number of bytes in the canonical big-endian encoding of a [`Scalar`].
pub const SCALAR_LENGTH: usize = 32;

/// Number of bytes in the compressed SEC1 encoding of a [`CurvePoint`].
pub const POINT_LENGTH: usize = 33;

/// Wrapper around [`k256::ProjectivePoint`] so that we can define our own
/// serialization/deserialization for it.
///
/// Note that this type derives [`Debug`]; if a [`CurvePoint`] is used in a
/// private type, `Debug` should be manually implemented with the field of
/// this type explicitly redacted!
#[derive(Clone, Copy, Debug, Eq, PartialEq, Zeroize)]
pub struct CurvePoint(pub k256::ProjectivePoint);

impl CurvePoint {
    /// The generator `G` of the secp256k1 group.
    pub const GENERATOR: Self = CurvePoint(k256::ProjectivePoint::GENERATOR);

    /// The identity point (the point at infinity).
    pub const IDENTITY: Self = CurvePoint(k256::ProjectivePoint::IDENTITY);

    /// Multiply `self` by a [`Scalar`].
    pub fn multiply_by_scalar(&self, scalar: &Scalar) -> Self {
        Self(self.0 * scalar)
    }

    /// Serialize the point as a compressed SEC1 byte array.
    ///
    /// The identity point encodes to all zeroes, so the degree-0 coefficient
    /// of a zero-sharing commitment round-trips like any other point.
    pub fn to_bytes(self) -> Vec<u8> {
        let mut generic_array = AffinePoint::<k256::Secp256k1>::from(self.0).to_bytes();
        let bytes = generic_array.to_vec();
        generic_array.zeroize();
        bytes
    }

    /// Deserialize a point from a compressed SEC1 byte array.
    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self> {
        point_from_bytes(bytes).ok_or_else(|| {
            error!("Failed to decode bytes as a curve point");
            CallerError::DeserializationFailed("curve point").into()
        })
    }
}

impl std::ops::Add for CurvePoint {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl From<k256::ProjectivePoint> for CurvePoint {
    fn from(p: k256::ProjectivePoint) -> Self {
        Self(p)
    }
}

impl Serialize for CurvePoint {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let afp = AffinePoint::<k256::Secp256k1>::from(self.0);
        afp.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CurvePoint {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let p = AffinePoint::<k256::Secp256k1>::deserialize(deserializer)?;
        Ok(Self(p.into()))
    }
}

/// Decode a point from its compressed SEC1 encoding.
pub(crate) fn point_from_bytes(bytes: &[u8]) -> Option<CurvePoint> {
    let fixed_len_bytes: [u8; POINT_LENGTH] = bytes.try_into().ok()?;
    let point: Option<AffinePoint<k256::Secp256k1>> =
        AffinePoint::<k256::Secp256k1>::from_bytes(&fixed_len_bytes.into()).into();
    point.map(|point| CurvePoint(point.into()))
}

/// Decode a scalar from its canonical big-endian encoding.
pub(crate) fn scalar_from_bytes(bytes: &[u8]) -> Option<Scalar> {
    if bytes.len() != SCALAR_LENGTH {
        return None;
    }
    <Scalar as PrimeField>::from_repr(GenericArray::clone_from_slice(bytes)).into()
}
