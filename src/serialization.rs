// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! Budget-checked binary persistence for protocol state.
//!
//! The format is big-endian with no padding. Scalars are 32-byte canonical
//! field encodings, points are 33-byte compressed SEC1 encodings, and
//! collection lengths are `u32` prefixes. Writers refuse to exceed their
//! byte budget and readers refuse to read past the end of their input; both
//! failures name the field that was in progress.

use crate::{
    curve::{point_from_bytes, scalar_from_bytes, CurvePoint, POINT_LENGTH, SCALAR_LENGTH},
    errors::{CallerError, InternalError, Result},
};
use k256::Scalar;
use tracing::error;

/// Number of bytes in a length prefix.
pub(crate) const LENGTH_BYTES: usize = 4;

/// Helper type for parsing a persisted byte blob into fields.
#[derive(Debug)]
pub struct ParseBytes<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ParseBytes<'a> {
    /// Wrap bytes for parsing.
    pub fn new(bytes: &'a [u8]) -> ParseBytes<'a> {
        ParseBytes { bytes, offset: 0 }
    }

    /// Take the next `n` bytes from the input.
    pub fn take_bytes(&mut self, n: usize, field: &'static str) -> Result<&'a [u8]> {
        let slice = self
            .bytes
            .get(self.offset..self.offset + n)
            .ok_or(CallerError::DeserializationFailed(field))?;
        self.offset += n;
        Ok(slice)
    }

    /// Parse the next 4 bytes as a big-endian `u32`.
    pub fn take_u32(&mut self, field: &'static str) -> Result<u32> {
        let len_slice = self.take_bytes(LENGTH_BYTES, field)?;
        let len_bytes: [u8; LENGTH_BYTES] = len_slice.try_into().map_err(|_| {
            error!("Failed to convert byte slice of checked length (this should never happen)");
            InternalError::InternalInvariantFailed
        })?;
        Ok(u32::from_be_bytes(len_bytes))
    }

    /// Number of bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }
}

/// Helper type for building a persisted byte blob under a byte budget.
#[derive(Debug)]
pub struct BuildBytes {
    bytes: Vec<u8>,
    budget: usize,
}

impl BuildBytes {
    /// Start a blob that may grow to at most `budget` bytes.
    pub fn with_budget(budget: usize) -> BuildBytes {
        BuildBytes {
            bytes: Vec::with_capacity(budget),
            budget,
        }
    }

    /// Append raw bytes, refusing to exceed the budget.
    pub fn put_bytes(&mut self, bytes: &[u8], field: &'static str) -> Result<()> {
        if self.bytes.len() + bytes.len() > self.budget {
            return Err(CallerError::SerializationFailed(field).into());
        }
        self.bytes.extend_from_slice(bytes);
        Ok(())
    }

    /// Append a big-endian `u32`.
    pub fn put_u32(&mut self, value: u32, field: &'static str) -> Result<()> {
        self.put_bytes(&value.to_be_bytes(), field)
    }

    /// Finish the blob.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Binary persistence of protocol state.
///
/// Implementors define a deterministic field layout; `size_hint` is exact
/// for that layout, and a round trip through `persist`/`restore` yields a
/// structurally equal value.
pub trait Persist: Sized {
    /// Exact number of bytes `persist` will write.
    fn size_hint(&self) -> usize;

    /// Write `self` to `out`.
    fn persist(&self, out: &mut BuildBytes) -> Result<()>;

    /// Read a value back from `input`.
    fn restore(input: &mut ParseBytes<'_>) -> Result<Self>;

    /// Persist `self` to a fresh byte vector sized by [`Persist::size_hint`].
    fn persist_to_vec(&self) -> Result<Vec<u8>> {
        let mut out = BuildBytes::with_budget(self.size_hint());
        self.persist(&mut out)?;
        Ok(out.into_bytes())
    }

    /// Restore a value from a byte slice, rejecting trailing bytes.
    fn restore_from_slice(bytes: &[u8]) -> Result<Self> {
        let mut input = ParseBytes::new(bytes);
        let value = Self::restore(&mut input)?;
        if input.remaining() != 0 {
            error!("Trailing bytes after restoring a persisted value");
            Err(CallerError::BadInput)?;
        }
        Ok(value)
    }
}

pub(crate) fn put_scalar(out: &mut BuildBytes, x: &Scalar, field: &'static str) -> Result<()> {
    out.put_bytes(x.to_bytes().as_slice(), field)
}

pub(crate) fn take_scalar(input: &mut ParseBytes<'_>, field: &'static str) -> Result<Scalar> {
    let bytes = input.take_bytes(SCALAR_LENGTH, field)?;
    scalar_from_bytes(bytes).ok_or_else(|| {
        error!("Persisted bytes are not a canonical scalar encoding");
        CallerError::DeserializationFailed(field).into()
    })
}

pub(crate) fn put_point(out: &mut BuildBytes, p: &CurvePoint, field: &'static str) -> Result<()> {
    out.put_bytes(&p.to_bytes(), field)
}

pub(crate) fn take_point(input: &mut ParseBytes<'_>, field: &'static str) -> Result<CurvePoint> {
    let bytes = input.take_bytes(POINT_LENGTH, field)?;
    point_from_bytes(bytes).ok_or_else(|| {
        error!("Persisted bytes are not a valid curve point encoding");
        CallerError::DeserializationFailed(field).into()
    })
}
