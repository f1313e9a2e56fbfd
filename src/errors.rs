// Copyright (c) 2022-2023 Bolt Labs Holdings, Inc
//
// This source code is licensed under both the MIT license found in the
// LICENSE-MIT file in the root directory of this source tree and the Apache
// License, Version 2.0 found in the LICENSE-APACHE file in the root directory
// of this source tree.

//! A list of error types which are produced during an execution of the
//! protocol.

use thiserror::Error;

/// The default Result type used in this crate.
pub type Result<T> = std::result::Result<T, InternalError>;

/// Represents an error in the internal operation of the crate.
///
/// Note that precondition violations on the state machines (malformed BRNG
/// batches, bad participant index sets) are integration bugs in the calling
/// application and abort the process with a panic rather than appearing here;
/// see [`RngParticipant::new`](crate::rng::RngParticipant::new).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum InternalError {
    #[error("Calling application made a mistake: {0}")]
    CallingApplicationMistake(#[from] CallerError),
    #[error("Internal invariant failed")]
    InternalInvariantFailed,
}

/// Errors that can be caused by a mistake made by the calling application.
///
/// Codec variants carry a short label naming the field that was in progress
/// when the byte budget ran out, so the caller can tell which part of a
/// persisted blob was malformed.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum CallerError {
    /// The calling application passed invalid input to a function.
    #[error("Invalid input")]
    BadInput,
    /// The byte budget was exceeded while serializing the named field.
    #[error("Ran out of byte budget while serializing {0}")]
    SerializationFailed(&'static str),
    /// The input buffer ran out while deserializing the named field.
    #[error("Ran out of bytes while deserializing {0}")]
    DeserializationFailed(&'static str),
}
