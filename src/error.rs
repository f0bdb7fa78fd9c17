// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error types surfaced at the engine boundary.
//!
//! Only malformed inputs are reported. Clock skew (`now` earlier than a
//! record's creation instant) and a missing viewer identity are recovered
//! inside the engine and never reach callers as errors.

use crate::model::CapsuleId;
use thiserror::Error;

/// Result alias used by the lifecycle service and configuration loading.
pub type EngineResult<T> = Result<T, EngineError>;

/// Result alias used by [`CapsuleStore`](crate::store::CapsuleStore) implementations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors returned by the engine boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Latitude or longitude is not finite or lies outside its physical range.
    #[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    /// Capsule or reply text is empty after trimming.
    #[error("content must not be empty")]
    EmptyContent,

    /// The referenced capsule does not exist.
    #[error("capsule not found: {0}")]
    CapsuleNotFound(CapsuleId),

    /// An [`EngineConfig`](crate::EngineConfig) value violates its invariants.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// A RON configuration document could not be parsed.
    #[cfg(feature = "serde")]
    #[error("failed to parse engine configuration: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// The persistence collaborator failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors reported by the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A reply referenced a capsule the store does not hold.
    #[error("reply references unknown capsule {0}")]
    MissingCapsule(CapsuleId),

    /// Backend-specific failure (I/O, connection, constraint, ...).
    #[error("store backend failure: {0}")]
    Backend(String),
}
