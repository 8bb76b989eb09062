// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error and diagnostic types.

/// Errors produced when validating inputs to the proxy engine.
///
/// Construction of a [`Canvas`](crate::Canvas) or validation of a
/// [`ProxyConfig`](crate::ProxyConfig) returns these directly. Inside an update the
/// only non-fatal variant is [`ProxyError::MalformedRoute`], which is recorded as a
/// [`Diagnostic`] instead of being returned.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ProxyError {
    /// Zoom must be finite and strictly positive.
    #[error("zoom must be finite and positive, got {0}")]
    InvalidZoom(f64),
    /// Marker size fraction must lie in `(0, 1]`.
    #[error("marker size fraction must be within (0, 1], got {0}")]
    InvalidSizeFraction(f64),
    /// Grace offset must be finite and non-negative.
    #[error("grace offset must be finite and non-negative, got {0}")]
    InvalidGraceOffset(f64),
    /// Direction step must lie in `(0, 0.5)`.
    #[error("direction step must be within (0, 0.5), got {0}")]
    InvalidDirectionStep(f64),
    /// Opacity must lie in `[0, 1]`.
    #[error("opacity must be within [0, 1], got {0}")]
    InvalidOpacity(f64),
    /// Hit tolerance must be finite and non-negative.
    #[error("hit tolerance must be finite and non-negative, got {0}")]
    InvalidHitTolerance(f64),
    /// An edge route does not consist of whole cubic segments.
    #[error("edge route has {len} points; expected 3n + 1 with n >= 1")]
    MalformedRoute {
        /// Number of points in the offending route.
        len: usize,
    },
}

/// A non-fatal problem found while processing one edge during an update.
#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic<E> {
    /// The edge the problem was found on.
    pub edge: E,
    /// What went wrong.
    pub error: ProxyError,
}
