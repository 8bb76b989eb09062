// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! [`ProxyGraph`](crate::ProxyGraph) implementations for Understory data structures.

#[cfg(feature = "diagram_adapter")]
mod diagram;
