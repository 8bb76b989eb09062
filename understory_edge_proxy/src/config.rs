// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Engine configuration.

use crate::error::ProxyError;
use crate::types::AnchorMode;

/// Parameters controlling detection, placement, filtering, and marker styling.
///
/// The defaults match a typical diagram viewer: markers slide toward the middle of the
/// viewport, are sized to 8% of the smaller view dimension and never enlarged, and are
/// hidden when they would cover a visible node.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProxyConfig {
    /// Where markers are anchored relative to their crossing.
    pub anchor_mode: AnchorMode,
    /// Fraction of `min(view width, view height)` the larger marker dimension takes.
    pub size_fraction: f64,
    /// Size markers by the diagram zoom instead of `size_fraction`.
    pub use_zoom_size: bool,
    /// Never scale markers above the represented node's own size.
    pub cap_scale_to_one: bool,
    /// Tolerance, in content units, when matching roots against a boundary's extent.
    pub grace_offset: f64,
    /// Parameter step used to decide which side of a crossing is inside the viewport.
    pub direction_step: f64,
    /// Opacity applied to every marker.
    pub opacity: f64,
    /// Drop markers that would overlap a visible node.
    pub filter_overlapping: bool,
    /// Let pointer events pass through markers.
    pub click_through: bool,
    /// Inflation, in view pixels, applied to markers for hit queries.
    pub hit_tolerance: f64,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            anchor_mode: AnchorMode::TowardsMiddle,
            size_fraction: 0.08,
            use_zoom_size: false,
            cap_scale_to_one: true,
            grace_offset: 1.0,
            direction_step: 0.03,
            opacity: 1.0,
            filter_overlapping: true,
            click_through: false,
            hit_tolerance: 0.0,
        }
    }
}

impl ProxyConfig {
    /// Check every numeric field, returning the first violation.
    pub fn validate(&self) -> Result<(), ProxyError> {
        if !(self.size_fraction > 0.0 && self.size_fraction <= 1.0) {
            return Err(ProxyError::InvalidSizeFraction(self.size_fraction));
        }
        if !(self.grace_offset.is_finite() && self.grace_offset >= 0.0) {
            return Err(ProxyError::InvalidGraceOffset(self.grace_offset));
        }
        if !(self.direction_step > 0.0 && self.direction_step < 0.5) {
            return Err(ProxyError::InvalidDirectionStep(self.direction_step));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ProxyError::InvalidOpacity(self.opacity));
        }
        if !(self.hit_tolerance.is_finite() && self.hit_tolerance >= 0.0) {
            return Err(ProxyError::InvalidHitTolerance(self.hit_tolerance));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ProxyConfig::default();
        assert_eq!(cfg.validate(), Ok(()));
        assert_eq!(cfg.anchor_mode, AnchorMode::TowardsMiddle);
        assert_eq!(cfg.grace_offset, 1.0);
        assert_eq!(cfg.direction_step, 0.03);
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let bad = ProxyConfig {
            size_fraction: 0.0,
            ..Default::default()
        };
        assert_eq!(bad.validate(), Err(ProxyError::InvalidSizeFraction(0.0)));

        let bad = ProxyConfig {
            grace_offset: -1.0,
            ..Default::default()
        };
        assert_eq!(bad.validate(), Err(ProxyError::InvalidGraceOffset(-1.0)));

        let bad = ProxyConfig {
            direction_step: 0.5,
            ..Default::default()
        };
        assert_eq!(bad.validate(), Err(ProxyError::InvalidDirectionStep(0.5)));

        let bad = ProxyConfig {
            opacity: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(ProxyError::InvalidOpacity(_))));

        let bad = ProxyConfig {
            hit_tolerance: f64::INFINITY,
            ..Default::default()
        };
        assert!(matches!(
            bad.validate(),
            Err(ProxyError::InvalidHitTolerance(_))
        ));
    }
}
