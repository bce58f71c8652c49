//! Media matching.
//!
//! Picks the media a plot lands on. A canonical name (for example `Letter`)
//! wins outright when the device offers it. Otherwise every media is tested
//! against the target page, straight and turned a quarter, and the one whose
//! usable area is closest to the target area is kept.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::model::{MediaCandidate, PageSize};

/// Default tolerance for size comparisons.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// How a media was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchKind {
    /// A canonical name was present in the media list
    CanonicalName,
    /// Closest area among the media that can hold the target
    Closest,
}

/// Result of matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaSelection {
    pub media_name: String,
    /// The target only fits with the media turned 90°.
    pub rotation_applied: bool,
    /// Absolute area difference between usable media and target.
    pub offset: f64,
    pub kind: MatchKind,
}

impl MediaSelection {
    /// Selection of a canonical media by name, no geometry involved.
    pub fn canonical(name: impl Into<String>) -> Self {
        Self {
            media_name: name.into(),
            rotation_applied: false,
            offset: 0.0,
            kind: MatchKind::CanonicalName,
        }
    }
}

/// Finds the media best suited to a target page.
#[derive(Debug, Clone)]
pub struct MediaMatcher {
    canonical_names: Vec<String>,
    tolerance: f64,
}

impl Default for MediaMatcher {
    fn default() -> Self {
        Self {
            canonical_names: Vec::new(),
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl MediaMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a name that is selected directly whenever the device lists it.
    /// Names are tried in the order they were added.
    pub fn with_canonical_name(mut self, name: impl Into<String>) -> Self {
        self.canonical_names.push(name.into());
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance.abs();
        self
    }

    pub fn canonical_names(&self) -> &[String] {
        &self.canonical_names
    }

    /// Matches `target` against `candidates`.
    ///
    /// Returns `None` when no media can hold the target in either orientation.
    pub fn match_media(
        &self,
        candidates: &[MediaCandidate],
        target: PageSize,
        match_printable_area: bool,
    ) -> Option<MediaSelection> {
        for name in &self.canonical_names {
            if candidates.iter().any(|c| &c.name == name) {
                info!(media = %name, "selected canonical media");
                return Some(MediaSelection::canonical(name.clone()));
            }
        }

        let selection = self.closest(candidates, target, match_printable_area);
        match &selection {
            Some(s) => info!(
                media = %s.media_name,
                offset = s.offset,
                rotated = s.rotation_applied,
                "selected closest media"
            ),
            None => warn!(%target, "no media can hold the target page"),
        }
        selection
    }

    /// Area-difference search, without the canonical name shortcut.
    pub fn closest(
        &self,
        candidates: &[MediaCandidate],
        target: PageSize,
        match_printable_area: bool,
    ) -> Option<MediaSelection> {
        let mut best: Option<MediaSelection> = None;

        for candidate in candidates {
            let usable = candidate.usable_size(match_printable_area);

            let fits_straight = self.holds(usable, target);
            let fits_turned = self.holds(usable, target.swapped());
            if !fits_straight && !fits_turned {
                debug!(media = %candidate.name, %usable, "media too small, skipped");
                continue;
            }

            let mut offset = (usable.area() - target.area()).abs();
            if offset <= self.tolerance {
                offset = 0.0;
            }

            // On equal offsets a straight fit replaces a turned one.
            let better = best.as_ref().is_none_or(|b| {
                offset < b.offset || (offset == b.offset && b.rotation_applied && fits_straight)
            });
            if better {
                best = Some(MediaSelection {
                    media_name: candidate.name.clone(),
                    rotation_applied: !fits_straight,
                    offset,
                    kind: MatchKind::Closest,
                });
                if offset == 0.0 && fits_straight {
                    break;
                }
            }
        }

        best
    }

    fn holds(&self, usable: PageSize, target: PageSize) -> bool {
        usable.width + self.tolerance >= target.width
            && usable.height + self.tolerance >= target.height
    }
}
