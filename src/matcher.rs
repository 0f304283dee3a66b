//! History matching
//!
//! Decides whether, and at which history index, a limit order at a target
//! price would have filled.
//!
//! Both modes start from the same closest-value scan over the whole history.
//! Buy mode accepts the candidate only inside the deviation band. Sell mode
//! additionally gates on `min_index` (the latest buy fill) and, when the
//! candidate does not qualify, force-closes the position against the sample
//! right after `min_index`, or the last sample. The forced close ignores the
//! deviation band and is reported as [`FillKind::Forced`].
//!
//! The sell scan covers the whole history: if the closest value first
//! occurs before `min_index`, a later qualifying touch is never searched for
//! and the fallback fires instead.

use ordered_float::OrderedFloat;

use crate::FillKind;

/// Result of matching one order against the history
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub price: f64,
    /// First index at which `price` occurs in the history
    pub history_index: usize,
    pub kind: FillKind,
}

/// Sample closest to `target`, with its index.
///
/// Ties keep the first sample in sequence order. `None` only for an empty slice.
pub fn closest_value(samples: &[f64], target: f64) -> Option<(usize, f64)> {
    samples
        .iter()
        .copied()
        .enumerate()
        .min_by_key(|&(_, value)| OrderedFloat((value - target).abs()))
}

/// Order matcher with a symmetric tolerance band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryMatcher {
    deviation: f64,
}

impl HistoryMatcher {
    pub fn new(deviation: f64) -> Self {
        Self { deviation }
    }

    pub fn deviation(&self) -> f64 {
        self.deviation
    }

    /// Whether `price` lies in `[target * (1 - dev), target * (1 + dev)]`
    pub fn within_band(&self, price: f64, target: f64) -> bool {
        target * (1.0 - self.deviation) <= price && price <= target * (1.0 + self.deviation)
    }

    /// Match a buy order: the closest sample, if it lies inside the band
    pub fn match_buy(&self, history: &[f64], target: f64) -> Option<Match> {
        let (index, price) = closest_value(history, target)?;
        if !self.within_band(price, target) {
            return None;
        }
        Some(Match {
            price,
            history_index: index,
            kind: FillKind::Limit,
        })
    }

    /// Match a sell order that may not fill before `min_index`.
    ///
    /// Returns `None` only for an empty history; every other outcome is a
    /// fill, genuine or forced.
    pub fn match_sell(&self, history: &[f64], target: f64, min_index: usize) -> Option<Match> {
        let (index, price) = closest_value(history, target)?;

        let qualifies = price == target
            || (self.within_band(price, target) && !history[index..].contains(&target));
        if index >= min_index && qualifies {
            return Some(Match {
                price,
                history_index: index,
                kind: FillKind::Limit,
            });
        }

        let forced = history
            .get(min_index + 1)
            .or_else(|| history.last())
            .copied()?;
        let history_index = history
            .iter()
            .position(|&sample| sample == forced)
            .unwrap_or(history.len() - 1);

        tracing::debug!(
            target,
            closest = price,
            closest_index = index,
            min_index,
            forced,
            "Sell target not reached, closing against history tail"
        );

        Some(Match {
            price: forced,
            history_index,
            kind: FillKind::Forced,
        })
    }
}
