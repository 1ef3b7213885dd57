//! Empirical correction hooks
//!
//! Both hooks were tuned on one bench rig and have no derivation. They are
//! kept as separate, named steps so each can be enabled or dropped on its
//! own without touching the core estimate.

use serde::Deserialize;

use crate::power::PowerEstimate;

/// Post-processing of the estimated power factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PowerFactorCorrection {
    /// Leave the estimate untouched
    #[default]
    None,
    /// Threshold nudges keyed on current band and real power
    CurrentBandNudge,
}

impl PowerFactorCorrection {
    pub fn apply(&self, estimate: PowerEstimate) -> PowerEstimate {
        match self {
            Self::None => estimate,
            Self::CurrentBandNudge => PowerEstimate {
                power_factor: current_band_nudge(&estimate),
                ..estimate
            },
        }
    }
}

/// Bench-rig power factor nudge
///
/// With both RMS values non-zero and at least 300 W real power: +0.122 for
/// 3.4 A <= irms <= 4.66 A, otherwise -0.03 for irms <= 4.69 A. The result
/// is clamped back into [0, 1].
pub fn current_band_nudge(estimate: &PowerEstimate) -> f64 {
    let mut pf = estimate.power_factor;
    if estimate.irms != 0.0 && estimate.vrms != 0.0 {
        if (3.4..=4.66).contains(&estimate.irms) && estimate.real_power >= 300.0 {
            pf += 0.122;
        } else if estimate.irms <= 4.69 && estimate.real_power >= 300.0 {
            pf -= 0.03;
        }
    }
    pf.clamp(0.0, 1.0)
}

/// Display-side correction of the rendered figures
///
/// Produces the values shown on the text display. The estimate handed to
/// the hook is not modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ReadingCorrection {
    /// Show the estimate as is
    #[default]
    None,
    /// Subtract fixed offsets per motor speed band
    SpeedBandOffsets,
}

impl ReadingCorrection {
    pub fn apply(&self, estimate: &PowerEstimate) -> PowerEstimate {
        match self {
            Self::None => *estimate,
            Self::SpeedBandOffsets => speed_band_offsets(estimate),
        }
    }
}

/// Bench-rig display offsets
///
/// Current is first reduced by 2.86 A. Above 1.8 A (fast band) real and
/// apparent power lose 610 W and 840 VA; at or below 1.77 A (slow band)
/// they lose 70 W and 224 VA. Between the bands they are left alone. The
/// current is then shifted by +1.1 A when the corrected real power is at
/// least 330 W and by -1.11 A otherwise. Every figure is floored at zero.
pub fn speed_band_offsets(estimate: &PowerEstimate) -> PowerEstimate {
    let mut irms = (estimate.irms - 2.86).max(0.0);
    let mut real_power = estimate.real_power;
    let mut apparent_power = estimate.apparent_power;

    if irms >= 1.8 {
        real_power = (real_power - 610.0).max(0.0);
        apparent_power = (apparent_power - 840.0).max(0.0);
    } else if irms <= 1.77 {
        real_power = (real_power - 70.0).max(0.0);
        apparent_power = (apparent_power - 224.0).max(0.0);
    }

    if real_power >= 330.0 {
        irms += 1.1;
    } else {
        irms = (irms - 1.11).max(0.0);
    }

    PowerEstimate {
        irms,
        real_power,
        apparent_power,
        ..*estimate
    }
}
