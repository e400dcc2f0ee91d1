use crate::config::{ClassificationThresholds, ZeroBaseline};
use crate::types::{GrowthClass, GrowthSet, Indicators};

/// Percentage change from `previous` to `current`.
///
/// A zero `previous` has no meaningful ratio; the result then follows the
/// configured baseline policy (`None` or `Some(0.0)`).
pub fn growth(current: f64, previous: f64, baseline: ZeroBaseline) -> Option<f64> {
    if previous == 0.0 {
        return match baseline {
            ZeroBaseline::Null => None,
            ZeroBaseline::Zero => Some(0.0),
        };
    }
    Some((current - previous) / previous * 100.0)
}

/// Member and contribution growth of one scope between two years.
///
/// An empty current set has nothing to compare and yields no growth. An
/// empty or missing previous set is a zero baseline.
pub fn growth_between(
    current: Option<&Indicators>,
    previous: Option<&Indicators>,
    baseline: ZeroBaseline,
) -> GrowthSet {
    let Some(cur) = current else {
        return GrowthSet::default();
    };
    let (prev_members, prev_contribution) = previous
        .map(|p| (p.total_members as f64, p.total_contribution))
        .unwrap_or((0.0, 0.0));
    GrowthSet {
        members_pct: growth(cur.total_members as f64, prev_members, baseline),
        contribution_pct: growth(cur.total_contribution, prev_contribution, baseline),
    }
}

pub fn classify(value: f64, t: &ClassificationThresholds) -> GrowthClass {
    if value > t.strong_above {
        GrowthClass::StrongGrowth
    } else if value > t.moderate_above {
        GrowthClass::ModerateGrowth
    } else if value >= t.stable_from {
        GrowthClass::Stable
    } else {
        GrowthClass::Decline
    }
}
