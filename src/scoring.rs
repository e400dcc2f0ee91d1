use crate::config::ScoringConfig;
use crate::types::Indicators;
use crate::util::round2;

/// Composite institutional score in `[0, 100]`, rounded to two decimals.
///
/// Four capped components: growth (default max 30), youth renewal
/// (max 25), inclusion (max 20) and contribution per member (max 25).
/// A missing growth value scores as 0% growth.
pub fn score(indicators: &Indicators, growth: Option<f64>, w: &ScoringConfig) -> f64 {
    let g = growth.unwrap_or(0.0);
    let growth_part = (g + w.growth_offset).clamp(0.0, w.growth_cap) * w.growth_weight;
    let renewal_part = indicators.youth_renewal_rate.min(w.renewal_cap) * w.renewal_weight;
    let inclusion_part = indicators.inclusion_rate.min(w.inclusion_cap) * w.inclusion_weight;
    let contribution_part = if w.contribution_divisor > 0.0 {
        (indicators.avg_contribution_per_member / w.contribution_divisor).min(w.contribution_cap)
    } else {
        0.0
    };

    let total = growth_part + renewal_part + inclusion_part + contribution_part;
    round2(total.clamp(0.0, 100.0))
}

/// Score of a possibly-empty indicator set.
pub fn score_cohort(
    indicators: Option<&Indicators>,
    growth: Option<f64>,
    w: &ScoringConfig,
) -> Option<f64> {
    indicators.map(|ind| score(ind, growth, w))
}
