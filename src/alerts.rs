use crate::config::AlertThresholds;
use crate::types::{AlertKind, GrowthSet, Indicators};

/// Evaluate the alert rules in their fixed order.
///
/// Growth rules are skipped when the growth value is missing; indicator
/// rules are skipped when the cohort has no data.
pub fn evaluate_alerts(
    indicators: Option<&Indicators>,
    growth: &GrowthSet,
    t: &AlertThresholds,
) -> Vec<AlertKind> {
    let mut alerts = Vec::new();

    if matches!(growth.members_pct, Some(g) if g < t.member_decline_pct) {
        alerts.push(AlertKind::MembershipDecline);
    }
    if matches!(growth.contribution_pct, Some(g) if g < t.contribution_decline_pct) {
        alerts.push(AlertKind::ContributionDecline);
    }
    if let Some(ind) = indicators {
        if ind.youth_renewal_rate < t.min_youth_renewal_pct {
            alerts.push(AlertKind::LowRenewal);
        }
        if ind.inclusion_rate < t.min_inclusion_pct {
            alerts.push(AlertKind::LowInclusion);
        }
    }

    alerts
}
