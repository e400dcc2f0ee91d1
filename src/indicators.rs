use crate::types::{AvailableFields, Indicators, Row};

/// Compute the indicators of one cohort.
///
/// Returns `None` when the cohort has no active members; every consumer
/// treats that as "no data". Optional columns only contribute when the
/// schema carries them, and rows from tables without them add nothing.
pub fn compute_indicators(
    cohort: &[&Row],
    fields: &AvailableFields,
    maturity_index: bool,
) -> Option<Indicators> {
    let mut total_members: u128 = 0;
    let mut youth: u128 = 0;
    let mut disabled: u128 = 0;
    let mut units: u128 = 0;
    let mut total_contribution = 0.0;

    for r in cohort {
        total_members += u128::from(r.active_members);
        youth += u128::from(r.under19) + u128::from(r.age19to23);
        disabled += r.disabilities.total();
        if fields.organized_units {
            units += u128::from(r.organized_units.unwrap_or(0));
        }
        if fields.unorganized_units {
            units += u128::from(r.unorganized_units.unwrap_or(0));
        }
        if fields.contribution {
            total_contribution += r.contributed_value.unwrap_or(0.0);
        }
    }

    if total_members == 0 {
        return None;
    }
    let members = total_members as f64;
    let structural_maturity_index = maturity_index.then(|| {
        if units > 0 {
            members / units as f64
        } else {
            0.0
        }
    });

    Some(Indicators {
        total_members,
        total_contribution,
        avg_contribution_per_member: total_contribution / members,
        youth_renewal_rate: youth as f64 / members * 100.0,
        inclusion_rate: disabled as f64 / members * 100.0,
        total_structural_units: units,
        structural_maturity_index,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DisabilityCounts;

    fn all_fields() -> AvailableFields {
        AvailableFields {
            contribution: true,
            organized_units: true,
            unorganized_units: true,
        }
    }

    fn row(members: u64, contribution: f64) -> Row {
        Row {
            year: 2023,
            region: "North".to_string(),
            name: "Unit".to_string(),
            active_members: members,
            under19: 0,
            age19to23: 0,
            disabilities: DisabilityCounts::default(),
            organized_units: None,
            unorganized_units: None,
            contributed_value: Some(contribution),
        }
    }

    #[test]
    fn totals_and_average_contribution() {
        let rows = vec![row(100, 1000.0), row(50, 500.0)];
        let cohort: Vec<&Row> = rows.iter().collect();
        let ind = compute_indicators(&cohort, &all_fields(), false).unwrap();
        assert_eq!(ind.total_members, 150);
        assert_eq!(ind.total_contribution, 1500.0);
        assert!((ind.avg_contribution_per_member - 10.0).abs() < 1e-9);
        assert!(
            (ind.avg_contribution_per_member * ind.total_members as f64 - ind.total_contribution)
                .abs()
                < 1e-6
        );
        assert_eq!(ind.structural_maturity_index, None);
    }

    #[test]
    fn zero_members_is_no_data() {
        assert!(compute_indicators(&[], &all_fields(), true).is_none());
        let rows = vec![row(0, 300.0)];
        let cohort: Vec<&Row> = rows.iter().collect();
        assert!(compute_indicators(&cohort, &all_fields(), true).is_none());
    }

    #[test]
    fn contribution_ignored_when_column_absent() {
        let rows = vec![row(10, 1000.0)];
        let cohort: Vec<&Row> = rows.iter().collect();
        let fields = AvailableFields {
            contribution: false,
            ..all_fields()
        };
        let ind = compute_indicators(&cohort, &fields, false).unwrap();
        assert_eq!(ind.total_contribution, 0.0);
        assert_eq!(ind.avg_contribution_per_member, 0.0);
    }

    #[test]
    fn rates_reach_one_hundred_at_the_boundary() {
        let mut r = row(20, 0.0);
        r.under19 = 12;
        r.age19to23 = 8;
        r.disabilities = DisabilityCounts {
            deaf: 5,
            hearing_impaired: 5,
            blind: 2,
            low_vision: 2,
            physical_lower: 2,
            physical_upper: 2,
            neurological: 1,
            intellectual: 1,
        };
        let rows = vec![r];
        let cohort: Vec<&Row> = rows.iter().collect();
        let ind = compute_indicators(&cohort, &all_fields(), false).unwrap();
        assert!((ind.youth_renewal_rate - 100.0).abs() < 1e-9);
        assert!((ind.inclusion_rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn sums_beyond_u64_stay_exact() {
        let mut a = row(u64::MAX, 0.0);
        a.under19 = u64::MAX;
        a.age19to23 = u64::MAX;
        a.disabilities.deaf = u64::MAX;
        a.disabilities.blind = u64::MAX;
        a.organized_units = Some(u64::MAX);
        a.unorganized_units = Some(u64::MAX);
        let rows = vec![a, row(1, 0.0)];
        let cohort: Vec<&Row> = rows.iter().collect();
        let ind = compute_indicators(&cohort, &all_fields(), true).unwrap();
        assert_eq!(ind.total_members, u128::from(u64::MAX) + 1);
        assert_eq!(ind.total_structural_units, 2 * u128::from(u64::MAX));
        assert!((ind.youth_renewal_rate - 200.0).abs() < 1e-6);
        assert!((ind.inclusion_rate - 200.0).abs() < 1e-6);
    }

    #[test]
    fn structural_units_and_maturity() {
        let mut a = row(40, 0.0);
        a.organized_units = Some(3);
        a.unorganized_units = Some(1);
        let mut b = row(40, 0.0);
        b.organized_units = None;
        let rows = vec![a, b];
        let cohort: Vec<&Row> = rows.iter().collect();
        let ind = compute_indicators(&cohort, &all_fields(), true).unwrap();
        assert_eq!(ind.total_structural_units, 4);
        assert_eq!(ind.structural_maturity_index, Some(20.0));

        let only_members = vec![row(10, 0.0)];
        let cohort: Vec<&Row> = only_members.iter().collect();
        let ind = compute_indicators(&cohort, &all_fields(), true).unwrap();
        assert_eq!(ind.total_structural_units, 0);
        assert_eq!(ind.structural_maturity_index, Some(0.0));
    }
}
