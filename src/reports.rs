use crate::alerts::evaluate_alerts;
use crate::config::EngineConfig;
use crate::growth::{classify, growth_between};
use crate::indicators::compute_indicators;
use crate::ranking::top_units;
use crate::scoring::score_cohort;
use crate::types::{
    AvailableFields, GrowthSet, Indicators, RegionReport, Report, Row, YearReport,
};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Build the per-year, per-region report from normalized rows.
///
/// Years are processed in ascending order; each year's growth is measured
/// against the previous year present in the data, and each region against
/// the same region in that year. The first year carries no national growth,
/// classification or alerts. Otherwise a scope without a previous value is
/// a zero baseline and follows the configured baseline policy.
pub fn build_report(rows: &[Row], fields: &AvailableFields, engine: &EngineConfig) -> Report {
    let mut by_year: BTreeMap<i32, Vec<&Row>> = BTreeMap::new();
    for r in rows {
        by_year.entry(r.year).or_default().push(r);
    }

    let mut report = Report::new();
    // Outer `None`: no earlier year. Inner `None`: earlier year with no data.
    let mut prev_national: Option<Option<Indicators>> = None;
    let mut prev_regions: BTreeMap<String, Option<Indicators>> = BTreeMap::new();

    for (year, cohort) in by_year {
        let national = compute_indicators(&cohort, fields, engine.maturity_index);
        let (national_growth, national_classification, national_alerts) = match &prev_national {
            Some(previous) => {
                let growth =
                    growth_between(national.as_ref(), previous.as_ref(), engine.zero_baseline);
                let classification = growth
                    .members_pct
                    .map(|g| classify(g, &engine.classification));
                let alerts = evaluate_alerts(national.as_ref(), &growth, &engine.alerts);
                (growth, classification, alerts)
            }
            None => (GrowthSet::default(), None, Vec::new()),
        };

        let mut by_region: BTreeMap<&str, Vec<&Row>> = BTreeMap::new();
        for r in &cohort {
            by_region.entry(r.region.as_str()).or_default().push(*r);
        }

        let mut regions = BTreeMap::new();
        let mut current_regions = BTreeMap::new();
        for (region, slice) in by_region {
            let indicators = compute_indicators(&slice, fields, engine.maturity_index);
            let previous = prev_regions.get(region).and_then(|p| p.as_ref());
            let growth = growth_between(indicators.as_ref(), previous, engine.zero_baseline);
            let classification = growth
                .members_pct
                .map(|g| classify(g, &engine.classification));
            let score = if engine.scoring.enabled {
                score_cohort(indicators.as_ref(), growth.members_pct, &engine.scoring)
            } else {
                None
            };
            let alerts = evaluate_alerts(indicators.as_ref(), &growth, &engine.alerts);
            if !alerts.is_empty() {
                debug!(year, region, alerts = alerts.len(), "regional alerts");
            }
            current_regions.insert(region.to_string(), indicators.clone());
            regions.insert(
                region.to_string(),
                RegionReport {
                    indicators,
                    growth,
                    classification,
                    score,
                    alerts,
                },
            );
        }

        let ranking = engine
            .ranking
            .enabled
            .then(|| top_units(&cohort, engine.ranking.size));

        debug!(
            year,
            rows = cohort.len(),
            regions = regions.len(),
            members = %national.as_ref().map(|n| n.total_members).unwrap_or(0),
            "assembled year"
        );

        prev_national = Some(national.clone());
        prev_regions = current_regions;
        report.insert(
            year,
            YearReport {
                national,
                national_growth,
                national_classification,
                national_alerts,
                regions,
                ranking,
            },
        );
    }

    info!(years = report.len(), "report assembled");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ZeroBaseline;
    use crate::loader::{normalize, read_table};
    use crate::types::{AlertKind, DisabilityCounts, GrowthClass};
    use serde_json::json;

    fn row(year: i32, region: &str, name: &str, members: u64, contribution: f64) -> Row {
        Row {
            year,
            region: region.to_string(),
            name: name.to_string(),
            active_members: members,
            under19: members / 2,
            age19to23: 0,
            disabilities: DisabilityCounts {
                deaf: members / 10,
                ..DisabilityCounts::default()
            },
            organized_units: Some(1),
            unorganized_units: None,
            contributed_value: Some(contribution),
        }
    }

    fn fields() -> AvailableFields {
        AvailableFields {
            contribution: true,
            organized_units: true,
            unorganized_units: false,
        }
    }

    #[test]
    fn national_totals_for_a_single_year() {
        let rows = vec![
            row(2023, "North", "A", 100, 1000.0),
            row(2023, "North", "B", 50, 500.0),
        ];
        let report = build_report(&rows, &fields(), &EngineConfig::default());
        let national = report[&2023].national.as_ref().unwrap();
        assert_eq!(national.total_members, 150);
        assert_eq!(national.total_contribution, 1500.0);
        assert!((national.avg_contribution_per_member - 10.0).abs() < 1e-9);
        assert_eq!(report[&2023].national_growth.members_pct, None);
        assert_eq!(report[&2023].national_classification, None);
    }

    #[test]
    fn first_year_has_no_national_growth_under_either_baseline() {
        let mut r = row(2023, "North", "A", 100, 0.0);
        r.under19 = 5;
        r.disabilities = DisabilityCounts::default();
        let rows = vec![r];
        for zero_baseline in [ZeroBaseline::Null, ZeroBaseline::Zero] {
            let engine = EngineConfig {
                zero_baseline,
                ..EngineConfig::default()
            };
            let report = build_report(&rows, &fields(), &engine);
            let y = &report[&2023];
            assert_eq!(y.national_growth, GrowthSet::default());
            assert_eq!(y.national_classification, None);
            assert!(y.national_alerts.is_empty());
            // regional indicator alerts still apply
            assert!(y.regions["North"].alerts.contains(&AlertKind::LowRenewal));
        }
    }

    #[test]
    fn empty_previous_year_is_a_zero_baseline() {
        let rows = vec![
            row(2022, "North", "A", 0, 0.0),
            row(2023, "North", "A", 50, 0.0),
        ];
        let engine = EngineConfig {
            zero_baseline: ZeroBaseline::Zero,
            ..EngineConfig::default()
        };
        let report = build_report(&rows, &fields(), &engine);
        assert_eq!(report[&2023].national_growth.members_pct, Some(0.0));
        assert_eq!(report[&2023].national_classification, Some(GrowthClass::Stable));
    }

    #[test]
    fn decline_between_years_raises_membership_alert() {
        let rows = vec![
            row(2022, "North", "A", 100, 1000.0),
            row(2023, "North", "A", 80, 1000.0),
        ];
        let report = build_report(&rows, &fields(), &EngineConfig::default());
        let y = &report[&2023];
        assert_eq!(y.national_growth.members_pct, Some(-20.0));
        assert_eq!(y.national_growth.contribution_pct, Some(0.0));
        assert_eq!(y.national_classification, Some(GrowthClass::Decline));
        assert!(y.national_alerts.contains(&AlertKind::MembershipDecline));
        assert_eq!(y.regions["North"].growth.members_pct, Some(-20.0));
        assert!(y.regions["North"].alerts.contains(&AlertKind::MembershipDecline));
    }

    #[test]
    fn new_region_has_no_baseline() {
        let rows = vec![
            row(2022, "North", "A", 100, 0.0),
            row(2023, "North", "A", 100, 0.0),
            row(2023, "South", "B", 40, 0.0),
        ];
        let report = build_report(&rows, &fields(), &EngineConfig::default());
        let south = &report[&2023].regions["South"];
        assert_eq!(south.growth.members_pct, None);
        assert_eq!(south.classification, None);
        assert!(south.score.is_some());

        let engine = EngineConfig {
            zero_baseline: ZeroBaseline::Zero,
            ..EngineConfig::default()
        };
        let report = build_report(&rows, &fields(), &engine);
        let south = &report[&2023].regions["South"];
        assert_eq!(south.growth.members_pct, Some(0.0));
        assert_eq!(south.classification, Some(GrowthClass::Stable));
    }

    #[test]
    fn growth_chains_across_gaps_in_the_series() {
        let rows = vec![
            row(2019, "North", "A", 100, 0.0),
            row(2021, "North", "A", 110, 0.0),
            row(2022, "North", "A", 121, 0.0),
        ];
        let report = build_report(&rows, &fields(), &EngineConfig::default());
        let years: Vec<i32> = report.keys().copied().collect();
        assert_eq!(years, vec![2019, 2021, 2022]);
        let g21 = report[&2021].national_growth.members_pct.unwrap();
        let g22 = report[&2022].national_growth.members_pct.unwrap();
        assert!((g21 - 10.0).abs() < 1e-9);
        assert!((g22 - 10.0).abs() < 1e-9);
        assert_eq!(report[&2022].national_classification, Some(GrowthClass::StrongGrowth));
    }

    #[test]
    fn empty_region_is_carried_without_error() {
        let rows = vec![
            row(2022, "North", "A", 0, 0.0),
            row(2023, "North", "A", 0, 0.0),
            row(2023, "South", "B", 10, 0.0),
        ];
        let report = build_report(&rows, &fields(), &EngineConfig::default());
        assert!(report[&2022].national.is_none());
        let north = &report[&2023].regions["North"];
        assert!(north.indicators.is_none());
        assert_eq!(north.score, None);
        assert!(north.alerts.is_empty());
        assert_eq!(report[&2023].national_growth.members_pct, None);

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["2022"]["national"], json!({}));
        assert_eq!(value["2023"]["regions"]["North"]["indicators"], json!({}));
    }

    #[test]
    fn optional_capabilities_follow_config() {
        let rows = vec![row(2023, "North", "A", 10, 0.0)];
        let mut engine = EngineConfig::default();
        engine.scoring.enabled = false;
        engine.ranking.enabled = false;
        engine.maturity_index = false;
        let report = build_report(&rows, &fields(), &engine);
        let y = &report[&2023];
        assert!(y.ranking.is_none());
        assert!(y.regions["North"].score.is_none());
        let value = serde_json::to_value(y).unwrap();
        assert!(value.get("ranking").is_none());
        assert!(value["regions"]["North"].get("score").is_none());
        assert!(value["national"].get("structural_maturity_index").is_none());
    }

    #[test]
    fn ranking_covers_the_national_cohort() {
        let rows = vec![
            row(2023, "North", "A", 10, 0.0),
            row(2023, "South", "B", 30, 0.0),
            row(2023, "South", "A", 25, 0.0),
        ];
        let report = build_report(&rows, &fields(), &EngineConfig::default());
        let ranking = report[&2023].ranking.as_ref().unwrap();
        assert_eq!(
            ranking.0,
            vec![("A".to_string(), 35), ("B".to_string(), 30)]
        );
    }

    #[test]
    fn serialized_shape_is_stable() {
        let rows = vec![
            row(2022, "North", "A", 100, 1000.0),
            row(2023, "North", "A", 80, 1000.0),
        ];
        let report = build_report(&rows, &fields(), &EngineConfig::default());
        let value = serde_json::to_value(&report).unwrap();
        let y = &value["2023"];
        assert_eq!(y["national"]["total_members"], json!(80));
        assert_eq!(y["national"]["total_structural_units"], json!(1));
        assert_eq!(y["national"]["total_contribution"], json!(1000.0));
        assert_eq!(y["national_growth"]["members_pct"], json!(-20.0));
        assert_eq!(y["national_classification"], json!("decline"));
        assert_eq!(y["national_alerts"][0], json!("membership decline alert"));
        assert_eq!(y["ranking"], json!({"A": 80}));
        assert_eq!(value["2022"]["national_growth"], json!({"members_pct": null, "contribution_pct": null}));
    }

    #[test]
    fn end_to_end_from_csv_text() {
        let text = "ano_referencia,regiao,nome,ativos,menor19,de19a23,surdos,auditiva,cegos,baixa_visao,fisica_inferior,fisica_superior,neurologico,intelectual,valor_repassado\n\
2022,Norte,Sinodal A,100,20,10,1,1,0,0,0,0,0,0,\"1.000,00\"\n\
2023,Norte,Sinodal A,80,10,5,0,0,0,0,0,0,0,0,\"1.234,56\"\n\
invalid,Norte,Sinodal A,999,0,0,0,0,0,0,0,0,0,0,10\n\
2023,Sul,Sinodal B,20,10,0,1,0,0,0,0,0,0,0,oops\n";
        let table = read_table("inline.csv", text.as_bytes(), 0).unwrap();
        let ds = normalize(&[table]).unwrap();
        assert_eq!(ds.report.dropped_bad_year, 1);
        let report = build_report(&ds.rows, &ds.fields, &EngineConfig::default());

        let y23 = &report[&2023];
        let national = y23.national.as_ref().unwrap();
        assert_eq!(national.total_members, 100);
        assert!((national.total_contribution - 1234.56).abs() < 1e-9);
        assert_eq!(y23.national_growth.members_pct, Some(0.0));
        assert_eq!(y23.regions["Norte"].growth.members_pct, Some(-20.0));
        assert_eq!(y23.regions["Sul"].growth.members_pct, None);
        assert_eq!(
            y23.regions["Sul"].indicators.as_ref().unwrap().total_contribution,
            0.0
        );
    }
}
