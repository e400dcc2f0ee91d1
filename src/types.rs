use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::collections::BTreeMap;
use tabled::Tabled;

/// A source table as read from disk: header cells plus raw string records.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub source: String,
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

/// The eight disability-category counts of a row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisabilityCounts {
    pub deaf: u64,
    pub hearing_impaired: u64,
    pub blind: u64,
    pub low_vision: u64,
    pub physical_lower: u64,
    pub physical_upper: u64,
    pub neurological: u64,
    pub intellectual: u64,
}

impl DisabilityCounts {
    /// Sum of all eight categories, widened so it cannot overflow.
    pub fn total(&self) -> u128 {
        [
            self.deaf,
            self.hearing_impaired,
            self.blind,
            self.low_vision,
            self.physical_lower,
            self.physical_upper,
            self.neurological,
            self.intellectual,
        ]
        .iter()
        .map(|&n| u128::from(n))
        .sum()
    }
}

/// One institutional unit's record for one reference year.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub year: i32,
    pub region: String,
    pub name: String,
    pub active_members: u64,
    pub under19: u64,
    pub age19to23: u64,
    pub disabilities: DisabilityCounts,
    pub organized_units: Option<u64>,
    pub unorganized_units: Option<u64>,
    pub contributed_value: Option<f64>,
}

/// Optional columns present in at least one loaded table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AvailableFields {
    pub contribution: bool,
    pub organized_units: bool,
    pub unorganized_units: bool,
}

impl AvailableFields {
    pub fn merge(self, other: Self) -> Self {
        Self {
            contribution: self.contribution || other.contribution,
            organized_units: self.organized_units || other.organized_units,
            unorganized_units: self.unorganized_units || other.unorganized_units,
        }
    }
}

/// Derived metrics of one cohort. Only exists for cohorts with members;
/// an empty cohort is `None` wherever indicators are carried. Totals are
/// `u128` so sums of `u64` row counts stay exact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicators {
    pub total_members: u128,
    pub total_contribution: f64,
    pub avg_contribution_per_member: f64,
    pub youth_renewal_rate: f64,
    pub inclusion_rate: f64,
    pub total_structural_units: u128,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structural_maturity_index: Option<f64>,
}

/// Qualitative reading of a growth percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GrowthClass {
    #[serde(rename = "strong growth")]
    StrongGrowth,
    #[serde(rename = "moderate growth")]
    ModerateGrowth,
    #[serde(rename = "stable")]
    Stable,
    #[serde(rename = "decline")]
    Decline,
}

impl GrowthClass {
    pub fn label(&self) -> &'static str {
        match self {
            GrowthClass::StrongGrowth => "strong growth",
            GrowthClass::ModerateGrowth => "moderate growth",
            GrowthClass::Stable => "stable",
            GrowthClass::Decline => "decline",
        }
    }
}

/// Year-over-year growth of one scope, in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GrowthSet {
    pub members_pct: Option<f64>,
    pub contribution_pct: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertKind {
    #[serde(rename = "membership decline alert")]
    MembershipDecline,
    #[serde(rename = "contribution decline alert")]
    ContributionDecline,
    #[serde(rename = "low generational renewal")]
    LowRenewal,
    #[serde(rename = "low inclusion index")]
    LowInclusion,
}

/// Top-N units of a cohort, highest first. Serialized as an ordered
/// `name -> members` object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Ranking(pub Vec<(String, u128)>);

impl Serialize for Ranking {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, total) in &self.0 {
            map.serialize_entry(name, total)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionReport {
    #[serde(serialize_with = "empty_when_none")]
    pub indicators: Option<Indicators>,
    pub growth: GrowthSet,
    pub classification: Option<GrowthClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    pub alerts: Vec<AlertKind>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearReport {
    #[serde(serialize_with = "empty_when_none")]
    pub national: Option<Indicators>,
    pub national_growth: GrowthSet,
    pub national_classification: Option<GrowthClass>,
    pub national_alerts: Vec<AlertKind>,
    pub regions: BTreeMap<String, RegionReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ranking: Option<Ranking>,
}

/// The full report, keyed by reference year. serde_json writes the integer
/// keys as strings, in ascending numeric order.
pub type Report = BTreeMap<i32, YearReport>;

/// Empty indicator sets are emitted as `{}` rather than `null`.
fn empty_when_none<S: Serializer>(
    value: &Option<Indicators>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(ind) => ind.serialize(serializer),
        None => serializer.serialize_map(Some(0))?.end(),
    }
}

/// Console preview row for the national series.
#[derive(Debug, Tabled, Clone)]
pub struct NationalPreviewRow {
    #[tabled(rename = "Year")]
    pub year: i32,
    #[tabled(rename = "Members")]
    pub members: String,
    #[tabled(rename = "Contribution")]
    pub contribution: String,
    #[tabled(rename = "MemberGrowth")]
    pub member_growth: String,
    #[tabled(rename = "Classification")]
    pub classification: String,
    #[tabled(rename = "Regions")]
    pub regions: usize,
    #[tabled(rename = "Alerts")]
    pub alerts: usize,
}
