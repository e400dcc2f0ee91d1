// Run configuration.
//
// Every knob the engine exposes lives here and is passed down explicitly;
// nothing reads process-wide path constants. All sections are optional in
// the TOML file and fall back to the defaults below.
use crate::error::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "membership_stats.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory scanned for source tables.
    #[serde(default = "default_input_dir")]
    pub dir: PathBuf,
    /// Glob applied inside `dir`.
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Lines to skip before the header row (title banners in exported sheets).
    #[serde(default)]
    pub skip_rows: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_report_file")]
    pub report_file: String,
    /// Narrative prompt file; empty disables it.
    #[serde(default = "default_prompt_file")]
    pub prompt_file: Option<String>,
    /// Rows shown in the console preview.
    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

/// Behaviour on a zero previous value when computing growth.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ZeroBaseline {
    /// No baseline: growth is `null`.
    #[default]
    Null,
    /// Growth from a zero baseline reads as 0%.
    Zero,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub zero_baseline: ZeroBaseline,
    #[serde(default = "default_true")]
    pub maturity_index: bool,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub ranking: RankingConfig,
    #[serde(default)]
    pub alerts: AlertThresholds,
    #[serde(default)]
    pub classification: ClassificationThresholds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_ranking_size")]
    pub size: usize,
}

/// Weights and caps of the composite institutional score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_growth_offset")]
    pub growth_offset: f64,
    #[serde(default = "default_growth_cap")]
    pub growth_cap: f64,
    #[serde(default = "default_growth_weight")]
    pub growth_weight: f64,
    #[serde(default = "default_renewal_cap")]
    pub renewal_cap: f64,
    #[serde(default = "default_renewal_weight")]
    pub renewal_weight: f64,
    #[serde(default = "default_inclusion_cap")]
    pub inclusion_cap: f64,
    #[serde(default = "default_inclusion_weight")]
    pub inclusion_weight: f64,
    #[serde(default = "default_contribution_divisor")]
    pub contribution_divisor: f64,
    #[serde(default = "default_contribution_cap")]
    pub contribution_cap: f64,
}

/// Alert thresholds, all in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertThresholds {
    #[serde(default = "default_member_decline")]
    pub member_decline_pct: f64,
    #[serde(default = "default_contribution_decline")]
    pub contribution_decline_pct: f64,
    #[serde(default = "default_min_renewal")]
    pub min_youth_renewal_pct: f64,
    #[serde(default = "default_min_inclusion")]
    pub min_inclusion_pct: f64,
}

/// Lower bounds of each growth class, in percent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationThresholds {
    /// Growth strictly above this is strong growth.
    #[serde(default = "default_strong")]
    pub strong_above: f64,
    /// Growth strictly above this is moderate growth.
    #[serde(default = "default_moderate")]
    pub moderate_above: f64,
    /// Growth at or above this is stable; below is decline.
    #[serde(default = "default_stable")]
    pub stable_from: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub zero_baseline: Option<ZeroBaseline>,
    pub no_prompt: bool,
}

impl Config {
    /// Load from `path`, or from `membership_stats.toml` in the working
    /// directory when no path is given. A missing default file yields the
    /// built-in defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !explicit && !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path).map_err(|source| ReportError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&data, &path.display().to_string())
    }

    pub fn from_toml(data: &str, origin: &str) -> Result<Self> {
        toml::from_str(data).map_err(|source| ReportError::Toml {
            path: origin.to_string(),
            source,
        })
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(dir) = overrides.input_dir {
            self.input.dir = dir;
        }
        if let Some(dir) = overrides.output_dir {
            self.output.dir = dir;
        }
        if let Some(zb) = overrides.zero_baseline {
            self.engine.zero_baseline = zb;
        }
        if overrides.no_prompt {
            self.output.prompt_file = None;
        }
    }

    pub fn report_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.report_file)
    }

    pub fn prompt_path(&self) -> Option<PathBuf> {
        self.output
            .prompt_file
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(|f| self.output.dir.join(f))
    }

    pub fn default_template() -> String {
        let template = r#"[input]
dir = "planilhas"
pattern = "*.csv"
skip_rows = 0

[output]
dir = "saida"
report_file = "base_ia_estatistica.json"
prompt_file = "prompt_relatorio_ia.txt"
preview_rows = 10

[engine]
# "null" reports growth from a zero baseline as null, "zero" as 0%
zero_baseline = "null"
maturity_index = true

[engine.scoring]
enabled = true
growth_offset = 10.0
growth_cap = 20.0
growth_weight = 1.5
renewal_cap = 50.0
renewal_weight = 0.5
inclusion_cap = 10.0
inclusion_weight = 2.0
contribution_divisor = 100.0
contribution_cap = 25.0

[engine.ranking]
enabled = true
size = 10

[engine.alerts]
member_decline_pct = -10.0
contribution_decline_pct = -15.0
min_youth_renewal_pct = 25.0
min_inclusion_pct = 2.0

[engine.classification]
strong_above = 8.0
moderate_above = 2.0
stable_from = -2.0
"#;
        template.to_string()
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: default_input_dir(),
            pattern: default_pattern(),
            skip_rows: 0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            report_file: default_report_file(),
            prompt_file: default_prompt_file(),
            preview_rows: default_preview_rows(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            zero_baseline: ZeroBaseline::default(),
            maturity_index: true,
            scoring: ScoringConfig::default(),
            ranking: RankingConfig::default(),
            alerts: AlertThresholds::default(),
            classification: ClassificationThresholds::default(),
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            size: default_ranking_size(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            growth_offset: default_growth_offset(),
            growth_cap: default_growth_cap(),
            growth_weight: default_growth_weight(),
            renewal_cap: default_renewal_cap(),
            renewal_weight: default_renewal_weight(),
            inclusion_cap: default_inclusion_cap(),
            inclusion_weight: default_inclusion_weight(),
            contribution_divisor: default_contribution_divisor(),
            contribution_cap: default_contribution_cap(),
        }
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            member_decline_pct: default_member_decline(),
            contribution_decline_pct: default_contribution_decline(),
            min_youth_renewal_pct: default_min_renewal(),
            min_inclusion_pct: default_min_inclusion(),
        }
    }
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            strong_above: default_strong(),
            moderate_above: default_moderate(),
            stable_from: default_stable(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("planilhas")
}

fn default_pattern() -> String {
    "*.csv".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("saida")
}

fn default_report_file() -> String {
    "base_ia_estatistica.json".to_string()
}

fn default_prompt_file() -> Option<String> {
    Some("prompt_relatorio_ia.txt".to_string())
}

fn default_preview_rows() -> usize {
    10
}

fn default_ranking_size() -> usize {
    10
}

fn default_growth_offset() -> f64 {
    10.0
}

fn default_growth_cap() -> f64 {
    20.0
}

fn default_growth_weight() -> f64 {
    1.5
}

fn default_renewal_cap() -> f64 {
    50.0
}

fn default_renewal_weight() -> f64 {
    0.5
}

fn default_inclusion_cap() -> f64 {
    10.0
}

fn default_inclusion_weight() -> f64 {
    2.0
}

fn default_contribution_divisor() -> f64 {
    100.0
}

fn default_contribution_cap() -> f64 {
    25.0
}

fn default_member_decline() -> f64 {
    -10.0
}

fn default_contribution_decline() -> f64 {
    -15.0
}

fn default_min_renewal() -> f64 {
    25.0
}

fn default_min_inclusion() -> f64 {
    2.0
}

fn default_strong() -> f64 {
    8.0
}

fn default_moderate() -> f64 {
    2.0
}

fn default_stable() -> f64 {
    -2.0
}
