use crate::config::InputConfig;
use crate::error::{ReportError, Result};
use crate::types::{AvailableFields, DisabilityCounts, RawTable, Row};
use crate::util::{normalize_header, parse_count, parse_money, parse_year};
use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub tables: usize,
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_bad_year: usize,
    pub coerced_money: usize,
    pub coerced_counts: usize,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub rows: Vec<Row>,
    pub fields: AvailableFields,
    pub report: LoadReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Year,
    Region,
    Name,
    ActiveMembers,
    Under19,
    Age19To23,
    Deaf,
    HearingImpaired,
    Blind,
    LowVision,
    PhysicalLower,
    PhysicalUpper,
    Neurological,
    Intellectual,
    OrganizedUnits,
    UnorganizedUnits,
    ContributedValue,
}

const REQUIRED: [Column; 14] = [
    Column::Year,
    Column::Region,
    Column::Name,
    Column::ActiveMembers,
    Column::Under19,
    Column::Age19To23,
    Column::Deaf,
    Column::HearingImpaired,
    Column::Blind,
    Column::LowVision,
    Column::PhysicalLower,
    Column::PhysicalUpper,
    Column::Neurological,
    Column::Intellectual,
];

const OPTIONAL: [Column; 3] = [
    Column::OrganizedUnits,
    Column::UnorganizedUnits,
    Column::ContributedValue,
];

impl Column {
    fn canonical(&self) -> &'static str {
        match self {
            Column::Year => "year",
            Column::Region => "region",
            Column::Name => "name",
            Column::ActiveMembers => "active_members",
            Column::Under19 => "under19",
            Column::Age19To23 => "age19to23",
            Column::Deaf => "deaf",
            Column::HearingImpaired => "hearing_impaired",
            Column::Blind => "blind",
            Column::LowVision => "low_vision",
            Column::PhysicalLower => "physical_lower",
            Column::PhysicalUpper => "physical_upper",
            Column::Neurological => "neurological",
            Column::Intellectual => "intellectual",
            Column::OrganizedUnits => "organized_units",
            Column::UnorganizedUnits => "unorganized_units",
            Column::ContributedValue => "contributed_value",
        }
    }
}

// Normalized header -> column. The source sheets use Portuguese headers;
// the canonical English names are accepted as well.
static ALIASES: Lazy<HashMap<&'static str, Column>> = Lazy::new(|| {
    let pairs = [
        ("ano_referencia", Column::Year),
        ("regiao", Column::Region),
        ("nome", Column::Name),
        ("ativos", Column::ActiveMembers),
        ("menor19", Column::Under19),
        ("de19a23", Column::Age19To23),
        ("surdos", Column::Deaf),
        ("auditiva", Column::HearingImpaired),
        ("cegos", Column::Blind),
        ("baixa_visao", Column::LowVision),
        ("fisica_inferior", Column::PhysicalLower),
        ("fisica_superior", Column::PhysicalUpper),
        ("neurologico", Column::Neurological),
        ("intelectual", Column::Intellectual),
        ("ump_organizada", Column::OrganizedUnits),
        ("ump_nao_organizada", Column::UnorganizedUnits),
        ("valor_repassado", Column::ContributedValue),
    ];
    let mut map: HashMap<&'static str, Column> = pairs.into_iter().collect();
    for col in REQUIRED.iter().chain(OPTIONAL.iter()) {
        map.insert(col.canonical(), *col);
    }
    map
});

/// Read one CSV table. The first `skip_rows` lines are discarded and the
/// next line is the header row; blank records are ignored.
pub fn read_table<R: Read>(source: &str, reader: R, skip_rows: usize) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut headers: Option<Vec<String>> = None;
    let mut records = Vec::new();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.map_err(|source_err| ReportError::Csv {
            table: source.to_string(),
            source: source_err,
        })?;
        if idx < skip_rows {
            continue;
        }
        let cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        if headers.is_none() {
            headers = Some(cells);
            continue;
        }
        if cells.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        records.push(cells);
    }
    let headers = headers.ok_or_else(|| ReportError::MissingHeader {
        table: source.to_string(),
        skip_rows,
    })?;
    Ok(RawTable {
        source: source.to_string(),
        headers,
        records,
    })
}

/// Read every table matching the configured pattern, in path order.
pub fn load_tables(input: &InputConfig) -> Result<Vec<RawTable>> {
    let pattern = input.dir.join(&input.pattern).display().to_string();
    let mut paths: Vec<_> = glob::glob(&pattern)?.filter_map(|p| p.ok()).collect();
    paths.sort();
    if paths.is_empty() {
        return Err(ReportError::NoInputFiles(pattern));
    }
    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path.display().to_string();
        let file = File::open(&path).map_err(|source| ReportError::Io {
            path: name.clone(),
            source,
        })?;
        let table = read_table(&name, file, input.skip_rows)?;
        debug!(table = %name, rows = table.records.len(), "read table");
        tables.push(table);
    }
    Ok(tables)
}

/// Turn raw tables into canonical rows.
///
/// Column presence is checked once per table: required columns must exist,
/// optional ones are recorded in the returned `AvailableFields`. Cells are
/// coerced with the policies in `util`; rows with an unusable year are
/// dropped.
pub fn normalize(tables: &[RawTable]) -> Result<Dataset> {
    let mut report = LoadReport {
        tables: tables.len(),
        ..LoadReport::default()
    };
    let mut fields = AvailableFields::default();
    let mut rows = Vec::new();

    for table in tables {
        let mut index: HashMap<Column, usize> = HashMap::new();
        for (pos, header) in table.headers.iter().enumerate() {
            let norm = normalize_header(header);
            match ALIASES.get(norm.as_str()) {
                Some(col) => {
                    index.entry(*col).or_insert(pos);
                }
                None if !norm.is_empty() => debug!(table = %table.source, column = %norm, "ignoring column"),
                None => {}
            }
        }
        if let Some(missing) = REQUIRED.iter().find(|c| !index.contains_key(*c)) {
            return Err(ReportError::MissingColumn {
                table: table.source.clone(),
                column: missing.canonical().to_string(),
            });
        }
        let table_fields = AvailableFields {
            contribution: index.contains_key(&Column::ContributedValue),
            organized_units: index.contains_key(&Column::OrganizedUnits),
            unorganized_units: index.contains_key(&Column::UnorganizedUnits),
        };
        fields = fields.merge(table_fields);

        for record in &table.records {
            report.total_rows += 1;
            let mut cells = CellReader {
                record,
                index: &index,
                coerced_counts: 0,
            };
            let Some(year) = parse_year(cells.text(Column::Year)) else {
                report.dropped_bad_year += 1;
                continue;
            };
            let contributed_value = if table_fields.contribution {
                let raw = cells.text(Column::ContributedValue);
                let value = parse_money(raw);
                if value.is_none() && !raw.trim().is_empty() {
                    report.coerced_money += 1;
                }
                Some(value.unwrap_or(0.0))
            } else {
                None
            };
            let row = Row {
                year,
                region: cells.label(Column::Region, "Unknown"),
                name: cells.label(Column::Name, "Unknown"),
                active_members: cells.count(Column::ActiveMembers),
                under19: cells.count(Column::Under19),
                age19to23: cells.count(Column::Age19To23),
                disabilities: DisabilityCounts {
                    deaf: cells.count(Column::Deaf),
                    hearing_impaired: cells.count(Column::HearingImpaired),
                    blind: cells.count(Column::Blind),
                    low_vision: cells.count(Column::LowVision),
                    physical_lower: cells.count(Column::PhysicalLower),
                    physical_upper: cells.count(Column::PhysicalUpper),
                    neurological: cells.count(Column::Neurological),
                    intellectual: cells.count(Column::Intellectual),
                },
                organized_units: table_fields
                    .organized_units
                    .then(|| cells.count(Column::OrganizedUnits)),
                unorganized_units: table_fields
                    .unorganized_units
                    .then(|| cells.count(Column::UnorganizedUnits)),
                contributed_value,
            };
            report.coerced_counts += cells.coerced_counts;
            rows.push(row);
        }
    }

    report.kept_rows = rows.len();
    if report.dropped_bad_year > 0 {
        warn!(dropped = report.dropped_bad_year, "rows without a valid year were dropped");
    }
    info!(
        tables = report.tables,
        rows = report.kept_rows,
        contribution = fields.contribution,
        organized_units = fields.organized_units,
        unorganized_units = fields.unorganized_units,
        "normalized dataset"
    );
    Ok(Dataset {
        rows,
        fields,
        report,
    })
}

struct CellReader<'a> {
    record: &'a [String],
    index: &'a HashMap<Column, usize>,
    coerced_counts: usize,
}

impl<'a> CellReader<'a> {
    fn text(&self, col: Column) -> &'a str {
        self.index
            .get(&col)
            .and_then(|&pos| self.record.get(pos))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    fn label(&self, col: Column, fallback: &str) -> String {
        let s = self.text(col).trim();
        if s.is_empty() {
            fallback.to_string()
        } else {
            s.to_string()
        }
    }

    fn count(&mut self, col: Column) -> u64 {
        let raw = self.text(col);
        match parse_count(raw) {
            Some(n) => n,
            None => {
                if !raw.trim().is_empty() {
                    self.coerced_counts += 1;
                }
                0
            }
        }
    }
}
