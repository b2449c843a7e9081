use crate::error::{PipelineError, RowError};
use crate::models::leaderboard::LeaderboardEntry;
use crate::models::sheet::RawMatrix;
use crate::validation;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    CompetitionId,
    ParticipantName,
    Score,
    TimeSeconds,
    TimeFormatted,
    ResultsPublished,
    SubmittedAt,
    Notes,
}

impl Field {
    pub const ALL: [Field; 8] = [
        Field::CompetitionId,
        Field::ParticipantName,
        Field::Score,
        Field::TimeSeconds,
        Field::TimeFormatted,
        Field::ResultsPublished,
        Field::SubmittedAt,
        Field::Notes,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::CompetitionId => "competition_id",
            Field::ParticipantName => "participant_name",
            Field::Score => "score",
            Field::TimeSeconds => "time_seconds",
            Field::TimeFormatted => "time_formatted",
            Field::ResultsPublished => "results_published",
            Field::SubmittedAt => "submitted_at",
            Field::Notes => "notes",
        }
    }

    pub fn required(self) -> bool {
        matches!(
            self,
            Field::CompetitionId
                | Field::ParticipantName
                | Field::Score
                | Field::TimeSeconds
                | Field::ResultsPublished
        )
    }
}

/// Shortest header accepted as an abbreviation of a field name ("time (sec)").
const MIN_ABBREVIATION_LEN: usize = 4;

fn normalize_header(header: &str) -> String {
    header
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// The one rule deciding whether a sheet header names a field.
pub fn header_matches(header: &str, field: Field) -> bool {
    let h = normalize_header(header);
    let f = normalize_header(field.name());
    if h.is_empty() {
        return false;
    }
    h == f || h.contains(&f) || (h.len() >= MIN_ABBREVIATION_LEN && f.starts_with(&h))
}

/// Column index per field, resolved once per fetch from the header row.
#[derive(Debug, Default)]
pub struct ColumnMap {
    columns: [Option<usize>; Field::ALL.len()],
}

impl ColumnMap {
    pub fn resolve(headers: &[Value]) -> Result<Self, PipelineError> {
        let headers: Vec<String> = headers.iter().map(cell_text).collect();
        let mut map = ColumnMap::default();
        let mut claimed = vec![false; headers.len()];
        // Required fields pick first; a column feeds at most one field.
        let by_priority = Field::ALL
            .iter()
            .enumerate()
            .filter(|(_, f)| f.required())
            .chain(Field::ALL.iter().enumerate().filter(|(_, f)| !f.required()));
        for (slot, field) in by_priority {
            let column = headers
                .iter()
                .enumerate()
                .position(|(i, h)| !claimed[i] && header_matches(h, *field));
            if let Some(i) = column {
                claimed[i] = true;
            }
            map.columns[slot] = column;
        }

        let missing: Vec<&'static str> = Field::ALL
            .iter()
            .filter(|f| f.required() && map.get(**f).is_none())
            .map(|f| f.name())
            .collect();
        if !missing.is_empty() {
            return Err(PipelineError::Schema { missing });
        }
        Ok(map)
    }

    pub fn get(&self, field: Field) -> Option<usize> {
        Field::ALL
            .iter()
            .position(|f| *f == field)
            .and_then(|i| self.columns[i])
    }

    fn cell<'a>(&self, row: &'a [Value], field: Field) -> Option<&'a Value> {
        self.get(field).and_then(|i| row.get(i))
    }

    fn text(&self, row: &[Value], field: Field) -> String {
        self.cell(row, field).map(cell_text).unwrap_or_default().trim().to_string()
    }

    fn optional_text(&self, row: &[Value], field: Field) -> Option<String> {
        Some(self.text(row, field)).filter(|s| !s.is_empty())
    }

    fn number(&self, row: &[Value], field: Field) -> f64 {
        self.cell(row, field).map(cell_number).unwrap_or(0.0)
    }
}

/// Stringify a cell the way a spreadsheet export reads it.
fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

fn is_blank_cell(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn cell_number(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_leading_number(s),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

/// Parse the longest numeric prefix, so "95 pts" reads as 95.
fn parse_leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    let mut seen_exp = false;

    let mut i = 0;
    if i < bytes.len() && (bytes[i] == b'+' || bytes[i] == b'-') {
        i += 1;
    }
    while i < bytes.len() {
        match bytes[i] {
            b'0'..=b'9' => {
                seen_digit = true;
                end = i + 1;
            }
            b'.' if !seen_dot && !seen_exp => seen_dot = true,
            b'e' | b'E' if seen_digit && !seen_exp => {
                seen_exp = true;
                if i + 1 < bytes.len() && (bytes[i + 1] == b'+' || bytes[i + 1] == b'-') {
                    i += 1;
                }
            }
            _ => break,
        }
        i += 1;
    }
    if !seen_digit {
        return None;
    }
    s[..end].parse().ok()
}

fn parse_row(columns: &ColumnMap, row: &[Value]) -> Result<LeaderboardEntry, RowError> {
    if row.iter().all(is_blank_cell) {
        return Err(RowError::Empty);
    }

    let competition_id = columns.text(row, Field::CompetitionId);
    let participant_name = columns.text(row, Field::ParticipantName);
    if competition_id.is_empty() || participant_name.is_empty() {
        return Err(RowError::BlankKey);
    }

    let entry = LeaderboardEntry {
        competition_id,
        participant_name,
        score: columns.number(row, Field::Score),
        time_seconds: columns.number(row, Field::TimeSeconds),
        time_formatted: columns.optional_text(row, Field::TimeFormatted),
        results_published: columns
            .text(row, Field::ResultsPublished)
            .eq_ignore_ascii_case("true"),
        submitted_at: columns.optional_text(row, Field::SubmittedAt),
        notes: columns.optional_text(row, Field::Notes),
    };
    validation::validate_entry(&entry)?;
    Ok(entry)
}

/// Turn a raw sheet matrix into entries, in sheet order.
///
/// Missing required columns fail the whole parse; bad rows are skipped.
pub fn parse(raw: &RawMatrix) -> Result<Vec<LeaderboardEntry>, PipelineError> {
    if raw.len() < 2 {
        return Ok(Vec::new());
    }

    let columns = ColumnMap::resolve(&raw[0])?;
    let mut entries = Vec::with_capacity(raw.len() - 1);
    for (index, row) in raw.iter().enumerate().skip(1) {
        match parse_row(&columns, row) {
            Ok(entry) => entries.push(entry),
            Err(RowError::Empty) | Err(RowError::BlankKey) => {
                tracing::trace!(row = index, "Skipping blank sheet row");
            }
            Err(e) => tracing::warn!(row = index, error = %e, "Invalid leaderboard row skipped"),
        }
    }
    Ok(entries)
}
