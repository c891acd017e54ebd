//! Course roster storage: `name, email, section, skips, switches`.
//!
//! Usage counters live in the same file as the roster. Blank counter cells
//! mean "never requested". A rewrite only touches the counter cells; every
//! other cell, and the column order, is written back as it was read.

use crate::error::{ColdCallError, Result};
use crate::types::{SectionId, Student};
use crate::usage::{Usage, UsageStore};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

const NAME: &str = "name";
const EMAIL: &str = "email";
const SECTION: &str = "section";
const SKIPS: &str = "skips";
const SWITCHES: &str = "switches";

#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub students: Vec<Student>,
    headers: csv::StringRecord,
    /// Parallel to `students`: the rows as read.
    rows: Vec<csv::StringRecord>,
    skips_col: Option<usize>,
    switches_col: Option<usize>,
}

struct Columns {
    name: usize,
    email: usize,
    section: usize,
    skips: Option<usize>,
    switches: Option<usize>,
}

impl Columns {
    fn locate(headers: &csv::StringRecord) -> Result<Self> {
        let find = |wanted: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(wanted))
        };
        let (Some(name), Some(email), Some(section)) = (find(NAME), find(EMAIL), find(SECTION))
        else {
            return Err(ColdCallError::MalformedInput(
                "make sure there are columns named name, email, and section".to_string(),
            ));
        };
        Ok(Self {
            name,
            email,
            section,
            skips: find(SKIPS),
            switches: find(SWITCHES),
        })
    }
}

fn required<'r>(record: &'r csv::StringRecord, idx: usize, field: &str, line: u64) -> Result<&'r str> {
    let value = record.get(idx).unwrap_or_default().trim();
    if value.is_empty() {
        return Err(ColdCallError::MalformedInput(format!(
            "line {line}: a {field} is empty, please check the csv file"
        )));
    }
    Ok(value)
}

fn counter(record: &csv::StringRecord, idx: Option<usize>, field: &str, line: u64) -> Result<Option<u32>> {
    let Some(idx) = idx else {
        return Ok(None);
    };
    let value = record.get(idx).unwrap_or_default().trim();
    if value.is_empty() {
        return Ok(None);
    }
    value.parse::<u32>().map(Some).map_err(|_| {
        ColdCallError::MalformedInput(format!(
            "line {line}: {field} must be a non-negative whole number, got '{value}'"
        ))
    })
}

impl Roster {
    /// Parse the roster and the usage counters embedded in it.
    pub fn load(path: &Path) -> Result<(Self, UsageStore)> {
        if !path.exists() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            return Err(ColdCallError::MissingInput(name));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)?;
        let headers = reader.headers()?.clone();
        let cols = Columns::locate(&headers)?;

        let mut roster = Roster {
            headers,
            skips_col: cols.skips,
            switches_col: cols.switches,
            ..Roster::default()
        };
        let mut usage = UsageStore::new();
        let mut seen = HashSet::new();

        for (i, record) in reader.records().enumerate() {
            let record = record?;
            let line = record.position().map(|p| p.line()).unwrap_or(i as u64 + 2);
            if record.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            let name = required(&record, cols.name, NAME, line)?;
            let email = required(&record, cols.email, EMAIL, line)?;
            let section = required(&record, cols.section, SECTION, line)?;
            let student = Student::new(name, email, section);

            if !seen.insert(student.email.clone()) {
                return Err(ColdCallError::MalformedInput(format!(
                    "line {line}: email {} appears more than once",
                    student.email
                )));
            }

            let skips = counter(&record, cols.skips, SKIPS, line)?;
            let switches = counter(&record, cols.switches, SWITCHES, line)?;
            if skips.is_some() || switches.is_some() {
                usage.insert(
                    &student.email,
                    Usage {
                        skips: skips.unwrap_or(0),
                        switches: switches.unwrap_or(0),
                    },
                );
            }

            roster.rows.push(record);
            roster.students.push(student);
        }

        Ok((roster, usage))
    }

    /// Rewrite the roster with `usage` in the counter cells. Counter columns
    /// missing from the original header are appended.
    pub fn save(&self, path: &Path, usage: &UsageStore) -> Result<()> {
        let mut header: Vec<&str> = self.headers.iter().collect();
        let skips_col = self.skips_col.unwrap_or_else(|| {
            header.push(SKIPS);
            header.len() - 1
        });
        let switches_col = self.switches_col.unwrap_or_else(|| {
            header.push(SWITCHES);
            header.len() - 1
        });

        let mut writer = csv::WriterBuilder::new()
            .flexible(true)
            .from_writer(Vec::new());
        writer.write_record(&header)?;

        for (student, row) in self.students.iter().zip(&self.rows) {
            let mut cells: Vec<String> = row.iter().map(str::to_string).collect();
            cells.resize(header.len().max(cells.len()), String::new());
            let (skips, switches) = match usage.entry(&student.email) {
                Some(u) => (u.skips.to_string(), u.switches.to_string()),
                None => (String::new(), String::new()),
            };
            cells[skips_col] = skips;
            cells[switches_col] = switches;
            writer.write_record(&cells)?;
        }

        let data = writer.into_inner().map_err(|e| e.into_error())?;
        crate::io::atomic_write(path, &data)
    }

    pub fn sections(&self) -> BTreeSet<SectionId> {
        self.students.iter().map(|s| s.section.clone()).collect()
    }

    pub fn find(&self, email: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.email == email)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
