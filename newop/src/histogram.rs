//! Profiling histogram text (`.hst`)
//!
//! Two header lines, then one `pc hex_word frequency` row per executed address.
//! The pc column is decimal, or hexadecimal with a `0x` prefix.
use std::io::BufRead;

use tracing::warn;

use crate::Error;

/// Number of header lines preceding the rows
const HEADER_LINES: usize = 2;

/// One histogram row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub pc: u32,
    pub hex: String,
    pub frequency: u64,
}

fn parse_pc(field: &str) -> Option<u32> {
    match field.strip_prefix("0x").or_else(|| field.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => field.parse().ok(),
    }
}

/// Parse one row, `None` if it is malformed
pub fn parse_record(line: &str) -> Option<Record> {
    let mut fields = line.split_whitespace();
    let pc = parse_pc(fields.next()?)?;
    let hex = fields.next()?.to_string();
    let frequency = fields.next()?.parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    Some(Record { pc, hex, frequency })
}

/// Read every well-formed row; malformed rows are logged and skipped
pub fn parse<R: BufRead>(reader: R) -> Result<Vec<Record>, Error> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate().skip(HEADER_LINES) {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_record(&line) {
            Some(record) => records.push(record),
            None => warn!("Skipping malformed histogram line {}: '{}'", index + 1, line),
        }
    }
    Ok(records)
}
