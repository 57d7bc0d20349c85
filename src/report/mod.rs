//! Text output: the workload banner and the pipe-delimited results table.

use std::io::Write;

use crate::bench::ResultsTable;
use crate::error::Result;

/// Column separator of the results table.
pub const SEPARATOR: char = '|';

/// Writes the workload description followed by `Processing...`.
///
/// The `{space}`, `{distribution}` and `{dataset}` placeholders are part of
/// the banner text and are printed as is.
pub fn write_banner(out: &mut impl Write, turns: u64) -> Result<()> {
    writeln!(out, "The benchmark performs {{turns}}={turns} number of iterations. ")?;
    writeln!(
        out,
        "Every turn the pseudo-random generator generates a number within the range from 0 to {{space}}-1 using {{distribution}}. "
    )?;
    writeln!(
        out,
        "That number is placed into {{dataset}} collection, or it is removed from it if the number was already present. "
    )?;
    write!(out, "Processing...")?;
    out.flush()?;
    Ok(())
}

/// Writes the header and one row per record. Each row has a column per
/// entry of `slot_series`, blank where the record has no measurement.
pub fn write_table(out: &mut impl Write, table: &ResultsTable, slot_series: &[u64]) -> Result<()> {
    write!(out, "turns{SEPARATOR}distribution{SEPARATOR}algorithm")?;
    for slots in slot_series {
        write!(out, "{SEPARATOR}time:s{slots}")?;
    }
    writeln!(out)?;

    for record in table.records() {
        write!(
            out,
            "{}{SEPARATOR}{}{SEPARATOR}{}",
            record.turns, record.distribution, record.algorithm
        )?;
        for slots in slot_series {
            write!(out, "{SEPARATOR}")?;
            if let Some(ns) = record.slots_to_ns.get(slots) {
                write!(out, "{ns:.2}")?;
            }
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench::DISTRIBUTION;

    fn render(table: &ResultsTable, series: &[u64]) -> String {
        let mut out = Vec::new();
        write_table(&mut out, table, series).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_banner_keeps_placeholders() {
        let mut out = Vec::new();
        write_banner(&mut out, 1024).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("The benchmark performs {turns}=1024 number of iterations."));
        assert!(text.contains("0 to {space}-1 using {distribution}."));
        assert!(text.contains("into {dataset} collection"));
        assert!(text.ends_with("Processing..."));
    }

    #[test]
    fn test_table_header() {
        let text = render(&ResultsTable::new(), &[64, 4096, 262144]);
        assert_eq!(
            text,
            "turns|distribution|algorithm|time:s64|time:s4096|time:s262144\n"
        );
    }

    #[test]
    fn test_table_blank_cells() {
        let mut table = ResultsTable::new();
        table.record(1024, DISTRIBUTION, "set<BTreeSet<i8>>", 64, 12.5);
        table.record(1024, DISTRIBUTION, "bitmap<u64>", 4096, 3.456);
        let text = render(&table, &[64, 4096]);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "1024|uniform|set<BTreeSet<i8>>|12.50|");
        assert_eq!(lines[2], "1024|uniform|bitmap<u64>||3.46");
    }
}
