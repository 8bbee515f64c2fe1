//! Writing protocol sheets to disk.
//!
//! A protocol is written either as one CSV file per class or as one workbook
//! with a worksheet per class. [`OutputNames`] hands out file names for a whole
//! run so two sheets or two exports never land on the same path.

use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, info, warn};

use protocol_core::error::ProtocolError;
use protocol_core::Result;

use crate::sheet::ProtocolSheet;

/// Longest worksheet name a workbook accepts.
pub const MAX_WORKSHEET_NAME: usize = 31;

/// Worksheet used when a protocol has no classes at all.
const EMPTY_WORKSHEET_NAME: &str = "Protocol";

// ── OutputNames ───────────────────────────────────────────────────────────────

/// Output paths already claimed during one run.
///
/// Paths are compared case-insensitively since two names differing only in
/// case share a file on common desktop file systems.
#[derive(Debug, Default)]
pub struct OutputNames {
    taken: HashSet<String>,
}

impl OutputNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `<dir>/<base>.<extension>`, or `<base>-2`, `<base>-3`, ... when
    /// that path was already handed out.
    pub fn claim(&mut self, dir: &Path, base: &str, extension: &str) -> PathBuf {
        let mut candidate = dir.join(format!("{base}.{extension}"));
        let mut suffix = 2;
        while !self.taken.insert(candidate.to_string_lossy().to_lowercase()) {
            candidate = dir.join(format!("{base}-{suffix}.{extension}"));
            suffix += 1;
        }
        if suffix > 2 {
            warn!(
                "{}.{} already written in this run; using {}",
                base,
                extension,
                candidate.display()
            );
        }
        candidate
    }
}

/// File-system safe form of a class name.
fn sanitize_file_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "_".to_string()
    } else {
        cleaned
    }
}

fn create_file(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| ProtocolError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

// ── CSV ───────────────────────────────────────────────────────────────────────

/// Write one sheet as CSV: the header, then every row.
pub fn write_sheet<W: Write>(sheet: &ProtocolSheet, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(&sheet.header)?;
    for row in &sheet.rows {
        csv_writer.write_record(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write every sheet to `<dir>/<stem>-<class>.csv` and return the paths.
pub fn write_csv_sheets(
    sheets: &[ProtocolSheet],
    dir: &Path,
    stem: &str,
    names: &mut OutputNames,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(sheets.len());
    for sheet in sheets {
        let base = format!("{stem}-{}", sanitize_file_component(&sheet.name));
        let path = names.claim(dir, &base, "csv");
        write_sheet(sheet, create_file(&path)?)?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }

    info!("Wrote {} protocol sheets to {}", written.len(), dir.display());
    Ok(written)
}

// ── Workbook ──────────────────────────────────────────────────────────────────

/// Worksheet names for `sheets`, in order.
///
/// Characters a workbook forbids (`[]:*?/\`) become `_`, names are cut to
/// [`MAX_WORKSHEET_NAME`] characters and duplicates (ignoring case) get a
/// ` (2)`, ` (3)`, ... suffix.
pub fn worksheet_names(sheets: &[ProtocolSheet]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    sheets
        .iter()
        .map(|sheet| {
            let cleaned: String = sheet
                .name
                .chars()
                .map(|c| if "[]:*?/\\".contains(c) { '_' } else { c })
                .collect();
            let cleaned = cleaned.trim_matches('\'').trim().to_string();
            let base = if cleaned.is_empty() {
                "_".to_string()
            } else {
                truncate_chars(&cleaned, MAX_WORKSHEET_NAME)
            };

            let mut name = base.clone();
            let mut suffix = 2;
            while !seen.insert(name.to_lowercase()) {
                let tail = format!(" ({suffix})");
                let room = MAX_WORKSHEET_NAME - tail.chars().count();
                name = format!("{}{tail}", truncate_chars(&base, room));
                suffix += 1;
            }
            name
        })
        .collect()
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Lay `sheets` out as the worksheets of one workbook.
///
/// The header row is bold and frozen; column widths follow the widest cell.
pub fn build_workbook(sheets: &[ProtocolSheet]) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    if sheets.is_empty() {
        workbook.add_worksheet().set_name(EMPTY_WORKSHEET_NAME)?;
        return Ok(workbook);
    }

    for (sheet, name) in sheets.iter().zip(worksheet_names(sheets)) {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;

        for (col, title) in sheet.header.iter().enumerate() {
            worksheet.write_string_with_format(0, column(col)?, title, &header_format)?;
        }
        for (row_index, row) in sheet.rows.iter().enumerate() {
            let row_number = u32::try_from(row_index + 1)
                .map_err(|_| ProtocolError::Config(format!("too many rows in {}", sheet.name)))?;
            for (col, cell) in row.iter().enumerate() {
                worksheet.write_string(row_number, column(col)?, cell)?;
            }
        }

        for (col, width) in crate::text::column_widths(sheet).into_iter().enumerate() {
            worksheet.set_column_width(column(col)?, (width + 2) as f64)?;
        }
        worksheet.set_freeze_panes(1, 0)?;
    }

    Ok(workbook)
}

fn column(index: usize) -> Result<u16> {
    u16::try_from(index)
        .map_err(|_| ProtocolError::Config(format!("column {index} is out of range")))
}

/// Write all sheets as one workbook at `<dir>/<stem>.xlsx` and return its path.
pub fn write_workbook(
    sheets: &[ProtocolSheet],
    dir: &Path,
    stem: &str,
    names: &mut OutputNames,
) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    let path = names.claim(dir, stem, "xlsx");
    let mut workbook = build_workbook(sheets)?;
    let bytes = workbook.save_to_buffer()?;
    create_file(&path)?.write_all(&bytes)?;

    info!(
        "Wrote protocol workbook {} ({} worksheets)",
        path.display(),
        sheets.len().max(1)
    );
    Ok(path)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sheet(name: &str, cell: &str) -> ProtocolSheet {
        ProtocolSheet {
            name: name.to_string(),
            header: vec!["#".to_string()],
            rows: vec![vec![cell.to_string()]],
        }
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|w| w == needle.as_bytes())
    }

    // ── OutputNames ───────────────────────────────────────────────────────────

    #[test]
    fn test_claim_adds_suffix_on_repeat() {
        let mut names = OutputNames::new();
        let dir = Path::new("/out");
        assert_eq!(names.claim(dir, "heat", "csv"), dir.join("heat.csv"));
        assert_eq!(names.claim(dir, "heat", "csv"), dir.join("heat-2.csv"));
        assert_eq!(names.claim(dir, "heat", "csv"), dir.join("heat-3.csv"));
        assert_eq!(names.claim(dir, "heat", "xlsx"), dir.join("heat.xlsx"));
    }

    #[test]
    fn test_claim_ignores_case() {
        let mut names = OutputNames::new();
        let dir = Path::new("/out");
        names.claim(dir, "round1-Pro", "csv");
        assert_eq!(
            names.claim(dir, "round1-PRO", "csv"),
            dir.join("round1-PRO-2.csv")
        );
    }

    // ── CSV ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_write_sheet_csv() {
        let sheet = ProtocolSheet {
            name: "Open".to_string(),
            header: vec!["#".to_string(), "Пилот".to_string()],
            rows: vec![vec!["1".to_string(), "Ivan, Jr.".to_string()]],
        };
        let mut buf = Vec::new();
        write_sheet(&sheet, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "#,Пилот\n1,\"Ivan, Jr.\"\n");
    }

    #[test]
    fn test_write_csv_sheets_file_names() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out");
        let sheets = vec![sheet("Pro", "A"), sheet("Спорт 1", "B")];
        let paths = write_csv_sheets(&sheets, &out, "round1", &mut OutputNames::new()).unwrap();
        assert_eq!(paths[0], out.join("round1-Pro.csv"));
        assert_eq!(paths[1], out.join("round1-Спорт_1.csv"));
        assert!(paths.iter().all(|p| p.exists()));
    }

    #[test]
    fn test_classes_with_same_file_name_do_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let sheets = vec![sheet("Street/Stock", "A"), sheet("Street Stock", "B")];
        let paths =
            write_csv_sheets(&sheets, dir.path(), "round1", &mut OutputNames::new()).unwrap();

        assert_eq!(paths[0], dir.path().join("round1-Street_Stock.csv"));
        assert_eq!(paths[1], dir.path().join("round1-Street_Stock-2.csv"));
        assert_eq!(std::fs::read_to_string(&paths[0]).unwrap(), "#\nA\n");
        assert_eq!(std::fs::read_to_string(&paths[1]).unwrap(), "#\nB\n");
    }

    #[test]
    fn test_exports_with_same_stem_do_not_overwrite() {
        let dir = TempDir::new().unwrap();
        let mut names = OutputNames::new();
        let day1 = write_csv_sheets(&[sheet("Pro", "day1")], dir.path(), "heat", &mut names).unwrap();
        let day2 = write_csv_sheets(&[sheet("Pro", "day2")], dir.path(), "heat", &mut names).unwrap();

        assert_ne!(day1[0], day2[0]);
        assert_eq!(std::fs::read_to_string(&day1[0]).unwrap(), "#\nday1\n");
        assert_eq!(std::fs::read_to_string(&day2[0]).unwrap(), "#\nday2\n");
    }

    #[test]
    fn test_sanitize_keeps_unicode_letters() {
        assert_eq!(sanitize_file_component("Спорт 1"), "Спорт_1");
        assert_eq!(sanitize_file_component(""), "_");
    }

    // ── Workbook ──────────────────────────────────────────────────────────────

    #[test]
    fn test_worksheet_names_replace_forbidden_characters() {
        let sheets = vec![sheet("Street/Stock", "A"), sheet("[Pro]:1", "B")];
        assert_eq!(worksheet_names(&sheets), vec!["Street_Stock", "_Pro__1"]);
    }

    #[test]
    fn test_worksheet_names_truncate_and_dedupe() {
        let long = "A".repeat(40);
        let sheets = vec![
            sheet(&long, "1"),
            sheet(&long, "2"),
            sheet("Pro", "3"),
            sheet("PRO", "4"),
        ];
        let names = worksheet_names(&sheets);
        assert_eq!(names[0], "A".repeat(31));
        assert_eq!(names[1], format!("{} (2)", "A".repeat(27)));
        assert_eq!(names[2], "Pro");
        assert_eq!(names[3], "PRO (2)");
        assert!(names.iter().all(|n| n.chars().count() <= MAX_WORKSHEET_NAME));
    }

    #[test]
    fn test_build_workbook_one_worksheet_per_class() {
        let sheets = vec![sheet("Pro", "A"), sheet("Street", "B")];
        let bytes = build_workbook(&sheets).unwrap().save_to_buffer().unwrap();

        assert_eq!(&bytes[..2], b"PK");
        assert!(contains(&bytes, "xl/worksheets/sheet1.xml"));
        assert!(contains(&bytes, "xl/worksheets/sheet2.xml"));
        assert!(!contains(&bytes, "xl/worksheets/sheet3.xml"));
    }

    #[test]
    fn test_build_workbook_without_classes_has_placeholder_sheet() {
        let bytes = build_workbook(&[]).unwrap().save_to_buffer().unwrap();
        assert!(contains(&bytes, "xl/worksheets/sheet1.xml"));
        assert!(!contains(&bytes, "xl/worksheets/sheet2.xml"));
    }

    #[test]
    fn test_write_workbook_unique_per_export() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("protocols");
        let mut names = OutputNames::new();
        let sheets = vec![sheet("Pro", "A")];

        let first = write_workbook(&sheets, &out, "heat", &mut names).unwrap();
        let second = write_workbook(&sheets, &out, "heat", &mut names).unwrap();

        assert_eq!(first, out.join("heat.xlsx"));
        assert_eq!(second, out.join("heat-2.xlsx"));
        let bytes = std::fs::read(&first).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }
}
