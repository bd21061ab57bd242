//! Export service - CSV sections as one text bundle or a zip archive
//!
//! Every section has an unquoted header row followed by one row per record,
//! with every field double-quoted and embedded quotes doubled. Missing
//! fields export as empty strings.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::domain::{Session, StoredRow, Table};
use crate::ports::RecordStore;

use super::logging::LogEvent;
use super::notifier::Notifier;

/// Default file name of the text bundle
pub const BUNDLE_FILE_NAME: &str = "finance_export.txt";

const RECORD_FIELDS: &[&str] = &["id", "userId", "date", "amount", "category", "note", "created_at"];
const CATEGORY_FIELDS: &[&str] = &["id", "userId", "name", "color"];
const SAVINGS_FIELDS: &[&str] = &["id", "userId", "amount", "note", "created_at"];
const RECURRING_FIELDS: &[&str] = &["id", "userId", "name", "amount", "type", "interval", "created_at"];

/// Tables included in an export, in output order
pub const EXPORT_TABLES: [Table; 6] = [
    Table::Expenses,
    Table::Income,
    Table::Categories,
    Table::Savings,
    Table::Recurring,
    Table::Sales,
];

/// Column order of a table's CSV section
pub fn export_fields(table: Table) -> &'static [&'static str] {
    match table {
        Table::Expenses | Table::Income | Table::Sales => RECORD_FIELDS,
        Table::Categories => CATEGORY_FIELDS,
        Table::Savings => SAVINGS_FIELDS,
        Table::Recurring => RECURRING_FIELDS,
        Table::Budgets => &["id", "userId", "amount", "updated_at"],
    }
}

/// One table rendered as CSV
#[derive(Debug, Clone)]
pub struct ExportSection {
    pub table: Table,
    pub rows: usize,
    pub csv: String,
}

impl ExportSection {
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.table)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub path: PathBuf,
    pub sections: usize,
    pub rows: usize,
}

/// Render rows as CSV text without a trailing newline
pub fn to_csv(rows: &[StoredRow], fields: &[&str]) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    for row in rows {
        writer.write_record(fields.iter().map(|f| row.field_text(f)))?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV: {}", e))?;
    let body = String::from_utf8(body).context("CSV output is not UTF-8")?;

    let mut out = fields.join(",");
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body.trim_end_matches('\n'));
    }
    Ok(out)
}

/// Join sections as `--- <table>.csv ---` blocks separated by a blank line
pub fn render_bundle(sections: &[ExportSection]) -> String {
    sections
        .iter()
        .map(|s| format!("--- {} ---\n{}", s.file_name(), s.csv))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Write through a temp file in the target directory so a failed export
/// never leaves a truncated file behind
fn write_atomically(path: &Path, write: impl FnOnce(&mut NamedTempFile) -> Result<()>) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(&dir)?;
    write(&mut tmp)?;
    tmp.persist(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

pub struct ExportService {
    store: Arc<dyn RecordStore>,
    notifier: Notifier,
}

impl ExportService {
    pub fn new(store: Arc<dyn RecordStore>, notifier: Notifier) -> Self {
        Self { store, notifier }
    }

    /// Read every exported table of the session user
    pub async fn sections(&self, session: &Session) -> Result<Vec<ExportSection>> {
        let mut sections = Vec::with_capacity(EXPORT_TABLES.len());
        for table in EXPORT_TABLES {
            let mut rows = self
                .store
                .get_all_by_user(table, session.user_id())
                .await
                .with_context(|| format!("Failed to read {}", table))?;
            // Stable output: oldest first, ties by id
            rows.sort_by(|a, b| {
                a.field_text("created_at")
                    .cmp(&b.field_text("created_at"))
                    .then_with(|| a.id.cmp(&b.id))
            });
            sections.push(ExportSection {
                table,
                rows: rows.len(),
                csv: to_csv(&rows, export_fields(table))?,
            });
        }
        Ok(sections)
    }

    /// Write the text bundle to `path`
    pub async fn export_text(&self, session: &Session, path: &Path) -> Result<ExportResult> {
        let sections = self.sections(session).await?;
        let bundle = render_bundle(&sections);

        write_atomically(path, |file| {
            file.write_all(bundle.as_bytes())?;
            Ok(())
        })?;

        Ok(self.finish(path, &sections, "text"))
    }

    /// Write each section as `<table>.csv` inside a zip archive at `path`
    pub async fn export_zip(&self, session: &Session, path: &Path) -> Result<ExportResult> {
        let sections = self.sections(session).await?;

        write_atomically(path, |file| {
            let mut zip = ZipWriter::new(file.as_file_mut());
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
            for section in &sections {
                zip.start_file(section.file_name(), options)?;
                zip.write_all(section.csv.as_bytes())?;
            }
            zip.finish()?;
            Ok(())
        })?;

        Ok(self.finish(path, &sections, "zip"))
    }

    fn finish(&self, path: &Path, sections: &[ExportSection], format: &str) -> ExportResult {
        let rows: usize = sections.iter().map(|s| s.rows).sum();
        self.notifier.log(LogEvent::new("export_created"));
        self.notifier.notify(
            "export_created",
            json!({ "format": format, "sections": sections.len(), "rows": rows }),
        );
        ExportResult {
            path: path.to_path_buf(),
            sections: sections.len(),
            rows,
        }
    }
}
