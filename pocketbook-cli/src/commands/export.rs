//! Export command - write every table as CSV

use std::path::PathBuf;

use anyhow::Result;
use pocketbook_core::services::export::BUNDLE_FILE_NAME;
use pocketbook_core::LogEvent;

use super::{get_context, get_logger, log_event};
use crate::output;

const ZIP_FILE_NAME: &str = "finance_export.zip";

pub async fn run(zip: bool, output_path: Option<PathBuf>, json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("export"));
    let ctx = get_context(&logger)?;

    let path = output_path.unwrap_or_else(|| {
        PathBuf::from(if zip { ZIP_FILE_NAME } else { BUNDLE_FILE_NAME })
    });

    let result = if zip {
        ctx.export_service.export_zip(&ctx.session, &path).await?
    } else {
        ctx.export_service.export_text(&ctx.session, &path).await?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        output::success(&format!(
            "Exported {} row(s) in {} table(s) to {}",
            result.rows,
            result.sections,
            result.path.display()
        ));
    }
    Ok(())
}
