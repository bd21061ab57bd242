//! Status command - who is acting and what is stored locally

use anyhow::Result;
use colored::Colorize;
use pocketbook_core::{IdentitySource, LogEvent};

use super::{get_context, get_logger, log_event};
use crate::output::create_table;

pub fn run(json: bool) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("command_executed").with_command("status"));
    let ctx = get_context(&logger)?;
    let status = ctx.status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Pocketbook Status".bold());
    println!();

    let source = match status.identity_source {
        IdentitySource::Host => "host",
        IdentitySource::Local => "local",
    };
    println!("User: {} ({})", status.user_id, source);
    println!("Database: {} (schema v{})", status.database, status.schema_version);
    match &status.remote {
        Some(name) => println!("Remote mirror: {}", name.green()),
        None => println!("Remote mirror: {}", "off".dimmed()),
    }
    println!();

    let mut table = create_table();
    table.set_header(vec!["Table", "Local rows"]);
    for count in &status.tables {
        table.add_row(vec![count.table.clone(), count.local_rows.to_string()]);
    }
    println!("{}", table);

    if status.remote.is_some() {
        println!(
            "{}",
            "Rows saved while the remote was reachable live remotely and are not counted here."
                .dimmed()
        );
    }

    Ok(())
}
