use crate::commands::{print_json, Context};
use crate::util::{format_timestamp_datetime, now_utc, render_results_table};
use anyhow::{Context as _, Result};
use clap::Args;
use panelcount_core::ProcessingSession;
use panelcount_sync::load_session;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct CountArgs {
    /// CSV, XLSX or XLS export with name, number and user columns
    pub file: PathBuf,
}

pub fn count(ctx: &Context<'_>, args: CountArgs) -> Result<()> {
    let session = process_file(&args.file)?;
    if ctx.json {
        return print_json(&session);
    }
    print_session(&session);
    Ok(())
}

pub fn process_file(path: &Path) -> Result<ProcessingSession> {
    load_session(path, now_utc()).with_context(|| format!("process {}", path.display()))
}

pub fn print_session(session: &ProcessingSession) {
    let aggregation = &session.aggregation;
    println!(
        "{} ({}, processed {}): {} rows read, {} skipped",
        session.file_name,
        session.format.label(),
        format_timestamp_datetime(session.processed_at),
        session.rows_read,
        aggregation.skipped_rows
    );
    if session.is_empty() {
        println!("No contacts found.");
        return;
    }
    print!("{}", render_results_table(session.results()));
    println!("Total users: {}", aggregation.total_users);
    println!("Unique numbers: {}", aggregation.total_contacts_all);
}
