use crate::commands::count::{print_session, process_file};
use crate::commands::{print_json, Context};
use crate::error::{invalid_input, not_found};
use anyhow::{Context as _, Result};
use clap::Args;
use panelcount_core::{CollectorEndpoint, CollectorLedger, ProcessingSession};
use panelcount_sync::{dispatch, DeliveryReport, HttpCollector, HttpOptions, MemoryCollector};
use serde::Serialize;
use std::path::PathBuf;
use tokio::runtime::{Builder, Runtime};

const ADHOC_COLLECTOR: &str = "cli";
const DRY_RUN_COLLECTOR: &str = "dry-run";

#[derive(Debug, Args)]
pub struct SendArgs {
    /// CSV, XLSX or XLS export with name, number and user columns
    pub file: PathBuf,
    /// Configured collector to send to; repeatable, defaults to all
    #[arg(long = "collector", value_name = "NAME")]
    pub collectors: Vec<String>,
    /// Send to this base URL instead of configured collectors
    #[arg(long, conflicts_with = "collectors")]
    pub url: Option<String>,
    /// Path appended to --url
    #[arg(long, requires = "url")]
    pub path: Option<String>,
    /// Apply deliveries to an in-memory collector instead of the network
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Serialize)]
struct LedgerDto {
    collector: String,
    records: CollectorLedger,
}

#[derive(Debug, Serialize)]
struct SendOutput<'a> {
    session: &'a ProcessingSession,
    deliveries: Vec<DeliveryReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ledgers: Vec<LedgerDto>,
}

pub fn send(ctx: &Context<'_>, args: SendArgs) -> Result<()> {
    let session = process_file(&args.file)?;
    let endpoints = resolve_endpoints(ctx, &args)?;
    let runtime = build_runtime()?;

    let mut deliveries = Vec::with_capacity(endpoints.len());
    let mut ledgers = Vec::new();
    if args.dry_run {
        for endpoint in &endpoints {
            let collector = MemoryCollector::with_ledger(
                endpoint.name.clone(),
                ctx.config.dispatch.origin.clone(),
                CollectorLedger::default(),
            );
            deliveries.push(runtime.block_on(dispatch(&collector, session.results())));
            ledgers.push(LedgerDto {
                collector: endpoint.name.clone(),
                records: collector.ledger(),
            });
        }
    } else {
        let options = HttpOptions {
            timeout: ctx.config.dispatch.timeout,
            user_agent: ctx.config.dispatch.user_agent.clone(),
        };
        let collectors = endpoints
            .iter()
            .map(|endpoint| {
                HttpCollector::new(endpoint, &options)
                    .with_context(|| format!("set up collector {}", endpoint.name))
            })
            .collect::<Result<Vec<_>>>()?;
        for collector in &collectors {
            deliveries.push(runtime.block_on(dispatch(collector, session.results())));
        }
    }

    if ctx.json {
        return print_json(&SendOutput {
            session: &session,
            deliveries,
            ledgers,
        });
    }

    print_session(&session);
    for report in &deliveries {
        println!();
        println!("{}", report.render());
        println!(
            "{}: {} delivered, {} failed",
            report.collector,
            report.succeeded(),
            report.failed()
        );
    }
    for ledger in &ledgers {
        println!(
            "dry run: {} would hold {} records",
            ledger.collector,
            ledger.records.len()
        );
    }
    Ok(())
}

fn resolve_endpoints(ctx: &Context<'_>, args: &SendArgs) -> Result<Vec<CollectorEndpoint>> {
    if let Some(url) = &args.url {
        let endpoint = CollectorEndpoint::new(ADHOC_COLLECTOR, url.trim(), args.path.clone())?;
        return Ok(vec![endpoint]);
    }

    if !args.collectors.is_empty() {
        return args
            .collectors
            .iter()
            .map(|name| {
                ctx.config
                    .collector(name.trim())
                    .cloned()
                    .ok_or_else(|| not_found(format!("collector {}", name.trim())))
            })
            .collect();
    }

    if !ctx.config.collectors.is_empty() {
        return Ok(ctx.config.collectors.clone());
    }
    if args.dry_run {
        return Ok(vec![CollectorEndpoint::new(
            DRY_RUN_COLLECTOR,
            "memory:",
            None,
        )?]);
    }
    Err(invalid_input(
        "no collectors configured; pass --url or add [[collectors]] to the config file",
    ))
}

fn build_runtime() -> Result<Runtime> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .with_context(|| "start async runtime")
}
