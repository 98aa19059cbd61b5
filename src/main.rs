use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use defect_ledger::{
    logging, records_from_json, records_to_json, vendor_repair_rates, Aggregator, DefectRecord,
    IngestReport, Ingestor, LedgerConfig, StatusClassifier,
};

/// Defect ledger: ingest vendor defect sheets, classify records, summarize.
#[derive(Parser)]
#[command(name = "defect-ledger", version, about)]
struct Cli {
    /// Keyword/threshold overrides (TOML). Built-in defaults when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest a defect CSV export.
    Ingest {
        /// CSV file (first row is the header)
        csv: PathBuf,

        /// Write accepted records as JSON
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write the skip ledger as CSV
        #[arg(long)]
        skips: Option<PathBuf>,
    },

    /// Dashboard totals and the vendor repair-rate board.
    Dashboard {
        /// Records JSON written by `ingest --out`
        records: PathBuf,

        /// Print as JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Status label of every record.
    Status {
        /// Records JSON written by `ingest --out`
        records: PathBuf,
    },
}

fn main() -> Result<()> {
    logging::init();

    let cli = Cli::parse();
    let config = LedgerConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load config")?;

    match cli.command {
        Commands::Ingest { csv, out, skips } => {
            run_ingest(&config, &csv, out.as_deref(), skips.as_deref())
        }
        Commands::Dashboard { records, json } => run_dashboard(&config, &records, json),
        Commands::Status { records } => run_status(&config, &records),
    }
}

fn run_ingest(config: &LedgerConfig, csv_path: &Path, out: Option<&Path>, skips: Option<&Path>) -> Result<()> {
    println!("📂 Ingesting {}", csv_path.display());

    let text = fs::read_to_string(csv_path)
        .with_context(|| format!("Failed to read {}", csv_path.display()))?;

    let today = Local::now().date_naive();
    let mut report = Ingestor::from_config(config, today).ingest(&text);
    for record in report.accepted_records.iter_mut() {
        record.assign_id();
    }

    println!("✓ {}", report.summary());

    let batch_size = config.thresholds.batch_size;
    let batches = report.batches(batch_size).count();
    info!(batches = batches, batch_size = batch_size, "records ready for storage");

    if let Some(path) = out {
        let json = records_to_json(&report.accepted_records)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("💾 {} records → {} ({} batches)", report.accepted_count(), path.display(), batches);
    }

    if let Some(path) = skips {
        write_skip_ledger(&report, path)?;
        println!("📝 {} skipped rows → {}", report.skip_ledger.len(), path.display());
    }

    Ok(())
}

fn write_skip_ledger(report: &IngestReport, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    writer.write_record(["line", "reason", "label", "content"])?;
    for entry in &report.skip_ledger {
        writer.write_record([
            entry.line_number.to_string().as_str(),
            entry.reason.code(),
            entry.reason.label(),
            entry.raw_content.as_str(),
        ])?;
    }
    writer.flush()?;

    Ok(())
}

fn load_records(path: &Path) -> Result<Vec<DefectRecord>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    records_from_json(&content)
        .with_context(|| format!("Failed to parse records in {}", path.display()))
}

fn run_dashboard(config: &LedgerConfig, path: &Path, as_json: bool) -> Result<()> {
    let records = load_records(path)?;
    let now = Local::now().naive_local();

    let aggregator = Aggregator::from_config(config);
    let summary = aggregator.summarize(&records, now);
    let board = vendor_repair_rates(&records, &aggregator);

    if as_json {
        let out = serde_json::json!({
            "summary": summary,
            "vendors": board,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("📊 {}", summary.summary());
    println!(
        "   total cost {:.0}, self repair {}, undeducted repair {}",
        summary.total_cost, summary.self_repair_quantity, summary.undeducted_repair_quantity
    );
    println!();
    println!("🏭 Vendor repair rates");
    for stat in &board {
        println!(
            "   {:<20} {:>5} received {:>5} repaired {:>4}%  deducted {:.0}",
            stat.vendor, stat.total, stat.completed, stat.rate, stat.deducted_amount
        );
    }

    Ok(())
}

fn run_status(config: &LedgerConfig, path: &Path) -> Result<()> {
    let records = load_records(path)?;
    let now = Local::now().naive_local();
    let classifier = StatusClassifier::from_config(config);

    for record in &records {
        println!(
            "{:<36}  {:<8}  {:<12}  {}  {}",
            record.id.as_deref().unwrap_or("-"),
            classifier.classify(record, now).label(),
            record.check_date,
            record.vendor,
            record.product_name
        );
    }

    Ok(())
}
