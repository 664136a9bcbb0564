use crate::infra::{field_officer, file_service, operator, parse_year, InMemoryBusinessRepository};
use chrono::{Datelike, Utc};
use clap::Args;
use siantar_geotag::config::AppConfig;
use siantar_geotag::error::AppError;
use siantar_geotag::registry::{
    AnalyticsSnapshot, AuditReport, Business, CategoryCount, FilterCriteria, ImportSummary,
    RegistryService, RepositoryError,
};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct StoreArgs {
    /// Registry data file (defaults to APP_DATA_PATH)
    #[arg(long)]
    pub(crate) data: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct StatsArgs {
    #[command(flatten)]
    pub(crate) store: StoreArgs,
    /// Reporting year for the founding-year window (defaults to this year)
    #[arg(long, value_parser = parse_year)]
    pub(crate) year: Option<i32>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    #[command(flatten)]
    pub(crate) store: StoreArgs,
    /// Destination CSV file; stdout when omitted
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct ImportArgs {
    #[command(flatten)]
    pub(crate) store: StoreArgs,
    /// Survey sheet to register
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Field officer credited with the imported records
    #[arg(long)]
    pub(crate) user: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting year for the analytics section (defaults to this year)
    #[arg(long, value_parser = parse_year)]
    pub(crate) year: Option<i32>,
}

pub(crate) fn run_audit(args: StoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = file_service(&config, args.data);
    let report = service.audit(&operator())?;
    render_audit(&report);
    Ok(())
}

pub(crate) fn run_stats(args: StatsArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = file_service(&config, args.store.data);
    let year = args.year.unwrap_or_else(|| Utc::now().year());
    let snapshot = service.analytics(&operator(), year)?;
    render_analytics(&snapshot);
    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = file_service(&config, args.store.data);

    match args.out {
        Some(path) => {
            let file = BufWriter::new(File::create(&path)?);
            let written = service.export_csv(&operator(), file)?;
            println!("Exported {written} businesses to {}", path.display());
        }
        None => {
            service.export_csv(&operator(), io::stdout().lock())?;
        }
    }
    Ok(())
}

pub(crate) fn run_import(args: ImportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let service = file_service(&config, args.store.data);
    let sheet = File::open(&args.csv)?;
    let summary = service.import_csv(&field_officer(&args.user), sheet, Utc::now())?;
    render_import(&summary);
    Ok(())
}

const DEMO_REGISTRY: &str = include_str!("../fixtures/demo_registry.json");

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let year = args.year.unwrap_or_else(|| Utc::now().year());
    let records: Vec<Business> =
        serde_json::from_str(DEMO_REGISTRY).map_err(RepositoryError::from)?;
    let service = RegistryService::new(
        Arc::new(InMemoryBusinessRepository::seeded(records)),
        Default::default(),
    );
    let admin = operator();

    println!("Business registry demo ({} sample records)", service.list(&admin)?.len());

    let searches = [
        ("text 'toko'", FilterCriteria::text("toko")),
        ("district Siantar Barat", FilterCriteria::district("Siantar Barat")),
        (
            "district Siantar Timur, sub-district Toba",
            FilterCriteria::district("Siantar Timur").with_sub_district("Toba"),
        ),
    ];
    println!("\nSearch");
    for (label, criteria) in &searches {
        let hits = service.search(&admin, criteria)?;
        let names: Vec<&str> = hits.iter().map(|business| business.legal_name.as_str()).collect();
        println!("- {label}: {} match(es) {}", hits.len(), names.join(", "));
    }

    println!();
    render_audit(&service.audit(&admin)?);
    println!();
    render_analytics(&service.analytics(&admin, year)?);
    Ok(())
}

fn render_audit(report: &AuditReport) {
    println!("Data-quality audit");
    println!(
        "- {} records | {} complete | {} with missing fields | {} possible duplicates",
        report.total,
        report.complete(),
        report.missing.len(),
        report.duplicates.len()
    );
    if report.is_clean() {
        println!("- No findings");
        return;
    }

    if !report.missing.is_empty() {
        println!("Missing fields:");
        for entry in &report.missing {
            println!(
                "  - {} ({}): {}",
                entry.id,
                display_name(&entry.business_name),
                entry.fields.join(", ")
            );
        }
    }
    if !report.duplicates.is_empty() {
        println!("Possible duplicates (same name and address):");
        for entry in &report.duplicates {
            println!("  - {}: {} @ {}", entry.id, entry.name, entry.address);
        }
    }
}

fn render_analytics(snapshot: &AnalyticsSnapshot) {
    println!("Registry analytics (reporting year {})", snapshot.current_year);
    println!(
        "- {} businesses | {} of {} districts active | {} sub-districts active",
        snapshot.total,
        snapshot.active_districts,
        snapshot.by_district.len(),
        snapshot.active_sub_districts
    );

    render_counts("Businesses per district:", &snapshot.by_district);
    render_counts("Busiest sub-districts:", &snapshot.top_sub_districts);

    if let (Some(first), Some(last)) = (
        snapshot.founding_years.first(),
        snapshot.founding_years.last(),
    ) {
        println!("Founded per year ({}-{}):", first.year, last.year);
        for entry in &snapshot.founding_years {
            println!("  - {}: {}", entry.year, entry.count);
        }
    }

    render_counts("Network type:", &snapshot.network.entries());
}

fn render_counts(title: &str, counts: &[CategoryCount]) {
    println!("{title}");
    for entry in counts {
        println!("  - {}: {}", entry.name, entry.count);
    }
}

fn render_import(summary: &ImportSummary) {
    println!(
        "Imported {} businesses, rejected {} rows",
        summary.accepted.len(),
        summary.rejected.len()
    );
    for row in &summary.rejected {
        println!("  - row {}: {}", row.line, row.reason);
        for field in row.fields.fields() {
            for message in row.fields.messages(field) {
                println!("      {field}: {message}");
            }
        }
    }
}

fn display_name(name: &str) -> &str {
    if name.trim().is_empty() {
        "unnamed"
    } else {
        name
    }
}
