use crate::commands::{
    run_audit, run_demo, run_export, run_import, run_stats, DemoArgs, ExportArgs, ImportArgs,
    StatsArgs, StoreArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use siantar_geotag::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Siantar Geotag",
    about = "Serve and inspect the Pematang Siantar business geotagging registry",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Report records with missing fields and possible duplicates
    Audit(StoreArgs),
    /// Print the analytics dashboard series
    Stats(StatsArgs),
    /// Write every record as CSV
    Export(ExportArgs),
    /// Register the rows of a survey sheet
    Import(ImportArgs),
    /// Walk through filtering, audit, and analytics on a bundled sample registry
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Audit(args) => run_audit(args),
        Command::Stats(args) => run_stats(args),
        Command::Export(args) => run_export(args),
        Command::Import(args) => run_import(args),
        Command::Demo(args) => run_demo(args),
    }
}
