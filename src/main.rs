mod app;
mod state;
mod ui;

use std::io::Write;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use eframe::egui;

use app::ToxViewApp;
use state::AppState;
use toxview::cli::{Args, Command};
use toxview::config::AppConfig;
use toxview::data::filter::{FilterRequest, FilterableColumn};
use toxview::data::service::QueryService;
use toxview::data::source::SourceConfig;

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);

    match args.command {
        None => run_gui(&config.source),
        Some(Command::Export {
            column,
            pattern,
            output,
        }) => run_export(&config.source, column, pattern, output.as_deref()),
        Some(Command::Values { column }) => run_values(&config.source, &column),
    }
}

fn run_gui(source: &SourceConfig) -> Result<()> {
    let source = source.validate().context("invalid source configuration")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ToxView – PFASTox Database",
        options,
        Box::new(move |_cc| Ok(Box::new(ToxViewApp::new(AppState::new(source))))),
    )
    .map_err(|e| anyhow!("GUI error: {e}"))
}

fn run_export(
    source: &SourceConfig,
    column: FilterableColumn,
    pattern: String,
    output: Option<&Path>,
) -> Result<()> {
    if pattern.is_empty() {
        bail!("--pattern must not be empty");
    }
    let service = QueryService::new(source)?;
    let out = service.run(&FilterRequest::new(column, pattern))?;
    let (Some(matched), Some(csv)) = (out.matched, out.csv) else {
        bail!("no filter was applied");
    };
    log::info!("{matched} of {} records matched", out.total);

    match output {
        Some(path) => std::fs::write(path, &csv)
            .with_context(|| format!("writing {}", path.display()))?,
        None => std::io::stdout()
            .lock()
            .write_all(&csv)
            .context("writing to stdout")?,
    }
    Ok(())
}

fn run_values(source: &SourceConfig, column: &str) -> Result<()> {
    let service = QueryService::new(source)?;
    let dataset = service.load()?;
    let values = service.distinct_values(&dataset, column)?;

    let mut stdout = std::io::stdout().lock();
    for value in values {
        writeln!(stdout, "{value}").context("writing to stdout")?;
    }
    Ok(())
}
