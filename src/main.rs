use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{ArgAction, Parser};

use dashexport::{
    Config, DashboardHost, ExportController, ExportOutcome,
    export::{ExportDependencies, file},
};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DASHEXPORT_GIT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "dashexport")]
#[command(
    version,
    long_version = LONG_VERSION,
    about = "Export dashboard layouts to PDF reports and slide decks"
)]
struct Cli {
    /// Dashboard layout file (TOML element tree)
    #[arg(
        long,
        short = 'l',
        value_name = "FILE",
        required_unless_present = "print_config"
    )]
    layout: Option<PathBuf>,

    /// Export the dashboard as a paginated PDF document
    #[arg(long, short = 'd', action = ArgAction::SetTrue)]
    document: bool,

    /// Export one slide per widget as a PowerPoint deck
    #[arg(long, short = 's', action = ArgAction::SetTrue)]
    slides: bool,

    /// Save a single element as a PNG image
    #[arg(long, value_name = "ID")]
    widget: Option<String>,

    /// File name for --widget (defaults to <ID>.png)
    #[arg(long, value_name = "FILE", requires = "widget")]
    widget_name: Option<String>,

    /// Output directory (overrides the config file)
    #[arg(long, short = 'o', value_name = "DIR")]
    out: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long, action = ArgAction::SetTrue)]
    print_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = Config::load()?;

    if cli.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    if !cli.document && !cli.slides && cli.widget.is_none() {
        bail!("Nothing to export: pass --document, --slides or --widget <ID>");
    }

    let layout = cli
        .layout
        .as_deref()
        .context("--layout is required for exports")?;
    let host = DashboardHost::from_layout_file(layout)
        .with_context(|| format!("Failed to load layout {}", layout.display()))?;

    let output_dir = match &cli.out {
        Some(dir) => file::expand_tilde(&dir.to_string_lossy()),
        None => config.output_directory(),
    };
    log::info!("Writing exports to {}", output_dir.display());

    let controller = ExportController::with_dependencies(
        host,
        config.export_settings(),
        ExportDependencies::with_output_dir(&output_dir),
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(run(&cli, &controller))
}

async fn run(cli: &Cli, controller: &ExportController) -> anyhow::Result<()> {
    let mut failed = false;

    if cli.document {
        match controller.export_as_document().await {
            Ok(outcome) => report(outcome),
            Err(e) => {
                log::error!("Document export failed: {}", e);
                failed = true;
            }
        }
    }

    if cli.slides {
        match controller.export_as_slide_deck().await {
            Ok(ExportOutcome::NoWidgets) => {
                report(ExportOutcome::NoWidgets);
                failed = true;
            }
            Ok(outcome) => report(outcome),
            Err(e) => {
                log::error!("Slide deck export failed: {}", e);
                failed = true;
            }
        }
    }

    if let Some(id) = &cli.widget {
        let filename = cli
            .widget_name
            .clone()
            .unwrap_or_else(|| format!("{id}.png"));
        match controller.export_widget_image(id, &filename).await {
            Ok(Some(path)) => println!("{}", path.display()),
            Ok(None) => {
                log::error!("Element '{}' not found", id);
                failed = true;
            }
            Err(e) => {
                log::error!("Widget export failed: {}", e);
                failed = true;
            }
        }
    }

    if failed {
        bail!("One or more exports failed");
    }
    Ok(())
}

fn report(outcome: ExportOutcome) {
    match outcome {
        ExportOutcome::Delivered(path) => println!("{}", path.display()),
        ExportOutcome::NoWidgets => eprintln!("{}", dashexport::export::NO_WIDGETS_MESSAGE),
    }
}
