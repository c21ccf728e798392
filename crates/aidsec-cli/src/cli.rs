#![forbid(unsafe_code)]

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use aidsec_core::{AggregateSpec, GroupBy, RowFilter, ValueSpec, aggregate};
use aidsec_core::words::COUNT_FIELD;
use aidsec_render::JsonLinesRenderer;
use aidsec_runtime::{
    DirectLoader, EventOutcome, ListenerAction, Loader, Page, PageConfig, SharedLoader, UiEvent,
    WidgetStatus,
};
use aidsec_widgets::{catalog, security_incidents_page};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use crate::error::{CliError, Result};
use crate::logging;
use crate::source::open_source;

/// Widget driven by the `scroll` command.
pub const SCROLL_WIDGET: &str = "total-incidents";

/// Exit code when the data produced nothing to show.
const NO_DATA_EXIT: i32 = 3;

#[derive(Debug, Parser)]
#[command(
    name = "aidsec",
    about = "Headless host for the humanitarian security incidents page",
    version
)]
pub struct Cli {
    /// Page configuration file (TOML, or JSON with a .json extension).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Write logs as JSON lines on stderr.
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize every widget and write its frames as JSON lines.
    Render(RenderArgs),

    /// Reveal the incidents timeline with simulated wheel events.
    Scroll(ScrollArgs),

    /// Print grouped totals for one concept as JSON.
    Summary(SummaryArgs),

    /// Print widget ids and their containers.
    #[command(name = "list-widgets")]
    ListWidgets,

    /// Validate the configuration and its concept overrides.
    #[command(name = "check-config")]
    CheckConfig,
}

#[derive(Debug, Clone, Default, Args)]
pub struct DataArgs {
    /// CSV file path or http(s) URL. Overrides `data_path`.
    #[arg(long)]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Default, Args)]
pub struct OutputArgs {
    /// Write to this file instead of stdout.
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Indent JSON output.
    #[arg(long)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Default, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Select this country in every dropdown after the first draw.
    #[arg(long)]
    pub select: Option<String>,

    /// Resize every widget to this container width after the first draw.
    #[arg(long)]
    pub width: Option<f64>,
}

#[derive(Debug, Clone, Args)]
pub struct ScrollArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Wheel delta per event. Negative scrolls back.
    #[arg(long, default_value_t = 40.0, allow_negative_numbers = true)]
    pub delta: f64,

    /// Stop after this many wheel events even if scrolling never releases.
    #[arg(long = "max-events", default_value_t = 1000, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_events: u32,
}

#[derive(Debug, Clone, Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    /// Concept to group by.
    #[arg(long, default_value = "country")]
    pub group: String,

    /// Treat the group key as a year (applies `year_cap`).
    #[arg(long)]
    pub by_year: bool,

    /// Concepts to sum per group, besides the row count.
    #[arg(long = "sum")]
    pub sums: Vec<String>,

    /// Keep only the largest groups by row count.
    #[arg(long)]
    pub top: Option<usize>,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_json);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();
    match cli.command {
        Commands::Render(args) => run_render(load_config(config)?, &args),
        Commands::Scroll(args) => run_scroll(load_config(config)?, &args),
        Commands::Summary(args) => run_summary(load_config(config)?, &args),
        Commands::ListWidgets => list_widgets(&mut std::io::stdout().lock()),
        Commands::CheckConfig => check_config(config, &mut std::io::stdout().lock()),
    }
}

// ---------------------------------------------------------------------------
// Shared plumbing
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>) -> Result<PageConfig> {
    let config = match path {
        Some(path) => PageConfig::from_file(path)?,
        None => PageConfig::default(),
    };
    Ok(config.validated()?)
}

fn with_data(mut config: PageConfig, data: &DataArgs) -> PageConfig {
    if let Some(location) = &data.data {
        config.data_path.clone_from(location);
    }
    config
}

fn loader_for(config: &PageConfig) -> Result<Box<dyn Loader>> {
    let source = open_source(&config.data_path)?;
    Ok(if config.shared_loader {
        Box::new(SharedLoader::new(source))
    } else {
        Box::new(DirectLoader::new(source))
    })
}

fn build_page(config: PageConfig) -> Result<Page> {
    let concepts = config.concept_table()?;
    let loader = loader_for(&config)?;
    Ok(security_incidents_page(config, concepts, loader))
}

fn open_output(output: &OutputArgs) -> Result<Box<dyn Write>> {
    Ok(match &output.out {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(std::io::stdout())),
    })
}

fn frames_renderer(output: &OutputArgs) -> Result<JsonLinesRenderer<Box<dyn Write>>> {
    Ok(JsonLinesRenderer::new(open_output(output)?).pretty(output.pretty))
}

fn finish(renderer: JsonLinesRenderer<Box<dyn Write>>) -> Result<usize> {
    let written = renderer.written();
    renderer.into_inner().flush()?;
    Ok(written)
}

// ---------------------------------------------------------------------------
// render
// ---------------------------------------------------------------------------

pub fn run_render(config: PageConfig, args: &RenderArgs) -> Result<()> {
    if let Some(width) = args.width
        && (!width.is_finite() || width <= 0.0)
    {
        return Err(CliError::invalid(format!("--width must be positive, got {width}")));
    }
    let config = with_data(config, &args.data);
    let data_path = config.data_path.clone();
    let mut page = build_page(config)?;
    let mut out = frames_renderer(&args.output)?;

    let ready = page.init(&mut out);
    if let Some(country) = &args.select {
        let redrawn = page.broadcast(&UiEvent::Select(country.clone()), &mut out);
        tracing::info!(target: "aidsec.cli", country = %country, redrawn, "selection applied");
    }
    if let Some(width) = args.width {
        page.broadcast(&UiEvent::Resize { width }, &mut out);
    }

    let written = finish(out)?;
    tracing::info!(target: "aidsec.cli", ready, frames = written, "render complete");
    if ready == 0 {
        return Err(CliError::exit(
            NO_DATA_EXIT,
            format!("no widget could be drawn from {data_path}"),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// scroll
// ---------------------------------------------------------------------------

pub fn run_scroll(config: PageConfig, args: &ScrollArgs) -> Result<()> {
    if !args.delta.is_finite() || args.delta.abs() < config.scroll.min_delta {
        return Err(CliError::invalid(format!(
            "--delta must be at least {} in magnitude, got {}",
            config.scroll.min_delta, args.delta
        )));
    }
    let config = with_data(config, &args.data);
    let mut page = build_page(config)?;
    let mut out = frames_renderer(&args.output)?;
    page.init(&mut out);

    if !page.status(SCROLL_WIDGET).is_some_and(WidgetStatus::is_ready) {
        finish(out)?;
        return Err(CliError::exit(NO_DATA_EXIT, "scroll widget has no data"));
    }
    if !matches!(
        page.dispatch(SCROLL_WIDGET, &UiEvent::Engage, &mut out)?,
        EventOutcome::Listener(ListenerAction::Attach)
    ) {
        return Err(CliError::exit(NO_DATA_EXIT, "scroll widget did not engage"));
    }

    let wheel = UiEvent::Wheel {
        delta_y: args.delta,
    };
    let mut redraws = 0_u32;
    let mut released = false;
    for _ in 0..args.max_events {
        match page.dispatch(SCROLL_WIDGET, &wheel, &mut out)? {
            EventOutcome::Redrawn => redraws += 1,
            EventOutcome::Listener(ListenerAction::Detach) => {
                page.dispatch(SCROLL_WIDGET, &UiEvent::Settle, &mut out)?;
                released = true;
                break;
            }
            _ => {}
        }
    }

    let written = finish(out)?;
    tracing::info!(target: "aidsec.cli", redraws, released, frames = written, "scroll complete");
    Ok(())
}

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct Summary<'a> {
    group: &'a str,
    fields: &'a [String],
    rows: Vec<SummaryRow<'a>>,
    stats: SummaryStats,
}

#[derive(Debug, Serialize)]
struct SummaryRow<'a> {
    key: &'a str,
    values: &'a [u64],
}

#[derive(Debug, Serialize)]
struct SummaryStats {
    rows_seen: usize,
    rows_filtered: usize,
    skipped_blank: usize,
    skipped_invalid: usize,
    skipped_reserved: usize,
    skipped_rows: usize,
    truncated_rows: usize,
}

pub fn run_summary(config: PageConfig, args: &SummaryArgs) -> Result<()> {
    let config = with_data(config, &args.data);
    let concepts = config.concept_table()?;
    for name in std::iter::once(&args.group).chain(&args.sums) {
        if concepts.get(name).is_none() {
            return Err(CliError::invalid(format!("unknown concept: {name}")));
        }
    }

    let dataset = loader_for(&config)?.load(&config.data_path)?;
    if !concepts.bind(dataset.headers()).is_bound(&args.group) {
        return Err(CliError::exit(
            NO_DATA_EXIT,
            format!("no column matches concept {}", args.group),
        ));
    }

    let group = if args.by_year {
        GroupBy::Year(args.group.clone())
    } else {
        GroupBy::Concept(args.group.clone())
    };
    let mut spec = args
        .sums
        .iter()
        .fold(AggregateSpec::by(group).value(ValueSpec::count(COUNT_FIELD)), |spec, name| {
            spec.value(ValueSpec::sum(name.as_str(), name.as_str()))
        });
    if args.by_year
        && let Some(cap) = config.year_cap
    {
        spec = spec.filter(RowFilter::year_at_most(cap));
    }
    let result = aggregate(&dataset, &concepts, &spec);

    let keys: Vec<&str> = match args.top {
        Some(n) => result.top_n(COUNT_FIELD, n).into_iter().map(|(key, _)| key).collect(),
        None => result.keys_sorted(),
    };
    let rows = keys
        .into_iter()
        .filter_map(|key| {
            result.get(key).map(|tally| SummaryRow {
                key,
                values: tally.values(),
            })
        })
        .collect();
    let stats = result.stats();
    let summary = Summary {
        group: &args.group,
        fields: result.fields(),
        rows,
        stats: SummaryStats {
            rows_seen: stats.rows_seen,
            rows_filtered: stats.rows_filtered,
            skipped_blank: stats.skipped_blank,
            skipped_invalid: stats.skipped_invalid,
            skipped_reserved: stats.skipped_reserved,
            skipped_rows: dataset.skipped_rows,
            truncated_rows: dataset.truncated_rows,
        },
    };

    let mut out = open_output(&args.output)?;
    if args.output.pretty {
        serde_json::to_writer_pretty(&mut out, &summary)?;
    } else {
        serde_json::to_writer(&mut out, &summary)?;
    }
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// list-widgets / check-config
// ---------------------------------------------------------------------------

pub fn list_widgets(out: &mut impl Write) -> Result<()> {
    for widget in catalog() {
        writeln!(out, "{}\t{}", widget.id(), widget.container())?;
    }
    Ok(())
}

pub fn check_config(path: Option<&Path>, out: &mut impl Write) -> Result<()> {
    let config = match path {
        Some(path) => PageConfig::from_file(path)?,
        None => PageConfig::default(),
    };
    let mut problems = config.validate();
    if let Err(error) = config.concept_table() {
        problems.push(error.to_string());
    }
    let label = path.map_or_else(|| "<defaults>".to_string(), |p| p.display().to_string());
    if problems.is_empty() {
        writeln!(out, "{label}: ok")?;
        return Ok(());
    }
    for problem in &problems {
        writeln!(out, "{label}: {problem}")?;
    }
    Err(CliError::exit(
        2,
        format!("{label}: {} configuration problem(s)", problems.len()),
    ))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn cli(command: Commands) -> Cli {
        Cli {
            config: None,
            log_json: false,
            command,
        }
    }

    #[test]
    fn list_widgets_prints_catalog_in_page_order() {
        let mut out = Vec::new();
        list_widgets(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let first = text.lines().next().unwrap();
        assert_eq!(first, "gender\tgender-comparison-graph");
        assert_eq!(text.lines().count(), catalog().len());
    }

    #[test]
    fn list_widgets_command_dispatches_successfully() {
        assert!(run(cli(Commands::ListWidgets)).is_ok());
    }

    #[test]
    fn default_config_checks_clean() {
        let mut out = Vec::new();
        check_config(None, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "<defaults>: ok\n");
    }

    #[test]
    fn invalid_config_reports_each_problem() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "top_locations = 0\ntop_words = 0").unwrap();
        let mut out = Vec::new();
        let error = check_config(Some(file.path()), &mut out).unwrap_err();
        assert_eq!(error.exit_code(), 2);
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }

    #[test]
    fn missing_config_file_is_config_error() {
        let result = run(Cli {
            config: Some(PathBuf::from("/nonexistent/aidsec.toml")),
            log_json: false,
            command: Commands::Render(RenderArgs::default()),
        });
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn small_scroll_delta_is_rejected() {
        let args = ScrollArgs {
            data: DataArgs::default(),
            output: OutputArgs::default(),
            delta: 1.0,
            max_events: 10,
        };
        let error = run_scroll(PageConfig::default(), &args).unwrap_err();
        assert!(matches!(error, CliError::InvalidArgument { .. }));
    }

    #[test]
    fn summary_rejects_unknown_concepts() {
        let args = SummaryArgs {
            data: DataArgs::default(),
            output: OutputArgs::default(),
            group: "planet".into(),
            by_year: false,
            sums: Vec::new(),
            top: None,
        };
        let error = run_summary(PageConfig::default(), &args).unwrap_err();
        assert_eq!(error.to_string(), "invalid argument: unknown concept: planet");
    }
}
