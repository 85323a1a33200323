// RegSift - main.rs
//
// Command-line entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and logging initialisation (debug mode support)
// 3. Dataset loading, querying and rendering
// 4. Annotation and preference updates

use regsift::app::annotations::AnnotationStore;
use regsift::app::loader::{build_registry, load_source, resolve_source};
use regsift::app::session::{Locale, Preferences, ViewMode};
use regsift::app::state::{AppState, LoadStatus};
use regsift::core::annotation::{AnnotationLookup, AnnotationPatch, InteractionStatus};
use regsift::core::discovery::{DatasetEntry, DatasetSource};
use regsift::core::export::{export_csv, export_json};
use regsift::core::filter::{FilterState, RangeFilter, TriState};
use regsift::core::model::FinancialField;
use regsift::core::query::resolve;
use regsift::core::sort::SortSpec;
use regsift::platform::config::{load_config, AppConfig, PlatformPaths};
use regsift::platform::fs::FileKvStore;
use regsift::platform::http::HttpClient;
use regsift::ui::render::{self, Layout};
use regsift::util::{self, constants, error::RegSiftError};

use clap::{Args, Parser, Subcommand};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// RegSift - search, filter, sort and annotate business-registry datasets.
///
/// Datasets are JSON documents (one object or an array) or line-delimited
/// JSON, read from a file, a URL, or a registered dataset name.
#[derive(Parser, Debug)]
#[command(name = "RegSift", version, about)]
struct Cli {
    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    /// Keep config, annotations, preferences and datasets under this directory.
    #[arg(long = "data-dir", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load a dataset and print the visible companies.
    List(ListArgs),

    /// Print the SNI and category vocabularies of a dataset.
    Facets {
        /// Dataset name, file path or URL.
        dataset: String,
    },

    /// Set status, comment or favorite for an organisation number.
    Annotate(AnnotateArgs),

    /// List registered datasets.
    Datasets,

    /// Show or change view mode and locale.
    Prefs(PrefsArgs),
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Dataset name, file path or URL.
    dataset: String,

    /// Case-insensitive substring of name or city, or part of the org number.
    #[arg(short = 's', long = "search", default_value = "")]
    search: String,

    #[arg(long)]
    min_revenue: Option<f64>,
    #[arg(long)]
    max_revenue: Option<f64>,
    /// Minimum profit after financial items.
    #[arg(long)]
    min_profit: Option<f64>,
    /// Maximum profit after financial items.
    #[arg(long)]
    max_profit: Option<f64>,
    #[arg(long)]
    min_net_profit: Option<f64>,
    #[arg(long)]
    max_net_profit: Option<f64>,
    #[arg(long)]
    min_assets: Option<f64>,
    #[arg(long)]
    max_assets: Option<f64>,

    /// Company phone present: any, yes or no.
    #[arg(long, default_value = "any")]
    company_phone: TriState,
    /// Any board member phone present: any, yes or no.
    #[arg(long, default_value = "any")]
    board_phone: TriState,
    #[arg(long, default_value = "any")]
    f_skatt: TriState,
    #[arg(long, default_value = "any")]
    vat: TriState,
    #[arg(long, default_value = "any")]
    employer: TriState,

    /// SNI description line to accept (repeatable).
    #[arg(long = "sni")]
    sni: Vec<String>,
    /// Category label to accept (repeatable).
    #[arg(long = "category")]
    categories: Vec<String>,
    /// Interaction status to accept (repeatable).
    #[arg(long = "status")]
    statuses: Vec<InteractionStatus>,

    /// Only favorites.
    #[arg(long)]
    favorites: bool,
    /// Only companies marked interested or call back.
    #[arg(long)]
    follow_ups: bool,

    /// Sort as <key>-<asc|desc>; keys: name, revenue,
    /// profit_after_financial_items, net_profit, total_assets, date.
    #[arg(long, default_value = constants::DEFAULT_SORT)]
    sort: SortSpec,

    /// Render at most this many companies.
    #[arg(long)]
    limit: Option<usize>,

    /// Layout override: grid or list.
    #[arg(long)]
    view: Option<ViewMode>,

    /// Also write the visible companies to a CSV file.
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// Also write the visible companies to a JSON file.
    #[arg(long)]
    export_json: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct AnnotateArgs {
    /// Organisation number of the company.
    org_number: String,

    #[arg(long)]
    status: Option<InteractionStatus>,

    #[arg(long)]
    comment: Option<String>,

    /// Set the favorite flag explicitly (true or false).
    #[arg(long, conflicts_with = "toggle_favorite")]
    favorite: Option<bool>,

    /// Flip the favorite flag.
    #[arg(long)]
    toggle_favorite: bool,
}

#[derive(Args, Debug)]
struct PrefsArgs {
    #[arg(long)]
    view: Option<ViewMode>,

    #[arg(long)]
    locale: Option<Locale>,
}

/// Everything resolved once at startup.
struct Context {
    paths: PlatformPaths,
    config: AppConfig,
    store: FileKvStore,
    http: HttpClient,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let paths = match cli.data_dir.clone() {
        Some(dir) => PlatformPaths::rooted_at(dir),
        None => PlatformPaths::resolve(),
    };

    // Config is read before logging so its level can take part in the
    // filter; its warnings are emitted right after.
    let (config, config_errors) = load_config(&paths.config_dir);
    util::logging::init(cli.debug, config.log_level.as_deref());
    for err in &config_errors {
        tracing::warn!(error = %err, "Config warning");
    }

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        data_dir = %paths.data_dir.display(),
        "RegSift starting"
    );

    let ctx = Context {
        store: FileKvStore::new(paths.data_dir.clone()),
        http: HttpClient::new(config.http_timeout_secs),
        paths,
        config,
    };

    match run(cli.command, &ctx) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command, ctx: &Context) -> Result<ExitCode, RegSiftError> {
    match command {
        Command::List(args) => run_list(args, ctx),
        Command::Facets { dataset } => run_facets(&dataset, ctx),
        Command::Annotate(args) => run_annotate(args, ctx),
        Command::Datasets => run_datasets(ctx),
        Command::Prefs(args) => run_prefs(args, ctx),
    }
}

// =============================================================================
// Subcommands
// =============================================================================

fn run_list(args: ListArgs, ctx: &Context) -> Result<ExitCode, RegSiftError> {
    let annotations = AnnotationStore::load(&ctx.store);
    let mut state = AppState::new();
    state.query.sort = args.sort;

    if !load_dataset(&mut state, &args.dataset, ctx, &annotations) {
        return Ok(ExitCode::FAILURE);
    }

    state.query.search = args.search.clone();
    state.query.filter = filter_from_args(&args);
    state.recompute(&annotations);

    let visible = resolve(&state.records, &state.visible);
    tracing::info!(
        total = state.records.len(),
        visible = visible.len(),
        active_filters = state.query.filter.active_count(),
        "Query applied"
    );

    if let Some(ref path) = args.export_csv {
        let writer = create_export_file(path)?;
        let count = export_csv(&visible, &annotations, writer, path)?;
        eprintln!("Exported {count} companies to {}", path.display());
    }
    if let Some(ref path) = args.export_json {
        let writer = create_export_file(path)?;
        let count = export_json(&visible, writer, path)?;
        eprintln!("Exported {count} companies to {}", path.display());
    }

    let configured_view = ctx.config.view_mode.as_deref().and_then(|v| v.parse().ok());
    let view = args.view.unwrap_or_else(|| {
        Preferences::load_or_default(&ctx.store, configured_view).view_mode
    });
    let layout = match view {
        ViewMode::Grid => Layout::Cards,
        ViewMode::List => Layout::Rows,
    };
    let max_rendered = args
        .limit
        .unwrap_or(ctx.config.max_rendered)
        .clamp(constants::MIN_MAX_RENDERED, constants::ABSOLUTE_MAX_RENDERED);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render::render_records(&mut out, &visible, &annotations, layout, max_rendered)
        .map_err(stdout_error)?;
    Ok(ExitCode::SUCCESS)
}

fn run_facets(dataset: &str, ctx: &Context) -> Result<ExitCode, RegSiftError> {
    let annotations = AnnotationStore::load(&ctx.store);
    let mut state = AppState::new();
    if !load_dataset(&mut state, dataset, ctx, &annotations) {
        return Ok(ExitCode::FAILURE);
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render::render_facets(&mut out, &state.facets).map_err(stdout_error)?;
    Ok(ExitCode::SUCCESS)
}

fn run_annotate(args: AnnotateArgs, ctx: &Context) -> Result<ExitCode, RegSiftError> {
    let org_number = args.org_number.trim();
    let mut annotations = AnnotationStore::load(&ctx.store);

    if args.toggle_favorite {
        annotations.toggle_favorite(org_number)?;
    }
    let patch = AnnotationPatch {
        status: args.status,
        comment: args.comment,
        is_favorite: args.favorite,
    };
    annotations.merge(org_number, &patch)?;

    let annotation = annotations.get(org_number);
    println!(
        "{org_number}: status={} favorite={} comment={:?}",
        annotation.status.key(),
        annotation.is_favorite,
        annotation.comment
    );
    Ok(ExitCode::SUCCESS)
}

fn run_datasets(ctx: &Context) -> Result<ExitCode, RegSiftError> {
    let (registry, warnings) = registry(ctx);
    for warning in &warnings {
        eprintln!("Warning: {warning}");
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    render::render_datasets(&mut out, &registry).map_err(stdout_error)?;
    Ok(ExitCode::SUCCESS)
}

fn run_prefs(args: PrefsArgs, ctx: &Context) -> Result<ExitCode, RegSiftError> {
    let configured_view = ctx.config.view_mode.as_deref().and_then(|v| v.parse().ok());
    let mut prefs = Preferences::load_or_default(&ctx.store, configured_view);

    if args.view.is_some() || args.locale.is_some() {
        if let Some(view) = args.view {
            prefs.view_mode = view;
        }
        if let Some(locale) = args.locale {
            prefs.locale = locale;
        }
        prefs.save(&ctx.store)?;
    }

    println!("view_mode = {}", prefs.view_mode);
    println!("locale = {}", prefs.locale);
    Ok(ExitCode::SUCCESS)
}

// =============================================================================
// Helpers
// =============================================================================

/// Resolve, read and parse a dataset into `state`. Returns false (after
/// printing the reason) when nothing usable was loaded.
fn load_dataset<A: AnnotationLookup>(
    state: &mut AppState,
    arg: &str,
    ctx: &Context,
    annotations: &A,
) -> bool {
    let source = resolve_dataset(arg, ctx);
    let ticket = state.begin_load(&source);
    let result = load_source(&source, &ctx.http);
    state.complete_load(ticket, result, annotations);

    match &state.status {
        LoadStatus::Loaded { count } => {
            tracing::debug!(count, source = %source, "Dataset ready");
            true
        }
        LoadStatus::FormatError { message } => {
            eprintln!("Could not understand '{source}': {message}");
            false
        }
        LoadStatus::ReadError { message } => {
            eprintln!("Could not read '{source}': {message}");
            false
        }
        LoadStatus::Waiting | LoadStatus::Reading { .. } => false,
    }
}

/// A URL or an existing file is used directly; anything else is looked up in
/// the registry (which may need the remote listing).
fn resolve_dataset(arg: &str, ctx: &Context) -> DatasetSource {
    match DatasetSource::parse(arg) {
        DatasetSource::File(ref path) if !path.exists() => {
            let (registry, warnings) = registry(ctx);
            for warning in &warnings {
                tracing::warn!(warning = %warning, "Dataset registry warning");
            }
            resolve_source(arg, &registry)
        }
        direct => direct,
    }
}

fn registry(ctx: &Context) -> (Vec<DatasetEntry>, Vec<String>) {
    build_registry(&ctx.config, &ctx.paths.datasets_dir, &ctx.http)
}

fn filter_from_args(args: &ListArgs) -> FilterState {
    let mut filter = if args.follow_ups {
        FilterState::follow_ups()
    } else {
        FilterState::default()
    };

    let bounds = [
        (FinancialField::Revenue, args.min_revenue, args.max_revenue),
        (
            FinancialField::ProfitAfterFinancialItems,
            args.min_profit,
            args.max_profit,
        ),
        (FinancialField::NetProfit, args.min_net_profit, args.max_net_profit),
        (FinancialField::TotalAssets, args.min_assets, args.max_assets),
    ];
    for (field, min, max) in bounds {
        *filter.ranges.get_mut(field) = RangeFilter::new(min, max);
    }

    filter.company_phone = args.company_phone;
    filter.board_phone = args.board_phone;
    filter.f_skatt = args.f_skatt;
    filter.vat_registered = args.vat;
    filter.employer_registered = args.employer;
    filter.sni.extend(args.sni.iter().cloned());
    filter.categories.extend(args.categories.iter().cloned());
    filter.statuses.extend(args.statuses.iter().copied());
    filter.favorites_only = args.favorites;
    filter
}

fn create_export_file(path: &Path) -> Result<BufWriter<std::fs::File>, RegSiftError> {
    let file = std::fs::File::create(path).map_err(|e| RegSiftError::Io {
        path: path.to_path_buf(),
        operation: "create export file",
        source: e,
    })?;
    Ok(BufWriter::new(file))
}

fn stdout_error(e: std::io::Error) -> RegSiftError {
    RegSiftError::Io {
        path: PathBuf::from("<stdout>"),
        operation: "write output",
        source: e,
    }
}
