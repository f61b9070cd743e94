//! Command-line client for the EduAdmin content API.
//!
//! Drives the same pager and option cache the desktop selectors use, but
//! synchronously, so list endpoints can be inspected from a shell.

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use eduadmin_client::HttpListSource;
use eduadmin_core::constants::DEFAULT_DISPLAY_FIELD;
use eduadmin_core::{
    AppError, Config, Filter, ListSource, OptionCache, OptionQuery, Pager, PagerConfig,
    PagerQuery, Record, RecordId, SortOrder, ViewMode,
};
use serde_json::Value;
use std::io;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Hard stop for `list --all` against a backend that never reports the end.
const MAX_WALK_PAGES: usize = 1_000;

#[derive(Parser)]
#[command(name = "eduadmin", about = "EduAdmin content API CLI", version)]
struct Cli {
    /// API base URL (can also be set via EDUADMIN_API_URL env var)
    #[arg(short, long, env = "EDUADMIN_API_URL")]
    server: Option<String>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    json: bool,

    /// Print timing for API requests
    #[arg(long, global = true)]
    timing: bool,

    /// Request timeout in seconds
    #[arg(short = 't', long)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
    /// Page through a resource the way a modal selector does
    List(ListArgs),
    /// Load dropdown options once, keeping the given ids visible
    Options(OptionsArgs),
}

#[derive(Args)]
struct ListArgs {
    resource: String,
    /// Filter as key=value; values that parse as JSON keep their type
    #[arg(short, long = "filter", value_parser = parse_filter_pair)]
    filters: Vec<(String, Value)>,
    /// Free-text search
    #[arg(short = 'q', long)]
    search: Option<String>,
    /// Only records owned by this user, as field=id
    #[arg(long, value_parser = parse_filter_pair)]
    owner: Option<(String, Value)>,
    #[arg(long, default_value = "id")]
    sort: String,
    /// Sort ascending instead of newest first
    #[arg(long)]
    asc: bool,
    #[arg(long)]
    per_page: Option<usize>,
    /// Field shown next to each id
    #[arg(short, long, default_value = DEFAULT_DISPLAY_FIELD)]
    display: String,
    /// Keep fetching until the resource is exhausted
    #[arg(long)]
    all: bool,
}

#[derive(Args)]
struct OptionsArgs {
    resource: String,
    #[arg(short, long, default_value = DEFAULT_DISPLAY_FIELD)]
    display: String,
    #[arg(short, long = "filter", value_parser = parse_filter_pair)]
    filters: Vec<(String, Value)>,
    /// Ids that must appear even when outside the fetched window
    #[arg(long = "initial")]
    initial: Vec<String>,
    /// Narrow the loaded options locally, as the dropdown search does
    #[arg(short = 'q', long)]
    search: Option<String>,
    #[arg(long)]
    desc: bool,
    #[arg(short, long)]
    limit: Option<usize>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}

fn log_timing(timing: bool, label: &str, duration: Duration) {
    if timing {
        eprintln!(
            "[timing] {}: {:.1} ms",
            label,
            duration.as_secs_f64() * 1000.0
        );
    }
}

/// Parse `key=value`. The value is read as JSON when it parses (numbers,
/// booleans, objects) and kept as a string otherwise.
fn parse_filter_pair(raw: &str) -> Result<(String, Value), String> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(format!("expected key=value, got '{}'", raw));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing key in '{}'", raw));
    }
    let value = value.trim();
    let value = serde_json::from_str::<Value>(value)
        .unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn build_filter(pairs: Vec<(String, Value)>) -> Filter {
    let mut filter = Filter::new();
    for (key, value) in pairs {
        filter.insert(&key, value);
    }
    filter
}

fn owner_view(owner: Option<(String, Value)>) -> Result<ViewMode, String> {
    let Some((owner_field, value)) = owner else {
        return Ok(ViewMode::All);
    };
    let owner_id = RecordId::from_json(&value)
        .ok_or_else(|| format!("owner id for '{}' must be a string or number", owner_field))?;
    Ok(ViewMode::Mine {
        owner_field,
        owner_id,
    })
}

/// Fetch pages until the pager is exhausted, or just the first page unless
/// `all` is set.
///
/// # Returns
/// The number of pages fetched.
///
/// # Errors
/// Stops at and returns the first fetch error.
fn walk_pages(
    source: &dyn ListSource,
    pager: &mut Pager,
    all: bool,
    timing: bool,
) -> Result<usize, AppError> {
    let mut pages = 0;
    while let Some(next) = pager.request_next() {
        let started = Instant::now();
        let page = source.fetch_list(&next.request.resource, &next.request.params)?;
        log_timing(
            timing,
            &format!("page {}", next.request.params.page),
            started.elapsed(),
        );
        pager.finish(next.generation, Ok(page));
        pages += 1;
        if !all {
            break;
        }
        if pages >= MAX_WALK_PAGES {
            tracing::warn!(pages, "stopping after page limit; backend never reported the end");
            break;
        }
    }
    Ok(pages)
}

/// Run one option load synchronously.
///
/// # Errors
/// Returns the fetch error instead of degrading to an empty list.
fn load_options(
    source: &dyn ListSource,
    cache: &mut OptionCache,
    timing: bool,
) -> Result<(), AppError> {
    let pending = cache.begin_load();
    let started = Instant::now();
    let result = source.fetch_list(&pending.request.resource, &pending.request.params);
    log_timing(timing, "options", started.elapsed());
    let page = result?;
    cache.finish_load(pending.generation, Ok(page));
    Ok(())
}

fn format_records(records: &[&Record], display_field: &str, json: bool) -> Result<String, String> {
    if json {
        return serde_json::to_string_pretty(records)
            .map_err(|err| format!("response encoding error: {}", err));
    }

    let rows: Vec<String> = records
        .iter()
        .map(|record| {
            format!(
                "{:<12} {}",
                record.identity_key().as_str(),
                record.display_or_id(display_field)
            )
        })
        .collect();
    Ok(rows.join("\n"))
}

/// Environment config with command-line overrides applied.
fn resolve_config(server: Option<String>, timeout: Option<u64>) -> Config {
    let mut config = Config::from_env();
    if let Some(server) = server.filter(|value| !value.trim().is_empty()) {
        config.api_url = server;
    }
    if let Some(timeout) = timeout.filter(|secs| *secs > 0) {
        config.request_timeout_secs = timeout;
    }
    config
}

fn run_list(
    source: &dyn ListSource,
    args: ListArgs,
    defaults: &Config,
    json: bool,
    timing: bool,
) -> Result<String, String> {
    let ListArgs {
        resource,
        filters,
        search,
        owner,
        sort,
        asc,
        per_page,
        display,
        all,
    } = args;

    let order = if asc { SortOrder::Asc } else { SortOrder::Desc };
    let config = PagerConfig::new(resource)
        .with_sort(sort, order)
        .with_per_page(per_page.unwrap_or(defaults.page_size));
    let mut pager = Pager::new(config).map_err(|err| err.to_string())?;
    pager.reset(PagerQuery {
        filter: build_filter(filters),
        search: search.unwrap_or_default(),
        view_mode: owner_view(owner)?,
    });

    let pages = walk_pages(source, &mut pager, all, timing).map_err(|err| err.to_string())?;
    if !json && !pager.is_exhausted() && pages > 0 {
        eprintln!(
            "showing {} record(s); more available (use --all)",
            pager.items().len()
        );
    }
    let records: Vec<&Record> = pager.items().iter().collect();
    format_records(&records, &display, json)
}

fn run_options(
    source: &dyn ListSource,
    args: OptionsArgs,
    defaults: &Config,
    json: bool,
    timing: bool,
) -> Result<String, String> {
    let OptionsArgs {
        resource,
        display,
        filters,
        initial,
        search,
        desc,
        limit,
    } = args;

    let mut query = OptionQuery::new(resource)
        .with_display_field(display.clone())
        .with_filter(build_filter(filters))
        .with_initial(initial.into_iter().map(Record::new).collect())
        .with_limit(limit.unwrap_or(defaults.option_limit));
    if desc {
        query = query.with_sort_order(SortOrder::Desc);
    }
    let mut cache = OptionCache::new(query).map_err(|err| err.to_string())?;
    load_options(source, &mut cache, timing).map_err(|err| err.to_string())?;

    let records = cache.search(search.as_deref().unwrap_or(""));
    format_records(&records, &display, json)
}

fn main() {
    let Cli {
        server,
        json,
        timing,
        timeout,
        command,
    } = Cli::parse();

    if let Commands::Completions { shell } = &command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return;
    }

    init_tracing();
    let config = resolve_config(server, timeout);
    let source = match HttpListSource::from_config(&config) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Setup failed: {}", err);
            std::process::exit(1);
        }
    };

    let (action, result) = match command {
        Commands::Completions { .. } => return,
        Commands::List(args) => ("List", run_list(&source, args, &config, json, timing)),
        Commands::Options(args) => (
            "Options",
            run_options(&source, args, &config, json, timing),
        ),
    };
    match result {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
        }
        Err(message) => {
            eprintln!("{} failed: {}", action, message);
            std::process::exit(1);
        }
    }
}
