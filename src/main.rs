//! datascope CLI - profile tables, explore JSON, describe numbers

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use datascope::options::{Bandwidth, BinRule, DatePreference};
use datascope::stats::parse_numbers;
use datascope::tree::type_at;
use datascope::{
    AnalysisError, CsvReader, Record, Result, StatisticalCalculator, TableProfile, TableProfiler,
    TimeSeries, TreeWalker, TypeStats, Value, diff, find_by_pattern, parse_json, read_text_file,
    records_from_json, resolve,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

/// Profile tabular files, explore JSON documents and describe numeric data.
#[derive(Parser, Debug)]
#[command(name = "datascope")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Output format: text (default) or json
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Profile every column of one or more CSV (or JSON array) files
    Csv {
        /// Input file(s)
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Field delimiter (single character)
        #[arg(short = 'd', long)]
        delimiter: Option<char>,

        /// Use day-month-year date format preference (default: month-day-year)
        #[arg(long)]
        dmy: bool,

        /// Number of most frequent values shown for text columns
        #[arg(long, default_value = "5")]
        top: usize,
    },

    /// Walk a JSON document and query its paths
    Json {
        /// Input JSON file
        file: PathBuf,

        /// List paths matching a pattern (`*` matches one segment)
        #[arg(long)]
        find: Option<String>,

        /// Print the value at a dotted path
        #[arg(long)]
        query: Option<String>,

        /// Compare against another JSON file
        #[arg(long)]
        diff: Option<PathBuf>,
    },

    /// Describe a numeric series from a CSV column or free text
    Stats {
        /// Input file
        file: PathBuf,

        /// Column to read numbers from; without it every number in the file is used
        #[arg(long)]
        column: Option<String>,

        /// Histogram bins: sturges, rice, sqrt, or a bin count
        #[arg(long, default_value = "sturges")]
        bins: BinRule,

        /// Density bandwidth: silverman or a positive number
        #[arg(long, default_value = "silverman")]
        bandwidth: Bandwidth,

        /// Field delimiter (single character)
        #[arg(short = 'd', long)]
        delimiter: Option<char>,
    },

    /// Analyze a dated series from two columns
    Timeseries {
        /// Input file
        file: PathBuf,

        /// Column holding dates
        #[arg(long)]
        date_column: String,

        /// Column holding values
        #[arg(long)]
        value_column: String,

        /// Use day-month-year date format preference (default: month-day-year)
        #[arg(long)]
        dmy: bool,

        /// Field delimiter (single character)
        #[arg(short = 'd', long)]
        delimiter: Option<char>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// JSON envelope naming the input a result came from.
#[derive(Serialize)]
struct Report<'a, T: Serialize> {
    file: String,
    #[serde(flatten)]
    result: &'a T,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let outcome = match &cli.command {
        Command::Csv {
            files,
            delimiter,
            dmy,
            top,
        } => {
            let mut exit_code = ExitCode::SUCCESS;
            for file in files {
                if let Err(e) = profile_file(file, *delimiter, *dmy, *top, cli.format) {
                    eprintln!("Error processing {}: {}", file.display(), e);
                    exit_code = ExitCode::FAILURE;
                }
            }
            return exit_code;
        }
        Command::Json {
            file,
            find,
            query,
            diff,
        } => explore_json(file, find.as_deref(), query.as_deref(), diff.as_deref(), cli.format),
        Command::Stats {
            file,
            column,
            bins,
            bandwidth,
            delimiter,
        } => describe_numbers(
            file,
            column.as_deref(),
            *bins,
            *bandwidth,
            *delimiter,
            cli.format,
        ),
        Command::Timeseries {
            file,
            date_column,
            value_column,
            dmy,
            delimiter,
        } => analyze_series(
            file,
            date_column,
            value_column,
            *dmy,
            *delimiter,
            cli.format,
        ),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default: warnings only).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn date_preference(dmy: bool) -> DatePreference {
    if dmy {
        DatePreference::DmyFormat
    } else {
        DatePreference::MdyFormat
    }
}

/// Read rows from a file: a JSON array of objects for `.json`, delimited
/// text otherwise.
fn load_records(path: &Path, delimiter: Option<char>) -> Result<Vec<Record>> {
    let text = read_text_file(path)?;
    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyData);
    }

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return records_from_json(&parse_json(&text)?);
    }

    let mut reader = CsvReader::new();
    if let Some(delim) = delimiter {
        if !delim.is_ascii() {
            return Err(AnalysisError::InvalidConfig(format!(
                "delimiter must be a single ASCII character, got {delim:?}"
            )));
        }
        reader.delimiter(delim as u8);
    }
    reader.read_str(&text)
}

fn print_json<T: Serialize>(path: &Path, result: &T) -> Result<()> {
    let report = Report {
        file: path.display().to_string(),
        result,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn fmt_num(x: f64) -> String {
    if x.fract() == 0.0 && x.abs() < 1e15 {
        format!("{x:.0}")
    } else {
        format!("{x:.4}")
    }
}

fn fmt_opt(x: Option<f64>) -> String {
    x.map_or_else(|| "-".to_string(), fmt_num)
}

fn profile_file(
    path: &Path,
    delimiter: Option<char>,
    dmy: bool,
    top: usize,
    format: OutputFormat,
) -> Result<()> {
    let rows = load_records(path, delimiter)?;
    let mut profiler = TableProfiler::new();
    profiler.date_preference(date_preference(dmy)).top_values(top);
    let profile = profiler.profile(&rows);

    match format {
        OutputFormat::Text => print_profile_text(path, &profile),
        OutputFormat::Json => print_json(path, &profile)?,
    }
    Ok(())
}

fn print_profile_text(path: &Path, profile: &TableProfile) {
    let summary = &profile.summary;
    println!("File: {}", path.display());
    println!("  Rows: {}", summary.row_count);
    println!("  Columns: {}", summary.column_count);
    println!("  Completeness: {:.1}%", summary.completeness_percent);
    println!("  Memory estimate: {} bytes", summary.memory_size_estimate_bytes);
    let types: Vec<String> = summary
        .type_distribution
        .iter()
        .map(|(t, n)| format!("{t}={n}"))
        .collect();
    println!("  Types: {}", types.join(", "));

    println!("  Column details:");
    for (i, column) in profile.columns.values().enumerate() {
        println!(
            "    {}: {} ({}) count={} unique={} missing={}",
            i + 1,
            column.name,
            column.column_type,
            column.count,
            column.unique,
            column.missing
        );
        println!("       {}", type_stats_line(&column.stats));
    }
    println!();
}

fn type_stats_line(stats: &TypeStats) -> String {
    match stats {
        TypeStats::Numeric(s) => format!(
            "min={} max={} mean={} median={} std_dev={} zeros={} negative={}",
            fmt_opt(s.min),
            fmt_opt(s.max),
            fmt_opt(s.mean),
            fmt_opt(s.median),
            fmt_opt(s.std_dev),
            s.zeros,
            s.negative
        ),
        TypeStats::String(s) => {
            let top: Vec<String> = s
                .top_values
                .iter()
                .map(|t| format!("{:?}x{}", t.value, t.count))
                .collect();
            format!(
                "length={}..{} avg={} empty={} words={}..{} top=[{}]",
                s.min_length,
                s.max_length,
                fmt_num(s.avg_length),
                s.empty,
                s.min_words,
                s.max_words,
                top.join(", ")
            )
        }
        TypeStats::Date(s) => format!(
            "earliest={} latest={} range_ms={} invalid={}",
            s.earliest.map_or_else(|| "-".to_string(), |d| d.to_rfc3339()),
            s.latest.map_or_else(|| "-".to_string(), |d| d.to_rfc3339()),
            s.range_millis,
            s.invalid_dates
        ),
        TypeStats::Boolean(s) => format!(
            "true={} false={} true_pct={:.1}%",
            s.true_count, s.false_count, s.true_percentage
        ),
        TypeStats::Mixed(s) => {
            let dist: Vec<String> = s
                .type_distribution
                .iter()
                .map(|(t, n)| format!("{t}={n}"))
                .collect();
            format!("types=[{}] predominant={}", dist.join(", "), s.predominant_type)
        }
    }
}

fn explore_json(
    path: &Path,
    find: Option<&str>,
    query: Option<&str>,
    other: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let doc = parse_json(&read_text_file(path)?)?;

    if let Some(other_path) = other {
        let other_doc = parse_json(&read_text_file(other_path)?)?;
        let changes = diff(&doc, &other_doc);
        match format {
            OutputFormat::Json => print_json(path, &serde_json::json!({ "diff": changes }))?,
            OutputFormat::Text => {
                println!("Diff: {} -> {}", path.display(), other_path.display());
                for change in &changes {
                    println!(
                        "  {:?} {}: {} -> {}",
                        change.kind,
                        display_path(&change.path),
                        change.original.as_ref().map_or("-".to_string(), |v| v.to_string()),
                        change.new.as_ref().map_or("-".to_string(), |v| v.to_string())
                    );
                }
                println!("  {} difference(s)", changes.len());
            }
        }
        return Ok(());
    }

    if let Some(path_query) = query {
        let value = resolve(&doc, path_query);
        match format {
            OutputFormat::Json => print_json(
                path,
                &serde_json::json!({ "query": path_query, "value": value }),
            )?,
            OutputFormat::Text => match (value, type_at(&doc, path_query)) {
                (Some(v), Some(t)) => println!("{} ({t}): {v}", display_path(path_query)),
                _ => println!("{}: not found", display_path(path_query)),
            },
        }
        return Ok(());
    }

    let analysis = TreeWalker::new().walk(&doc);

    if let Some(pattern) = find {
        let hits = find_by_pattern(&analysis.paths, pattern);
        match format {
            OutputFormat::Json => print_json(path, &serde_json::json!({ "matches": hits }))?,
            OutputFormat::Text => {
                for entry in &hits {
                    match &entry.value {
                        Some(v) => println!("{} ({}): {v}", display_path(&entry.path), entry.node_type),
                        None => println!("{} ({})", display_path(&entry.path), entry.node_type),
                    }
                }
                println!("{} match(es)", hits.len());
            }
        }
        return Ok(());
    }

    match format {
        OutputFormat::Json => print_json(path, &analysis)?,
        OutputFormat::Text => {
            let stats = &analysis.stats;
            println!("File: {}", path.display());
            println!("  Paths: {}", analysis.paths.len());
            println!("  Total keys: {}", stats.total_keys);
            println!("  Max depth: {}", stats.max_depth);
            println!("  Arrays: {}", stats.array_count);
            println!("  Nulls: {}", stats.null_count);
            let types: Vec<String> = stats
                .value_type_counts
                .iter()
                .map(|(t, n)| format!("{t}={n}"))
                .collect();
            println!("  Value types: {}", types.join(", "));
            if let Some(s) = &stats.string_length_stats {
                println!("  String length: min={} max={} avg={}", s.min, s.max, fmt_num(s.avg));
            }
            if let Some(n) = &stats.number_stats {
                println!(
                    "  Numbers: count={} min={} max={} sum={} avg={}",
                    n.count,
                    fmt_num(n.min),
                    fmt_num(n.max),
                    fmt_num(n.sum),
                    fmt_num(n.avg)
                );
            }
            println!();
        }
    }
    Ok(())
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "(root)" } else { path }
}

fn describe_numbers(
    path: &Path,
    column: Option<&str>,
    bins: BinRule,
    bandwidth: Bandwidth,
    delimiter: Option<char>,
    format: OutputFormat,
) -> Result<()> {
    let mut calc = StatisticalCalculator::new();
    calc.bin_rule(bins).bandwidth(bandwidth);

    match column {
        Some(name) => {
            let rows = load_records(path, delimiter)?;
            if rows.first().is_some_and(|r| !r.contains_key(name)) {
                return Err(AnalysisError::InvalidInput(format!(
                    "column '{name}' not found"
                )));
            }
            let values: Vec<Value> = rows
                .iter()
                .filter_map(|r| r.get(name).cloned())
                .collect();
            calc.set_values(&values);
        }
        None => {
            calc.set_data(parse_numbers(&read_text_file(path)?));
        }
    }

    if calc.data().is_empty() {
        return Err(AnalysisError::EmptyData);
    }
    let summary = calc.calculate();

    match format {
        OutputFormat::Json => print_json(path, summary)?,
        OutputFormat::Text => {
            println!("File: {}", path.display());
            if let Some(d) = &summary.descriptive {
                println!("  Count: {}", d.count);
                println!("  Mean: {}", fmt_num(d.mean));
                println!("  Median: {}", fmt_num(d.median));
                let modes: Vec<String> = d.mode.iter().copied().map(fmt_num).collect();
                println!("  Mode: {}", modes.join(", "));
                println!("  Std dev: {}", fmt_num(d.std_dev));
                println!("  Min / max: {} / {}", fmt_num(d.min), fmt_num(d.max));
                println!(
                    "  Quartiles: {} / {} / {} (IQR {})",
                    fmt_num(d.quartiles.q1),
                    fmt_num(d.quartiles.q2),
                    fmt_num(d.quartiles.q3),
                    fmt_num(d.iqr)
                );
                println!("  CV: {}%", fmt_num(d.coefficient_of_variation));
            }
            if let Some(dist) = &summary.distribution {
                println!("  Skewness: {}", fmt_num(dist.skewness));
                println!("  Kurtosis: {}", fmt_num(dist.kurtosis));
                println!("  Looks normal: {}", dist.is_normal);
                if let Some(sw) = &dist.normality_tests.shapiro_wilk {
                    println!("  Shapiro-Wilk W: {}", fmt_num(sw.statistic));
                }
                let jb = &dist.normality_tests.jarque_bera;
                println!(
                    "  Jarque-Bera: {} (p = {})",
                    fmt_num(jb.statistic),
                    fmt_num(jb.p_value)
                );
                let counts: Vec<String> =
                    dist.histogram.counts.iter().map(ToString::to_string).collect();
                println!("  Histogram: [{}]", counts.join(", "));
            }
            if let Some(corr) = &summary.correlation {
                let acf: Vec<String> = corr.autocorrelation.iter().copied().map(fmt_num).collect();
                println!("  Autocorrelation: [{}]", acf.join(", "));
                println!(
                    "  Runs test: runs={} expected={} z={} random={}",
                    corr.runs_test.runs,
                    fmt_num(corr.runs_test.expected_runs),
                    fmt_num(corr.runs_test.z_score),
                    corr.runs_test.is_random
                );
                println!(
                    "  Trend: {} (slope {})",
                    corr.trend.direction,
                    fmt_num(corr.trend.slope)
                );
            }
            println!();
        }
    }
    Ok(())
}

fn analyze_series(
    path: &Path,
    date_column: &str,
    value_column: &str,
    dmy: bool,
    delimiter: Option<char>,
    format: OutputFormat,
) -> Result<()> {
    let rows = load_records(path, delimiter)?;
    let series = TimeSeries::from_records(&rows, date_column, value_column, date_preference(dmy))?;
    let analysis = series.analyze().ok_or(AnalysisError::EmptyData)?;

    match format {
        OutputFormat::Json => print_json(path, &analysis)?,
        OutputFormat::Text => {
            println!("File: {}", path.display());
            println!("  Points: {} ({} skipped)", series.len(), series.dropped());
            println!(
                "  Range: {} .. {}",
                analysis.bounds.min_date.to_rfc3339(),
                analysis.bounds.max_date.to_rfc3339()
            );
            println!(
                "  Mean / min / max: {} / {} / {}",
                fmt_num(analysis.stats.mean),
                fmt_num(analysis.stats.min),
                fmt_num(analysis.stats.max)
            );
            match &analysis.trend {
                Some(t) => println!(
                    "  Trend: {} (strength {} per ms)",
                    t.direction,
                    fmt_num(t.strength)
                ),
                None => println!("  Trend: -"),
            }
            if let Some(s) = &analysis.seasonality {
                println!(
                    "  Regular spacing: {} (period {} ms)",
                    s.detected,
                    fmt_num(s.period_millis)
                );
            }
            let ma: Vec<String> = analysis.moving_average.iter().copied().map(fmt_num).collect();
            println!("  Moving average: [{}]", ma.join(", "));
            println!();
        }
    }
    Ok(())
}
