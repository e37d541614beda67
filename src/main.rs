use anyhow::Result;
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use pepsweep::panel::KinasePanel;
use pepsweep::search::{write_report, SearchLimits, SensorSearch};
use pepsweep::{Direction, SearchConfig};

/// Parse a count that may have metric suffix (k/K=1000, m/M=1e6, g/G=1e9)
fn parse_metric_number(s: &str) -> Result<usize, String> {
    if s.is_empty() {
        return Err("Empty string".to_string());
    }

    let (num_part, suffix) = match s.chars().last() {
        Some(c) if c.is_ascii_alphabetic() => (&s[..s.len() - c.len_utf8()], Some(c)),
        _ => (s, None),
    };

    let base: f64 = num_part
        .parse()
        .map_err(|e| format!("Invalid number: {e}"))?;

    let multiplier = match suffix {
        Some('k') | Some('K') => 1000.0,
        Some('m') | Some('M') => 1_000_000.0,
        Some('g') | Some('G') => 1_000_000_000.0,
        Some(c) => {
            return Err(format!(
                "Unknown suffix '{c}'. Use k/K (1000), m/M (1e6), or g/G (1e9)"
            ))
        }
        None => 1.0,
    };

    let result = base * multiplier;

    if !result.is_finite() || result < 0.0 || result > usize::MAX as f64 {
        return Err(format!("Value {result} out of range"));
    }

    Ok(result as usize)
}

/// pepsweep - Enumerate kinase sensor peptides in PSSM score order
///
/// Generates the best-scoring peptides for a target kinase and reports how
/// every sub-target and background kinase scores them
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Directory of kinase matrices named <kinase>.csv
    #[clap(short = 'd', long = "kinases-directory")]
    kinases_directory: PathBuf,

    /// Target kinase name
    #[clap(short = 't', long = "target")]
    target: String,

    /// Sub-target kinase names, comma separated (must not include the target)
    #[clap(short = 'k', long = "kinases", value_delimiter = ',', num_args = 0..)]
    kinases: Vec<String>,

    /// Output file (stdout if not specified)
    #[clap(short = 'o', long = "output")]
    output: Option<String>,

    /// Maximum number of peptides to report
    #[clap(short = 'n', long = "max-search", default_value = "1k", value_parser = parse_metric_number)]
    max_search: usize,

    /// Stop once the target score falls past this value
    #[clap(long = "min-score", allow_hyphen_values = true)]
    min_score: Option<f64>,

    /// Enumerate the lowest-scoring peptides instead of the highest
    #[clap(long = "lowest")]
    lowest: bool,

    /// Abort the search after this many distinct states (unbounded if not set)
    #[clap(long = "max-visited", value_parser = parse_metric_number)]
    max_visited: Option<usize>,

    /// States to explore when computing each kinase's score range
    #[clap(long = "probe-limit", default_value = "1M", value_parser = parse_metric_number)]
    probe_limit: usize,

    /// Write comma-separated output instead of tab-separated
    #[clap(long = "csv")]
    csv: bool,

    /// Number of threads for parallel processing
    #[clap(short = 'j', long = "threads", default_value = "8")]
    threads: usize,

    /// Quiet mode (warnings and errors only)
    #[clap(long = "quiet")]
    quiet: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads)
        .build_global()?;

    let panel = KinasePanel::load(&args.kinases_directory, &args.target, &args.kinases)?;

    let direction = if args.lowest {
        Direction::Lowest
    } else {
        Direction::Highest
    };
    let config = SearchConfig::new(direction).with_max_visited(args.max_visited);
    let limits = SearchLimits {
        max_hits: args.max_search,
        score_threshold: args.min_score,
    };

    info!(
        "Searching {} {} peptides for '{}'",
        args.max_search, direction, args.target
    );
    let candidates = SensorSearch::new(&panel, config)
        .with_limits(limits)
        .with_probe_limit(args.probe_limit)
        .run()?;

    let mut writer: Box<dyn Write> = if let Some(ref path) = args.output {
        Box::new(BufWriter::new(File::create(path)?))
    } else {
        Box::new(BufWriter::new(std::io::stdout()))
    };

    let delimiter = if args.csv { ',' } else { '\t' };
    write_report(&candidates, &mut writer, delimiter)?;
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metric_number() {
        assert_eq!(parse_metric_number("250"), Ok(250));
        assert_eq!(parse_metric_number("1k"), Ok(1000));
        assert_eq!(parse_metric_number("2.5M"), Ok(2_500_000));
        assert!(parse_metric_number("").is_err());
        assert!(parse_metric_number("3x").is_err());
        assert!(parse_metric_number("-1").is_err());
        assert!(parse_metric_number("nan").is_err());
        assert!(parse_metric_number("inf").is_err());
        assert!(parse_metric_number("NaNk").is_err());
    }
}
