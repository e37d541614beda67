/// scoredist - Score distribution of peptides across a kinase panel
///
/// Scores a fixed list of peptides against the target, sub-target and
/// background kinases and writes the flat table used for plotting.
use anyhow::Result;
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use pepsweep::distribution::{score_distribution, write_distribution};
use pepsweep::panel::KinasePanel;

#[derive(Parser)]
#[clap(
    name = "scoredist",
    about = "Score peptides against a target kinase, its sub-targets and the background"
)]
struct Args {
    /// Directory of kinase matrices named <kinase>.csv
    #[clap(short = 'd', long = "kinases-directory")]
    kinases_directory: PathBuf,

    /// Sub-target kinase names, separated by spaces (must not include the target)
    #[clap(short = 'k', long = "kinases", num_args = 1..)]
    kinases: Vec<String>,

    /// Target kinase name
    #[clap(short = 't', long = "target")]
    target: String,

    /// Peptides to score
    #[clap(short = 's', long = "sequences", num_args = 1.., required = true)]
    sequences: Vec<String>,

    /// Output file (stdout if not specified)
    #[clap(short = 'o', long = "output")]
    output: Option<String>,

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
    let rows = score_distribution(&panel, &args.sequences)?;
    info!(
        "Scored {} peptides against {} kinases",
        args.sequences.len(),
        panel.member_count()
    );

    let mut writer: Box<dyn Write> = if let Some(ref path) = args.output {
        Box::new(BufWriter::new(File::create(path)?))
    } else {
        Box::new(BufWriter::new(std::io::stdout()))
    };

    let delimiter = if args.csv { ',' } else { '\t' };
    write_distribution(&rows, &mut writer, delimiter)?;
    writer.flush()?;

    Ok(())
}
