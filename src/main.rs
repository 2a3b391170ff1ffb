use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use allele_align::aligner::ScanAligner;
use allele_align::pipelines::{self, AlignConfig, Strategy};
use allele_align::report::{self, ReportFilter};
use allele_align::database;

#[derive(Parser)]
#[command(name = "allele-align")]
#[command(about = "Aligns short reads against multi-allele gene databases", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Align reads against a gene/allele database
    Align {
        /// FASTA database of `gene.allele` records (.fa or .fa.gz)
        #[arg(value_name = "DATABASE.FA")]
        database: PathBuf,

        /// Reads in FASTA or FASTQ, plain or gzipped
        #[arg(value_name = "READS.FQ")]
        reads: PathBuf,

        /// Alignment strategy: naive, categorical, or regional
        #[arg(long, value_name = "NAME", default_value = "regional")]
        method: String,

        /// Representative alleles per gene for the first pass
        #[arg(short = 'r', long, value_name = "INT", default_value = "1")]
        representatives: usize,

        /// Also include each first-pass read's mate in the second pass
        #[arg(long)]
        pair: bool,

        /// Worker threads (default: hardware concurrency)
        #[arg(short = 't', long, value_name = "INT")]
        threads: Option<usize>,

        /// Drop matches with more than INT mismatches
        #[arg(long, value_name = "INT", default_value = "5")]
        max_mismatches: u32,

        /// Fold regions with fewer than INT reads into the catch-all
        #[arg(long, value_name = "INT", default_value = "3")]
        min_region_reads: usize,

        /// Output file for the alignment records (default: stdout)
        #[arg(short = 'o', long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Print records from a previously written alignment file
    Report {
        /// Alignment record file written by `align -o`
        #[arg(value_name = "ALIGNMENTS")]
        alignments: PathBuf,

        /// Show only the first INT matching records
        #[arg(long, value_name = "INT")]
        head: Option<usize>,

        /// Show only records for this read id
        #[arg(short = 'r', long, value_name = "INT")]
        read: Option<u32>,

        /// Show only records for this gene
        #[arg(short = 'g', long, value_name = "GENE")]
        gene: Option<String>,

        /// Show only records for this allele
        #[arg(short = 'a', long, value_name = "ALLELE")]
        allele: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_timestamp(None)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Align {
            database,
            reads,
            method,
            representatives,
            pair,
            threads,
            max_mismatches,
            min_region_reads,
            output,
        } => run_align(
            database,
            reads,
            method,
            representatives,
            pair,
            threads,
            max_mismatches,
            min_region_reads,
            output,
        ),
        Commands::Report {
            alignments,
            head,
            read,
            gene,
            allele,
        } => run_report(alignments, head, read, gene, allele),
    };

    if let Err(e) = outcome {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}

#[allow(clippy::too_many_arguments)]
fn run_align(
    database_path: PathBuf,
    reads_path: PathBuf,
    method: String,
    representatives: usize,
    pair: bool,
    threads: Option<usize>,
    max_mismatches: u32,
    min_region_reads: usize,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let strategy: Strategy = method
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{e}"))?;
    if representatives == 0 {
        anyhow::bail!("--representatives must be at least 1");
    }
    let threads = match threads {
        Some(0) => anyhow::bail!("--threads must be at least 1"),
        Some(n) => n,
        None => std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1),
    };
    log::info!("Using {threads} thread(s)");

    let database = database::load_database(&database_path)
        .map_err(|e| anyhow::anyhow!("Error loading database {}: {e}", database_path.display()))?;
    log::info!("Loaded {} gene(s)", database.len());
    let reads = database::load_reads(&reads_path)
        .map_err(|e| anyhow::anyhow!("Error loading reads {}: {e}", reads_path.display()))?;
    log::info!("Loaded {} read(s)", reads.len());

    let aligner = ScanAligner::new(max_mismatches);
    let config = AlignConfig {
        strategy,
        num_representatives: representatives,
        include_pair: pair,
        threads,
        min_reads_per_region: min_region_reads,
    };
    let results = pipelines::run(&database, &reads, &aligner, &config)?;

    let total: usize = results
        .values()
        .flat_map(|alleles| alleles.values())
        .map(|matches| matches.len())
        .sum();
    match output {
        Some(path) => {
            let file = File::create(&path)
                .map_err(|e| anyhow::anyhow!("Error creating output file {}: {e}", path.display()))?;
            let mut writer = BufWriter::new(file);
            report::write_alignments(&results, &mut writer)?;
            writer.flush()?;
            log::info!("{total} match(es) saved to {}", path.display());
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            report::write_alignments(&results, &mut writer)?;
            writer.flush()?;
            log::info!("{total} match(es) written");
        }
    }
    Ok(())
}

fn run_report(
    alignments: PathBuf,
    head: Option<usize>,
    read: Option<u32>,
    gene: Option<String>,
    allele: Option<String>,
) -> anyhow::Result<()> {
    let filter = ReportFilter {
        read_id: read,
        gene_id: gene,
        allele_id: allele,
        limit: head,
    };
    let records = report::scan_alignments(&alignments, &filter)
        .map_err(|e| anyhow::anyhow!("Error reading {}: {e}", alignments.display()))?;
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    for record in &records {
        report::print_alignment(record, &mut writer)?;
    }
    writer.flush()?;
    Ok(())
}
