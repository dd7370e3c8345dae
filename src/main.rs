use std::process;

use clap::{ArgAction, Parser, Subcommand};
use log::LevelFilter;

use apdb_admin::admin_errors::AdminError;
use apdb_admin::classify::NewnessPolicy;
use apdb_admin::config::StoreConfig;
use apdb_admin::constants::{DetectorId, VisitId};
use apdb_admin::report::render_first_visit_counts;
use apdb_admin::visit_walker::VisitWalker;

#[derive(Parser)]
#[command(name = "apdb-admin", about = "APDB data management command line tools")]
struct Cli {
    /// Log level for diagnostic output.
    #[arg(short = 'l', long, default_value = "info", global = true)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dump APDB contents.
    Dump {
        #[command(subcommand)]
        target: DumpTarget,
    },
    /// Delete APDB records.
    Delete {
        #[command(subcommand)]
        target: DeleteTarget,
    },
}

#[derive(Subcommand)]
enum DumpTarget {
    /// Dump data for a particular visit.
    Visit {
        /// Exposure catalog configuration URI.
        butler_config: String,

        /// APDB configuration URI.
        apdb_config: String,

        /// Instrument name.
        instrument: String,

        /// Visit number.
        visit: VisitId,

        /// Detector number(s); all science detectors if omitted.
        detectors: Vec<DetectorId>,

        /// Verbose output, can be repeated.
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },
}

#[derive(Subcommand)]
enum DeleteTarget {
    /// Delete the records first created by a particular visit.
    Visit {
        /// Exposure catalog configuration URI.
        butler_config: String,

        /// APDB configuration URI.
        apdb_config: String,

        /// Instrument name.
        instrument: String,

        /// Visit number.
        visit: VisitId,

        /// Detector number(s); all science detectors if omitted.
        detectors: Vec<DetectorId>,

        /// Actually delete; default is a dry run printing what would go.
        #[arg(long)]
        delete: bool,

        /// Select objects with no associated sources instead of objects
        /// first detected in this visit.
        #[arg(long)]
        no_sources: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::new().filter_level(cli.log_level).init();

    if let Err(err) = run(cli.command) {
        eprintln!("apdb-admin: {err}");
        process::exit(1);
    }
}

fn run(command: Commands) -> Result<(), AdminError> {
    match command {
        Commands::Dump {
            target:
                DumpTarget::Visit {
                    butler_config,
                    apdb_config,
                    instrument,
                    visit,
                    detectors,
                    verbose,
                },
        } => {
            let catalog = StoreConfig::from_uri(&butler_config)?.open()?;
            let mut apdb = StoreConfig::from_uri(&apdb_config)?.open()?;

            let mut walker = VisitWalker::new(&catalog, &mut apdb, &instrument, visit);
            let dump = walker.dump_visit(&detectors, verbose)?;

            for summary in &dump.summaries {
                println!(
                    "--- Processing visit {} detector {}",
                    summary.visit, summary.detector
                );
                if let Some(report) = &summary.report {
                    print!("{report}");
                }
            }
            print!("{}", render_first_visit_counts(&dump.first_visit_counts));
            Ok(())
        }
        Commands::Delete {
            target:
                DeleteTarget::Visit {
                    butler_config,
                    apdb_config,
                    instrument,
                    visit,
                    detectors,
                    delete,
                    no_sources,
                },
        } => {
            let catalog = StoreConfig::from_uri(&butler_config)?.open()?;
            let mut apdb = StoreConfig::from_uri(&apdb_config)?.open()?;

            let policy = if no_sources {
                NewnessPolicy::NoSources
            } else {
                NewnessPolicy::FirstSourceVisit
            };

            let mut walker = VisitWalker::new(&catalog, &mut apdb, &instrument, visit);
            let summaries = walker.delete_visit(&detectors, delete, policy)?;

            for summary in &summaries {
                if let Some(report) = &summary.report {
                    print!("{report}");
                }
            }
            Ok(())
        }
    }
}
