use anyhow::Context;
use clap::{Parser, Subcommand};
use extract_core::{
    extension_from_env_value, namespace_from_env_value, write_table, CoreConfig, DocumentIssue,
    Extraction, ExtractionService, LinkRequest, TableRecord,
};
use fhir::ResourceKind;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "fhir-extract")]
#[command(about = "Extract and link FHIR XML diagnostic reports, observations and conditions")]
struct Cli {
    /// FHIR namespace URI (`*` or `any` matches elements by local name only)
    #[arg(long, global = true, env = "FHIR_EXTRACT_NAMESPACE")]
    namespace: Option<String>,

    /// File extension of input documents (default: xml)
    #[arg(long, global = true, env = "FHIR_EXTRACT_EXTENSION")]
    extension: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Link Bundle reports to observations and conditions and write the patient table
    Link {
        /// Directory of Bundle documents holding DiagnosticReports
        #[arg(long)]
        bundle_dir: PathBuf,
        /// Directory of Observation documents (repeatable)
        #[arg(long = "observation-dir", required = true)]
        observation_dirs: Vec<PathBuf>,
        /// Directory of Condition documents (repeatable)
        #[arg(long = "condition-dir")]
        condition_dirs: Vec<PathBuf>,
        /// CSV output file (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write the detailed observation table for a directory
    Observations {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write the detailed condition table for a directory
    Conditions {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Write the detailed diagnostic report table for a directory
    Reports {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Extract one resource type from a directory as JSON
    Extract {
        /// Resource type name, e.g. Observation
        #[arg(long = "type")]
        resource_type: String,
        #[arg(long)]
        dir: PathBuf,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    fn config(&self) -> anyhow::Result<CoreConfig> {
        let namespace = namespace_from_env_value(self.namespace.clone());
        let extension = extension_from_env_value(self.extension.clone());
        Ok(CoreConfig::new(namespace, &extension)?)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("extract_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let service = ExtractionService::new(cli.config()?);

    match cli.command {
        Some(Commands::Link {
            bundle_dir,
            observation_dirs,
            condition_dirs,
            output,
        }) => {
            let request = LinkRequest {
                bundle_dir,
                observation_dirs,
                condition_dirs,
            };
            let outcome = service.link(&request)?;
            write_table(open_output(output.as_deref())?, &outcome.rows())?;
            report_issues(&outcome.issues);
            eprintln!(
                "{} report(s), {} row(s), {} issue(s)",
                outcome.summary.reports, outcome.summary.linked_results, outcome.summary.issues
            );
        }
        Some(Commands::Observations { dir, output }) => {
            write_extraction(service.extract_observations(&[dir])?, output.as_deref())?;
        }
        Some(Commands::Conditions { dir, output }) => {
            write_extraction(service.extract_conditions(&[dir])?, output.as_deref())?;
        }
        Some(Commands::Reports { dir, output }) => {
            write_extraction(service.extract_reports(&dir)?, output.as_deref())?;
        }
        Some(Commands::Extract {
            resource_type,
            dir,
            output,
        }) => {
            let kind: ResourceKind = resource_type.parse()?;
            let extraction = service.extract_kind(&dir, kind)?;
            let records: Vec<_> = extraction.records.values().collect();
            let mut out = open_output(output.as_deref())?;
            serde_json::to_writer_pretty(&mut out, &records)?;
            writeln!(out)?;
            out.flush()?;
            report_issues(&extraction.issues);
        }
        None => {
            println!("Use 'fhir-extract --help' for commands");
        }
    }

    Ok(())
}

fn write_extraction<T: TableRecord>(
    extraction: Extraction<T>,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    write_table(open_output(output)?, extraction.records.values())?;
    report_issues(&extraction.issues);
    eprintln!(
        "{} record(s) from {} document(s)",
        extraction.len(),
        extraction.documents
    );
    Ok(())
}

fn report_issues(issues: &[DocumentIssue]) {
    for issue in issues.iter().filter(|i| i.is_failure()) {
        eprintln!("skipped {issue}");
    }
}

fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(io::stdout().lock()),
    })
}
