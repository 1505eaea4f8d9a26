use std::path::{Path, PathBuf};

mod link;
mod list;
mod show;
mod terminal;
mod validate;

use casebook::{
    Case, Directory,
    domain::{Hypothesis, ProcessStatus, ServiceGroup, Stage, Status},
    storage::METADATA_DIR,
};
use chrono::NaiveDate;
use clap::ArgAction;
use link::{Link, Unlink};
use list::List;
use show::Show;
use tracing::instrument;
use validate::Validate;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global=true)]
    verbose: u8,

    /// The path to the root of the case registry
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        self.command
            .unwrap_or_else(|| Command::List(List::default()))
            .run(self.root)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Initialize a new case registry
    Init,

    /// Register a new case
    New(New),

    /// Change fields of an existing case
    Set(Set),

    /// Show detailed information about a case
    Show(Show),

    /// List cases matching the given filters (default)
    List(List),

    /// Relate one case to another
    ///
    /// A copy of the related case is stored inside the first one.
    Link(Link),

    /// Remove a relation between two cases
    Unlink(Unlink),

    /// Check the registry for relation cycles and dangling references
    Validate(Validate),
}

impl Command {
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        match self {
            Self::Init => Init::run(&root)?,
            Self::New(command) => command.run(root)?,
            Self::Set(command) => command.run(root)?,
            Self::Show(command) => command.run(root)?,
            Self::List(command) => command.run(root)?,
            Self::Link(command) => command.run(root)?,
            Self::Unlink(command) => command.run(root)?,
            Self::Validate(command) => command.run(root)?,
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Init {}

impl Init {
    #[instrument]
    fn run(root: &Path) -> anyhow::Result<()> {
        let metadata_dir = root.join(METADATA_DIR);
        if metadata_dir.exists() {
            anyhow::bail!("Registry already initialized (found existing {METADATA_DIR} directory)");
        }

        std::fs::create_dir_all(&metadata_dir)
            .map_err(|e| anyhow::anyhow!("Failed to create {METADATA_DIR} directory: {e}"))?;

        casebook::Config::default()
            .save(&metadata_dir.join("config.toml"))
            .map_err(|e| anyhow::anyhow!("Failed to create config.toml: {e}"))?;

        println!("Initialized case registry in {}", root.display());
        println!("  Created: {METADATA_DIR}/config.toml");
        println!();
        println!("Next steps:");
        println!("  case new --name \"Jane Doe\" --taxpayer-id 000.000.000-00");

        Ok(())
    }
}

/// Case fields that can be given on the command line.
#[derive(Debug, Default, clap::Args)]
pub struct CaseFields {
    /// External registry number
    #[arg(long)]
    filing_number: Option<String>,

    /// Requester's taxpayer id
    #[arg(long)]
    taxpayer_id: Option<String>,

    /// Requester's name
    #[arg(long = "name")]
    requester_name: Option<String>,

    /// Requester's date of birth (YYYY-MM-DD)
    #[arg(long)]
    birth_date: Option<NaiveDate>,

    /// Case status
    #[arg(long)]
    status: Option<Status>,

    /// Hypothesis
    #[arg(long)]
    hypothesis: Option<Hypothesis>,

    /// Service group
    #[arg(long)]
    service_group: Option<ServiceGroup>,

    /// Workflow stage
    #[arg(long)]
    stage: Option<Stage>,

    /// Process status
    #[arg(long)]
    process_status: Option<ProcessStatus>,
}

impl CaseFields {
    /// Store every field that was given. Fields left out are not touched.
    fn apply(self, case: &mut Case) {
        if let Some(value) = self.filing_number {
            case.set_filing_number(value);
        }
        if let Some(value) = self.taxpayer_id {
            case.set_taxpayer_id(value);
        }
        if let Some(value) = self.requester_name {
            case.set_requester_name(value);
        }
        if let Some(value) = self.birth_date {
            case.set_birth_date(value);
        }
        if let Some(value) = self.status {
            case.set_status(value);
        }
        if let Some(value) = self.hypothesis {
            case.set_hypothesis(value);
        }
        if let Some(value) = self.service_group {
            case.set_service_group(value);
        }
        if let Some(value) = self.stage {
            case.set_stage(value);
        }
        if let Some(value) = self.process_status {
            case.set_process_status(value);
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct New {
    /// Id of the new case (default: a random UUID)
    #[arg(long)]
    id: Option<String>,

    #[command(flatten)]
    fields: CaseFields,
}

impl New {
    #[instrument(skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root)?;

        let id = self
            .id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut case = Case::new();
        case.set_id(id.clone());
        self.fields.apply(&mut case);

        directory.insert(case)?;
        directory.flush()?;

        println!("Added case {id}");
        Ok(())
    }
}

/// A case field that can be cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Field {
    FilingNumber,
    TaxpayerId,
    Name,
    BirthDate,
    Status,
    Hypothesis,
    ServiceGroup,
    Stage,
    ProcessStatus,
    RelatedCases,
}

impl Field {
    fn clear(self, case: &mut Case) {
        match self {
            Self::FilingNumber => case.set_filing_number(None),
            Self::TaxpayerId => case.set_taxpayer_id(None),
            Self::Name => case.set_requester_name(None),
            Self::BirthDate => case.set_birth_date(None),
            Self::Status => case.set_status(None),
            Self::Hypothesis => case.set_hypothesis(None),
            Self::ServiceGroup => case.set_service_group(None),
            Self::Stage => case.set_stage(None),
            Self::ProcessStatus => case.set_process_status(None),
            Self::RelatedCases => case.set_related_cases(Vec::new()),
        }
    }
}

#[derive(Debug, clap::Parser)]
pub struct Set {
    /// Id of the case to change
    id: String,

    #[command(flatten)]
    fields: CaseFields,

    /// Fields to clear (can be given multiple times)
    #[arg(long, value_enum, value_name = "FIELD")]
    clear: Vec<Field>,
}

impl Set {
    #[instrument(skip(self))]
    fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root)?;

        let Self { id, fields, clear } = self;
        directory.update(&id, |case| {
            for field in clear {
                field.clear(case);
            }
            fields.apply(case);
        })?;
        directory.flush()?;

        println!("Updated case {id}");
        Ok(())
    }
}
