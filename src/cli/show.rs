use std::path::PathBuf;

use casebook::{Case, Config, Directory, domain::document};
use clap::Parser;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Display detailed information about a case")]
pub struct Show {
    /// The id of the case to display
    id: String,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "pretty")]
    output: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Pretty,
    Json,
    Yaml,
}

impl Show {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root)?;

        let Some(case) = directory.get(&self.id) else {
            anyhow::bail!("Case {} not found", self.id);
        };

        match self.output {
            OutputFormat::Pretty => print!("{}", render_pretty(&directory, case)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(case)?),
            OutputFormat::Yaml => print!("{}", serde_yaml::to_string(case)?),
        }

        Ok(())
    }
}

fn render_pretty(directory: &Directory, case: &Case) -> String {
    use std::fmt::Write;

    let config = directory.config();
    let mut out = String::new();

    let _ = writeln!(out, "# {}", case.id().unwrap_or_default());
    if let Some(name) = case.requester_name() {
        let _ = writeln!(out, "{name}");
    }

    let _ = writeln!(out, "\n{}", "Requester".dim());
    field(&mut out, "Taxpayer", case.taxpayer_id().map(|v| taxpayer_id(config, v)));
    field(&mut out, "Born", case.birth_date().map(|d| d.to_string()));

    let _ = writeln!(out, "\n{}", "Case".dim());
    field(&mut out, "Filing", case.filing_number().map(|v| filing_number(config, v)));
    field(&mut out, "Status", case.status().map(ToString::to_string));
    field(&mut out, "Process", case.process_status().map(ToString::to_string));
    field(&mut out, "Stage", case.stage().map(ToString::to_string));
    field(&mut out, "Hypothesis", case.hypothesis().map(ToString::to_string));
    field(&mut out, "Group", case.service_group().map(ToString::to_string));

    if let Some(path) = case.id().and_then(|id| directory.path_for(id)) {
        field(&mut out, "Path", Some(path.display().to_string()));
    }

    if !case.related_cases().is_empty() {
        let _ = writeln!(out, "\n{}", "Related".dim());
        for related in case.related_cases() {
            let id = related.id().unwrap_or("(no id)");
            let name = related.requester_name().unwrap_or_default();
            let known = related.id().is_some_and(|id| directory.get(id).is_some());
            let indicator = if known { "" } else { " (not registered)" };
            let _ = writeln!(out, "  • {id} {name}{}", indicator.warning());
        }
    }

    let referenced_by = case
        .id()
        .map(|id| directory.graph().referenced_by(id))
        .unwrap_or_default();
    if !referenced_by.is_empty() {
        let _ = writeln!(out, "\n{}", "Referenced by".dim());
        for id in referenced_by {
            let _ = writeln!(out, "  • {id}");
        }
    }

    out
}

fn field(out: &mut String, label: &str, value: Option<String>) {
    use std::fmt::Write;

    if let Some(value) = value {
        let _ = writeln!(out, "  {:<11}{value}", format!("{label}:"));
    }
}

pub(super) fn taxpayer_id(config: &Config, value: &str) -> String {
    if config.mask_documents {
        document::display_taxpayer_id(value)
    } else {
        value.to_string()
    }
}

pub(super) fn filing_number(config: &Config, value: &str) -> String {
    if config.mask_documents {
        document::display_filing_number(value)
    } else {
        value.to_string()
    }
}
