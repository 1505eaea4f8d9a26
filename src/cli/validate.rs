use std::path::PathBuf;

use casebook::Directory;
use clap::Parser;
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Check the registry for relation cycles and dangling references")]
pub struct Validate {
    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

/// Problems found in a registry.
#[derive(Debug, Default, PartialEq, Eq)]
struct Report {
    cycles: Vec<Vec<String>>,
    dangling: Vec<String>,
}

impl Report {
    fn of(directory: &Directory) -> Self {
        Self {
            cycles: directory.graph().cycles(),
            dangling: directory
                .dangling_references()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    fn is_clean(&self) -> bool {
        self.cycles.is_empty() && self.dangling.is_empty()
    }
}

impl Validate {
    #[instrument(level = "debug", skip(self))]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let directory = Directory::new(root)?;
        let report = Report::of(&directory);

        if !self.quiet {
            if report.is_clean() {
                println!("{}", "✓ No problems found".success());
            }

            for cycle in &report.cycles {
                println!("{} {}", "cycle:".warning(), cycle.join(" ↔ "));
            }

            // Informational only.
            for id in &report.dangling {
                println!("{} {id} has no case file", "note:".dim());
            }
        }

        if !report.cycles.is_empty() {
            anyhow::bail!("found {} relation cycle(s)", report.cycles.len());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use casebook::{Case, Directory};
    use tempfile::tempdir;

    use super::*;

    fn case(id: &str, related: Vec<Case>) -> Case {
        let mut case = Case::new();
        case.set_id(id.to_string());
        case.set_related_cases(related);
        case
    }

    #[test]
    fn clean_registry_passes() {
        let tmp = tempdir().unwrap();
        let mut directory = Directory::new(tmp.path().to_path_buf()).unwrap();
        directory.insert(case("c-1", vec![case("c-2", vec![])])).unwrap();
        directory.insert(case("c-2", vec![])).unwrap();
        directory.flush().unwrap();

        let validate = Validate { quiet: true };
        assert!(validate.run(tmp.path().to_path_buf()).is_ok());
    }

    #[test]
    fn cycles_fail_validation() {
        let tmp = tempdir().unwrap();
        std::fs::write(
            tmp.path().join("c-1.yaml"),
            "id: c-1\nrelatedCases:\n  - id: c-2\n    relatedCases:\n      - id: c-1\n",
        )
        .unwrap();

        let directory = Directory::new(tmp.path().to_path_buf()).unwrap();
        let report = Report::of(&directory);
        assert_eq!(report.cycles, vec![vec!["c-1".to_string(), "c-2".to_string()]]);
        assert_eq!(report.dangling, ["c-2"]);

        let validate = Validate { quiet: true };
        assert!(validate.run(tmp.path().to_path_buf()).is_err());
    }
}
