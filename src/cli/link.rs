use std::path::PathBuf;

use casebook::Directory;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
pub struct Link {
    /// The id of the case that gains a related case
    from: String,

    /// The id of the related case
    to: String,
}

impl Link {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root)?;

        let outcome = directory.link(&self.from, &self.to)?;
        directory.flush()?;

        if outcome.already_linked {
            println!("{} is already related to {}", self.to, self.from);
        } else {
            println!("Related {} to {}", self.to, self.from);
        }

        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Unlink {
    /// The id of the case that loses a related case
    from: String,

    /// The id of the related case to remove
    to: String,
}

impl Unlink {
    #[instrument]
    pub fn run(self, root: PathBuf) -> anyhow::Result<()> {
        let mut directory = Directory::new(root)?;

        if !directory.unlink(&self.from, &self.to)? {
            anyhow::bail!("{} is not related to {}", self.to, self.from);
        }
        directory.flush()?;

        println!("Removed {} from {}", self.to, self.from);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use casebook::{Case, Directory};
    use tempfile::tempdir;

    use super::*;

    fn setup(ids: &[&str]) -> tempfile::TempDir {
        let tmp = tempdir().unwrap();
        let mut directory = Directory::new(tmp.path().to_path_buf()).unwrap();
        for id in ids {
            let mut case = Case::new();
            case.set_id((*id).to_string());
            directory.insert(case).unwrap();
        }
        directory.flush().unwrap();
        tmp
    }

    fn link(from: &str, to: &str) -> Link {
        Link {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    #[test]
    fn link_run_stores_related_case() {
        let tmp = setup(&["c-1", "c-2"]);

        link("c-1", "c-2")
            .run(tmp.path().to_path_buf())
            .expect("link command should succeed");

        let directory = Directory::new(tmp.path().to_path_buf()).unwrap();
        let related: Vec<_> = directory
            .get("c-1")
            .unwrap()
            .related_cases()
            .iter()
            .filter_map(Case::id)
            .collect();
        assert_eq!(related, ["c-2"]);
    }

    #[test]
    fn link_run_refuses_cycle() {
        let tmp = setup(&["c-1", "c-2"]);
        link("c-1", "c-2").run(tmp.path().to_path_buf()).unwrap();

        assert!(link("c-2", "c-1").run(tmp.path().to_path_buf()).is_err());
    }

    #[test]
    fn unlink_run_removes_relation() {
        let tmp = setup(&["c-1", "c-2"]);
        link("c-1", "c-2").run(tmp.path().to_path_buf()).unwrap();

        let unlink = || Unlink {
            from: "c-1".to_string(),
            to: "c-2".to_string(),
        };
        unlink().run(tmp.path().to_path_buf()).unwrap();
        assert!(unlink().run(tmp.path().to_path_buf()).is_err());

        let directory = Directory::new(tmp.path().to_path_buf()).unwrap();
        assert!(directory.get("c-1").unwrap().related_cases().is_empty());
    }
}
