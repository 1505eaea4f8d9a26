//! A filesystem backed store of cases
//!
//! The [`Directory`] keeps one YAML file per case under a root directory, with
//! registry settings in `.cases/config.toml`. Relations between cases are
//! checked against a [`CaseGraph`] built from everything on disk.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    ffi::OsStr,
    fmt, io,
    path::{Path, PathBuf},
};

use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use walkdir::WalkDir;

use crate::{
    Case,
    domain::{CaseGraph, Config, LinkError, LinkOutcome},
    storage::yaml,
};

/// Name of the metadata directory at the root of a registry.
pub const METADATA_DIR: &str = ".cases";

/// A filesystem backed store of cases.
#[derive(Debug)]
pub struct Directory {
    /// The root of the directory cases are stored in.
    root: PathBuf,
    config: Config,
    /// Top-level cases, keyed by id.
    cases: BTreeMap<String, Case>,
    /// Where each case was loaded from.
    paths: HashMap<String, PathBuf>,
    graph: CaseGraph,
    dirty: BTreeSet<String>,
}

/// Errors raised while loading a directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryLoadError {
    /// Files that could not be read as cases.
    UnrecognisedFiles(Vec<PathBuf>),
    /// Two files hold a case with the same id.
    DuplicateId {
        /// The duplicated id.
        id: String,
        /// The file read first.
        first: PathBuf,
        /// The file read second.
        second: PathBuf,
    },
}

impl fmt::Display for DirectoryLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognisedFiles(paths) => {
                write!(f, "Unrecognised files: ")?;
                for (i, path) in paths.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", path.display())?;
                }
                Ok(())
            }
            Self::DuplicateId { id, first, second } => write!(
                f,
                "Case {id} is defined in both {} and {}",
                first.display(),
                second.display()
            ),
        }
    }
}

/// Errors raised when changing the contents of a directory.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The case has no id, so it cannot be stored.
    #[error("case has no id")]
    MissingId,
    /// The id cannot be used as a file name.
    #[error("case id {0:?} is not a valid file name")]
    InvalidFileName(String),
    /// A case with this id already exists.
    #[error("case {0} already exists")]
    AlreadyExists(String),
    /// The file a new case would be written to is already taken.
    #[error("{} is already in use", .0.display())]
    PathInUse(PathBuf),
    /// No case with this id exists.
    #[error("case {0} not found")]
    NotFound(String),
    /// An update tried to change a case's id.
    #[error("updating case {0} must not change its id")]
    IdChanged(String),
    /// The relation was refused.
    #[error(transparent)]
    Link(#[from] LinkError),
    /// Writing to disk failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Directory {
    /// Open the directory at the given path and load every case in it.
    ///
    /// # Errors
    ///
    /// If `allow_unrecognised` is `false` (the default), any YAML file that
    /// cannot be read as a case with an id is an error. Otherwise such files
    /// are skipped. Two files holding the same case id are always an error.
    #[tracing::instrument(level = "debug")]
    pub fn new(root: PathBuf) -> Result<Self, DirectoryLoadError> {
        let config = load_config(&root);
        let paths = collect_yaml_paths(&root);

        let (loaded, unrecognised): (Vec<_>, Vec<_>) = paths
            .par_iter()
            .map(|path| try_load_case(path))
            .partition(Result::is_ok);

        let unrecognised: Vec<PathBuf> = unrecognised.into_iter().filter_map(Result::err).collect();

        if !config.allow_unrecognised && !unrecognised.is_empty() {
            return Err(DirectoryLoadError::UnrecognisedFiles(unrecognised));
        }

        let mut cases = BTreeMap::new();
        let mut case_paths: HashMap<String, PathBuf> = HashMap::new();
        for (id, case, path) in loaded.into_iter().filter_map(Result::ok) {
            if let Some(first) = case_paths.get(&id) {
                return Err(DirectoryLoadError::DuplicateId {
                    id,
                    first: first.clone(),
                    second: path,
                });
            }
            case_paths.insert(id.clone(), path);
            cases.insert(id, case);
        }

        tracing::debug!("Loaded {} cases from {}", cases.len(), root.display());

        let graph = CaseGraph::from_cases(cases.values());

        Ok(Self {
            root,
            config,
            cases,
            paths: case_paths,
            graph,
            dirty: BTreeSet::new(),
        })
    }

    /// The root of the directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The registry configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The relation graph of every case in the directory, including nested
    /// related cases.
    #[must_use]
    pub const fn graph(&self) -> &CaseGraph {
        &self.graph
    }

    /// Iterate over the top-level cases, ordered by id.
    pub fn cases(&self) -> impl Iterator<Item = &Case> + '_ {
        self.cases.values()
    }

    /// Find a top-level case by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Case> {
        self.cases.get(id)
    }

    /// The file a case is (or will be) stored in.
    #[must_use]
    pub fn path_for(&self, id: &str) -> Option<PathBuf> {
        if !self.cases.contains_key(id) {
            return None;
        }
        Some(
            self.paths
                .get(id)
                .cloned()
                .unwrap_or_else(|| self.root.join(format!("{id}.yaml"))),
        )
    }

    /// Add a new case.
    ///
    /// The case is written on the next [`flush`](Self::flush).
    ///
    /// # Errors
    ///
    /// Returns an error if the case has no id, if the id is not usable as a
    /// file name, if a case with that id already exists, or if its file
    /// `<root>/<id>.yaml` already exists or holds another case.
    pub fn insert(&mut self, case: Case) -> Result<(), DirectoryError> {
        let id = case.id().ok_or(DirectoryError::MissingId)?.to_string();
        validate_file_name(&id)?;
        if self.cases.contains_key(&id) {
            return Err(DirectoryError::AlreadyExists(id));
        }

        let path = self.root.join(format!("{id}.yaml"));
        if path.exists() || self.paths.values().any(|p| *p == path) {
            return Err(DirectoryError::PathInUse(path));
        }

        tracing::debug!("Adding case {id}");
        self.cases.insert(id.clone(), case);
        self.dirty.insert(id);
        self.rebuild_graph();
        Ok(())
    }

    /// Apply a named update to an existing case.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotFound`] if there is no such case, or
    /// [`DirectoryError::IdChanged`] if the update altered the id, in which
    /// case the update is discarded.
    pub fn update<F>(&mut self, id: &str, update: F) -> Result<&Case, DirectoryError>
    where
        F: FnOnce(&mut Case),
    {
        let case = self
            .cases
            .get_mut(id)
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))?;

        let mut updated = case.clone();
        update(&mut updated);
        if updated.id() != Some(id) {
            return Err(DirectoryError::IdChanged(id.to_string()));
        }

        *case = updated;
        self.dirty.insert(id.to_string());
        self.rebuild_graph();

        self.cases
            .get(id)
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))
    }

    /// Relate case `to` to case `from`.
    ///
    /// A copy of `to` is appended to the related cases of `from`. When the
    /// configuration rejects cycles, the relation is first checked against
    /// the id graph.
    ///
    /// # Errors
    ///
    /// Returns an error if either case does not exist, or if the relation
    /// would create a cycle and cycles are rejected.
    pub fn link(&mut self, from: &str, to: &str) -> Result<LinkOutcome, DirectoryError> {
        let related = self
            .cases
            .get(to)
            .cloned()
            .ok_or_else(|| DirectoryError::NotFound(to.to_string()))?;
        let case = self
            .cases
            .get(from)
            .ok_or_else(|| DirectoryError::NotFound(from.to_string()))?;

        if case.related_cases().iter().any(|c| c.id() == Some(to)) {
            return Ok(LinkOutcome {
                already_linked: true,
            });
        }

        if self.config.reject_cycles {
            self.graph.link(from, to)?;
        }

        self.update(from, |case| case.related_cases_mut().push(related))?;
        tracing::info!("Related case {to} to {from}");

        Ok(LinkOutcome {
            already_linked: false,
        })
    }

    /// Remove every direct related case with id `to` from case `from`.
    ///
    /// Returns `true` if anything was removed.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::NotFound`] if `from` does not exist.
    pub fn unlink(&mut self, from: &str, to: &str) -> Result<bool, DirectoryError> {
        let case = self
            .cases
            .get(from)
            .ok_or_else(|| DirectoryError::NotFound(from.to_string()))?;

        if !case.related_cases().iter().any(|c| c.id() == Some(to)) {
            return Ok(false);
        }

        self.update(from, |case| case.related_cases_mut().retain(|c| c.id() != Some(to)))?;
        Ok(true)
    }

    /// Related case ids that have no file of their own.
    #[must_use]
    pub fn dangling_references(&self) -> BTreeSet<&str> {
        self.cases
            .values()
            .flat_map(Case::descendants)
            .filter_map(Case::id)
            .filter(|id| !self.cases.contains_key(*id))
            .collect()
    }

    /// Write every modified case to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written. Cases not yet written
    /// stay modified, so a later flush retries them.
    pub fn flush(&mut self) -> io::Result<Vec<PathBuf>> {
        let pending: Vec<String> = self.dirty.iter().cloned().collect();
        let mut written = Vec::with_capacity(pending.len());
        for id in pending {
            if let (Some(case), Some(path)) = (self.cases.get(&id), self.path_for(&id)) {
                yaml::save(case, &path)?;
                tracing::debug!("Wrote {}", path.display());
                self.paths.insert(id.clone(), path.clone());
                written.push(path);
            }
            self.dirty.remove(&id);
        }
        Ok(written)
    }

    fn rebuild_graph(&mut self) {
        self.graph = CaseGraph::from_cases(self.cases.values());
    }
}

fn validate_file_name(id: &str) -> Result<(), DirectoryError> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(DirectoryError::InvalidFileName(id.to_string()));
    }
    Ok(())
}

fn load_config(root: &Path) -> Config {
    let path = root.join(METADATA_DIR).join("config.toml");
    Config::load(&path).unwrap_or_else(|e| {
        tracing::debug!("Failed to load config: {e}");
        Config::default()
    })
}

fn collect_yaml_paths(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| {
            !entry
                .path()
                .components()
                .any(|c| c.as_os_str() == METADATA_DIR)
        })
        .filter(|entry| {
            matches!(
                entry.path().extension().and_then(OsStr::to_str),
                Some("yaml" | "yml")
            )
        })
        .map(walkdir::DirEntry::into_path)
        .collect()
}

fn try_load_case(path: &Path) -> Result<(String, Case, PathBuf), PathBuf> {
    let case = match yaml::load(path) {
        Ok(case) => case,
        Err(e) => {
            tracing::debug!("Failed to load case from {}: {:?}", path.display(), e);
            return Err(path.to_path_buf());
        }
    };

    let Some(id) = case.id().map(str::to_string) else {
        tracing::debug!("Skipping case without id at {}", path.display());
        return Err(path.to_path_buf());
    };

    Ok((id, case, path.to_path_buf()))
}
