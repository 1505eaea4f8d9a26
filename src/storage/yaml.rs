use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Read, Write},
    path::Path,
};

use crate::Case;

/// Errors that can occur when loading a case from YAML.
#[derive(Debug, thiserror::Error)]
#[error("failed to read case from yaml")]
pub enum LoadError {
    /// The case file was not found.
    NotFound,
    /// An I/O error occurred.
    Io(#[from] io::Error),
    /// The YAML could not be parsed.
    Yaml(#[from] serde_yaml::Error),
}

/// Read a single case from YAML.
///
/// # Errors
///
/// Returns an error if the reader fails or the content is not a case.
pub fn read<R: Read>(reader: R) -> Result<Case, LoadError> {
    Ok(serde_yaml::from_reader(reader)?)
}

/// Write a single case as YAML.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn write<W: Write>(case: &Case, writer: &mut W) -> io::Result<()> {
    let yaml = serde_yaml::to_string(case).map_err(io::Error::other)?;
    writer.write_all(yaml.as_bytes())?;
    writer.flush()
}

/// Load a case from a file.
///
/// # Errors
///
/// Returns [`LoadError::NotFound`] if the file does not exist, or another
/// [`LoadError`] if it cannot be read or parsed.
pub fn load(path: &Path) -> Result<Case, LoadError> {
    let file = File::open(path).map_err(|io_error| match io_error.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound,
        _ => LoadError::Io(io_error),
    })?;

    read(BufReader::new(file))
}

/// Save a case to a file.
///
/// Parent directories are created automatically if they don't exist.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written to.
pub fn save(case: &Case, path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(case, &mut writer)
}
