pub mod directory;
/// YAML serialization for cases.
pub mod yaml;

pub use directory::{Directory, DirectoryError, DirectoryLoadError, METADATA_DIR};
pub use yaml::LoadError;
