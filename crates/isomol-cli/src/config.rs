use crate::cli::MeshArgs;
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileConfig {
    #[serde(default)]
    pub mesh: MeshSection,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct MeshSection {
    /// Default isolevels when no `-l` flags are given.
    pub isolevels: Option<Vec<f64>>,
    /// Default data channel index.
    pub channel: Option<usize>,
}

pub fn load(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)
        .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
    debug!(path = %path.display(), "Loaded configuration file.");
    Ok(config)
}

/// Effective mesh parameters after applying flag overrides on top of the
/// optional configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshConfig {
    pub isolevels: Vec<f64>,
    pub channel: usize,
}

pub fn resolve_mesh(args: &MeshArgs) -> Result<MeshConfig> {
    let file = match &args.config {
        Some(path) => load(path)?,
        None => FileConfig::default(),
    };

    let isolevels = if args.isolevels.is_empty() {
        file.mesh.isolevels.unwrap_or_default()
    } else {
        args.isolevels.clone()
    };
    if isolevels.is_empty() {
        return Err(CliError::Argument(
            "at least one isolevel is required (-l flag or mesh.isolevels in the config file)"
                .to_string(),
        ));
    }

    let channel = args.channel.or(file.mesh.channel).unwrap_or(0);

    Ok(MeshConfig { isolevels, channel })
}
