pub mod init;
pub mod list;
pub mod results;
pub mod take;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::Result;

use skillcheck_store::{load_config_from, SkillcheckConfig};

/// Load the config, then let an explicit catalog path win over it.
pub fn config_with_catalog(
    catalog: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<SkillcheckConfig> {
    let mut config = load_config_from(config_path)?;
    if let Some(catalog) = catalog {
        config.catalog = catalog;
    }
    Ok(config)
}
