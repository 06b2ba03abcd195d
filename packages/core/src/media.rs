// Подготовка каталогов для медиа

use crate::config::Config;
use crate::error::{Result, WhatsflyError};
use std::path::Path;

/// Make sure every media subdirectory exists under `root`.
///
/// An empty `root` means media persistence is off and nothing is created.
/// Safe to call repeatedly.
pub fn provision(root: &Path) -> Result<()> {
    if root.as_os_str().is_empty() {
        return Ok(());
    }

    for subdir in Config::global().media_subdirectories {
        let path = root.join(subdir);
        std::fs::create_dir_all(&path)
            .map_err(|source| WhatsflyError::MediaProvisioning { path, source })?;
    }

    tracing::debug!("Media directories ready under {}", root.display());
    Ok(())
}
