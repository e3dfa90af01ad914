//! YAML output for parsed extensions.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use crate::error::Result;
use crate::types::Extension;

/// Render an extension as a YAML document.
pub fn generate_yaml(extension: &Extension) -> Result<String> {
    let yaml_string = serde_yaml_ng::to_string(extension)?;

    let lines: Vec<&str> = yaml_string.lines().map(str::trim_end).collect();
    Ok(format!("---\n{}\n", lines.join("\n")))
}

/// Save an extension as YAML to `path`.
///
/// Writes to a temp file next to the target, syncs it, then renames it
/// into place so an existing file is never left half written.
pub fn save_yaml(extension: &Extension, path: &Path) -> Result<()> {
    let content = generate_yaml(extension)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "extension.yaml".to_string());
    let temp_file = path.with_file_name(format!(".{file_name}.tmp"));

    {
        let mut file = File::create(&temp_file)?;
        file.write_all(content.as_bytes())?;
        file.sync_all()?;
    }

    // On Windows, rename fails if the destination already exists
    #[cfg(target_os = "windows")]
    if path.exists() {
        fs::remove_file(path)?;
    }

    fs::rename(&temp_file, path)?;
    Ok(())
}
