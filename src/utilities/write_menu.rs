use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::menu::Menu;

/// Pretty JSON with 4-space indentation, non-ASCII kept as-is.
pub fn render_menu(menu: &Menu) -> Result<String> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    menu.serialize(&mut serializer).context("Failed to serialize menu")?;

    String::from_utf8(buffer).context("Serialized menu is not valid UTF-8")
}

/// Overwrites `path` with the rendered menu, creating parent directories as needed.
pub async fn write_menu(menu: &Menu, path: &Path) -> Result<()> {
    let rendered = render_menu(menu)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
    }

    tokio::fs::write(path, rendered)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(())
}
