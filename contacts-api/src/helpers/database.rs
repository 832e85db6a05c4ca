use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ApiConfig;
use crate::database::Database;

/// Returns the default path of the contacts database
///
/// # Platform-specific paths
///
/// - **macOS**: `~/Library/Application Support/contactbook/contacts.db`
/// - **Linux**: `~/.local/share/contactbook/contacts.db`
/// - **Windows**: `%LOCALAPPDATA%\contactbook\contacts.db`
pub fn get_db_path() -> anyhow::Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(data_dir.join("contactbook").join("contacts.db"))
}

/// Open the database named by `[database] path`, or the platform default
pub fn initialize_database(config: &ApiConfig) -> anyhow::Result<(Arc<Database>, PathBuf)> {
    let db_path = match config.database.as_ref().and_then(|d| d.path.clone()) {
        Some(path) => path,
        None => get_db_path()?,
    };

    let db = Database::new(&db_path)?;
    Ok((Arc::new(db), db_path))
}
