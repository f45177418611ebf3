use anyhow::Result;
use std::path::PathBuf;

const KHARCHA_DIR: &str = ".kharcha";
const DB_FILE: &str = "kharcha.db";

/// Environment variable to override the Kharcha directory.
const KHARCHA_DIR_ENV: &str = "KHARCHA_DIR";

/// Resolve the Kharcha data directory.
/// Priority: KHARCHA_DIR env var > ~/.kharcha/
pub fn resolve_kharcha_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(KHARCHA_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|h| h.join(KHARCHA_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}

/// Ensure the Kharcha directory exists and return its path.
pub fn ensure_kharcha_dir() -> Result<PathBuf> {
    let dir = resolve_kharcha_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Ensure database path exists and return it: ~/.kharcha/kharcha.db
pub fn ensure_database_path() -> Result<PathBuf> {
    Ok(ensure_kharcha_dir()?.join(DB_FILE))
}

/// Convenience helper returning the database path as a UTF-8 string.
pub fn ensure_database_path_string() -> Result<String> {
    Ok(ensure_database_path()?.to_string_lossy().into_owned())
}
