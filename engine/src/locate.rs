//! Finding the engine executable on disk.

use std::path::PathBuf;

/// Environment variable naming the engine executable. Takes precedence over
/// every other candidate.
pub const ENGINE_PATH_ENV: &str = "KINGSROW_PATH";

/// Ordered list of places the engine may be installed.
#[derive(Debug, Clone, Default)]
pub struct EngineLocator {
    candidates: Vec<PathBuf>,
}

impl EngineLocator {
    pub fn new(candidates: Vec<PathBuf>) -> Self {
        Self { candidates }
    }

    /// Candidates in priority order:
    /// 1. `KINGSROW_PATH` env variable if set
    /// 2. the configured path, if any
    /// 3. the built-in install locations
    pub fn from_env(configured: Option<PathBuf>) -> Self {
        let env_path = std::env::var_os(ENGINE_PATH_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self::from_sources(env_path, configured)
    }

    pub fn from_sources(env_path: Option<PathBuf>, configured: Option<PathBuf>) -> Self {
        let mut candidates = Vec::new();
        candidates.extend(env_path);
        candidates.extend(configured);
        candidates.extend(default_candidates());
        Self { candidates }
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    /// First candidate that exists as a file.
    pub fn locate(&self) -> Option<PathBuf> {
        let found = self
            .candidates
            .iter()
            .find(|path| path.is_file())
            .cloned();
        match &found {
            Some(path) => tracing::info!("Found engine at: {}", path.display()),
            None => tracing::warn!(
                "Engine executable not found ({} candidates checked)",
                self.candidates.len()
            ),
        }
        found
    }
}

/// Common install locations.
pub fn default_candidates() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = [
        r"C:\Program Files\KingsRow\KingsRow.exe",
        r"C:\Program Files (x86)\KingsRow\KingsRow.exe",
        r"C:\KingsRow\KingsRow.exe",
        r".\KingsRow.exe",
    ]
    .iter()
    .map(PathBuf::from)
    .collect();

    if let Some(desktop) = dirs::desktop_dir() {
        paths.push(desktop.join("KingsRow.exe"));
    }
    if let Some(documents) = dirs::document_dir() {
        paths.push(documents.join("KingsRow").join("KingsRow.exe"));
    }
    paths
}
