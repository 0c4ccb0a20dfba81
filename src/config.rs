use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "CliniReport";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Env var overriding where exported artifacts are written.
pub const EXPORTS_DIR_ENV: &str = "CLINIREPORT_EXPORTS_DIR";

/// Get the application data directory
/// ~/CliniReport/ on all platforms. Falls back to the working directory when
/// no home directory can be determined.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Get the exports directory
///
/// Priority:
/// 1. `CLINIREPORT_EXPORTS_DIR` env var
/// 2. `~/CliniReport/exports/`
pub fn exports_dir() -> PathBuf {
    match std::env::var(EXPORTS_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => app_data_dir().join("exports"),
    }
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "clinireport=info,clinireport_lib=info"
}
