//! Process-wide printer capabilities, read once at startup from the
//! environment variables named in the external interfaces and the matching
//! CLI top-level flags (which take precedence when present).

use crate::cli::Cli;
use std::env;

/// A snapshot of what this printer supports, consumed by the job
/// configurator (C2). No configuration file is introduced: this process is
/// a per-job filter invoked by a parent server, so env + flags are the
/// complete configuration surface.
#[derive(Debug, Clone)]
pub struct PrinterCapabilities {
    /// Comma-separated supported resolutions, e.g. `["300dpi", "600dpi"]`.
    pub resolutions: Vec<String>,
    /// Comma-separated supported raster color types, e.g. `["sgray_8", "srgb_8"]`.
    pub types: Vec<String>,
    pub sheet_back: String,
    pub media_default: String,
    pub sides_default: String,
    /// Effective verbosity: `max(SERVER_LOGLEVEL floor, -v count)`.
    pub verbosity: u8,
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_loglevel_floor() -> u8 {
    match env::var("SERVER_LOGLEVEL").as_deref() {
        Ok("debug") => 2,
        Ok("info") => 1,
        _ => 0,
    }
}

impl PrinterCapabilities {
    /// Reads the environment and overlays any CLI top-level flags that take
    /// precedence, per §4.1/§6.
    pub fn from_env_and_cli(cli: &Cli) -> Self {
        let resolutions = cli
            .resolutions
            .clone()
            .or_else(|| env::var("PWG_RASTER_DOCUMENT_RESOLUTION_SUPPORTED").ok())
            .map(|s| split_list(&s))
            .unwrap_or_default();
        let types = cli
            .types
            .clone()
            .or_else(|| env::var("PWG_RASTER_DOCUMENT_TYPE_SUPPORTED").ok())
            .map(|s| split_list(&s))
            .unwrap_or_default();
        let sheet_back = cli
            .sheet_back
            .clone()
            .or_else(|| env::var("PWG_RASTER_DOCUMENT_SHEET_BACK").ok())
            .unwrap_or_else(|| "normal".to_string());
        let media_default =
            env::var("PRINTER_MEDIA_DEFAULT").unwrap_or_else(|_| "na_letter_8.5x11in".to_string());
        let sides_default =
            env::var("PRINTER_SIDES_DEFAULT").unwrap_or_else(|_| "one-sided".to_string());
        let verbosity = env_loglevel_floor().max(cli.verbose);

        PrinterCapabilities {
            resolutions,
            types,
            sheet_back,
            media_default,
            sides_default,
            verbosity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_comma_separated_lists() {
        assert_eq!(
            split_list("300dpi, 600dpi"),
            vec!["300dpi".to_string(), "600dpi".to_string()]
        );
    }
}
