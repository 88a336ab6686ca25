//! Per-domain error types, one `thiserror` enum per failure boundary named
//! in the error handling design, unified by [`EngineError`] at the `main`
//! boundary.

use derive_more::From;
use thiserror::Error;

/// Failures while resolving the option map into a [`crate::geometry::PageGeometry`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown flag: {0}")]
    UnknownFlag(String),
    #[error("missing argument for flag: {0}")]
    MissingArgument(String),
    #[error("invalid resolution string '{0}'")]
    BadResolution(String),
    #[error("Unknown \"media\" value '{0}'")]
    UnknownMedia(String),
    #[error("unsupported input MIME type '{0}'")]
    UnsupportedInputMime(String),
    #[error("unsupported output MIME type '{0}'")]
    UnsupportedOutputMime(String),
    #[error("copies {0} out of range (1..=9999)")]
    CopiesOutOfRange(u32),
    #[error("no resolution could be resolved from options or supported list")]
    NoResolutionResolved,
}

/// Failures opening or pre-flighting the input document.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("input file not found: {0}")]
    FileNotFound(String),
    #[error("failed to read PDF: {0}")]
    PdfUnreadable(String),
    #[error("PDF is encrypted and could not be unlocked with an empty password")]
    PdfEncryptedAndLocked,
    #[error("PDF forbids printing")]
    PdfPrintingForbidden,
    #[error("failed to decode JPEG: {0}")]
    JpegDecodeFailure(String),
}

/// Failures constructing a [`crate::geometry::RasterHeader`].
#[derive(Error, Debug)]
pub enum RasterSetupError {
    #[error("page size '{0}' has no cups/pwg media representation")]
    UnrepresentableMedia(String),
    #[error("raster header field overflowed its wire representation")]
    FieldOverflow,
}

/// Failures writing to the output sink (C9).
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("device-uri scheme '{0}' is not supported (only socket:// and the default fd)")]
    UnsupportedScheme(String),
    #[error("failed to resolve or connect to {0}: {1}")]
    ConnectFailure(String, #[source] std::io::Error),
    #[error("connecting to {0} timed out after 30 seconds")]
    ConnectTimeout(String),
    #[error("sink write error: {0}")]
    WriteFailure(#[from] std::io::Error),
}

/// Top-level error unifying every component's failure domain at the `main`
/// boundary, where it becomes an `ERROR:` progress line and exit code 1.
#[derive(Error, Debug, From)]
pub enum EngineError {
    #[error("configuration error: {0}")]
    Config(ConfigError),
    #[error("input error: {0}")]
    Input(InputError),
    #[error("raster setup error: {0}")]
    RasterSetup(RasterSetupError),
    #[error("sink error: {0}")]
    Sink(SinkError),
    #[error("CUPS raster error: {0}")]
    CupsRaster(#[from] print_raster::error::CupsRasterError),
    #[error("PCL error: {0}")]
    Pcl(#[from] print_raster::error::PclError),
}
