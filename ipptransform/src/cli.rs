//! Top-level CLI surface: `ipptransform [options] filename`.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "ipptransform", about = "Transform a print-ready document into a PWG-Raster or HP PCL device stream")]
pub struct Cli {
    /// Output device URI (`socket://host:port`); defaults to stdout.
    #[arg(short = 'd')]
    pub device_uri: Option<String>,

    /// Input MIME type; inferred from the filename extension when absent.
    #[arg(short = 'i')]
    pub input_mime: Option<String>,

    /// Output MIME type: `application/vnd.hp-pcl` or `image/pwg-raster`.
    #[arg(short = 'm')]
    pub output_mime: Option<String>,

    /// Job options as `"k=v k2=v2 ..."`, repeatable and merged in order.
    #[arg(short = 'o', num_args = 1.., action = clap::ArgAction::Append)]
    pub options: Vec<String>,

    /// Supported resolutions, comma-separated (e.g. `300dpi,600dpi`).
    #[arg(short = 'r')]
    pub resolutions: Option<String>,

    /// Sheet-back keyword: `normal` | `flipped` | `manual-tumble` | `rotated`.
    #[arg(short = 's')]
    pub sheet_back: Option<String>,

    /// Supported raster types, comma-separated (e.g. `sgray_8,srgb_8`).
    #[arg(short = 't')]
    pub types: Option<String>,

    /// Increase verbosity; repeatable.
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Input document path.
    pub filename: String,
}
