//! Top-level job orchestration: opens the input document, resolves job
//! geometry, opens the output sink, and drives the page pipeline (C7) to
//! completion.

use crate::band::BandContext;
use crate::capabilities::PrinterCapabilities;
use crate::cli::Cli;
use crate::error::{EngineError, InputError};
use crate::geometry::{build_headers, PageGeometry};
use crate::options::build_option_map;
use crate::pipeline::{run_job, OutputFormat, RasterTarget};
use crate::progress::ProgressReporter;
use crate::sink::Sink;
use crate::source::jpeg::JpegSource;
use crate::source::pdf::PdfSource;
use crate::source::{BlankPageRasterizer, PageSource};
use std::path::Path;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::{info, warn};

/// Dispatches between the two input formats C4 supports behind one
/// `PageSource` implementation, so the pipeline loop (C7) stays generic
/// over a single concrete type.
enum AnySource {
    Pdf(PdfSource),
    Jpeg(JpegSource),
}

impl PageSource for AnySource {
    fn page_count(&self) -> u32 {
        match self {
            AnySource::Pdf(s) => s.page_count(),
            AnySource::Jpeg(s) => s.page_count(),
        }
    }

    fn permits_printing(&self) -> bool {
        match self {
            AnySource::Pdf(s) => s.permits_printing(),
            AnySource::Jpeg(s) => s.permits_printing(),
        }
    }

    fn is_encrypted(&self) -> bool {
        match self {
            AnySource::Pdf(s) => s.is_encrypted(),
            AnySource::Jpeg(s) => s.is_encrypted(),
        }
    }

    fn unlock_with_empty_password(&mut self) -> bool {
        match self {
            AnySource::Pdf(s) => s.unlock_with_empty_password(),
            AnySource::Jpeg(s) => s.unlock_with_empty_password(),
        }
    }

    fn page_crop_box(&self, index: u32) -> crate::source::Rect {
        match self {
            AnySource::Pdf(s) => s.page_crop_box(index),
            AnySource::Jpeg(s) => s.page_crop_box(index),
        }
    }

    fn draw_page(
        &self,
        index: u32,
        band: &mut BandContext,
        window_top: u32,
        window_bottom: u32,
        transform: crate::transform::Matrix,
        color_type: crate::geometry::ColorType,
    ) -> Result<(), InputError> {
        match self {
            AnySource::Pdf(s) => s.draw_page(index, band, window_top, window_bottom, transform, color_type),
            AnySource::Jpeg(s) => s.draw_page(index, band, window_top, window_bottom, transform, color_type),
        }
    }
}

fn infer_mime(path: &Path, explicit: Option<&str>) -> &'static str {
    if let Some(m) = explicit {
        if m.contains("pdf") {
            return "application/pdf";
        }
        if m.contains("jpeg") || m.contains("jpg") {
            return "image/jpeg";
        }
    }
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()) {
        Some(ext) if ext == "pdf" => "application/pdf",
        Some(ext) if ext == "jpg" || ext == "jpeg" => "image/jpeg",
        _ => "application/pdf",
    }
}

fn open_source(path: &Path, input_mime: Option<&str>) -> Result<AnySource, EngineError> {
    if !path.exists() {
        return Err(InputError::FileNotFound(path.display().to_string()).into());
    }
    match infer_mime(path, input_mime) {
        "image/jpeg" => Ok(AnySource::Jpeg(JpegSource::open(path)?)),
        _ => Ok(AnySource::Pdf(PdfSource::open(path, Box::new(BlankPageRasterizer))?)),
    }
}

fn select_format(output_mime: &str) -> Result<OutputFormat, EngineError> {
    if output_mime.contains("pwg-raster") {
        Ok(OutputFormat::Pwg)
    } else if output_mime.contains("pcl") {
        Ok(OutputFormat::Pcl)
    } else {
        Err(crate::error::ConfigError::UnsupportedOutputMime(output_mime.to_string()).into())
    }
}

/// Runs one transform job end to end, per the `ipptransform`-style CLI
/// contract: reads `cli.filename`, writes the device stream to
/// `cli.device_uri` (or stdout), and reports progress on `stderr`.
pub async fn run(cli: &Cli) -> Result<(), EngineError> {
    let caps = PrinterCapabilities::from_env_and_cli(cli);
    let mut reporter = ProgressReporter::new(Box::new(tokio::io::stderr().compat_write()));

    let mut source = open_source(Path::new(&cli.filename), cli.input_mime.as_deref())?;

    if source.is_encrypted() && !source.unlock_with_empty_password() {
        return Err(InputError::PdfEncryptedAndLocked.into());
    }
    if !source.permits_printing() {
        return Err(InputError::PdfPrintingForbidden.into());
    }

    let options = build_option_map(&cli.options);
    let page_count = source.page_count().max(1);
    let geom = PageGeometry::resolve(&options, &caps, page_count)?;
    let (front, back) = build_headers(&geom, page_count);
    let copies = geom.copies;

    info!(
        pages = page_count,
        copies,
        xdpi = front.xdpi,
        ydpi = front.ydpi,
        duplex = front.duplex,
        "job resolved"
    );
    reporter
        .attr("job-impressions", front.total_page_count)
        .await
        .map_err(crate::error::SinkError::WriteFailure)?;

    let output_mime = cli
        .output_mime
        .as_deref()
        .ok_or_else(|| crate::error::ConfigError::UnsupportedOutputMime(String::new()))?;
    let format = select_format(output_mime)?;
    let sink: crate::pipeline::BoxedSink = Box::new(Sink::open(cli.device_uri.as_deref()).await?);
    let target = RasterTarget::start_job(sink, format).await?;

    let band_bpp = front.color_type.band_bpp();
    let mut band = BandContext::new(&front, band_bpp);

    if let Err(err) = run_job(
        target,
        &source,
        &front,
        &back,
        geom.sheet_back,
        copies,
        page_count,
        &mut band,
        &mut reporter,
    )
    .await
    {
        warn!(%err, "job failed");
        return Err(err);
    }

    Ok(())
}
