//! Page Pipeline (C7): the top-level loop over copies × pages, driving
//! either the PWG or PCL encoder through a small hand-rolled dispatch
//! wrapper (`RasterTarget`) rather than fighting `print_raster`'s generic
//! trait bounds through a single boxed capability — the same
//! risk-reducing simplification already taken for `PclWriter`'s boxed
//! futures.

use crate::band::BandContext;
use crate::error::{EngineError, SinkError};
use crate::geometry::{pcl_image_box, ColorType, RasterHeader, SheetBack};
use crate::progress::ProgressReporter;
use crate::pwg::build_cups_header;
use crate::source::PageSource;
use crate::transform::{back_side_transform, pack_rgbx_to_rgb, Matrix};
use futures::{AsyncWrite, AsyncWriteExt};
use print_raster::model::pcl::PclPageHeader;
use print_raster::writer::cups::{CupsRasterPageWriterV3BE, CupsRasterWriterV3BE};
use print_raster::writer::pcl::{PclPageWriter, PclWriter};
use print_raster::writer::{RasterPageWriter, RasterWriter};
use std::ops::DerefMut;
use std::pin::Pin;
use tracing::{debug, info};

pub type BoxedSink = Box<dyn AsyncWrite + Unpin + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Pwg,
    Pcl,
}

/// The scanline window that actually reaches the wire for `header`, as
/// `(row_top, row_bottom, col_left, col_right)`, all inclusive. PWG-Raster
/// emits the full page; PCL crops to `geometry::pcl_image_box`'s margins,
/// since `print_raster::encode::pcl::PclLineEncoder` enforces exactly that
/// width and row count.
fn image_box_bounds(header: &RasterHeader, format: OutputFormat) -> (u32, u32, u32, u32) {
    match format {
        OutputFormat::Pwg => (0, header.cups_height - 1, 0, header.cups_width - 1),
        OutputFormat::Pcl => {
            let (left, top, right, bottom) = pcl_image_box(header);
            (top, bottom, left, right)
        }
    }
}

fn pcl_header_for(header: &RasterHeader, back_side: bool) -> PclPageHeader {
    let (left, top, right, bottom) = pcl_image_box(header);
    PclPageHeader {
        dpi: header.xdpi,
        page_height_pt: header.page_height_pt,
        left,
        top,
        right,
        bottom,
        duplex: header.duplex,
        tumble: header.tumble,
        back_side,
    }
}

async fn write_line_to<E>(encoder: &mut E, line: &[u8]) -> Result<(), EngineError>
where
    E: AsyncWrite + Unpin,
{
    encoder
        .write_all(line)
        .await
        .map_err(SinkError::WriteFailure)?;
    Ok(())
}

/// Owns exactly one of a CUPS-raster or PCL job/page writer at a time. Both
/// `RasterWriter::next_page` and `RasterPageWriter::next_page` consume
/// `self` by value, so each transition is modeled as taking the current
/// variant out of an `Option` and replacing it with the successor.
enum Stage {
    PwgJob(CupsRasterWriterV3BE<BoxedSink>),
    PwgPage(CupsRasterPageWriterV3BE<BoxedSink>),
    PclJob(PclWriter<BoxedSink>),
    PclPage(PclPageWriter<BoxedSink>),
}

pub struct RasterTarget {
    stage: Option<Stage>,
}

impl RasterTarget {
    pub async fn start_job(sink: BoxedSink, format: OutputFormat) -> Result<Self, EngineError> {
        let stage = match format {
            OutputFormat::Pwg => Stage::PwgJob(CupsRasterWriterV3BE::new(Pin::new(sink)).await?),
            OutputFormat::Pcl => Stage::PclJob(PclWriter::new(Pin::new(sink)).await?),
        };
        Ok(RasterTarget { stage: Some(stage) })
    }

    pub async fn start_page(&mut self, header: &RasterHeader, back_side: bool) -> Result<(), EngineError> {
        let stage = self.stage.take().expect("RasterTarget used after finish");
        let next = match stage {
            Stage::PwgJob(writer) => {
                let cups_header = build_cups_header(header);
                Stage::PwgPage(writer.next_page(&cups_header).await?)
            }
            Stage::PwgPage(page) => {
                let cups_header = build_cups_header(header);
                Stage::PwgPage(page.next_page(&cups_header).await?)
            }
            Stage::PclJob(writer) => {
                let pcl_header = pcl_header_for(header, back_side);
                Stage::PclPage(writer.next_page(&pcl_header).await?)
            }
            Stage::PclPage(page) => {
                let pcl_header = pcl_header_for(header, back_side);
                Stage::PclPage(page.next_page(&pcl_header).await?)
            }
        };
        self.stage = Some(next);
        Ok(())
    }

    /// Which wire format is currently active, so the page pipeline can
    /// crop rows/columns to PCL's narrower image box without `Stage`
    /// leaking out of this module.
    pub fn format(&self) -> OutputFormat {
        match self.stage.as_ref().expect("RasterTarget used after finish") {
            Stage::PwgJob(_) | Stage::PwgPage(_) => OutputFormat::Pwg,
            Stage::PclJob(_) | Stage::PclPage(_) => OutputFormat::Pcl,
        }
    }

    pub async fn write_line(&mut self, line: &[u8]) -> Result<(), EngineError> {
        match self.stage.as_mut().expect("RasterTarget used after finish") {
            Stage::PwgPage(page) => write_line_to(page.content_mut(), line).await,
            Stage::PclPage(page) => write_line_to(page.content_mut(), line).await,
            Stage::PwgJob(_) | Stage::PclJob(_) => {
                unreachable!("write_line called before start_page")
            }
        }
    }

    pub async fn finish(mut self) -> Result<(), EngineError> {
        match self.stage.take().expect("RasterTarget used after finish") {
            Stage::PwgPage(page) => page.finish().await?,
            Stage::PclPage(page) => page.finish().await?,
            Stage::PwgJob(writer) => writer.finish().await?,
            Stage::PclJob(writer) => writer.finish().await?,
        }
        Ok(())
    }
}

/// Runs the full copies × pages loop (§4.7), driving `target` through every
/// page and reporting progress on `reporter`. `source` is already opened
/// and pre-flighted by the caller (C4); `front`/`back` are the resolved
/// `RasterHeader` pair (C2); `band` is allocated once for the document
/// (C3).
#[allow(clippy::too_many_arguments)]
pub async fn run_job<S, W>(
    mut target: RasterTarget,
    source: &S,
    front: &RasterHeader,
    back: &RasterHeader,
    sheet_back: SheetBack,
    copies: u32,
    pages: u32,
    band: &mut BandContext,
    reporter: &mut ProgressReporter<W>,
) -> Result<(), EngineError>
where
    S: PageSource,
    W: DerefMut<Target: AsyncWrite> + Unpin,
{
    let mut impressions = 0u32;
    let mut sheets = 0u32;

    for copy in 0..copies {
        for page in 1..=pages {
            let is_back = front.duplex && page % 2 == 0;
            let header = if is_back { back } else { front };
            let page_index = (page - 1).min(source.page_count().saturating_sub(1));
            render_page(&mut target, source, header, page_index, is_back, sheet_back, band).await?;

            impressions += 1;
            reporter
                .attr("job-impressions-completed", impressions)
                .await
                .map_err(SinkError::WriteFailure)?;
            if !front.duplex || page % 2 == 1 {
                sheets += 1;
                reporter
                    .attr("job-media-sheets-completed", sheets)
                    .await
                    .map_err(SinkError::WriteFailure)?;
            }
        }

        if copies > 1 && front.duplex && pages % 2 == 1 {
            // Odd-page duplex job, more copies to come: insert a synthetic
            // blank back side so the next copy's front page lands correctly.
            target.start_page(back, true).await?;
            band.reset_for_page();
            let (row_top, row_bottom, col_left, col_right) = image_box_bounds(back, target.format());
            let bpp = back.color_type.bytes_per_pixel() as usize;
            let blank = vec![0xffu8; (col_right - col_left + 1) as usize * bpp];
            for _ in row_top..=row_bottom {
                target.write_line(&blank).await?;
            }
            impressions += 1;
            reporter
                .attr("job-impressions-completed", impressions)
                .await
                .map_err(SinkError::WriteFailure)?;
        }
        debug!(copy, "copy complete");
    }

    info!(impressions, sheets, "job complete");
    target.finish().await
}

#[allow(clippy::too_many_arguments)]
async fn render_page<S>(
    target: &mut RasterTarget,
    source: &S,
    header: &RasterHeader,
    page_index: u32,
    is_back: bool,
    sheet_back: SheetBack,
    band: &mut BandContext,
) -> Result<(), EngineError>
where
    S: PageSource,
{
    let sheet_back_transform = if is_back {
        back_side_transform(
            sheet_back,
            header.tumble,
            header.page_width_pt as f64,
            header.page_height_pt as f64,
        )
    } else {
        Matrix::IDENTITY
    };

    target.start_page(header, is_back).await?;
    band.reset_for_page();

    let px_per_pt_x = header.xdpi as f64 / 72.0;
    let px_per_pt_y = header.ydpi as f64 / 72.0;
    let page_ctm = Matrix::scale(px_per_pt_x, px_per_pt_y).concat(&sheet_back_transform);

    let bpp = header.color_type.bytes_per_pixel() as usize;
    let (row_top, row_bottom, col_left, col_right) = image_box_bounds(header, target.format());
    let col_start = col_left as usize * bpp;
    let col_end = (col_right as usize + 1) * bpp;

    for y in row_top..=row_bottom {
        if y >= band.band_endy {
            band.ensure_covers(y, row_bottom);
            source.draw_page(
                page_index,
                band,
                band.band_starty,
                band.band_endy - 1,
                page_ctm,
                header.color_type,
            )?;
        }

        match header.color_type {
            ColorType::Gray => {
                let line = band.line(y);
                target.write_line(&line[col_start..col_end]).await?;
            }
            ColorType::Rgb => {
                let mut packed = band.line(y).to_vec();
                let width_px = (packed.len() / 4).min(header.cups_width as usize);
                let written = pack_rgbx_to_rgb(&mut packed, width_px);
                debug_assert_eq!(written, header.cups_width as usize * bpp);
                target.write_line(&packed[col_start..col_end]).await?;
            }
        }
    }

    Ok(())
}
