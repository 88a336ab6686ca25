use super::{RasterPageWriter, RasterWriter};
use crate::encode::{PclLineEncoder, RasterEncoder};
use crate::error::PclError;
use crate::model::pcl::{page_size_code, PclPageHeader};
use futures::{AsyncWrite, AsyncWriteExt};
use std::future::Future;
use std::ops::DerefMut;
use std::pin::Pin;

async fn emit_page_setup<W>(writer: &mut Pin<W>, header: &PclPageHeader) -> Result<(), PclError>
where
    W: DerefMut<Target: AsyncWrite> + Unpin,
{
    if header.back_side {
        writer.as_mut().write_all(b"\x1b&a2G").await?;
    } else {
        writer
            .as_mut()
            .write_all(b"\x1b&l12D\x1b&k12H\x1b&l0O")
            .await?;
        if let Some(code) = page_size_code(header.page_height_pt) {
            writer
                .as_mut()
                .write_all(format!("\x1b&l{}A", code).as_bytes())
                .await?;
        }
        let top_lines = 12 * header.top / header.dpi;
        writer
            .as_mut()
            .write_all(format!("\x1b&l{}E\x1b&l0L", top_lines).as_bytes())
            .await?;
        if header.duplex {
            let mode = 1 + u32::from(header.tumble);
            writer
                .as_mut()
                .write_all(format!("\x1b&l{}S", mode).as_bytes())
                .await?;
        }
    }

    let v = 720 * header.top / header.dpi;
    writer
        .as_mut()
        .write_all(
            format!(
                "\x1b*t{}R\x1b*r{}S\x1b*r{}T\x1b&a0H\x1b&a{}V\x1b*b2M\x1b*r1A",
                header.dpi,
                header.width(),
                header.height(),
                v
            )
            .as_bytes(),
        )
        .await?;
    Ok(())
}

/// Flushes the trailing blank-row run (if any), emits end-graphics and the
/// formfeed decision, and hands back the underlying writer.
async fn emit_page_end<W>(
    encoder: &mut PclLineEncoder<W>,
    header: &PclPageHeader,
) -> Result<(), PclError>
where
    W: DerefMut<Target: AsyncWrite> + Unpin,
{
    if encoder.bytes_remaining() > 0 {
        return Err(PclError::IncompletePage);
    }
    let blanks = encoder.take_pending_blank_rows();
    if blanks > 0 {
        encoder
            .write_all(format!("\x1b*b{}Y", blanks).as_bytes())
            .await?;
    }
    encoder.write_all(b"\x1b*r0B").await?;
    if header.ends_sheet() {
        encoder.write_all(b"\x0c").await?;
    }
    Ok(())
}

/// Job-level writer for HP PCL raster streams. Implements [`RasterWriter`]
/// the same way [`crate::writer::cups::CupsRasterWriter`] does for CUPS
/// Raster, so the page pipeline that drives a job can be written once,
/// generic over the wire format.
pub struct PclWriter<W> {
    writer: Pin<W>,
}

impl<W> PclWriter<W>
where
    W: DerefMut<Target: AsyncWrite> + Unpin,
{
    /// Emits the job-level `ESC E` reset. Per-page setup happens on the
    /// first call to [`RasterWriter::next_page`].
    pub async fn new(mut writer: Pin<W>) -> Result<Self, PclError> {
        writer.as_mut().write_all(b"\x1bE").await?;
        Ok(Self { writer })
    }
}

impl<W> RasterWriter<W> for PclWriter<W>
where
    W: DerefMut<Target: AsyncWrite> + Unpin + 'static,
{
    type PageHeader = PclPageHeader;
    type PageWriter = PclPageWriter<W>;
    type Error = PclError;
    type NextPageFuture<'a> = Pin<Box<dyn Future<Output = Result<Self::PageWriter, Self::Error>> + 'a>>
    where
        Self: 'a;
    type FinishFuture = Pin<Box<dyn Future<Output = Result<(), Self::Error>>>>;

    fn next_page<'a>(self, header: &'a Self::PageHeader) -> Self::NextPageFuture<'a>
    where
        Self: 'a,
    {
        Box::pin(async move {
            let mut writer = self.writer;
            emit_page_setup(&mut writer, header).await?;
            Ok(PclPageWriter {
                content: PclLineEncoder::new(writer, header),
                header: *header,
            })
        })
    }

    fn finish(self) -> Self::FinishFuture {
        Box::pin(async move {
            let mut writer = self.writer;
            writer.as_mut().write_all(b"\x1bE").await?;
            writer.as_mut().close().await?;
            Ok(())
        })
    }
}

/// Page-level writer for a single HP PCL raster page.
pub struct PclPageWriter<W> {
    content: PclLineEncoder<W>,
    header: PclPageHeader,
}

impl<W> RasterPageWriter<W> for PclPageWriter<W>
where
    W: DerefMut<Target: AsyncWrite> + Unpin + 'static,
{
    type Header = PclPageHeader;
    type Encoder = PclLineEncoder<W>;
    type Error = PclError;
    type NextPageFuture<'a> = Pin<Box<dyn Future<Output = Result<Self, Self::Error>> + 'a>>
    where
        Self: 'a;
    type FinishFuture = Pin<Box<dyn Future<Output = Result<(), Self::Error>>>>;

    fn next_page<'a>(self, header: &'a Self::Header) -> Self::NextPageFuture<'a>
    where
        Self: 'a,
    {
        Box::pin(async move {
            let mut content = self.content;
            emit_page_end(&mut content, &self.header).await?;
            let mut writer = content.into_pin_mut();
            emit_page_setup(&mut writer, header).await?;
            Ok(PclPageWriter {
                content: PclLineEncoder::new(writer, header),
                header: *header,
            })
        })
    }

    fn finish(self) -> Self::FinishFuture {
        Box::pin(async move {
            let mut content = self.content;
            emit_page_end(&mut content, &self.header).await?;
            let mut writer = content.into_pin_mut();
            writer.as_mut().write_all(b"\x1bE").await?;
            writer.as_mut().close().await?;
            Ok(())
        })
    }

    fn content_mut(&mut self) -> &mut Self::Encoder {
        &mut self.content
    }

    fn into_content(self) -> Self::Encoder {
        self.content
    }
}
