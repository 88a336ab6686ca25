use futures::AsyncWriteExt;
use print_raster::model::pcl::PclPageHeader;
use print_raster::writer::pcl::PclWriter;
use print_raster::writer::{RasterPageWriter, RasterWriter};
use std::pin::Pin;

fn sample_header(back_side: bool) -> PclPageHeader {
    PclPageHeader {
        dpi: 300,
        page_height_pt: 792,
        left: 0,
        top: 0,
        right: 7,
        bottom: 1,
        duplex: false,
        tumble: false,
        back_side,
    }
}

#[tokio::test]
async fn simplex_page_starts_with_reset_and_ends_with_formfeed() {
    let mut data = Vec::<u8>::new();
    let header = sample_header(false);
    let writer = PclWriter::new(Pin::new(&mut data)).await.unwrap();
    let mut page_writer = writer.next_page(&header).await.unwrap();
    page_writer
        .content_mut()
        .write_all(&[0x00; 8])
        .await
        .unwrap();
    page_writer
        .content_mut()
        .write_all(&[0xff; 8])
        .await
        .unwrap();
    page_writer.finish().await.unwrap();

    let text = String::from_utf8_lossy(&data);
    assert!(text.starts_with("\x1bE"), "job starts with a reset");
    assert!(text.contains("\x1b*r1A"), "start graphics command present");
    assert!(text.contains("\x1b*b"), "at least one row command emitted");
    assert!(text.contains("\x1b*b1Y"), "trailing blank row is run-length encoded");
    assert!(text.contains("\x1b*r0B"), "end graphics command present");
    assert!(text.ends_with("\x1bE"), "job ends with a reset after the final formfeed");
    assert!(text.contains('\x0c'), "simplex page ends with a formfeed");
}

#[tokio::test]
async fn duplex_back_side_does_not_emit_formfeed() {
    let mut data = Vec::<u8>::new();
    let header = sample_header(true);
    let writer = PclWriter::new(Pin::new(&mut data)).await.unwrap();
    let mut page_writer = writer.next_page(&header).await.unwrap();
    page_writer
        .content_mut()
        .write_all(&[0x00; 8])
        .await
        .unwrap();
    page_writer
        .content_mut()
        .write_all(&[0x00; 8])
        .await
        .unwrap();
    page_writer.finish().await.unwrap();

    let text = String::from_utf8_lossy(&data);
    assert!(text.contains("\x1b&a2G"), "back side uses the back-side escape");
    // The only formfeed-looking byte should be absent before the trailing
    // job reset, since a duplex back side does not end the physical sheet.
    let before_final_reset = &text[..text.rfind("\x1bE").unwrap()];
    assert!(!before_final_reset.contains('\x0c'));
}

#[tokio::test]
async fn rejects_incomplete_page() {
    let mut data = Vec::<u8>::new();
    let header = sample_header(false);
    let writer = PclWriter::new(Pin::new(&mut data)).await.unwrap();
    let mut page_writer = writer.next_page(&header).await.unwrap();
    page_writer
        .content_mut()
        .write_all(&[0x00; 8])
        .await
        .unwrap();
    let result = page_writer.finish().await;
    assert!(result.is_err(), "finishing before all rows are written is an error");
}
