use futures::AsyncWriteExt;
use print_raster::model::cups::{
    CupsAdvance, CupsColorOrder, CupsColorSpace, CupsCut, CupsImagingBoundingBox, CupsJog,
    CupsLeadingEdge, CupsMargins, CupsPageHeaderV1, CupsPageHeaderV2, CupsPageSize, CupsResolution,
};
use print_raster::writer::cups::CupsRasterWriterV3BE;
use print_raster::writer::{RasterPageWriter, RasterWriter};
use std::pin::Pin;

fn sample_header(width: u32, height: u32, bytes_per_line: u32) -> CupsPageHeaderV2 {
    CupsPageHeaderV2::from(CupsPageHeaderV1 {
        media_class: String::new(),
        media_color: String::new(),
        media_type: String::new(),
        output_type: String::new(),
        advance_distance: 0,
        advance_media: CupsAdvance::Never,
        collate: false,
        cut_media: CupsCut::Never,
        duplex: false,
        resolution: CupsResolution {
            cross_feed: 300,
            feed: 300,
        },
        imaging_bbox: CupsImagingBoundingBox {
            left: 0,
            bottom: 0,
            right: 612,
            top: 792,
        },
        insert_sheet: false,
        jog: CupsJog::Never,
        leading_edge: CupsLeadingEdge::Top,
        margins: CupsMargins { left: 0, bottom: 0 },
        manual_feed: false,
        media_position: 0,
        media_weight: 0,
        mirror_print: false,
        negative_print: false,
        num_copies: 1,
        orientation: print_raster::model::cups::CupsOrientation::Portrait,
        output_face_up: false,
        page_size: CupsPageSize {
            width: 612,
            height: 792,
        },
        separations: false,
        tray_switch: false,
        tumble: false,
        width,
        height,
        cups_media_type: 0,
        bits_per_color: 8,
        bits_per_pixel: 8,
        bytes_per_line,
        color_order: CupsColorOrder::Chunky,
        color_space: CupsColorSpace::Gray,
        cups_compression: 0,
        cups_row_count: 0,
        cups_row_feed: 0,
        cups_row_step: 0,
    })
}

#[tokio::test]
async fn writes_sync_word_and_uncompressed_page_data() {
    let mut data = Vec::<u8>::new();
    let header = sample_header(4, 2, 4);
    let writer = CupsRasterWriterV3BE::new(Pin::new(&mut data)).await.unwrap();
    let mut page_writer = writer.next_page(&header).await.unwrap();
    page_writer
        .content_mut()
        .write_all(&[0x00, 0x40, 0x80, 0xff])
        .await
        .unwrap();
    page_writer
        .content_mut()
        .write_all(&[0xff, 0x80, 0x40, 0x00])
        .await
        .unwrap();
    page_writer.finish().await.unwrap();

    assert_eq!(&data[0..4], b"RaS3");
    // header is fixed-size 1796 bytes for V2/V3 page headers.
    let header_end = 4 + 1796;
    assert!(data.len() > header_end);
    let pixels = &data[header_end..];
    assert_eq!(pixels, &[0x00, 0x40, 0x80, 0xff, 0xff, 0x80, 0x40, 0x00]);
}

#[tokio::test]
async fn rejects_row_with_wrong_length() {
    let mut data = Vec::<u8>::new();
    let header = sample_header(4, 2, 4);
    let writer = CupsRasterWriterV3BE::new(Pin::new(&mut data)).await.unwrap();
    let mut page_writer = writer.next_page(&header).await.unwrap();
    let result = page_writer.content_mut().write_all(&[0x00, 0x40, 0x80]).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn writes_multiple_pages_sequentially() {
    let mut data = Vec::<u8>::new();
    let header = sample_header(2, 1, 2);
    let writer = CupsRasterWriterV3BE::new(Pin::new(&mut data)).await.unwrap();
    let mut first_page = writer.next_page(&header).await.unwrap();
    first_page.content_mut().write_all(&[0x11, 0x22]).await.unwrap();
    let mut page_writer = first_page.next_page(&header).await.unwrap();
    page_writer.content_mut().write_all(&[0x33, 0x44]).await.unwrap();
    page_writer.finish().await.unwrap();

    let header_size = 1796;
    let page_count = data
        .windows(4)
        .filter(|w| w == b"RaS3")
        .count();
    assert_eq!(page_count, 1, "sync word only appears once per job");
    // two page headers + two 2-byte rows follow the sync word.
    assert_eq!(data.len(), 4 + header_size * 2 + 4);
}
