//! PWG Encoder (C5): adapts a [`RasterHeader`] into `print_raster`'s
//! `CupsPageHeaderV2` and drives its `RasterWriter`/`RasterPageWriter`
//! traits. PWG-raster devices read uncompressed chunky rows, which in this
//! codebase is the V3 wire variant (`UncompressedRasterEncoder`), not V2
//! (which is the RLE-compressed variant) — see `DESIGN.md` for why this
//! differs from the literal "V2BE" wording used elsewhere.

use crate::geometry::{ColorType, RasterHeader};
use print_raster::model::cups::{
    CupsAdvance, CupsColorOrder, CupsColorSpace, CupsCut, CupsImagingBoundingBox, CupsJog,
    CupsLeadingEdge, CupsMargins, CupsOrientation, CupsPageHeaderV1, CupsPageHeaderV2,
    CupsPageSize, CupsResolution,
};

/// Builds the `CupsPageHeaderV2` for one page, selecting the front or back
/// `RasterHeader` as the caller directs.
pub fn build_cups_header(header: &RasterHeader) -> CupsPageHeaderV2 {
    let color_space = match header.color_type {
        ColorType::Gray => CupsColorSpace::Gray,
        ColorType::Rgb => CupsColorSpace::RGB,
    };
    CupsPageHeaderV2::from(CupsPageHeaderV1 {
        media_class: String::new(),
        media_color: String::new(),
        media_type: String::new(),
        output_type: String::new(),
        advance_distance: 0,
        advance_media: CupsAdvance::Never,
        collate: false,
        cut_media: CupsCut::Never,
        duplex: header.duplex,
        resolution: CupsResolution {
            cross_feed: header.xdpi,
            feed: header.ydpi,
        },
        imaging_bbox: CupsImagingBoundingBox {
            left: 0,
            bottom: 0,
            right: header.page_width_pt,
            top: header.page_height_pt,
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
        orientation: CupsOrientation::Portrait,
        output_face_up: false,
        page_size: CupsPageSize {
            width: header.page_width_pt,
            height: header.page_height_pt,
        },
        separations: false,
        tray_switch: false,
        tumble: header.tumble,
        width: header.cups_width,
        height: header.cups_height,
        cups_media_type: 0,
        bits_per_color: 8,
        bits_per_pixel: header.bits_per_pixel,
        bytes_per_line: header.cups_bytes_per_line,
        color_order: CupsColorOrder::Chunky,
        color_space,
        cups_compression: 0,
        cups_row_count: 0,
        cups_row_feed: 0,
        cups_row_step: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_color_type_to_cups_color_space() {
        let header = RasterHeader {
            xdpi: 300,
            ydpi: 300,
            cups_width: 2550,
            cups_height: 3300,
            cups_bytes_per_line: 2550,
            bits_per_pixel: 8,
            duplex: false,
            tumble: false,
            page_width_pt: 612,
            page_height_pt: 792,
            color_type: ColorType::Gray,
            total_page_count: 1,
            back_side: false,
        };
        let cups_header = build_cups_header(&header);
        assert_eq!(cups_header.v1.color_space, CupsColorSpace::Gray);
        assert_eq!(cups_header.v1.bytes_per_line, 2550);
        assert_eq!(cups_header.v1.width, 2550);
        assert_eq!(cups_header.v1.height, 3300);
    }
}
