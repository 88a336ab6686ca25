//! Job Configurator (C2): resolves the option map plus printer capabilities
//! into an immutable [`PageGeometry`] and a front/back [`RasterHeader`]
//! pair.

use crate::capabilities::PrinterCapabilities;
use crate::error::ConfigError;
use crate::media::{self, Media};
use crate::options::{OptionMap, OptionValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    Gray,
    Rgb,
}

impl ColorType {
    /// Bytes per pixel on the wire (1 for gray, 3 for packed RGB).
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            ColorType::Gray => 1,
            ColorType::Rgb => 3,
        }
    }

    /// Bytes per pixel in the band intermediate buffer (RGB is rendered as
    /// 4-byte RGBX and packed down to 3 bytes just before emission).
    pub fn band_bpp(&self) -> u32 {
        match self {
            ColorType::Gray => 1,
            ColorType::Rgb => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sides {
    OneSided,
    TwoSidedLongEdge,
    TwoSidedShortEdge,
}

impl Sides {
    pub fn is_duplex(&self) -> bool {
        !matches!(self, Sides::OneSided)
    }

    /// Tumble (short-edge) binding flag as used by the PCL `ESC & l N S`
    /// duplex-mode escape and the back-side transform selection.
    pub fn tumble(&self) -> bool {
        matches!(self, Sides::TwoSidedShortEdge)
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "one-sided" => Some(Sides::OneSided),
            "two-sided-long-edge" => Some(Sides::TwoSidedLongEdge),
            "two-sided-short-edge" => Some(Sides::TwoSidedShortEdge),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetBack {
    Normal,
    Flipped,
    ManualTumble,
    Rotated,
}

impl SheetBack {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(SheetBack::Normal),
            "flipped" => Some(SheetBack::Flipped),
            "manual-tumble" => Some(SheetBack::ManualTumble),
            "rotated" => Some(SheetBack::Rotated),
            _ => None,
        }
    }
}

/// Immutable per-job geometry, constructed once after option resolution.
#[derive(Debug, Clone)]
pub struct PageGeometry {
    pub media: Media,
    pub xdpi: u32,
    pub ydpi: u32,
    pub color_type: ColorType,
    pub sides: Sides,
    pub copies: u32,
    pub sheet_back: SheetBack,
}

/// Parses `WxHdpi` or `Ndpi` (square), returning `(xdpi, ydpi)`.
pub fn parse_resolution(s: &str) -> Option<(u32, u32)> {
    let s = s.strip_suffix("dpi")?;
    if let Some((w, h)) = s.split_once('x') {
        let x = w.parse().ok()?;
        let y = h.parse().ok()?;
        Some((x, y))
    } else {
        let n = s.parse().ok()?;
        Some((n, n))
    }
}

fn resolve_resolution(
    options: &OptionMap,
    caps: &PrinterCapabilities,
) -> Result<(u32, u32), ConfigError> {
    if let Some(OptionValue::Scalar(requested)) = options.get("printer-resolution") {
        if let Some(parsed) = parse_resolution(requested) {
            let as_dpi = format!("{}dpi", parsed.0);
            let as_dpi_xy = format!("{}x{}dpi", parsed.0, parsed.1);
            if caps.resolutions.iter().any(|r| *r == as_dpi || *r == as_dpi_xy) {
                return Ok(parsed);
            }
        }
        // Unsupported/unsupported-value printer-resolution: info-logged and
        // discarded by the caller, fall through to print-quality/median.
    }

    if caps.resolutions.is_empty() {
        return Err(ConfigError::NoResolutionResolved);
    }

    if let Some(OptionValue::Scalar(quality)) = options.get("print-quality") {
        let index = match quality.as_str() {
            "draft" => Some(0),
            "normal" => Some(caps.resolutions.len() / 2),
            "high" => Some(caps.resolutions.len() - 1),
            _ => None,
        };
        if let Some(index) = index {
            if let Some(res) = caps.resolutions.get(index) {
                if let Some(parsed) = parse_resolution(res) {
                    return Ok(parsed);
                }
            }
        }
    }

    let median = caps.resolutions.len() / 2;
    caps.resolutions
        .get(median)
        .and_then(|s| parse_resolution(s))
        .ok_or(ConfigError::NoResolutionResolved)
}

fn resolve_color_type(options: &OptionMap, caps: &PrinterCapabilities) -> ColorType {
    let requested_color = options
        .get("color")
        .and_then(OptionValue::as_scalar)
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    if requested_color && caps.types.iter().any(|t| t == "srgb_8") {
        ColorType::Rgb
    } else {
        ColorType::Gray
    }
}

fn resolve_media(options: &OptionMap, caps: &PrinterCapabilities) -> Result<Media, ConfigError> {
    if let Some(OptionValue::Scalar(name)) = options.get("media") {
        return media::lookup(name).ok_or_else(|| ConfigError::UnknownMedia(name.clone()));
    }
    if let Some(OptionValue::Map(col)) = options.get("media-col") {
        if let Some(OptionValue::Scalar(name)) = col.get("media-size-name") {
            return media::lookup(name).ok_or_else(|| ConfigError::UnknownMedia(name.clone()));
        }
        if let Some(OptionValue::Map(size)) = col.get("media-size") {
            let x = size
                .get("x-dimension")
                .and_then(OptionValue::as_scalar)
                .and_then(|v| v.parse::<u32>().ok());
            let y = size
                .get("y-dimension")
                .and_then(OptionValue::as_scalar)
                .and_then(|v| v.parse::<u32>().ok());
            if let (Some(x), Some(y)) = (x, y) {
                return Ok(media::from_dimensions(x, y));
            }
        }
    }
    media::lookup(&caps.media_default)
        .ok_or_else(|| ConfigError::UnknownMedia(caps.media_default.clone()))
}

fn resolve_sides(options: &OptionMap, caps: &PrinterCapabilities, page_count: u32) -> Sides {
    if page_count == 1 {
        return Sides::OneSided;
    }
    options
        .get("sides")
        .and_then(OptionValue::as_scalar)
        .and_then(Sides::parse)
        .or_else(|| Sides::parse(&caps.sides_default))
        .unwrap_or(Sides::OneSided)
}

fn resolve_copies(options: &OptionMap) -> Result<u32, ConfigError> {
    let copies = options
        .get("copies")
        .and_then(OptionValue::as_scalar)
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(1);
    if (1..=9999).contains(&copies) {
        Ok(copies)
    } else {
        Err(ConfigError::CopiesOutOfRange(copies))
    }
}

impl PageGeometry {
    pub fn resolve(
        options: &OptionMap,
        caps: &PrinterCapabilities,
        page_count: u32,
    ) -> Result<Self, ConfigError> {
        let (xdpi, ydpi) = resolve_resolution(options, caps)?;
        let color_type = resolve_color_type(options, caps);
        let media = resolve_media(options, caps)?;
        let sides = resolve_sides(options, caps, page_count);
        let copies = resolve_copies(options)?;
        let sheet_back = SheetBack::parse(&caps.sheet_back).unwrap_or(SheetBack::Normal);
        Ok(PageGeometry {
            media,
            xdpi,
            ydpi,
            color_type,
            sides,
            copies,
            sheet_back,
        })
    }
}

/// Fixed-shape page-descriptor record, independent of wire format; §3's
/// `RasterHeader`. `print_raster`'s `CupsPageHeaderV2`/`PclPageHeader` are
/// both derived from this.
#[derive(Debug, Clone, Copy)]
pub struct RasterHeader {
    pub xdpi: u32,
    pub ydpi: u32,
    pub cups_width: u32,
    pub cups_height: u32,
    pub cups_bytes_per_line: u32,
    pub bits_per_pixel: u32,
    pub duplex: bool,
    pub tumble: bool,
    pub page_width_pt: u32,
    pub page_height_pt: u32,
    pub color_type: ColorType,
    /// Equals `copies * pages_effective`, where `pages_effective` rounds an
    /// odd page count up by one when duplex and `copies > 1`.
    pub total_page_count: u32,
    /// Whether this instance describes the back side of a duplex sheet.
    pub back_side: bool,
}

fn pages_effective(page_count: u32, duplex: bool, copies: u32) -> u32 {
    if duplex && copies > 1 && page_count % 2 == 1 {
        page_count + 1
    } else {
        page_count
    }
}

/// Builds the front/back `RasterHeader` pair. `page_count` must be known,
/// which is why this runs after C4 opens the source document.
pub fn build_headers(geom: &PageGeometry, page_count: u32) -> (RasterHeader, RasterHeader) {
    let duplex = geom.sides.is_duplex();
    let tumble = geom.sides.tumble();
    let bits_per_pixel = geom.color_type.bytes_per_pixel() * 8;
    let cups_width = geom.media.width_pixels(geom.xdpi);
    let cups_height = geom.media.height_pixels(geom.ydpi);
    let cups_bytes_per_line = cups_width * geom.color_type.bytes_per_pixel();
    let total_page_count = geom.copies * pages_effective(page_count, duplex, geom.copies);

    let make = |back_side: bool| RasterHeader {
        xdpi: geom.xdpi,
        ydpi: geom.ydpi,
        cups_width,
        cups_height,
        cups_bytes_per_line,
        bits_per_pixel,
        duplex,
        tumble,
        page_width_pt: geom.media.width_points(),
        page_height_pt: geom.media.height_points(),
        color_type: geom.color_type,
        total_page_count,
        back_side,
    };
    (make(false), make(true))
}

/// PCL image-box margins (§4.6 step 1): top/bottom margin is `ydpi/6`, side
/// margins are `xdpi/4` except centered 8-inch-wide imaging on A4.
pub fn pcl_image_box(header: &RasterHeader) -> (u32, u32, u32, u32) {
    let top_bottom_margin = header.ydpi / 6;
    let top = top_bottom_margin;
    let bottom = header.cups_height - 1 - top_bottom_margin;
    let (left, right) = if header.page_height_pt == 842 {
        let image_width = header.xdpi * 8;
        let left = (header.cups_width.saturating_sub(image_width)) / 2;
        (left, left + image_width - 1)
    } else {
        let side_margin = header.xdpi / 4;
        (side_margin, header.cups_width - 1 - side_margin)
    };
    (left, top, right, bottom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(resolutions: &[&str], types: &[&str]) -> PrinterCapabilities {
        PrinterCapabilities {
            resolutions: resolutions.iter().map(|s| s.to_string()).collect(),
            types: types.iter().map(|s| s.to_string()).collect(),
            sheet_back: "normal".to_string(),
            media_default: "na_letter_8.5x11in".to_string(),
            sides_default: "one-sided".to_string(),
            verbosity: 0,
        }
    }

    #[test]
    fn parses_square_and_rectangular_resolutions() {
        assert_eq!(parse_resolution("300dpi"), Some((300, 300)));
        assert_eq!(parse_resolution("600x300dpi"), Some((600, 300)));
        assert_eq!(parse_resolution("300"), None);
    }

    #[test]
    fn printer_resolution_option_wins_when_supported() {
        let mut options = OptionMap::new();
        options.insert(
            "printer-resolution".to_string(),
            OptionValue::Scalar("600dpi".to_string()),
        );
        let c = caps(&["300dpi", "600dpi"], &["sgray_8"]);
        assert_eq!(resolve_resolution(&options, &c).unwrap(), (600, 600));
    }

    #[test]
    fn print_quality_normal_picks_median() {
        let options = OptionMap::new();
        let c = caps(&["150dpi", "300dpi", "600dpi"], &["sgray_8"]);
        // with no printer-resolution and no print-quality, falls through to
        // the plain median-of-supported-list rule.
        assert_eq!(resolve_resolution(&options, &c).unwrap(), (300, 300));
    }

    #[test]
    fn pages_effective_rounds_up_odd_duplex_multi_copy() {
        assert_eq!(pages_effective(3, true, 2), 4);
        assert_eq!(pages_effective(3, true, 1), 3);
        assert_eq!(pages_effective(4, true, 2), 4);
    }

    #[test]
    fn total_page_count_matches_scenario_two() {
        let geom = PageGeometry {
            media: media::lookup("iso_a4_210x297mm").unwrap(),
            xdpi: 300,
            ydpi: 300,
            color_type: ColorType::Gray,
            sides: Sides::TwoSidedLongEdge,
            copies: 2,
            sheet_back: SheetBack::Normal,
        };
        let (front, _back) = build_headers(&geom, 3);
        assert_eq!(front.total_page_count, 8);
    }

    #[test]
    fn unknown_media_name_is_a_config_error() {
        let options = {
            let mut m = OptionMap::new();
            m.insert("media".to_string(), OptionValue::Scalar("bogus_size".to_string()));
            m
        };
        let c = caps(&["300dpi"], &["sgray_8"]);
        let err = resolve_media(&options, &c).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownMedia(ref s) if s == "bogus_size"));
    }
}
