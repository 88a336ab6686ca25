//! PWG media size table: name → physical dimensioning in PWG units
//! (1/2540 inch), the unit `print_raster`'s CUPS headers also use for
//! `PageSize`/`ImagingBoundingBox`.

/// A resolved media entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub pwg_name: String,
    /// Physical width, in 1/2540ths of an inch.
    pub width_pwg: u32,
    /// Physical height, in 1/2540ths of an inch.
    pub height_pwg: u32,
}

impl Media {
    pub fn width_points(&self) -> u32 {
        self.width_pwg * 72 / 2540
    }

    pub fn height_points(&self) -> u32 {
        self.height_pwg * 72 / 2540
    }

    pub fn width_pixels(&self, dpi: u32) -> u32 {
        ((self.width_pwg as u64) * dpi as u64 / 2540) as u32
    }

    pub fn height_pixels(&self, dpi: u32) -> u32 {
        ((self.height_pwg as u64) * dpi as u64 / 2540) as u32
    }
}

/// A small built-in table of common PWG/legacy media names. Real deployments
/// would extend this from a PPD or a `media-col-database`; this spec only
/// requires the lookup behavior, not an exhaustive table.
const TABLE: &[(&str, u32, u32)] = &[
    ("na_letter_8.5x11in", 21590, 27940),
    ("na_legal_8.5x14in", 21590, 35560),
    ("na_index-4x6_4x6in", 10160, 15240),
    ("na_5x7_5x7in", 12700, 17780),
    ("iso_a4_210x297mm", 21000, 29700),
    ("iso_a5_148x210mm", 14800, 21000),
    ("iso_a3_297x420mm", 29700, 42000),
    ("jis_b5_182x257mm", 18200, 25700),
    ("na_executive_7.25x10.5in", 18415, 26670),
    ("om_card_54x86mm", 5400, 8600),
];

/// Resolves a PWG or legacy media name to its physical dimensions. Unknown
/// names are the caller's responsibility to surface as a `ConfigError`.
pub fn lookup(name: &str) -> Option<Media> {
    TABLE.iter().find(|(n, _, _)| *n == name).map(|(n, w, h)| Media {
        pwg_name: n.to_string(),
        width_pwg: *w,
        height_pwg: *h,
    })
}

/// Builds a [`Media`] directly from PWG-unit dimensions, used for the
/// `media-col` → `media-size` → `x-dimension`/`y-dimension` path, which
/// does not necessarily resolve to a named table entry.
pub fn from_dimensions(width_pwg: u32, height_pwg: u32) -> Media {
    Media {
        pwg_name: String::new(),
        width_pwg,
        height_pwg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letter_converts_to_expected_points() {
        let m = lookup("na_letter_8.5x11in").unwrap();
        assert_eq!(m.width_points(), 612);
        assert_eq!(m.height_points(), 792);
    }

    #[test]
    fn letter_at_600dpi_matches_known_pixel_dims() {
        let m = lookup("na_letter_8.5x11in").unwrap();
        assert_eq!(m.width_pixels(600), 5100);
        assert_eq!(m.height_pixels(600), 6600);
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(lookup("bogus_size").is_none());
    }
}
