/// Page-level parameters for a single HP PCL raster page.
///
/// Unlike [`crate::model::cups::CupsPageHeaderV2`], PCL has no fixed binary
/// header layout on the wire — the "header" is a sequence of escape
/// commands emitted before the pixel data. This struct carries everything
/// [`crate::writer::pcl::PclWriter`] needs to emit that sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PclPageHeader {
    /// Horizontal and vertical resolution in pixels per inch (assumed equal,
    /// as HP PCL raster graphics do not support independent x/y resolution).
    pub dpi: u32,
    /// Page height in PostScript points (1/72 inch), used to select the
    /// `ESC & l # A` page-size code and the A4 margin special-case.
    pub page_height_pt: u32,
    /// Image box, in device pixels, inclusive on all sides, origin top-left.
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    /// Whether the job is duplex at all.
    pub duplex: bool,
    /// Whether duplex binding is along the short edge.
    pub tumble: bool,
    /// Whether this is the back side of a duplex sheet.
    pub back_side: bool,
}

impl PclPageHeader {
    /// Image box width in pixels.
    pub fn width(&self) -> u32 {
        self.right - self.left + 1
    }

    /// Image box height in pixels.
    pub fn height(&self) -> u32 {
        self.bottom - self.top + 1
    }

    /// Whether the page ends a physical sheet and should be followed by a
    /// formfeed: always true in simplex, true only for the front side in
    /// duplex.
    pub fn ends_sheet(&self) -> bool {
        !self.duplex || !self.back_side
    }
}

/// PCL page-size codes for `ESC & l # A`, keyed by page height in points.
/// Unknown sizes omit the command entirely.
pub fn page_size_code(page_height_pt: u32) -> Option<u32> {
    Some(match page_height_pt {
        540 => 80,
        595 => 25,
        624 => 90,
        649 => 91,
        684 => 81,
        709 => 100,
        756 => 1,
        792 => 2,
        842 => 26,
        1008 => 3,
        1191 => 27,
        1224 => 6,
        _ => return None,
    })
}
