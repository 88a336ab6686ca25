//! PDF source, grounded on `lopdf`-based document inspection (see
//! `panjagala333-presswerk`'s `pdf/reader.rs` for the same load/inspect
//! shape). This module reads page tree, `MediaBox`/`CropBox`, and the
//! standard security handler's permission bits; it does not implement
//! content-stream rendering, which is delegated to a [`PageRasterizer`].

use super::{PageRasterizer, PageSource, Rect};
use crate::band::BandContext;
use crate::error::InputError;
use crate::geometry::ColorType;
use crate::transform::Matrix;
use lopdf::{Document, Object, ObjectId};
use std::path::Path;
use tracing::{debug, info, warn};

/// The PDF standard security handler's "print the document" permission bit.
const PERMIT_PRINT_BIT: i64 = 1 << 2;

pub struct PdfSource {
    document: Document,
    page_ids: Vec<ObjectId>,
    rasterizer: Box<dyn PageRasterizer>,
}

impl PdfSource {
    pub fn open(path: impl AsRef<Path>, rasterizer: Box<dyn PageRasterizer>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let document = Document::load(path)
            .map_err(|err| InputError::PdfUnreadable(format!("{}: {}", path.display(), err)))?;
        let pages = document.get_pages();
        let mut numbers: Vec<u32> = pages.keys().copied().collect();
        numbers.sort_unstable();
        let page_ids = numbers.into_iter().map(|n| pages[&n]).collect();
        debug!(pages = page_ids.len(), "PDF opened");
        Ok(PdfSource {
            document,
            page_ids,
            rasterizer,
        })
    }

    fn encrypt_dict(&self) -> Option<&lopdf::Dictionary> {
        self.document
            .trailer
            .get(b"Encrypt")
            .ok()
            .and_then(|obj| match obj {
                Object::Dictionary(d) => Some(d),
                Object::Reference(id) => match self.document.get_object(*id) {
                    Ok(Object::Dictionary(d)) => Some(d),
                    _ => None,
                },
                _ => None,
            })
    }

    fn permission_bits(&self) -> Option<i64> {
        self.encrypt_dict()
            .and_then(|d| d.get(b"P").ok())
            .and_then(|p| p.as_i64().ok())
    }

    fn box_for(&self, page_id: ObjectId, key: &[u8]) -> Option<Rect> {
        let page = self.document.get_object(page_id).ok()?;
        let dict = match page {
            Object::Dictionary(d) => d,
            _ => return None,
        };
        let array = match dict.get(key) {
            Ok(Object::Array(a)) => a,
            _ => return None,
        };
        if array.len() != 4 {
            return None;
        }
        let nums: Vec<f64> = array.iter().filter_map(|o| o.as_float().ok().map(|f| f as f64)).collect();
        if nums.len() != 4 {
            return None;
        }
        Some(Rect {
            left: nums[0],
            bottom: nums[1],
            right: nums[2],
            top: nums[3],
        })
    }
}

impl PageSource for PdfSource {
    fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    fn permits_printing(&self) -> bool {
        match self.permission_bits() {
            Some(p) => p & PERMIT_PRINT_BIT != 0,
            None => true,
        }
    }

    fn is_encrypted(&self) -> bool {
        self.encrypt_dict().is_some()
    }

    fn unlock_with_empty_password(&mut self) -> bool {
        match self.document.decrypt("") {
            Ok(()) => {
                info!("PDF unlocked with an empty password");
                true
            }
            Err(err) => {
                warn!(%err, "failed to unlock PDF with an empty password");
                false
            }
        }
    }

    fn page_crop_box(&self, index: u32) -> Rect {
        let page_id = self.page_ids[index as usize];
        self.box_for(page_id, b"CropBox")
            .or_else(|| self.box_for(page_id, b"MediaBox"))
            .unwrap_or(Rect {
                left: 0.0,
                bottom: 0.0,
                right: 612.0,
                top: 792.0,
            })
    }

    fn draw_page(
        &self,
        index: u32,
        band: &mut BandContext,
        window_top: u32,
        window_bottom: u32,
        transform: Matrix,
        color_type: ColorType,
    ) -> Result<(), InputError> {
        let crop = self.page_crop_box(index);
        self.rasterizer
            .draw(crop, transform, band, window_top, window_bottom, color_type);
        Ok(())
    }
}
