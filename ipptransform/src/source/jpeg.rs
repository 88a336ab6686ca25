//! JPEG source: decodes to an in-memory RGB surface via the `image` crate
//! and exposes it as a single-page document (§4.4), resampling
//! nearest-neighbor into the band window under the page's affine transform.

use super::{PageSource, Rect};
use crate::band::BandContext;
use crate::error::InputError;
use crate::geometry::ColorType;
use crate::transform::Matrix;
use image::{GenericImageView, RgbImage};
use std::path::Path;
use tracing::{debug, warn};

pub struct JpegSource {
    image: RgbImage,
}

impl JpegSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, InputError> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .map_err(|err| InputError::JpegDecodeFailure(format!("{}: {}", path.display(), err)))?;
        let image = decoded.to_rgb8();
        debug!(width = image.width(), height = image.height(), "JPEG decoded");
        Ok(JpegSource { image })
    }
}

impl PageSource for JpegSource {
    fn page_count(&self) -> u32 {
        1
    }

    fn permits_printing(&self) -> bool {
        true
    }

    fn is_encrypted(&self) -> bool {
        false
    }

    fn unlock_with_empty_password(&mut self) -> bool {
        true
    }

    fn page_crop_box(&self, _index: u32) -> Rect {
        Rect {
            left: 0.0,
            bottom: 0.0,
            right: self.image.width() as f64,
            top: self.image.height() as f64,
        }
    }

    fn draw_page(
        &self,
        _index: u32,
        band: &mut BandContext,
        window_top: u32,
        window_bottom: u32,
        transform: Matrix,
        color_type: ColorType,
    ) -> Result<(), InputError> {
        let Some(inverse) = transform.invert() else {
            warn!("page transform is singular; leaving band blank for this page");
            return Ok(());
        };
        let bpp = color_type.band_bpp();
        let (img_w, img_h) = (self.image.width(), self.image.height());

        for y in window_top..=window_bottom {
            let line = band.line_mut(y);
            let width_px = line.len() as u32 / bpp;
            for x in 0..width_px {
                let (src_x, src_y) = inverse.apply(x as f64 + 0.5, y as f64 + 0.5);
                if src_x < 0.0 || src_y < 0.0 || src_x >= img_w as f64 || src_y >= img_h as f64 {
                    continue;
                }
                let pixel = self.image.get_pixel(src_x as u32, src_y as u32);
                let offset = (x * bpp) as usize;
                match color_type {
                    ColorType::Gray => {
                        let [r, g, b] = pixel.0;
                        let gray = (r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000;
                        line[offset] = gray as u8;
                    }
                    ColorType::Rgb => {
                        line[offset] = pixel.0[0];
                        line[offset + 1] = pixel.0[1];
                        line[offset + 2] = pixel.0[2];
                        line[offset + 3] = 0xff;
                    }
                }
            }
        }
        Ok(())
    }
}
