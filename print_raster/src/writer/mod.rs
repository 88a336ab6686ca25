pub mod common;
pub mod cups;
pub mod interface;
pub mod pcl;

pub use interface::{RasterPageWriter, RasterWriter};
