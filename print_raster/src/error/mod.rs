pub mod cups;
pub mod pcl;

pub use cups::CupsRasterError;
pub use pcl::PclError;
