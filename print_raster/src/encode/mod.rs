pub mod compressed;
pub mod encoder;
pub mod pcl;
pub mod uncompressed;

pub use compressed::CompressedRasterEncoder;
pub use encoder::{RasterEncoder, RasterEncoderConsumer, RasterEncoderExt};
pub use pcl::PclLineEncoder;
pub use uncompressed::UncompressedRasterEncoder;
