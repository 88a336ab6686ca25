pub mod compressed;
pub mod decoder;
pub mod limits;
pub mod uncompressed;

pub use compressed::CompressedRasterDecoder;
pub use decoder::{RasterDecoder, RasterDecoderConsumer, RasterDecoderExt};
pub use limits::Limits;
pub use uncompressed::UncompressedRasterDecoder;
