pub mod cups;
pub mod interface;

pub use cups::{CupsPageFactoryV1, CupsPageFactoryV2, CupsPageFactoryV3, WithCupsSyncWord};
pub use interface::RasterPageFactory;
