pub mod cups;
pub mod pcl;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RasterByteOrder {
    BigEndian,
    LittleEndian,
}
