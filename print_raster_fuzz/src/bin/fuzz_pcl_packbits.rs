use honggfuzz::fuzz;
use print_raster::encode::pcl::{pack_bits, unpack_bits};

fn main() {
    loop {
        fuzz!(|data: Vec<u8>| {
            let mut compressed = Vec::new();
            pack_bits(&data, &mut compressed);
            assert_eq!(unpack_bits(&compressed), data);
        });
    }
}
