use super::RasterEncoder;
use crate::error::PclError;
use crate::model::pcl::PclPageHeader;
use futures::ready;
use futures::task::Context;
use futures::task::Poll;
use futures::AsyncWrite;
use pin_project::pin_project;
use std::io;
use std::ops::DerefMut;
use std::pin::Pin;

/// Ordered-dither threshold table, expanded from the classic recursive Bayer
/// construction by interleaving the bits of `x` and `y`. Computed once at
/// compile time rather than generated at startup.
const fn bayer_index(x: u32, y: u32) -> u32 {
    let mut v: u32 = 0;
    let mut i = 5i32;
    while i >= 0 {
        let xi = (x >> i) & 1;
        let yi = (y >> i) & 1;
        v = (v << 2) | (yi << 1) | (xi ^ yi);
        i -= 1;
    }
    v
}

const fn build_threshold_table() -> [[u8; 64]; 64] {
    let mut table = [[0u8; 64]; 64];
    let mut y = 0usize;
    while y < 64 {
        let mut x = 0usize;
        while x < 64 {
            let v = bayer_index(x as u32, y as u32);
            table[y][x] = ((v * 256) / 4096) as u8;
            x += 1;
        }
        y += 1;
    }
    table
}

pub const THRESHOLD: [[u8; 64]; 64] = build_threshold_table();

/// PackBits-compresses `input` into `output`, appending to whatever is
/// already there. Literal runs are encoded as `count - 1` (1..=127)
/// followed by the raw bytes; replicate runs as `257 - count` (2..=127)
/// followed by the single repeated byte.
pub fn pack_bits(input: &[u8], output: &mut Vec<u8>) {
    let mut i = 0;
    let n = input.len();
    while i < n {
        let mut j = i + 1;
        while j < n && j - i < 128 && input[j] == input[i] {
            j += 1;
        }
        let run_len = j - i;
        if run_len >= 2 {
            output.push((257 - run_len) as u8);
            output.push(input[i]);
            i = j;
        } else {
            let lit_start = i;
            i += 1;
            while i < n {
                if i + 1 < n && input[i] == input[i + 1] {
                    break;
                }
                if i - lit_start >= 127 {
                    break;
                }
                i += 1;
            }
            output.push((i - lit_start - 1) as u8);
            output.extend_from_slice(&input[lit_start..i]);
        }
    }
}

/// Inverse of [`pack_bits`]. Used by tests and the fuzz harness to verify
/// the round trip; production code never needs to decode PCL.
pub fn unpack_bits(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < input.len() {
        let header = input[i] as i8;
        i += 1;
        if header >= 0 {
            let count = header as usize + 1;
            out.extend_from_slice(&input[i..i + count]);
            i += count;
        } else {
            let count = 257 - (input[i - 1] as usize);
            out.extend(std::iter::repeat(input[i]).take(count));
            i += 1;
        }
    }
    out
}

fn dither_row(row: &[u8], left: u32, y: u32) -> Vec<u8> {
    let mut out = vec![0u8; row.len().div_ceil(8)];
    for (i, &gray) in row.iter().enumerate() {
        let x = left.wrapping_add(i as u32);
        let threshold = THRESHOLD[(y & 63) as usize][(x & 63) as usize];
        if gray <= threshold {
            out[i / 8] |= 0x80 >> (i % 8);
        }
    }
    out
}

/// Encodes one PCL raster page's scanlines as `ESC * b N W` / `ESC * b N Y`
/// commands. Implements [`RasterEncoder`], the same `AsyncWrite`-based
/// capability [`crate::encode::compressed::CompressedRasterEncoder`]
/// implements for CUPS Raster, so the page pipeline can be written once and
/// driven by either wire format.
///
/// Each `poll_write` call must be given exactly one scanline: `image box
/// width` bytes of 8-bit grayscale, most significant byte first.
#[pin_project(project = PclLineEncoderProj)]
pub struct PclLineEncoder<W> {
    writer: Pin<W>,
    left: u32,
    width: usize,
    rows_remaining: u64,
    y: u32,
    out_blanks: u32,
    pending: Vec<u8>,
    pending_pos: usize,
}

impl<W> PclLineEncoder<W> {
    pub fn new(writer: Pin<W>, header: &PclPageHeader) -> Self {
        Self {
            writer,
            left: header.left,
            width: header.width() as usize,
            rows_remaining: header.height() as u64,
            y: header.top,
            out_blanks: 0,
            pending: Vec::new(),
            pending_pos: 0,
        }
    }

    /// Takes the currently pending blank-row run, for the page writer to
    /// flush as a trailing `ESC * b N Y` at page end. `print_line` already
    /// flushes it immediately before the next non-blank row, but a page
    /// that ends on a run of blank rows needs this done explicitly.
    pub fn take_pending_blank_rows(&mut self) -> u32 {
        std::mem::take(&mut self.out_blanks)
    }
}

impl<W> RasterEncoder<W> for PclLineEncoder<W>
where
    W: DerefMut<Target: AsyncWrite>,
{
    fn bytes_remaining(&self) -> u64 {
        self.rows_remaining
    }

    fn into_pin_mut(self) -> Pin<W> {
        self.writer
    }
}

impl<W> AsyncWrite for PclLineEncoder<W>
where
    W: DerefMut<Target: AsyncWrite>,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let mut this = self.project();
        loop {
            if *this.pending_pos < this.pending.len() {
                let n = ready!(this
                    .writer
                    .as_mut()
                    .poll_write(cx, &this.pending[*this.pending_pos..]))?;
                if n == 0 {
                    return Poll::Ready(Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write to writer",
                    )));
                }
                *this.pending_pos += n;
                continue;
            }
            if !this.pending.is_empty() {
                this.pending.clear();
                *this.pending_pos = 0;
                return Poll::Ready(Ok(buf.len()));
            }
            if buf.is_empty() {
                return Poll::Ready(Ok(0));
            }
            if *this.rows_remaining == 0 {
                return Poll::Ready(Err(io::Error::new(io::ErrorKind::InvalidInput, PclError::TooManyRows)));
            }
            if buf.len() != *this.width {
                return Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    PclError::RowLengthMismatch {
                        expected: *this.width,
                        actual: buf.len(),
                    },
                )));
            }
            let y = *this.y;
            *this.y += 1;
            *this.rows_remaining -= 1;
            if buf.iter().all(|&b| b == 0xff) {
                *this.out_blanks += 1;
                return Poll::Ready(Ok(buf.len()));
            }
            if *this.out_blanks > 0 {
                this.pending
                    .extend_from_slice(format!("\x1b*b{}Y", *this.out_blanks).as_bytes());
                *this.out_blanks = 0;
            }
            let packed = dither_row(buf, *this.left, y);
            let mut compressed = Vec::with_capacity(2 * packed.len() + 2);
            pack_bits(&packed, &mut compressed);
            this.pending
                .extend_from_slice(format!("\x1b*b{}W", compressed.len()).as_bytes());
            this.pending.extend_from_slice(&compressed);
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.project();
        this.writer.as_mut().poll_flush(cx)
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.project();
        this.writer.as_mut().poll_close(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_bits_round_trip_mixed() {
        let input: Vec<u8> = vec![
            1, 1, 1, 1, 2, 3, 4, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 5, 6, 7, 8,
        ];
        let mut compressed = Vec::new();
        pack_bits(&input, &mut compressed);
        assert_eq!(unpack_bits(&compressed), input);
    }

    #[test]
    fn test_pack_bits_round_trip_all_distinct() {
        let input: Vec<u8> = (0..200u32).map(|v| (v % 251) as u8).collect();
        let mut compressed = Vec::new();
        pack_bits(&input, &mut compressed);
        assert_eq!(unpack_bits(&compressed), input);
    }

    #[test]
    fn test_pack_bits_round_trip_single_byte() {
        let input: Vec<u8> = vec![0x42];
        let mut compressed = Vec::new();
        pack_bits(&input, &mut compressed);
        assert_eq!(compressed, vec![0x00, 0x42]);
        assert_eq!(unpack_bits(&compressed), input);
    }

    #[test]
    fn test_pack_bits_run_of_127() {
        let input: Vec<u8> = vec![0xaa; 127];
        let mut compressed = Vec::new();
        pack_bits(&input, &mut compressed);
        assert_eq!(compressed, vec![257u16.wrapping_sub(127) as u8, 0xaa]);
        assert_eq!(unpack_bits(&compressed), input);
    }

    #[test]
    fn test_threshold_table_within_byte_range_and_varied() {
        let mut seen_low = false;
        let mut seen_high = false;
        for row in THRESHOLD.iter() {
            for &v in row.iter() {
                if v < 32 {
                    seen_low = true;
                }
                if v > 223 {
                    seen_high = true;
                }
            }
        }
        assert!(seen_low && seen_high);
    }

    #[test]
    fn test_dither_all_white_row_is_blank() {
        let row = vec![0xffu8; 16];
        assert!(row.iter().all(|&b| b == 0xff));
    }
}
