//! Decoding binary measurement files into [`Table`]s.
//!
//! The vendor measurement format is handled by external tooling; this
//! module only fixes the seam. [`MeasurementDecoder`] is the contract the
//! transcoder dispatches through, and [`SegmentDecoder`] reads the raw
//! channel-segment capture layout used by the fixtures:
//!
//! ```text
//! magic    b"MSEG"
//! version  u16 LE (currently 1)
//! count    u16 LE                    number of channels
//! channel, repeated `count` times:
//!   name_len  u16 LE, then the UTF-8 name
//!   samples   u32 LE, then samples × f64 LE
//! ```

use crate::table::{Channel, Table};
use anyhow::{Context, Result, bail, ensure};
use std::fs;
use std::path::Path;

/// Converts one binary measurement blob into a tabular structure.
pub trait MeasurementDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Table>;

    /// Read and decode a file in one step.
    fn decode_file(&self, path: &Path) -> Result<Table> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        self.decode(&bytes).with_context(|| format!("decode {}", path.display()))
    }
}

pub const SEGMENT_MAGIC: &[u8; 4] = b"MSEG";
pub const SEGMENT_VERSION: u16 = 1;

/// Decoder for the raw channel-segment capture layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SegmentDecoder;

impl MeasurementDecoder for SegmentDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Table> {
        let mut r = Reader { bytes, pos: 0 };

        let magic = r.take(4)?;
        ensure!(magic == SEGMENT_MAGIC.as_slice(), "bad segment magic {magic:02x?}");
        let version = r.u16()?;
        ensure!(version == SEGMENT_VERSION, "unsupported segment version {version}");

        let count = r.u16()? as usize;
        let mut table = Table::new();
        for idx in 0..count {
            let name_len = r.u16()? as usize;
            let name = std::str::from_utf8(r.take(name_len)?)
                .with_context(|| format!("channel {idx} name is not valid UTF-8"))?
                .to_string();
            let sample_count = r.u32()? as usize;
            // Preallocation bounded by the payload size; oversized counts
            // fail in take() instead of allocating.
            let mut samples = Vec::with_capacity(sample_count.min(bytes.len() / 8));
            for _ in 0..sample_count {
                samples.push(r.f64()?);
            }
            table.push_channel(Channel::new(name, samples));
        }
        ensure!(
            r.pos == bytes.len(),
            "{} trailing bytes after the last channel",
            bytes.len() - r.pos
        );
        Ok(table)
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.bytes.len() - self.pos < n {
            bail!("truncated segment: wanted {n} bytes at offset {}", self.pos);
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn f64(&mut self) -> Result<f64> {
        let b = self.take(8)?;
        let mut buf = [0u8; 8];
        buf.copy_from_slice(b);
        Ok(f64::from_le_bytes(buf))
    }
}
