//! In-memory tabular artifact produced by decoding one measurement file.
//!
//! A [`Table`] is a set of named channels (columns) of f64 samples.
//! Channels may be ragged; CSV serialization pads the short ones with
//! empty cells, and the row count is the longest channel's sample count.

use anyhow::Result;
use std::io::Write;

/// One named column of samples.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub name: String,
    pub samples: Vec<f64>,
}

impl Channel {
    pub fn new(name: impl Into<String>, samples: Vec<f64>) -> Self {
        Self { name: name.into(), samples }
    }
}

/// Rows × named columns, realized as channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    channels: Vec<Channel>,
}

impl Table {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_channels(channels: Vec<Channel>) -> Self {
        Self { channels }
    }

    pub fn push_channel(&mut self, channel: Channel) {
        self.channels.push(channel);
    }

    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of CSV data rows: the longest channel's sample count.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.channels.iter().map(|c| c.samples.len()).max().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Serialize as CSV: a header row of channel names, then one record per
    /// row with shorter channels contributing empty cells. A table with no
    /// channels writes nothing. Returns the number of data rows written.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<usize> {
        if self.channels.is_empty() {
            return Ok(0);
        }
        let mut w = csv::Writer::from_writer(writer);
        w.write_record(self.channels.iter().map(|c| c.name.as_str()))?;

        let rows = self.row_count();
        for row in 0..rows {
            let record: Vec<String> = self
                .channels
                .iter()
                .map(|c| c.samples.get(row).map(|v| v.to_string()).unwrap_or_default())
                .collect();
            w.write_record(&record)?;
        }
        w.flush()?;
        Ok(rows)
    }

    /// Serialize as CSV into a fresh buffer.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_csv(&mut buf)?;
        Ok(buf)
    }
}
