//! CSV candle ingest.
//!
//! Expected header: `timestamp,open,high,low,close,volume`, timestamps in
//! RFC 3339. Rows are deserialized directly into [`Candle`] and the whole
//! series is validated before it is handed on.

use std::io::Read;
use std::path::Path;

use crate::domain::Candle;

use super::{validate_candles, DataError};

/// Load and validate candles from a CSV file.
pub fn load_candles_csv(path: &Path) -> Result<Vec<Candle>, DataError> {
    let file = std::fs::File::open(path)?;
    read_candles_csv(file)
}

/// Load and validate candles from any CSV reader.
pub fn read_candles_csv<R: Read>(reader: R) -> Result<Vec<Candle>, DataError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut candles = Vec::new();
    for row in csv_reader.deserialize() {
        let candle: Candle = row?;
        candles.push(candle);
    }
    validate_candles(&candles)?;
    Ok(candles)
}

/// Write candles to any CSV writer, matching the ingest format.
pub fn write_candles_csv<W: std::io::Write>(
    writer: W,
    candles: &[Candle],
) -> Result<(), DataError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for candle in candles {
        csv_writer.serialize(candle)?;
    }
    csv_writer.flush()?;
    Ok(())
}
