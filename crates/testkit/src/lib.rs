#![warn(missing_docs)]
//! Deterministic testing surfaces: in-memory host doubles and an event log.

mod mock;

use anyhow::Result;
use mcbe_core::{EntityId, EquipmentSlot, SimTick};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

pub use mcbe_core::PLAYER_TYPE;
pub use mock::{MockContainer, MockEntity, MockWorld};

/// One delivered signal event, as written to replay logs.
#[derive(Debug, Serialize)]
pub struct EventRecord<'a> {
    /// Tick the event was delivered on.
    pub tick: SimTick,
    /// Event kind name (`entity_jump`, `player_equip`, ...).
    pub kind: &'a str,
    /// Entity or player the event refers to.
    pub entity: &'a EntityId,
    /// Slot, for equipment events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot: Option<EquipmentSlot>,
    /// Item type id, for equipment events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<&'a str>,
}

/// A sink that writes newline-delimited JSON.
pub struct JsonlSink<W: Write = BufWriter<File>> {
    out: W,
    written: usize,
}

impl JsonlSink {
    /// Create a new sink at `path`, creating parent dirs if needed.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        Ok(Self::from_writer(BufWriter::new(file)))
    }
}

impl<W: Write> JsonlSink<W> {
    /// Wrap an arbitrary writer.
    pub fn from_writer(out: W) -> Self {
        Self { out, written: 0 }
    }

    /// Append a record to the log.
    pub fn write<T: Serialize>(&mut self, record: &T) -> Result<()> {
        let line = serde_json::to_string(record)?;
        self.out.write_all(line.as_bytes())?;
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}
