//! Recorded server command streams.
//!
//! A capture is the sequence of `(command, payload)` pairs a client received,
//! already split by the packet framing layer. It is stored with bincode.

use std::fs;
use std::path::Path;

use anyhow::Context;
use bincode::{Decode, Encode};

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct CapturedCommand {
    pub name: String,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Encode, Decode)]
pub struct Capture {
    pub commands: Vec<CapturedCommand>,
}

impl Capture {
    pub fn push(&mut self, name: &str, payload: Vec<u8>) {
        self.commands.push(CapturedCommand {
            name: name.to_string(),
            payload,
        });
    }

    pub fn to_bytes(&self) -> anyhow::Result<Vec<u8>> {
        bincode::encode_to_vec(self, bincode::config::standard()).context("Encode capture")
    }

    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        let (capture, _consumed) = bincode::decode_from_slice(bytes, bincode::config::standard())
            .context("Decode capture")?;
        Ok(capture)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_bytes(&bytes).with_context(|| format!("Invalid capture {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
    }
}
