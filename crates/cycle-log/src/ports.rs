//! I/O port labels.
//!
//! A `ports.json` file in the working directory maps I/O addresses to
//! human-readable names for the I/O index. Keys are the 4-nibble port
//! address followed by `r` or `w`, e.g. `"03DAr": "CGA status register"`.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;

/// Port address labels loaded from `ports.json`.
#[derive(Debug, Default, Deserialize)]
pub struct PortMap(HashMap<String, String>);

impl PortMap {
    /// Load from a JSON file. A missing file yields an empty map; a file
    /// that exists but does not parse is reported.
    pub fn load(path: &Path) -> io::Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e),
        };
        serde_json::from_str(&text).map_err(io::Error::other)
    }

    /// Label for a port access, if one is defined.
    #[must_use]
    pub fn lookup(&self, port: u16, write: bool) -> Option<&str> {
        let key = format!("{port:04X}{}", if write { 'w' } else { 'r' });
        self.0.get(&key).map(String::as_str)
    }
}
