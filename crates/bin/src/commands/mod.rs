//! Subcommand implementations.

use std::{
    io::{self, Read},
    path::Path,
};

pub mod decode;
pub mod fold;
pub mod tags;

/// Reads and parses a JSON document from `file`, or from standard input.
pub(crate) fn read_json(file: Option<&Path>) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let text = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    Ok(serde_json::from_str(&text)?)
}
