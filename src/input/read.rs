//! Input reading implementation.

use crate::cli::InputSpec;
use crate::error::{Error, Result};
use crate::input::InputSource;
use std::fs;
use std::io::{self, Read};

/// Read the transaction JSON text from the specified source.
pub fn read_input(spec: &InputSpec) -> Result<String> {
    let text = match InputSource::from_spec(spec)? {
        InputSource::File(path) => fs::read(&path).map_err(|e| Error::IoError {
            path: Some(path),
            source: e,
        })?,

        InputSource::Text(text) => text.into_bytes(),

        InputSource::Stdin => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|e| Error::IoError {
                    path: None,
                    source: e,
                })?;
            buffer
        }
    };

    into_text(text)
}

/// Validate that input is non-empty UTF-8.
fn into_text(bytes: Vec<u8>) -> Result<String> {
    let text = String::from_utf8(bytes)
        .map_err(|_| Error::InvalidJson("input is not UTF-8 text".to_string()))?;

    if text.trim().is_empty() {
        return Err(Error::NoInput);
    }

    Ok(text)
}
