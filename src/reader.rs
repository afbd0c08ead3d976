use crate::error::CondenseError;
use crate::options::BinaryDetection;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const SNIFF_LEN: usize = 8192;

/// Which decoder produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value, so
    /// this never fails, but non-Latin-1 input comes out mis-rendered.
    Latin1,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub text: String,
    pub encoding: Encoding,
}

/// Outcome of reading one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Text {
        text: String,
        /// Set when the fallback decoder had to be used.
        warning: Option<String>,
    },
    /// Binary detection fired; the file is left out of the output.
    Binary,
}

/// UTF-8 first, Latin-1 if that fails.
pub fn decode(bytes: Vec<u8>) -> Decoded {
    match String::from_utf8(bytes) {
        Ok(text) => Decoded {
            text,
            encoding: Encoding::Utf8,
        },
        Err(err) => Decoded {
            text: err.as_bytes().iter().map(|&b| char::from(b)).collect(),
            encoding: Encoding::Latin1,
        },
    }
}

/// Reads and decodes a whole file.
///
/// Open and read failures come back as [`CondenseError::Io`]; the caller
/// records them as warnings. The handle is closed before this returns,
/// whichever way decoding goes.
pub fn read_file(path: &Path, binary_detection: BinaryDetection) -> Result<ReadOutcome, CondenseError> {
    let bytes = {
        let mut file = File::open(path).map_err(|e| CondenseError::io(path, e))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| CondenseError::io(path, e))?;
        bytes
    };

    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    let is_binary = match binary_detection {
        BinaryDetection::Simple => head.contains(&0),
        BinaryDetection::Accurate => content_inspector::inspect(head).is_binary(),
        BinaryDetection::None => false,
    };
    if is_binary {
        #[cfg(feature = "logging")]
        tracing::debug!("Binary file detected: {}", path.display());
        return Ok(ReadOutcome::Binary);
    }

    let decoded = decode(bytes);
    let warning = match decoded.encoding {
        Encoding::Utf8 => None,
        Encoding::Latin1 => {
            #[cfg(feature = "logging")]
            tracing::debug!("Fell back to Latin-1 for {}", path.display());
            Some("not valid UTF-8, read as Latin-1; some characters may be wrong".to_string())
        }
    };
    Ok(ReadOutcome::Text {
        text: decoded.text,
        warning,
    })
}
