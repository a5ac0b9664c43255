//! Input loading: files, directories (recursive) and inline base64 content.
//!
//! Loading never decodes rules; it only produces raw blobs. A missing root
//! path is fatal, while an unreadable file inside a directory or a bad
//! base64 line is recorded as skipped so the rest of the batch still loads.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;

use crate::error::{ParseError, Result};

/// Raw bytes of one input plus where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputBlob {
    pub origin: String,
    pub bytes: Vec<u8>,
}

/// An input that could not be loaded or decoded.
#[derive(Debug)]
pub struct SkippedInput {
    pub origin: String,
    pub error: ParseError,
}

/// Result of loading inputs: the blobs to decode and the inputs that were
/// dropped along the way.
#[derive(Debug, Default)]
pub struct Inputs {
    pub blobs: Vec<InputBlob>,
    pub skipped: Vec<SkippedInput>,
}

impl Inputs {
    fn skip(&mut self, origin: String, error: ParseError) {
        log::warn!("skipping {origin}: {error}");
        self.skipped.push(SkippedInput { origin, error });
    }
}

/// Load a rule file, or every file below a directory.
///
/// Directory entries are visited in sorted order so repeated runs see the
/// same sequence of inputs.
pub fn load_path(path: &Path) -> Result<Inputs> {
    let metadata = std::fs::metadata(path).map_err(|source| ParseError::InputAccess {
        path: path.to_path_buf(),
        source,
    })?;

    let mut inputs = Inputs::default();
    if !metadata.is_dir() {
        let bytes = std::fs::read(path).map_err(|source| ParseError::InputAccess {
            path: path.to_path_buf(),
            source,
        })?;
        inputs.blobs.push(InputBlob {
            origin: path.display().to_string(),
            bytes,
        });
        return Ok(inputs);
    }

    fn walk(dir: &Path, inputs: &mut Inputs) {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                inputs.skip(dir.display().to_string(), e.into());
                return;
            }
        };

        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => inputs.skip(dir.display().to_string(), e.into()),
            }
        }
        paths.sort();

        for path in paths {
            if path.is_dir() {
                walk(&path, inputs);
                continue;
            }
            match std::fs::read(&path) {
                Ok(bytes) => {
                    log::debug!("read {} ({} bytes)", path.display(), bytes.len());
                    inputs.blobs.push(InputBlob {
                        origin: path.display().to_string(),
                        bytes,
                    });
                }
                Err(e) => inputs.skip(path.display().to_string(), e.into()),
            }
        }
    }

    walk(path, &mut inputs);
    Ok(inputs)
}

/// Decode inline base64 content.
///
/// A single line is one blob (`content`). Several lines are treated as one
/// blob per line (`content[N]`, 1-based); blank lines are ignored and a
/// line that is not valid base64 is skipped without affecting the others.
pub fn load_base64(content: &str) -> Inputs {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut inputs = Inputs::default();
    let single = lines.len() == 1;
    for (idx, line) in lines.into_iter().enumerate() {
        let origin = if single {
            "content".to_string()
        } else {
            format!("content[{}]", idx + 1)
        };
        match BASE64.decode(line) {
            Ok(bytes) => inputs.blobs.push(InputBlob { origin, bytes }),
            Err(e) => inputs.skip(origin, e.into()),
        }
    }
    inputs
}
