//! Parsers for the two dataset files.
//!
//! - movies.dat: movieId::title (one record per line, position = catalog index)
//! - similarity.bin: little-endian header followed by row-major f32 scores
//!
//! Binary layout of similarity.bin:
//!
//! ```text
//! offset  size  field
//! 0       4     magic "SIMX"
//! 4       4     version (u32, currently 1)
//! 8       4     rows (u32)
//! 12      4     cols (u32)
//! 16      4*n   scores (f32), n = rows * cols
//! ```

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const SIMILARITY_MAGIC: &[u8; 4] = b"SIMX";
pub const SIMILARITY_VERSION: u32 = 1;
const HEADER_LEN: usize = 16;

fn read_file(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

/// Parse the movies.dat file
pub fn parse_catalog(path: &Path) -> Result<Vec<MovieRecord>> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let bytes = read_file(path)?;
    let content = String::from_utf8(bytes).map_err(|e| DataLoadError::ParseError {
        file: file_name.clone(),
        line: 0,
        reason: format!("file is not valid UTF-8: {}", e),
    })?;

    parse_catalog_str(&content, &file_name)
}

/// Parse catalog lines from an in-memory string
///
/// The title is everything after the first "::", so titles may contain
/// the separator themselves. Empty lines are skipped and do not take an index.
/// A leading UTF-8 byte order mark is ignored.
pub fn parse_catalog_str(content: &str, file_name: &str) -> Result<Vec<MovieRecord>> {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut movies = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let line_no = idx + 1;
        let line_trimmed = line.trim();
        if line_trimmed.is_empty() {
            continue;
        }

        let (movie_id, title) =
            line_trimmed
                .split_once("::")
                .ok_or_else(|| DataLoadError::ParseError {
                    file: file_name.to_string(),
                    line: line_no,
                    reason: "Missing '::' separator".to_string(),
                })?;

        let title = title.trim();
        if title.is_empty() {
            return Err(DataLoadError::ParseError {
                file: file_name.to_string(),
                line: line_no,
                reason: "Missing title".to_string(),
            });
        }

        let movie = MovieRecord {
            index: movies.len(),
            movie_id: movie_id.trim().parse().map_err(|e| DataLoadError::ParseError {
                file: file_name.to_string(),
                line: line_no,
                reason: format!("Invalid movieId: {}", e),
            })?,
            title: title.to_string(),
        };

        movies.push(movie);
    }

    Ok(movies)
}

/// Parse the similarity.bin file
pub fn parse_similarity(path: &Path) -> Result<SimilarityMatrix> {
    let bytes = read_file(path)?;
    decode_similarity(&bytes)
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

/// Decode a similarity matrix from its binary representation
pub fn decode_similarity(bytes: &[u8]) -> Result<SimilarityMatrix> {
    if bytes.len() < HEADER_LEN {
        return Err(DataLoadError::MalformedMatrix(format!(
            "file is {} bytes, shorter than the {} byte header",
            bytes.len(),
            HEADER_LEN
        )));
    }
    if &bytes[0..4] != SIMILARITY_MAGIC {
        return Err(DataLoadError::MalformedMatrix("bad magic bytes".to_string()));
    }

    let version = read_u32(bytes, 4);
    if version != SIMILARITY_VERSION {
        return Err(DataLoadError::InvalidValue {
            field: "similarity version".to_string(),
            value: version.to_string(),
        });
    }

    let rows = read_u32(bytes, 8) as usize;
    let cols = read_u32(bytes, 12) as usize;
    if rows != cols {
        return Err(DataLoadError::MalformedMatrix(format!(
            "matrix is {}x{}, expected a square matrix",
            rows, cols
        )));
    }

    let payload = &bytes[HEADER_LEN..];
    let expected_len = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| DataLoadError::MalformedMatrix(format!("dimension {} overflows", rows)))?;
    if payload.len() != expected_len {
        return Err(DataLoadError::MalformedMatrix(format!(
            "header declares {}x{} ({} bytes) but payload is {} bytes",
            rows,
            cols,
            expected_len,
            payload.len()
        )));
    }

    let scores = payload
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    SimilarityMatrix::from_flat(rows, scores)
}

/// Encode a similarity matrix in the similarity.bin format
///
/// Used by offline tooling that writes the dataset, and by tests.
pub fn encode_similarity(matrix: &SimilarityMatrix) -> Vec<u8> {
    let size = matrix.size() as u32;
    let mut bytes = Vec::with_capacity(HEADER_LEN + matrix.as_slice().len() * 4);
    bytes.extend_from_slice(SIMILARITY_MAGIC);
    bytes.extend_from_slice(&SIMILARITY_VERSION.to_le_bytes());
    bytes.extend_from_slice(&size.to_le_bytes());
    bytes.extend_from_slice(&size.to_le_bytes());
    for score in matrix.as_slice() {
        bytes.extend_from_slice(&score.to_le_bytes());
    }
    bytes
}
