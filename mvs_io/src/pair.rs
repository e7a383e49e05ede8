//! View-pair table.
//!
//! Text format:
//!
//! ```text
//! V
//! <ref id>
//! K id0 score0 id1 score1 ...
//! <ref id>
//! K ...
//! ```
//!
//! Only the neighbor ids are kept, in file order. Scores are validated but not
//! retained.

use std::fs;
use std::path::Path;

use crate::error::{io_error, MvsIoError, Result};

/// One reference view and its ranked neighbors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewPair {
    /// Reference view id.
    pub ref_view: u32,
    /// Neighbor view ids, best first.
    pub neighbors: Vec<u32>,
}

/// Read a view-pair table from disk.
pub fn read_view_pairs(path: &Path) -> Result<Vec<ViewPair>> {
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    parse_view_pairs(&text).map_err(|err| match err {
        MvsIoError::InvalidConfig { message } => {
            MvsIoError::config(format!("{}: {}", path.display(), message))
        }
        other => other,
    })
}

/// Parse a view-pair table.
///
/// # Errors
/// [`MvsIoError::InvalidConfig`] if the declared viewpoint count disagrees with
/// the lines present, a neighbor line does not hold `2K + 1` tokens, or any
/// token fails to parse.
pub fn parse_view_pairs(text: &str) -> Result<Vec<ViewPair>> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let (header, body) = lines
        .split_first()
        .ok_or_else(|| MvsIoError::config("pair table is empty"))?;

    let count: usize = header
        .parse()
        .map_err(|_| MvsIoError::config(format!("invalid viewpoint count {header:?}")))?;

    if body.len() != 2 * count {
        return Err(MvsIoError::config(format!(
            "pair table declares {count} viewpoints but holds {} lines after the header",
            body.len()
        )));
    }

    body.chunks_exact(2)
        .enumerate()
        .map(|(i, chunk)| parse_entry(i, chunk[0], chunk[1]))
        .collect()
}

fn parse_entry(index: usize, ref_line: &str, neighbor_line: &str) -> Result<ViewPair> {
    let ref_view: u32 = ref_line.parse().map_err(|_| {
        MvsIoError::config(format!("entry {index}: invalid reference id {ref_line:?}"))
    })?;

    let tokens: Vec<&str> = neighbor_line.split_whitespace().collect();
    let declared: usize = tokens
        .first()
        .and_then(|t| t.parse().ok())
        .ok_or_else(|| {
            MvsIoError::config(format!("entry {index}: invalid neighbor count line"))
        })?;

    if tokens.len() != 2 * declared + 1 {
        return Err(MvsIoError::config(format!(
            "entry {index}: {declared} neighbors declared but {} tokens follow",
            tokens.len() - 1
        )));
    }

    let mut neighbors = Vec::with_capacity(declared);
    for pair in tokens[1..].chunks_exact(2) {
        let id: u32 = pair[0].parse().map_err(|_| {
            MvsIoError::config(format!("entry {index}: invalid neighbor id {:?}", pair[0]))
        })?;
        pair[1].parse::<f32>().map_err(|_| {
            MvsIoError::config(format!("entry {index}: invalid score {:?}", pair[1]))
        })?;
        neighbors.push(id);
    }

    Ok(ViewPair {
        ref_view,
        neighbors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "2\n0\n2 10 2346.0 1 2036.0\n1\n3 2 1.5 0 1.0 9 0.5\n";

    #[test]
    fn test_parse_keeps_file_order() {
        let pairs = parse_view_pairs(TABLE).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].ref_view, 0);
        assert_eq!(pairs[0].neighbors, vec![10, 1]);
        // Not re-sorted by id or score
        assert_eq!(pairs[1].neighbors, vec![2, 0, 9]);
    }

    #[test]
    fn test_count_mismatch() {
        let err = parse_view_pairs("3\n0\n1 1 1.0\n1\n1 0 1.0\n").unwrap_err();
        assert!(matches!(err, MvsIoError::InvalidConfig { .. }));
    }

    #[test]
    fn test_token_mismatch() {
        assert!(parse_view_pairs("1\n0\n2 1 1.0 2\n").is_err());
        assert!(parse_view_pairs("1\n0\n1 1 1.0 2 2.0\n").is_err());
    }

    #[test]
    fn test_unparsable_tokens() {
        assert!(parse_view_pairs("x\n").is_err());
        assert!(parse_view_pairs("1\nzero\n1 1 1.0\n").is_err());
        assert!(parse_view_pairs("1\n0\n1 one 1.0\n").is_err());
        assert!(parse_view_pairs("1\n0\n1 1 high\n").is_err());
        assert!(parse_view_pairs("").is_err());
    }

    #[test]
    fn test_zero_neighbors() {
        let pairs = parse_view_pairs("1\n4\n0\n").unwrap();
        assert_eq!(pairs[0].ref_view, 4);
        assert!(pairs[0].neighbors.is_empty());
    }
}
