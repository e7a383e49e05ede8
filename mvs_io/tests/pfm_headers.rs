//! PFM decoding of malformed and hostile headers.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use tempfile::TempDir;

use mvs_io::{decode_pfm, read_pfm, MvsIoError};

fn decode(bytes: &[u8]) -> mvs_io::Result<mvs_core::DepthMap> {
    decode_pfm(&mut Cursor::new(bytes.to_vec()), Path::new("hostile.pfm"))
}

#[test]
fn overflowing_dimensions_are_a_format_error() {
    let err = decode(b"Pf\n4294967296 4294967296\n-1\n").unwrap_err();
    assert!(matches!(err, MvsIoError::InvalidFormat { .. }), "{err}");

    let max = format!("Pf\n{} 2\n-1\n", usize::MAX);
    let err = decode(max.as_bytes()).unwrap_err();
    assert!(matches!(err, MvsIoError::InvalidFormat { .. }), "{err}");
}

#[test]
fn oversized_header_without_payload_is_a_format_error() {
    // 1 GiB announced, 8 bytes present
    let mut data = b"Pf\n16384 16384\n-1\n".to_vec();
    data.extend_from_slice(&[0u8; 8]);
    let err = decode(&data).unwrap_err();
    assert!(matches!(err, MvsIoError::InvalidFormat { .. }), "{err}");
}

#[test]
fn oversized_header_on_disk_names_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("depth_map_0000.pfm");
    fs::write(&path, b"Pf\n100000 100000\n1\n\0\0\0\0").unwrap();

    match read_pfm(&path).unwrap_err() {
        MvsIoError::InvalidFormat { path: p, .. } => assert_eq!(p, path),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn exact_payload_still_decodes() {
    let mut data = b"Pf\n2 1\n-1\n".to_vec();
    data.extend_from_slice(&1.5f32.to_le_bytes());
    data.extend_from_slice(&2.5f32.to_le_bytes());
    let depth = decode(&data).unwrap();
    assert_eq!(depth.as_slice(), &[1.5, 2.5]);
}
