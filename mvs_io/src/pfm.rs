//! Portable float map codec for single-channel depth.
//!
//! Layout:
//!
//! ```text
//! Pf\n
//! <width> <height>\n
//! <scale>\n
//! <width * height f32 values, bottom row first>
//! ```
//!
//! A negative scale marks little-endian data, a positive one big-endian.
//! Three-channel `PF` files are rejected.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};

use mvs_core::DepthMap;

use crate::error::{io_error, MvsIoError, Result};

/// Byte order of the float payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PfmEndian {
    /// Scale written as `-1`.
    #[default]
    Little,
    /// Scale written as `1`.
    Big,
}

/// Read a depth map from a PFM file.
pub fn read_pfm(path: &Path) -> Result<DepthMap> {
    let file = File::open(path).map_err(io_error(path))?;
    decode_pfm(&mut BufReader::new(file), path)
}

/// Write a depth map as little-endian PFM.
pub fn write_pfm(path: &Path, depth: &DepthMap) -> Result<()> {
    let file = File::create(path).map_err(io_error(path))?;
    let mut writer = BufWriter::new(file);
    encode_pfm(&mut writer, depth, PfmEndian::Little).map_err(io_error(path))?;
    writer.flush().map_err(io_error(path))
}

/// Decode PFM from a reader. `path` is only used in error messages.
pub fn decode_pfm<R: BufRead>(reader: &mut R, path: &Path) -> Result<DepthMap> {
    let invalid = |message: String| MvsIoError::InvalidFormat {
        path: path.to_path_buf(),
        message,
    };

    let magic = read_header_line(reader, path)?;
    match magic.as_str() {
        "Pf" => {}
        "PF" => return Err(invalid("three-channel PF is not a depth map".into())),
        other => return Err(invalid(format!("bad magic {other:?}"))),
    }

    let dims = read_header_line(reader, path)?;
    let mut parts = dims.split_whitespace().map(str::parse::<usize>);
    let (width, height) = match (parts.next(), parts.next(), parts.next()) {
        (Some(Ok(w)), Some(Ok(h)), None) => (w, h),
        _ => return Err(invalid(format!("bad dimensions {dims:?}"))),
    };

    let scale_line = read_header_line(reader, path)?;
    let scale: f32 = scale_line
        .parse()
        .map_err(|_| invalid(format!("bad scale {scale_line:?}")))?;
    if scale == 0.0 || !scale.is_finite() {
        return Err(invalid(format!("bad scale {scale_line:?}")));
    }

    let values = width
        .checked_mul(height)
        .filter(|n| n.checked_mul(4).is_some())
        .ok_or_else(|| invalid(format!("dimensions {width}x{height} overflow")))?;

    // Allocation follows the bytes actually present, never the header alone
    let mut payload = Vec::new();
    reader
        .by_ref()
        .take(values as u64 * 4)
        .read_to_end(&mut payload)
        .map_err(io_error(path))?;
    if payload.len() != values * 4 {
        return Err(invalid(format!(
            "payload shorter than {width}x{height} values"
        )));
    }

    let mut file_rows = vec![0.0f32; values];
    if scale < 0.0 {
        LittleEndian::read_f32_into(&payload, &mut file_rows);
    } else {
        BigEndian::read_f32_into(&payload, &mut file_rows);
    }

    let mut data = Vec::with_capacity(values);
    for row in file_rows.chunks_exact(width.max(1)).rev() {
        data.extend_from_slice(row);
    }

    Ok(DepthMap::from_vec(width, height, data)?)
}

/// Encode a depth map as PFM with the given byte order.
pub fn encode_pfm<W: Write>(writer: &mut W, depth: &DepthMap, endian: PfmEndian) -> std::io::Result<()> {
    let (width, height) = (depth.width(), depth.height());
    let scale = match endian {
        PfmEndian::Little => -1.0,
        PfmEndian::Big => 1.0,
    };
    write!(writer, "Pf\n{width} {height}\n{scale}\n")?;

    for row in depth.as_slice().chunks_exact(width.max(1)).rev() {
        match endian {
            PfmEndian::Little => write_row::<LittleEndian, _>(writer, row)?,
            PfmEndian::Big => write_row::<BigEndian, _>(writer, row)?,
        }
    }
    Ok(())
}

fn write_row<E: ByteOrder, W: Write>(writer: &mut W, row: &[f32]) -> std::io::Result<()> {
    for &value in row {
        writer.write_f32::<E>(value)?;
    }
    Ok(())
}

fn read_header_line<R: BufRead>(reader: &mut R, path: &Path) -> Result<String> {
    let mut bytes = Vec::new();
    reader
        .by_ref()
        .take(256)
        .read_until(b'\n', &mut bytes)
        .map_err(io_error(path))?;
    if bytes.last() != Some(&b'\n') {
        return Err(MvsIoError::InvalidFormat {
            path: path.to_path_buf(),
            message: "truncated header".into(),
        });
    }
    let line = String::from_utf8_lossy(&bytes).trim().to_owned();
    Ok(line)
}
