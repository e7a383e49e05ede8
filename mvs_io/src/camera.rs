//! Calibration text loader.
//!
//! Fixed line layout:
//!
//! | line  | content                                   |
//! |-------|-------------------------------------------|
//! | 0     | `extrinsic` marker                        |
//! | 1-4   | 4×4 world→camera rows                     |
//! | 6     | `intrinsic` marker                        |
//! | 7-9   | 3×3 intrinsic rows                        |
//! | 11    | `depth_min depth_interval [extra values]` |
//!
//! The interval is multiplied by `interval_scale` on load.

use std::fs;
use std::path::Path;

use nalgebra::{Matrix3, Matrix4};

use mvs_core::{CameraParams, MvsCoreError};

use crate::error::{io_error, MvsIoError, Result};

const EXTRINSIC_ROWS: std::ops::Range<usize> = 1..5;
const INTRINSIC_ROWS: std::ops::Range<usize> = 7..10;
const DEPTH_LINE: usize = 11;

/// Load calibration for one view.
pub fn load_camera(path: &Path, interval_scale: f32) -> Result<CameraParams> {
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    parse_camera(&text, interval_scale).map_err(|err| match err {
        MvsIoError::Calibration { message, .. } => MvsIoError::Calibration {
            path: path.to_path_buf(),
            message,
        },
        other => other,
    })
}

/// Parse calibration text.
///
/// Errors carry an empty path; [`load_camera`] fills in the file name.
pub fn parse_camera(text: &str, interval_scale: f32) -> Result<CameraParams> {
    let lines: Vec<&str> = text.lines().map(str::trim_end).collect();

    let mut extrinsics = Matrix4::<f32>::zeros();
    for (row, line_no) in EXTRINSIC_ROWS.enumerate() {
        let values = parse_row(&lines, line_no, 4)?;
        for (col, value) in values.into_iter().enumerate() {
            extrinsics[(row, col)] = value;
        }
    }

    let mut intrinsics = Matrix3::<f32>::zeros();
    for (row, line_no) in INTRINSIC_ROWS.enumerate() {
        let values = parse_row(&lines, line_no, 3)?;
        for (col, value) in values.into_iter().enumerate() {
            intrinsics[(row, col)] = value;
        }
    }

    let depth_line = line(&lines, DEPTH_LINE)?;
    let depth_values = parse_numbers(depth_line, DEPTH_LINE)?;
    if depth_values.len() < 2 {
        return Err(calibration(format!(
            "line {DEPTH_LINE}: expected depth_min and depth_interval, got {} values",
            depth_values.len()
        )));
    }
    let depth_min = depth_values[0];
    let depth_interval = depth_values[1] * interval_scale;

    CameraParams::new(intrinsics, extrinsics, depth_min, depth_interval).map_err(|err| match err {
        MvsCoreError::InvalidInterval { value } => calibration(format!(
            "scaled depth interval must be positive, got {value}"
        )),
        other => MvsIoError::Core(other),
    })
}

fn calibration(message: String) -> MvsIoError {
    MvsIoError::Calibration {
        path: Default::default(),
        message,
    }
}

fn line<'a>(lines: &[&'a str], line_no: usize) -> Result<&'a str> {
    lines
        .get(line_no)
        .copied()
        .ok_or_else(|| calibration(format!("missing line {line_no}")))
}

fn parse_numbers(text: &str, line_no: usize) -> Result<Vec<f32>> {
    text.split_whitespace()
        .map(|token| {
            token
                .parse::<f32>()
                .map_err(|_| calibration(format!("line {line_no}: invalid number {token:?}")))
        })
        .collect()
}

fn parse_row(lines: &[&str], line_no: usize, columns: usize) -> Result<Vec<f32>> {
    let values = parse_numbers(line(lines, line_no)?, line_no)?;
    if values.len() != columns {
        return Err(calibration(format!(
            "line {line_no}: expected {columns} values, got {}",
            values.len()
        )));
    }
    Ok(values)
}
