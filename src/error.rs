//! Typed failures for the decode pipeline.
//!
//! Validation itself never errors (it returns a report); these
//! variants cover everything after the caller decides to trust a
//! file. `Validation` and `Decode` carry the whole diagnostic report
//! so operators get actionable guidance without re-running validation.

use thiserror::Error;

use crate::dji::RetCode;
use crate::validate::DiagnosticReport;

#[derive(Debug, Error)]
pub enum Error {
    /// The file failed validation; no native resource is held.
    #[error("validation failed:\n{0}")]
    Validation(Box<DiagnosticReport>),

    /// A handle was created but could not produce data. Fatal for
    /// this load only; the handle has already been destroyed.
    #[error("decode failed with {code}:\n{report}")]
    Decode {
        code: RetCode,
        report: Box<DiagnosticReport>,
    },

    /// Pixel coordinate query outside frame bounds.
    #[error("pixel ({x}, {y}) out of range for {width}x{height} frame")]
    OutOfRange {
        x: isize,
        y: isize,
        width: usize,
        height: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}
