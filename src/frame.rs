//! The decoded radiometric matrix plus its capture metadata.

use std::{fs, path::Path};

use ndarray::Array2;

use crate::dji::{ColorBar, DecoderHandle, MeasurementParams, NativeDecoder};
use crate::error::Error;
use crate::stats::PixelStats;
use crate::validate::validate_with;

/// A fully decoded frame. Immutable once constructed; pixel `(x, y)`
/// lives at row `y`, column `x` of the matrix.
#[derive(Debug)]
pub struct ThermalFrame {
    width: usize,
    height: usize,
    temperatures: Array2<f32>,
    pub params: MeasurementParams,
    pub color_bar: ColorBar,
    pub stats: PixelStats,
}

impl ThermalFrame {
    /// Build a frame from an already-decoded temperature matrix in
    /// `(height, width)` layout. Statistics are computed here so they
    /// always agree with the matrix.
    pub fn from_parts(
        temperatures: Array2<f32>,
        params: MeasurementParams,
        color_bar: ColorBar,
    ) -> Self {
        let (height, width) = temperatures.dim();
        let mut stats = PixelStats::default();
        for &value in temperatures.iter() {
            stats += value as f64;
        }
        ThermalFrame {
            width,
            height,
            temperatures,
            params,
            color_bar,
            stats,
        }
    }

    /// Validate and decode the file at `path`.
    ///
    /// Validation failures surface as [`Error::Validation`] with the
    /// full report embedded. After validation a *fresh* handle is
    /// created — the validator's probe handle is never reused across
    /// the component boundary. A handle that cannot produce data is
    /// unrecoverable for this load ([`Error::Decode`]); failures to
    /// read measurement params or the color bar are non-fatal and
    /// leave the documented defaults in place. The handle is
    /// destroyed on every exit path.
    pub fn load_with<D: NativeDecoder>(path: &Path, decoder: &D) -> Result<Self, Error> {
        let report = validate_with(path, decoder);
        if !report.is_valid {
            return Err(Error::Validation(Box::new(report)));
        }

        let bytes = fs::read(path)?;
        let mut handle = match decoder.create(&bytes) {
            Ok(handle) => handle,
            Err(code) => {
                return Err(Error::Decode {
                    code,
                    report: Box::new(report),
                })
            }
        };

        let (width, height) = handle.resolution();
        let temperatures = match handle.measure() {
            Ok(values) => values,
            Err(code) => {
                return Err(Error::Decode {
                    code,
                    report: Box::new(report),
                })
            }
        };

        let params = handle.measurement_params().unwrap_or_default();
        let color_bar = handle.color_bar().unwrap_or_default();
        drop(handle);

        let matrix = Array2::from_shape_vec((height as usize, width as usize), temperatures)?;
        Ok(ThermalFrame::from_parts(matrix, params, color_bar))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The dense matrix in `(height, width)` layout.
    pub fn temperatures(&self) -> &Array2<f32> {
        &self.temperatures
    }

    /// Temperature at pixel `(x, y)` in celsius.
    pub fn temperature_at(&self, x: isize, y: isize) -> Result<f32, Error> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return Err(Error::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.temperatures[(y as usize, x as usize)])
    }
}
