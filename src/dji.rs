//! Safe wrapper over the DJI DIRP decode library.
//!
//! The DIRP API hands out an opaque handle that must be created,
//! queried and destroyed in that order, exactly once. The wrapper
//! enforces the lifecycle by construction: [`RJpegDecoder::create`]
//! queries the resolution immediately (so `measure` can never run
//! against unknown dimensions) and the handle is destroyed in `Drop`
//! on every exit path.
//!
//! A handle is `Send` but not `Sync`; the native library provides no
//! internal locking, so concurrent use of one handle is forbidden.
//! Higher layers serialize access or create one handle per worker.
//! All native calls are synchronous and blocking. Imposing a timeout
//! means abandoning the call on another thread, which leaks the
//! handle (it cannot be destroyed from outside its owning call) — a
//! known risk this crate documents rather than papers over.
//!
//! The traits at the bottom exist so that validation and loading are
//! generic over the decoder; the `dji-thermal-sys` backed
//! implementation is behind the `dji` feature because linking it
//! requires the vendor SDK.

use serde_derive::*;

/// A raw DIRP return code. `0` is success; the rest form a small,
/// closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetCode(pub i32);

impl RetCode {
    pub const SUCCESS: RetCode = RetCode(0);

    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    /// Symbolic name of the code, per the DIRP headers.
    pub fn name(self) -> &'static str {
        match self.0 {
            0 => "DIRP_SUCCESS",
            -1 => "DIRP_ERROR_MALLOC",
            -2 => "DIRP_ERROR_POINTER_NULL",
            -3 => "DIRP_ERROR_INVALID_PARAMS",
            -4 => "DIRP_ERROR_INVALID_RAW",
            -5 => "DIRP_ERROR_INVALID_HEADER",
            -6 => "DIRP_ERROR_INVALID_CURVE",
            -7 => "DIRP_ERROR_INVALID_CONF",
            -8 => "DIRP_ERROR_INVALID_AUTH",
            -9 => "DIRP_ERROR_INVALID_SPEC",
            -10 => "DIRP_ERROR_PARSE",
            -11 => "DIRP_ERROR_SIZE",
            -12 => "DIRP_ERROR_INVALID_HANDLE",
            -13 => "DIRP_ERROR_FORMAT_INPUT",
            -14 => "DIRP_ERROR_FORMAT_OUTPUT",
            -15 => "DIRP_ERROR_UNSUPPORTED_FUNC",
            -16 => "DIRP_ERROR_UNSUPPORTED_ACTION",
            -17 => "DIRP_ERROR_FILE_FAIL",
            -18 => "DIRP_ERROR_STATE_FAIL",
            -19 => "DIRP_ERROR_ABNORMAL_EXIT",
            _ => "DIRP_ERROR_UNKNOWN",
        }
    }

    /// Operator guidance for codes seen in the field. Unknown codes
    /// get a generic message.
    pub fn guidance(self) -> &'static str {
        GUIDANCE
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|(_, text)| *text)
            .unwrap_or("unknown error code; consult the DIRP SDK headers for this build")
    }
}

impl std::fmt::Display for RetCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

/// Guidance table. Data, not control flow: extend it by adding rows.
///
/// Code -15 is the legacy catch-all the codec reports for several
/// unrelated problems; the text enumerates the plausible causes
/// because the SDK itself does not distinguish them.
const GUIDANCE: &[(i32, &str)] = &[
    (
        -5,
        "no DIRP header found: likely a plain JPEG or a visual-spectrum photo, \
         not a radiometric capture",
    ),
    (
        -10,
        "radiometric payload could not be parsed: the file may be truncated or \
         written by unsupported firmware",
    ),
    (
        -13,
        "input format rejected: this SDK release does not understand the \
         container layout of the file",
    ),
    (
        -15,
        "legacy catch-all rejection; known causes include: image taken with a \
         non-thermal lens, unsupported camera model, firmware too old for \
         radiometric JPEG, or the thermal payload was stripped by an image editor",
    ),
];

/// Ambient measurement parameters stored alongside the radiometric
/// payload. Defaults are the DIRP SDK defaults.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MeasurementParams {
    pub distance_m: f32,
    pub humidity_pct: f32,
    pub emissivity: f32,
    pub reflection_c: f32,
}

impl Default for MeasurementParams {
    fn default() -> Self {
        MeasurementParams {
            distance_m: 5.0,
            humidity_pct: 70.0,
            emissivity: 1.0,
            reflection_c: 23.0,
        }
    }
}

/// Color bar range reported by the camera.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ColorBar {
    pub high: f32,
    pub low: f32,
    pub manual: bool,
}

/// Creates decode handles from raw R-JPEG bytes.
///
/// The only production implementation is [`RJpegDecoder`]; tests use
/// stubs so the pure-Rust surface exercises the full pipeline without
/// the vendor library.
pub trait NativeDecoder {
    type Handle: DecoderHandle;

    /// One native decode context per call. A failed create reports the
    /// raw code verbatim; no retries.
    fn create(&self, bytes: &[u8]) -> Result<Self::Handle, RetCode>;
}

/// A live decode context. Valid from creation until drop; destroyed
/// exactly once, in `Drop`.
pub trait DecoderHandle {
    fn resolution(&self) -> (u32, u32);

    fn measurement_params(&self) -> Result<MeasurementParams, RetCode>;

    fn color_bar(&self) -> Result<ColorBar, RetCode>;

    /// Per-pixel temperatures in celsius, row-major, exactly
    /// `width * height` values. The buffer is sized internally from
    /// the resolution captured at creation time.
    fn measure(&mut self) -> Result<Vec<f32>, RetCode>;

    /// The raw radiometric payload, undecoded.
    fn raw_radiometric(&mut self) -> Result<Vec<u8>, RetCode>;
}

#[cfg(feature = "dji")]
pub use self::sys::{RJpegDecoder, RJpegHandle};

#[cfg(feature = "dji")]
mod sys {
    use std::mem::{size_of, MaybeUninit};

    use dji_thermal_sys::*;

    use super::{ColorBar, DecoderHandle, MeasurementParams, NativeDecoder, RetCode};

    /// Decoder backed by `libdirp` via `dji-thermal-sys`.
    #[derive(Debug, Default)]
    pub struct RJpegDecoder;

    #[derive(Debug)]
    pub struct RJpegHandle {
        handle: DIRP_HANDLE,
        width: u32,
        height: u32,
    }

    // The handle may move between threads but must not be shared:
    // libdirp has no internal locking.
    unsafe impl Send for RJpegHandle {}

    impl NativeDecoder for RJpegDecoder {
        type Handle = RJpegHandle;

        fn create(&self, bytes: &[u8]) -> Result<RJpegHandle, RetCode> {
            let mut handle = MaybeUninit::uninit();
            let ret = unsafe {
                dirp_create_from_rjpeg(bytes.as_ptr(), bytes.len() as i32, handle.as_mut_ptr())
            };
            if ret != 0 {
                return Err(RetCode(ret));
            }
            let handle = unsafe { handle.assume_init() };

            // Resolution is captured up front so measure() can never
            // run without known dimensions.
            let mut resolution = MaybeUninit::uninit();
            let ret = unsafe { dirp_get_rjpeg_resolution(handle, resolution.as_mut_ptr()) };
            if ret != 0 {
                unsafe { dirp_destroy(handle) };
                return Err(RetCode(ret));
            }
            let resolution = unsafe { resolution.assume_init() };

            Ok(RJpegHandle {
                handle,
                width: resolution.width as u32,
                height: resolution.height as u32,
            })
        }
    }

    impl DecoderHandle for RJpegHandle {
        fn resolution(&self) -> (u32, u32) {
            (self.width, self.height)
        }

        fn measurement_params(&self) -> Result<MeasurementParams, RetCode> {
            let mut params = MaybeUninit::uninit();
            let ret = unsafe { dirp_get_measurement_params(self.handle, params.as_mut_ptr()) };
            if ret != 0 {
                return Err(RetCode(ret));
            }
            let params = unsafe { params.assume_init() };
            Ok(MeasurementParams {
                distance_m: params.distance,
                humidity_pct: params.humidity,
                emissivity: params.emissivity,
                reflection_c: params.reflection,
            })
        }

        fn color_bar(&self) -> Result<ColorBar, RetCode> {
            let mut bar = MaybeUninit::uninit();
            let ret = unsafe { dirp_get_color_bar(self.handle, bar.as_mut_ptr()) };
            if ret != 0 {
                return Err(RetCode(ret));
            }
            let bar = unsafe { bar.assume_init() };
            Ok(ColorBar {
                high: bar.high,
                low: bar.low,
                manual: bar.manual_enable,
            })
        }

        fn measure(&mut self) -> Result<Vec<f32>, RetCode> {
            let num_values = (self.width * self.height) as usize;
            let mut values = Vec::with_capacity(num_values);
            let ret = unsafe {
                dirp_measure_ex(
                    self.handle,
                    values.as_mut_ptr(),
                    (num_values * size_of::<f32>()) as i32,
                )
            };
            if ret != 0 {
                return Err(RetCode(ret));
            }
            unsafe {
                values.set_len(num_values);
            }
            Ok(values)
        }

        fn raw_radiometric(&mut self) -> Result<Vec<u8>, RetCode> {
            // 16-bit raw sensor values, one per pixel.
            let num_bytes = (self.width * self.height) as usize * 2;
            let mut values = Vec::with_capacity(num_bytes);
            let ret = unsafe {
                dirp_get_original_raw(self.handle, values.as_mut_ptr(), num_bytes as i32)
            };
            if ret != 0 {
                return Err(RetCode(ret));
            }
            unsafe {
                values.set_len(num_bytes);
            }
            Ok(values)
        }
    }

    impl Drop for RJpegHandle {
        fn drop(&mut self) {
            // Destroy exactly once; nothing useful to do with a
            // failing code at this point.
            unsafe {
                dirp_destroy(self.handle);
            }
        }
    }
}


#[cfg(all(test, feature = "dji"))]
mod dataset_tests {
    use anyhow::{Context, Result};
    use glob::{glob_with, MatchOptions};

    use std::env;

    use super::{DecoderHandle, NativeDecoder, RJpegDecoder};

    /// Run with `RJPEG_DATASETS_PATH` pointing at a directory of real
    /// captures; skipped otherwise.
    #[test]
    fn decode_datasets() -> Result<()> {
        let base = match env::var("RJPEG_DATASETS_PATH").context("env `RJPEG_DATASETS_PATH`") {
            Ok(base) => base,
            Err(_) => return Ok(()),
        };
        let mut opts = MatchOptions::new();
        opts.case_sensitive = false;
        for path in glob_with(&format!("{}/**/*.jpg", base), opts)? {
            let path = path?;
            eprintln!("Reading {}...", path.display());
            let bytes = std::fs::read(&path)?;
            let mut handle = RJpegDecoder
                .create(&bytes)
                .map_err(|c| anyhow::anyhow!("create failed: {}", c))?;
            let (wid, ht) = handle.resolution();
            let temps = handle
                .measure()
                .map_err(|c| anyhow::anyhow!("measure failed: {}", c))?;
            assert_eq!(temps.len(), (wid * ht) as usize);
            let params = handle.measurement_params().ok();
            eprintln!("\tdims: {}x{}, params: {:?}", wid, ht, params);
        }
        Ok(())
    }
}
