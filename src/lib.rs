//! Validate and decode radiometric R-JPEGs from DJI thermal cameras.
//!
//! This crate is the decode core of a drone thermal-inspection
//! pipeline. It covers four things:
//!
//! 1. [Heuristic validation][validate] of candidate files — size,
//!    JPEG magic, marker and vendor-signature scans, and a native
//!    probe — collected into a [`DiagnosticReport`] that never
//!    panics and renders a stable operator-facing text report.
//!
//! 2. A [safe wrapper][dji] over the vendor DIRP decode library with
//!    a strict handle lifecycle: create, query, destroy, exactly
//!    once, on every exit path.
//!
//! 3. Decoding into a [`ThermalFrame`] — the dense per-pixel
//!    temperature matrix plus measurement parameters — and a
//!    [deterministic threshold pipeline][threshold] that classifies
//!    hot pixels for downstream detection.
//!
//! 4. [Lazy regeneration][features] of per-feature hot-pixel lists,
//!    so long runs can drop pixel data under memory pressure and
//!    rebuild it bit-identically later.
//!
//! # Usage
//!
//! ```rust,no_run
//! # #[cfg(feature = "dji")]
//! # fn example() -> Result<(), rjpeg::Error> {
//! use std::path::Path;
//! use rjpeg::{dji::RJpegDecoder, ThermalFrame};
//!
//! let frame = ThermalFrame::load_with(Path::new("DJI_0042_R.jpg"), &RJpegDecoder)?;
//! let mask = rjpeg::threshold::hot_pixel_mask(&frame, 200);
//! # Ok(())
//! # }
//! ```
//!
//! Object detection, video iteration, geolocation and reporting live
//! in other crates; this one stops at frames, masks and feature
//! pixels.

pub mod dji;
pub mod error;
pub mod export;
pub mod features;
pub mod frame;
pub mod stats;
pub mod threshold;
pub mod validate;

pub mod cli;

pub use crate::error::Error;
pub use crate::features::{regenerate_for_block, Block, Feature, FeatureKind, HotPixel, PixelBox};
pub use crate::frame::ThermalFrame;
pub use crate::threshold::{hot_pixel_mask, HotPixelMask};
pub use crate::validate::{validate_heuristics, validate_with, DiagnosticReport};
