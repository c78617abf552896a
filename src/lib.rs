//! Slanted watch face: a tilted digital clock with large hours, minutes and
//! a column of complication slots. The crate lays the face out from
//! precomputed text metrics, draws it onto an abstract canvas, and maps taps
//! back to fields through the tilt.

pub mod canvas;
pub mod clock;
pub mod color;
pub mod complications;
pub mod error_codes;
pub mod face;
pub mod font_assets;
pub mod geometry;
pub mod measure;
pub mod metrics;
pub mod painter;
pub mod settings;
pub mod typefaces;
pub mod variants;
pub mod veneer;
