//! Color science engine
//!
//! This module converts six-band spectral readings into CIE coordinates,
//! correlated color temperature and tint, and renders a display swatch of
//! the measured light.

pub mod cct;
pub mod conversion;
pub mod spectrum;

pub use cct::{
    calculate_cct_mccamy, calculate_chromaticity, calculate_color_temperature,
    calculate_planckian_uv, calculate_tint, calculate_uv, calculate_xyz, Chromaticity,
    ColorResult, UvCoordinates,
};
pub use conversion::ColorConverter;
pub use spectrum::SpectralChannels;
