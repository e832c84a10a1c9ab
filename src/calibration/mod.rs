//! Illuminant tables and camera white balance
//!
//! This module holds the per-light-source characteristics shared by the
//! sensor models and the derivation of camera white balance multipliers.

pub mod white_balance;
pub mod illuminant;

pub use white_balance::{calculate_camera_settings, CameraSettings, WhiteBalanceCalculator};
pub use illuminant::{Illuminant, LightSource};
