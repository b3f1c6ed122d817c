//! Errors for the fallible edges of the game
//!
//! The simulation itself never fails; these cover settings storage and the
//! render surface.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("settings are not valid JSON: {0}")]
    SettingsParse(#[from] serde_json::Error),

    #[error("settings storage unavailable: {0}")]
    SettingsStorage(String),

    #[error("render surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),
}

pub type Result<T> = std::result::Result<T, Error>;
