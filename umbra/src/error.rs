use glam::UVec2;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reason why a [`crate::DenoiserConfig`] got rejected.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("`max_tspp` must be at least 1")]
    ZeroMaxTspp,

    #[error("`{field}` must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("`{field}` must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("`{field}` must be positive, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("`{field}` must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("`{field}` must be at most {max}, got {value}")]
    TooLarge {
        field: &'static str,
        value: u32,
        max: u32,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("invalid size {0}: both dimensions must be non-zero")]
    InvalidSize(UVec2),

    #[error("{what} is {actual}, but the denoiser is {expected}")]
    SizeMismatch {
        what: &'static str,
        expected: UVec2,
        actual: UVec2,
    },

    #[error("{what} has {actual} items, but the denoiser expects {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("couldn't allocate denoiser's resources: {0}")]
    Allocation(String),

    #[error("couldn't build denoiser's pipelines: {0}")]
    Pipeline(String),

    #[error("shaders are unavailable; compile with the `shaders` feature")]
    ShadersUnavailable,

    #[error("couldn't export image: {0}")]
    Image(#[from] image::ImageError),
}

pub(crate) fn validate_size(size: UVec2) -> Result<()> {
    if size.x == 0 || size.y == 0 {
        Err(Error::InvalidSize(size))
    } else {
        Ok(())
    }
}

pub(crate) fn validate_size_of(
    what: &'static str,
    expected: UVec2,
    actual: UVec2,
) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::SizeMismatch {
            what,
            expected,
            actual,
        })
    }
}
