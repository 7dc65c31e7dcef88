mod denoiser;
mod image;

pub use self::denoiser::*;
pub use self::image::*;
