use std::path::Path;

use glam::{uvec2, UVec2};
use rayon::prelude::*;

use crate::{validate_size, Error, Result};

/// Row-major 2D buffer consumed and produced by [`crate::CpuDenoiser`].
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T> {
    size: UVec2,
    pixels: Vec<T>,
}

impl<T> Image<T> {
    pub fn new(size: UVec2, pixels: Vec<T>) -> Result<Self> {
        validate_size(size)?;

        let expected = (size.x * size.y) as usize;

        if pixels.len() != expected {
            return Err(Error::LengthMismatch {
                what: "image",
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self { size, pixels })
    }

    /// Builds an image by evaluating `f` for each pixel, in parallel.
    pub fn from_fn(size: UVec2, f: impl Fn(UVec2) -> T + Sync) -> Self
    where
        T: Send,
    {
        let pixels = (0..size.x * size.y)
            .into_par_iter()
            .map(|idx| f(uvec2(idx % size.x, idx / size.x)))
            .collect();

        Self { size, pixels }
    }

    pub fn filled(size: UVec2, value: T) -> Self
    where
        T: Clone,
    {
        Self {
            size,
            pixels: vec![value; (size.x * size.y) as usize],
        }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    pub fn map<U>(&self, f: impl Fn(&T) -> U + Send + Sync) -> Image<U>
    where
        T: Sync,
        U: Send,
    {
        Image {
            size: self.size,
            pixels: self.pixels.par_iter().map(f).collect(),
        }
    }
}

impl<T> Image<T>
where
    T: Copy,
{
    pub fn get(&self, pos: UVec2) -> T {
        self.pixels[(pos.y * self.size.x + pos.x) as usize]
    }
}

impl Image<f32> {
    pub fn mean(&self) -> f32 {
        self.pixels.iter().sum::<f32>() / self.pixels.len() as f32
    }

    /// Returns the population variance of all pixels.
    pub fn variance(&self) -> f32 {
        let mean = self.mean();

        self.pixels.iter().map(|p| (p - mean).powi(2)).sum::<f32>()
            / self.pixels.len() as f32
    }

    /// Saves the image as an 8-bit grayscale PNG, mapping `0.0..=1.0` to
    /// black..white.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        let img = ::image::GrayImage::from_fn(self.size.x, self.size.y, |x, y| {
            let value = self.get(uvec2(x, y)).clamp(0.0, 1.0);

            ::image::Luma([(value * 255.0).round() as u8])
        });

        img.save_with_format(path, ::image::ImageFormat::Png)?;

        Ok(())
    }
}
