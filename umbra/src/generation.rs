/// Selects which slot of a double-buffered resource is the current one.
///
/// The denoiser advances it twice per frame: once before reprojection writes
/// its resampled history, and once before the temporal blend writes the new
/// history; after each advance the slot written by the previous step becomes
/// the past one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheGeneration(u32);

impl CacheGeneration {
    pub fn advance(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn is_alternate(&self) -> bool {
        self.0 % 2 == 1
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}
