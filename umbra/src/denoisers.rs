use fxhash::FxHashMap;

use crate::Denoiser;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DenoiserHandle(usize);

#[derive(Debug, Default)]
pub struct Denoisers {
    denoisers: FxHashMap<DenoiserHandle, Denoiser>,
    next_id: usize,
}

impl Denoisers {
    pub fn add(&mut self, denoiser: Denoiser) -> DenoiserHandle {
        let handle = DenoiserHandle(self.next_id);

        self.denoisers.insert(handle, denoiser);
        self.next_id += 1;

        handle
    }

    pub fn get(&self, handle: DenoiserHandle) -> &Denoiser {
        self.denoisers
            .get(&handle)
            .unwrap_or_else(|| panic!("Denoiser does not exist: {:?}", handle))
    }

    pub fn get_mut(&mut self, handle: DenoiserHandle) -> &mut Denoiser {
        self.denoisers
            .get_mut(&handle)
            .unwrap_or_else(|| panic!("Denoiser does not exist: {:?}", handle))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Denoiser> + '_ {
        self.denoisers.values_mut()
    }

    pub fn remove(&mut self, handle: DenoiserHandle) {
        self.denoisers.remove(&handle);
    }
}
