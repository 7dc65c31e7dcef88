use glam::UVec2;

use crate::{Bindable, DoubleBufferedBindable, Texture};

/// Pair of resources whose roles (current / past) swap every time the cache
/// generation advances; see [`crate::CacheGeneration`].
#[derive(Debug)]
pub struct DoubleBuffered<T> {
    a: T,
    b: T,
}

impl DoubleBuffered<Texture> {
    pub fn new(device: &wgpu::Device, label: impl AsRef<str>, size: UVec2) -> Self {
        let label = label.as_ref();

        Self {
            a: Texture::new(device, format!("{label}_a"), size),
            b: Texture::new(device, format!("{label}_b"), size),
        }
    }
}

impl DoubleBuffered<&Texture> {
    pub fn bind_readable(&self) -> impl DoubleBufferedBindable + '_ {
        DoubleBufferedBinder {
            a: self.a.bind_readable(),
            b: self.b.bind_readable(),
        }
    }

    pub fn bind_writable(&self) -> impl DoubleBufferedBindable + '_ {
        DoubleBufferedBinder {
            a: self.a.bind_writable(),
            b: self.b.bind_writable(),
        }
    }
}

impl<T> DoubleBuffered<T> {
    pub fn from_fn(mut f: impl FnMut() -> T) -> Self {
        Self { a: f(), b: f() }
    }

    /// Returns the slot that's current in given generation.
    pub fn get(&self, alternate: bool) -> &T {
        if alternate {
            &self.b
        } else {
            &self.a
        }
    }

    /// Returns `(past, current)` slots of given generation.
    pub fn split_mut(&mut self, alternate: bool) -> (&T, &mut T) {
        if alternate {
            (&self.a, &mut self.b)
        } else {
            (&self.b, &mut self.a)
        }
    }

    pub fn curr(&self) -> DoubleBuffered<&T> {
        DoubleBuffered {
            a: &self.a,
            b: &self.b,
        }
    }

    pub fn past(&self) -> DoubleBuffered<&T> {
        DoubleBuffered {
            a: &self.b,
            b: &self.a,
        }
    }
}

struct DoubleBufferedBinder<T> {
    a: T,
    b: T,
}

impl<T> DoubleBufferedBindable for DoubleBufferedBinder<T>
where
    T: Bindable,
{
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, [wgpu::BindingResource; 2])> {
        let entries_a = self.a.bind(binding);
        let entries_b = self.b.bind(binding);

        assert_eq!(entries_a.len(), entries_b.len());

        entries_a
            .into_iter()
            .zip(entries_b)
            .map(|((layout_a, resource_a), (layout_b, resource_b))| {
                assert_eq!(layout_a, layout_b);

                (layout_a, [resource_a, resource_b])
            })
            .collect()
    }
}
