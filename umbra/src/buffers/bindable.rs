/// Resource that can be attached to a pipeline, e.g. a uniform buffer or a
/// texture.
pub trait Bindable {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, wgpu::BindingResource)>;
}

/// Resource that can be attached to a pipeline and exists in two versions,
/// one per cache generation; see [`crate::DoubleBuffered`].
pub trait DoubleBufferedBindable {
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, [wgpu::BindingResource; 2])>;
}

/// Single-buffered resources look the same in both generations.
impl<T> DoubleBufferedBindable for T
where
    T: Bindable,
{
    fn bind(
        &self,
        binding: u32,
    ) -> Vec<(wgpu::BindGroupLayoutEntry, [wgpu::BindingResource; 2])> {
        Bindable::bind(self, binding)
            .into_iter()
            .map(|(layout, resource)| (layout, [resource.clone(), resource]))
            .collect()
    }
}
