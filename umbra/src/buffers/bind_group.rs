use crate::DoubleBufferedBindable;

/// Bind group created in two variants, one per cache generation.
#[derive(Debug)]
pub struct BindGroup {
    variants: [wgpu::BindGroup; 2],
    layout: wgpu::BindGroupLayout,
}

impl BindGroup {
    pub fn builder<'a>(label: impl ToString) -> BindGroupBuilder<'a> {
        BindGroupBuilder {
            label: label.to_string(),
            entries: Default::default(),
        }
    }

    pub fn get(&self, alternate: bool) -> &wgpu::BindGroup {
        &self.variants[alternate as usize]
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }
}

pub struct BindGroupBuilder<'a> {
    label: String,
    entries: Vec<(wgpu::BindGroupLayoutEntry, [wgpu::BindingResource<'a>; 2])>,
}

impl<'a> BindGroupBuilder<'a> {
    pub fn add(mut self, item: &'a dyn DoubleBufferedBindable) -> Self {
        let binding = self.entries.len() as u32;

        self.entries.extend(item.bind(binding));
        self
    }

    pub fn build(self, device: &wgpu::Device) -> BindGroup {
        let label = format!("umbra_{}", self.label);

        let (layouts, resources): (Vec<_>, Vec<_>) =
            self.entries.into_iter().unzip();

        let layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(&format!("{label}_layout")),
                entries: &layouts,
            });

        let [resources_a, resources_b] = split(resources);

        let variants = [resources_a, resources_b].map(|resources| {
            let entries: Vec<_> = resources
                .into_iter()
                .enumerate()
                .map(|(binding, resource)| wgpu::BindGroupEntry {
                    binding: binding as u32,
                    resource,
                })
                .collect();

            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(&label),
                layout: &layout,
                entries: &entries,
            })
        });

        BindGroup { variants, layout }
    }
}

fn split<T>(items: Vec<[T; 2]>) -> [Vec<T>; 2] {
    let mut a = Vec::with_capacity(items.len());
    let mut b = Vec::with_capacity(items.len());

    for [item_a, item_b] in items {
        a.push(item_a);
        b.push(item_b);
    }

    [a, b]
}
