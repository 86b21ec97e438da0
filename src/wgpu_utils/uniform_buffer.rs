// src/wgpu_utils/uniform_buffer.rs
use std::marker::PhantomData;

fn short_type_name<T>() -> &'static str {
    let type_name = std::any::type_name::<T>();
    let pos = type_name.rfind(':').unwrap_or(0);
    if pos > 0 {
        &type_name[(pos + 1)..]
    } else {
        type_name
    }
}

/// Typed uniform buffer that skips writes when the content is unchanged
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    content_type: PhantomData<Content>,
    previous_content: Vec<u8>,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    /// Create a new uniform buffer
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", short_type_name::<Content>())),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        UniformBuffer {
            buffer,
            content_type: PhantomData,
            previous_content: Vec::new(),
        }
    }

    /// Create buffer with initial data
    pub fn new_with_data(device: &wgpu::Device, initial_content: &Content) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", short_type_name::<Content>())),
            size: std::mem::size_of::<Content>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: true,
        });

        let mapped_memory = buffer.slice(..);
        mapped_memory
            .get_mapped_range_mut()
            .clone_from_slice(bytemuck::bytes_of(initial_content));
        buffer.unmap();

        UniformBuffer {
            buffer,
            content_type: PhantomData,
            previous_content: bytemuck::bytes_of(initial_content).to_vec(),
        }
    }

    /// Update buffer content (skips the write when nothing changed)
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: Content) {
        let new_content = bytemuck::bytes_of(&content);
        if self.previous_content == new_content {
            return;
        }
        queue.write_buffer(&self.buffer, 0, new_content);
        self.previous_content = new_content.to_vec();
    }

    /// Get binding resource
    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}

/// Growable GPU array of `Content`, used for vertex and instance data
pub struct ArrayBuffer<Content> {
    buffer: wgpu::Buffer,
    usage: wgpu::BufferUsages,
    content_type: PhantomData<Content>,
    capacity: usize,
    current_size: usize,
}

impl<Content: bytemuck::Pod> ArrayBuffer<Content> {
    fn allocate(device: &wgpu::Device, usage: wgpu::BufferUsages, capacity: usize) -> wgpu::Buffer {
        // Zero-sized buffers cannot be bound as vertex input
        let size = (capacity.max(1) * std::mem::size_of::<Content>()) as u64;
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("ArrayBuffer<{}>", short_type_name::<Content>())),
            size,
            usage: usage | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Create an instance/vertex buffer filled with `data`
    pub fn new_vertex(device: &wgpu::Device, queue: &wgpu::Queue, data: &[Content]) -> Self {
        let usage = wgpu::BufferUsages::VERTEX;
        let buffer = Self::allocate(device, usage, data.len());
        if !data.is_empty() {
            queue.write_buffer(&buffer, 0, bytemuck::cast_slice(data));
        }

        ArrayBuffer {
            buffer,
            usage,
            content_type: PhantomData,
            capacity: data.len().max(1),
            current_size: data.len(),
        }
    }

    /// Replace the array contents, reallocating when `data` outgrows the buffer
    pub fn update_data(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, data: &[Content]) {
        if data.len() > self.capacity {
            let capacity = data.len().next_power_of_two();
            self.buffer = Self::allocate(device, self.usage, capacity);
            self.capacity = capacity;
        }
        if !data.is_empty() {
            queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(data));
        }
        self.current_size = data.len();
    }

    /// Slice covering the live elements only
    pub fn slice(&self) -> wgpu::BufferSlice<'_> {
        let bytes = (self.current_size.max(1) * std::mem::size_of::<Content>()) as u64;
        self.buffer.slice(..bytes)
    }

    /// Get current number of elements
    pub fn len(&self) -> usize {
        self.current_size
    }

    pub fn is_empty(&self) -> bool {
        self.current_size == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[repr(C)]
    #[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
    struct Probe {
        value: [f32; 4],
    }

    #[test]
    fn test_short_type_name_strips_path() {
        assert_eq!(short_type_name::<Probe>(), "Probe");
        assert_eq!(short_type_name::<f32>(), "f32");
    }
}
