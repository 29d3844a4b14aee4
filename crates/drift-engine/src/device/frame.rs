/// A single acquired frame.
///
/// Short-lived: holding the surface texture blocks acquisition of the next
/// one, so submit it within the same tick.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
