mod vertex;

use vertex::{Instance, Vertex};

fn print_layout(name: &str, names: &[&str], layout: &wgpu::VertexBufferLayout) {
    println!("{name} ({:?}, stride {})", layout.step_mode, layout.array_stride);
    for (attribute_name, attribute) in names.iter().zip(layout.attributes) {
        println!(
            "  {attribute_name}: location {} {:?} at offset {}",
            attribute.shader_location, attribute.format, attribute.offset
        );
    }
}

fn main() {
    // Pass these to wgpu::VertexState::buffers when creating the render pipeline.
    // The attribute names are needed to bind locations for GLSL shaders.
    let buffers = [
        Vertex::vertex_buffer_layout(wgpu::VertexStepMode::Vertex),
        Instance::vertex_buffer_layout(wgpu::VertexStepMode::Instance),
    ];

    print_layout("Vertex", &Vertex::ATTRIBUTE_NAMES, &buffers[0]);
    print_layout("Instance", &Instance::ATTRIBUTE_NAMES, &buffers[1]);

    let vertices = [Vertex {
        position: [0.0, 0.5, 0.0],
        tex_coord: [0.5, 1.0],
        color: [1.0, 0.0, 0.0, 1.0],
    }];
    let instances = [Instance {
        offset: glam::vec2(0.25, 0.0),
        scale: 0.5,
    }];
    println!(
        "{} vertex bytes, {} instance bytes",
        bytemuck::cast_slice::<_, u8>(&vertices).len(),
        bytemuck::cast_slice::<_, u8>(&instances).len()
    );
}
