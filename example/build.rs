use std::path::Path;

use glsl_vertex_layout::{create_vertex_layouts, FieldTypes, VertexStruct, WriteOptions};

fn main() {
    env_logger::init();

    println!("cargo:rerun-if-changed=src/shader.vert");
    println!("cargo:rerun-if-changed=src/vertex.rs");

    let glsl_source = std::fs::read_to_string("src/shader.vert").unwrap();
    let vertex_source = std::fs::read_to_string("src/vertex.rs").unwrap();

    let vertices = VertexStruct::from_rust_file(&vertex_source)
        .inspect_err(|error| error.emit_to_stderr_with_path("src/vertex.rs"))
        .unwrap();

    let text = create_vertex_layouts(
        &glsl_source,
        &vertices,
        &FieldTypes::default(),
        WriteOptions {
            rustfmt: true,
            ..Default::default()
        },
    )
    .inspect_err(|error| error.emit_to_stderr_with_path("src/shader.vert"))
    .unwrap();

    let out_dir = std::env::var("OUT_DIR").unwrap();
    std::fs::write(Path::new(&out_dir).join("vertex_layout.rs"), text.as_bytes()).unwrap();
}
