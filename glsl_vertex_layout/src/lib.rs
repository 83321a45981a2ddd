//! # glsl_vertex_layout
//! glsl_vertex_layout is a library for generating [wgpu](https://github.com/gfx-rs/wgpu) vertex buffer layouts
//! for Rust vertex structs from the `attribute` declarations of a GLSL shader.
//!
//! Field names in Rust rarely match the attribute names chosen by shader authors.
//! A field `position` should bind to `a_VertexPosition`, and `tex_coord` should bind to `a_UV`.
//! Fields are paired with attributes by comparing the words in each name after normalizing common abbreviations.
//! See [matching] for the exact rules.
//!
//! ## Getting Started
//! The [create_vertex_layout] and [create_vertex_layouts] functions are intended for use in build scripts.
//! Changing an attribute in the shader or a field in the vertex struct regenerates the layout
//! or fails the build with an error naming the field that could not be matched.
//!
//! ```rust no_run
//! // build.rs
//! use glsl_vertex_layout::{create_vertex_layout, FieldTypes, VertexStruct, WriteOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     println!("cargo:rerun-if-changed=src/shader.vert");
//!
//!     // Read the shader source file.
//!     let glsl_source = std::fs::read_to_string("src/shader.vert")?;
//!
//!     // Describe the Rust vertex struct.
//!     let vertex = VertexStruct::from_rust_struct(
//!         "#[repr(C)] pub struct Vertex { pub position: [f32; 3], pub color: [f32; 4] }",
//!     )?;
//!
//!     // Generate the layout.
//!     let text = create_vertex_layout(
//!         &glsl_source,
//!         &vertex,
//!         &FieldTypes::default(),
//!         WriteOptions::default(),
//!     )
//!     .inspect_err(|error| error.emit_to_stderr_with_path("src/shader.vert"))?;
//!     std::fs::write("src/vertex_layout.rs", text.as_bytes())?;
//!     Ok(())
//! }
//! ```
#![allow(clippy::result_large_err)]

extern crate wgpu_types as wgpu;

use std::{
    io::Write,
    process::{Command, Stdio},
};

use proc_macro2::TokenStream;

mod error;
mod generate;
pub mod glsl;
pub mod layout;
pub mod matching;
mod vertex;

pub use error::{CreateLayoutError, NoMatchError};
pub use glsl::{extract_attributes, strip_comments};
pub use layout::{binding_plan, AttributeBinding, AttributeType, BindingPlan, FieldTypes};
pub use matching::{resolve_field, CandidatePool};
pub use vertex::VertexStruct;

/// A named and typed variable.
///
/// This is either an attribute declared in GLSL like `attribute vec3 a_Position;`
/// or a field of a Rust vertex struct like `position: [f32; 3]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariableDeclaration {
    /// The variable or field name like `"a_Position"`.
    pub name: String,
    /// The declared type as written in the source like `"vec3"` or `"[f32;3]"`.
    pub ty: String,
}

impl VariableDeclaration {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
        }
    }
}

/// Options for configuring the generated code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Generate an `ATTRIBUTE_NAMES` constant with the matched GLSL attribute names
    /// in the same order as `VERTEX_ATTRIBUTES` when `true`.
    ///
    /// GLSL `attribute` variables have no location in the shader source.
    /// Use these names to bind each attribute to its `shader_location` when linking the program.
    pub attribute_names: bool,

    /// Format the generated code with the `rustfmt` formatter used for `cargo fmt`.
    /// This invokes a separate process to run the `rustfmt` executable.
    /// The output uses `prettyplease` instead if `rustfmt` is not available.
    pub rustfmt: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            attribute_names: true,
            rustfmt: false,
        }
    }
}

/// Create the Rust source for the vertex layout of a single vertex struct.
///
/// Each field of `vertex` is matched to an attribute declared in `glsl_source`
/// and its type is looked up in `field_types`.
/// See [create_vertex_layouts] for details on the generated code.
pub fn create_vertex_layout(
    glsl_source: &str,
    vertex: &VertexStruct,
    field_types: &FieldTypes,
    options: WriteOptions,
) -> Result<String, CreateLayoutError> {
    create_vertex_layouts(
        glsl_source,
        std::slice::from_ref(vertex),
        field_types,
        options,
    )
}

/// Create the Rust source for the vertex layouts of several vertex structs used with the same shader.
///
/// The generated code adds an inherent `impl` block to each vertex struct
/// and should be included in the module that defines the struct or one of its descendants.
///
/// ```rust ignore
/// impl Vertex {
///     pub const ATTRIBUTE_NAMES: [&'static str; 2] = ["a_Position", "a_Color"];
///     pub const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] = [/* ... */];
///     pub const fn vertex_buffer_layout(step_mode: wgpu::VertexStepMode) -> wgpu::VertexBufferLayout<'static> {
///         /* ... */
///     }
/// }
/// ```
///
/// Every vertex struct is matched against all of the shader's attributes.
/// Within a single struct, each attribute is used by at most one field.
pub fn create_vertex_layouts(
    glsl_source: &str,
    vertices: &[VertexStruct],
    field_types: &FieldTypes,
    options: WriteOptions,
) -> Result<String, CreateLayoutError> {
    let mut output = TokenStream::new();
    for vertex in vertices {
        let plan = binding_plan(glsl_source, vertex, field_types)?;
        output.extend(generate::vertex_struct_methods(&plan, options)?);
    }

    if options.rustfmt {
        Ok(pretty_print_rustfmt(output))
    } else {
        Ok(pretty_print(output))
    }
}

fn pretty_print(output: TokenStream) -> String {
    match syn::parse2::<syn::File>(output.clone()) {
        Ok(file) => prettyplease::unparse(&file),
        Err(e) => {
            log::warn!("Failed to parse generated code, skipping formatting: {e}");
            output.to_string()
        }
    }
}

fn pretty_print_rustfmt(tokens: TokenStream) -> String {
    match rustfmt(&tokens.to_string()) {
        // Don't modify line endings.
        Ok(text) => text.replace('\r', ""),
        Err(e) => {
            log::warn!("Failed to run rustfmt, falling back to prettyplease: {e}");
            pretty_print(tokens)
        }
    }
}

fn rustfmt(value: &str) -> std::io::Result<String> {
    let mut proc = Command::new("rustfmt")
        .arg("--emit=stdout")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = proc.stdin.take() {
        stdin.write_all(value.as_bytes())?;
    }

    let output = proc.wait_with_output()?;
    if !output.status.success() {
        return Err(std::io::Error::other(format!(
            "rustfmt exited with {}",
            output.status
        )));
    }
    String::from_utf8(output.stdout).map_err(std::io::Error::other)
}

#[cfg(test)]
mod test {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use quote::quote;

    // Tokenstreams can't be compared directly using PartialEq.
    // Use pretty_print to normalize the formatting and compare strings.
    // Use a colored diff output to make differences easier to see.
    #[cfg(test)]
    #[macro_export]
    macro_rules! assert_tokens_eq {
        ($a:expr, $b:expr) => {
            pretty_assertions::assert_eq!($crate::pretty_print($a), $crate::pretty_print($b))
        };
    }

    const SHADER: &str = indoc! {r#"
        #version 100

        attribute vec3 a_VertexPosition;
        attribute vec4 a_VertexColor;
        attribute vec2 a_InstanceOffset;

        varying mediump vec4 v_Color;

        void main(void) {
            gl_Position = vec4(a_VertexPosition.xy + a_InstanceOffset, a_VertexPosition.z, 1.0);
            v_Color = a_VertexColor;
        }
    "#};

    #[test]
    fn create_vertex_layout_single_struct() {
        let vertex = VertexStruct::new(
            "Vertex",
            vec![
                VariableDeclaration::new("position", "[f32; 3]"),
                VariableDeclaration::new("color", "[f32; 4]"),
            ],
        );

        let actual = create_vertex_layout(
            SHADER,
            &vertex,
            &FieldTypes::default(),
            WriteOptions::default(),
        )
        .unwrap();

        let expected = pretty_print(quote! {
            impl Vertex {
                pub const ATTRIBUTE_NAMES: [&'static str; 2] = ["a_VertexPosition", "a_VertexColor"];
                pub const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] = [
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x3,
                        offset: std::mem::offset_of!(Vertex, position) as u64,
                        shader_location: 0,
                    },
                    wgpu::VertexAttribute {
                        format: wgpu::VertexFormat::Float32x4,
                        offset: std::mem::offset_of!(Vertex, color) as u64,
                        shader_location: 1,
                    }
                ];
                pub const fn vertex_buffer_layout(
                    step_mode: wgpu::VertexStepMode,
                ) -> wgpu::VertexBufferLayout<'static> {
                    wgpu::VertexBufferLayout {
                        array_stride: std::mem::size_of::<Vertex>() as u64,
                        step_mode,
                        attributes: &Self::VERTEX_ATTRIBUTES,
                    }
                }
            }
        });
        assert_eq!(expected, actual);
    }

    #[test]
    fn create_vertex_layouts_fresh_attributes_per_struct() {
        // Both structs use the color attribute.
        let vertex = VertexStruct::new(
            "Vertex",
            vec![
                VariableDeclaration::new("position", "[f32; 3]"),
                VariableDeclaration::new("color", "[f32; 4]"),
            ],
        );
        let instance = VertexStruct::new(
            "Instance",
            vec![
                VariableDeclaration::new("offset", "[f32; 2]"),
                VariableDeclaration::new("color", "[f32; 4]"),
            ],
        );

        let actual = create_vertex_layouts(
            SHADER,
            &[vertex, instance],
            &FieldTypes::default(),
            WriteOptions::default(),
        )
        .unwrap();

        let instance_start = actual.find("impl Instance").unwrap();
        assert!(actual[..instance_start].contains("impl Vertex"));
        assert!(actual[instance_start..].contains("\"a_InstanceOffset\""));
        assert!(actual[instance_start..].contains("\"a_VertexColor\""));
    }

    #[test]
    fn create_vertex_layouts_empty() {
        let actual = create_vertex_layouts(
            SHADER,
            &[],
            &FieldTypes::default(),
            WriteOptions::default(),
        )
        .unwrap();
        assert_eq!("", actual);
    }

    #[test]
    fn create_vertex_layout_no_attribute_names() {
        let vertex = VertexStruct::new("Vertex", vec![VariableDeclaration::new("pos", "f32")]);

        let actual = create_vertex_layout(
            "attribute float a_Position;",
            &vertex,
            &FieldTypes::default(),
            WriteOptions {
                attribute_names: false,
                ..Default::default()
            },
        )
        .unwrap();

        assert!(!actual.contains("ATTRIBUTE_NAMES"));
        assert!(actual.contains("wgpu::VertexFormat::Float32"));
        assert!(!actual.contains("Float32x"));
    }

    #[test]
    fn create_vertex_layout_unmatched_field() {
        let vertex = VertexStruct::new(
            "Vertex",
            vec![
                VariableDeclaration::new("position", "[f32; 3]"),
                VariableDeclaration::new("tangent", "[f32; 4]"),
            ],
        );

        let result = create_vertex_layout(
            SHADER,
            &vertex,
            &FieldTypes::default(),
            WriteOptions::default(),
        );

        assert!(matches!(
            result,
            Err(CreateLayoutError::NoMatch { ref vertex, ref source })
                if vertex == "Vertex" && source.field == "tangent"
        ));
    }

    #[test]
    fn create_vertex_layout_no_attributes() {
        let vertex = VertexStruct::new("Vertex", vec![VariableDeclaration::new("position", "f32")]);

        let result = create_vertex_layout(
            indoc! {r#"
                // attribute vec3 a_Position;
                void main(void) {}
            "#},
            &vertex,
            &FieldTypes::default(),
            WriteOptions::default(),
        );

        assert!(matches!(
            result,
            Err(CreateLayoutError::NoMatch { ref source, .. }) if source.candidates.is_empty()
        ));
    }

    #[test]
    fn create_vertex_layout_rustfmt() {
        let vertex = VertexStruct::new("Vertex", vec![VariableDeclaration::new("uv", "[f32; 2]")]);

        // The output is formatted by prettyplease if rustfmt is not installed.
        let actual = create_vertex_layout(
            "attribute vec2 a_TexCoord;",
            &vertex,
            &FieldTypes::default(),
            WriteOptions {
                rustfmt: true,
                ..Default::default()
            },
        )
        .unwrap();

        assert!(actual.contains("offset_of!(Vertex, uv)"));
        assert!(actual.contains("\"a_TexCoord\""));
    }

    #[test]
    fn pretty_print_invalid_tokens() {
        // Tokens that don't form a file are returned unformatted.
        assert_eq!("impl Vertex", pretty_print(quote!(impl Vertex)));
    }

    #[test]
    fn public_types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VariableDeclaration>();
        assert_send_sync::<CandidatePool>();
        assert_send_sync::<BindingPlan>();
        assert_send_sync::<FieldTypes>();
        assert_send_sync::<CreateLayoutError>();
    }
}
