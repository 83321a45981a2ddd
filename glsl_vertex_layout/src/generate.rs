use proc_macro2::{Literal, Span, TokenStream};
use quote::quote;
use syn::Ident;

use crate::{error::CreateLayoutError, layout::BindingPlan, WriteOptions};

pub fn vertex_struct_methods(
    plan: &BindingPlan,
    options: WriteOptions,
) -> Result<TokenStream, CreateLayoutError> {
    let name: syn::Path =
        syn::parse_str(&plan.vertex).map_err(|_| CreateLayoutError::InvalidIdentifier {
            name: plan.vertex.clone(),
        })?;

    let count = Literal::usize_unsuffixed(plan.attributes.len());
    let attributes = plan
        .attributes
        .iter()
        .map(|attribute| {
            let field_name = field_ident(&attribute.field)?;
            let location = Literal::u32_unsuffixed(attribute.shader_location);
            // Variant names match the Debug output.
            let format = Ident::new(&format!("{:?}", attribute.format), Span::call_site());

            Ok(quote! {
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::#format,
                    offset: std::mem::offset_of!(#name, #field_name) as u64,
                    shader_location: #location,
                }
            })
        })
        .collect::<Result<Vec<_>, CreateLayoutError>>()?;

    let attribute_names = options.attribute_names.then(|| {
        let names = plan.attributes.iter().map(|a| a.attribute.as_str());
        quote! {
            pub const ATTRIBUTE_NAMES: [&'static str; #count] = [#(#names),*];
        }
    });

    // Offsets and the stride are calculated by the compiler to account for the actual Rust layout.
    // The attributes are always used from slices, so the stride is the size of the struct.
    Ok(quote! {
        impl #name {
            #attribute_names

            pub const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; #count] = [#(#attributes),*];

            pub const fn vertex_buffer_layout(step_mode: wgpu::VertexStepMode) -> wgpu::VertexBufferLayout<'static> {
                wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<#name>() as u64,
                    step_mode,
                    attributes: &Self::VERTEX_ATTRIBUTES,
                }
            }
        }
    })
}

fn field_ident(name: &str) -> Result<Ident, CreateLayoutError> {
    // Keywords like type need to be raw identifiers.
    syn::parse_str(name)
        .or_else(|_| syn::parse_str(&format!("r#{name}")))
        .map_err(|_| CreateLayoutError::InvalidIdentifier {
            name: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_tokens_eq, layout::AttributeBinding};

    fn binding(
        field: &str,
        attribute: &str,
        shader_location: u32,
        format: wgpu::VertexFormat,
        offset: u64,
    ) -> AttributeBinding {
        AttributeBinding {
            field: field.to_string(),
            attribute: attribute.to_string(),
            shader_location,
            format,
            components: 0,
            offset,
        }
    }

    #[test]
    fn write_vertex_methods_float32() {
        let plan = BindingPlan {
            vertex: "VertexInput0".to_string(),
            stride: 40,
            attributes: vec![
                binding("a", "a_A", 0, wgpu::VertexFormat::Float32, 0),
                binding("b", "a_B", 1, wgpu::VertexFormat::Float32x2, 4),
                binding("c", "a_C", 2, wgpu::VertexFormat::Float32x3, 12),
                binding("d", "a_D", 3, wgpu::VertexFormat::Float32x4, 24),
            ],
        };

        let actual = vertex_struct_methods(&plan, WriteOptions::default()).unwrap();

        assert_tokens_eq!(
            quote! {
                impl VertexInput0 {
                    pub const ATTRIBUTE_NAMES: [&'static str; 4] = ["a_A", "a_B", "a_C", "a_D"];

                    pub const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 4] = [
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32,
                            offset: std::mem::offset_of!(VertexInput0, a) as u64,
                            shader_location: 0,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x2,
                            offset: std::mem::offset_of!(VertexInput0, b) as u64,
                            shader_location: 1,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x3,
                            offset: std::mem::offset_of!(VertexInput0, c) as u64,
                            shader_location: 2,
                        },
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Float32x4,
                            offset: std::mem::offset_of!(VertexInput0, d) as u64,
                            shader_location: 3,
                        }
                    ];

                    pub const fn vertex_buffer_layout(step_mode: wgpu::VertexStepMode) -> wgpu::VertexBufferLayout<'static> {
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<VertexInput0>() as u64,
                            step_mode,
                            attributes: &Self::VERTEX_ATTRIBUTES,
                        }
                    }
                }
            },
            actual
        );
    }

    #[test]
    fn write_vertex_methods_path_and_raw_field() {
        let plan = BindingPlan {
            vertex: "crate::mesh::Vertex".to_string(),
            stride: 4,
            attributes: vec![binding("type", "a_Type", 5, wgpu::VertexFormat::Uint32, 0)],
        };

        let actual = vertex_struct_methods(
            &plan,
            WriteOptions {
                attribute_names: false,
                ..Default::default()
            },
        )
        .unwrap();

        assert_tokens_eq!(
            quote! {
                impl crate::mesh::Vertex {
                    pub const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 1] = [
                        wgpu::VertexAttribute {
                            format: wgpu::VertexFormat::Uint32,
                            offset: std::mem::offset_of!(crate::mesh::Vertex, r#type) as u64,
                            shader_location: 5,
                        }
                    ];

                    pub const fn vertex_buffer_layout(step_mode: wgpu::VertexStepMode) -> wgpu::VertexBufferLayout<'static> {
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<crate::mesh::Vertex>() as u64,
                            step_mode,
                            attributes: &Self::VERTEX_ATTRIBUTES,
                        }
                    }
                }
            },
            actual
        );
    }

    #[test]
    fn write_vertex_methods_empty() {
        let plan = BindingPlan {
            vertex: "Empty".to_string(),
            stride: 0,
            attributes: Vec::new(),
        };

        let actual = vertex_struct_methods(&plan, WriteOptions::default()).unwrap();

        assert_tokens_eq!(
            quote! {
                impl Empty {
                    pub const ATTRIBUTE_NAMES: [&'static str; 0] = [];

                    pub const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 0] = [];

                    pub const fn vertex_buffer_layout(step_mode: wgpu::VertexStepMode) -> wgpu::VertexBufferLayout<'static> {
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<Empty>() as u64,
                            step_mode,
                            attributes: &Self::VERTEX_ATTRIBUTES,
                        }
                    }
                }
            },
            actual
        );
    }

    #[test]
    fn write_vertex_methods_invalid_struct_name() {
        let plan = BindingPlan {
            vertex: "not a path".to_string(),
            stride: 0,
            attributes: Vec::new(),
        };

        let result = vertex_struct_methods(&plan, WriteOptions::default());

        assert!(matches!(
            result,
            Err(CreateLayoutError::InvalidIdentifier { ref name }) if name == "not a path"
        ));
    }

    #[test]
    fn write_vertex_methods_invalid_field_name() {
        let plan = BindingPlan {
            vertex: "Vertex".to_string(),
            stride: 4,
            attributes: vec![binding("self", "a_Self", 0, wgpu::VertexFormat::Float32, 0)],
        };

        let result = vertex_struct_methods(&plan, WriteOptions::default());

        assert!(matches!(
            result,
            Err(CreateLayoutError::InvalidIdentifier { ref name }) if name == "self"
        ));
    }
}
