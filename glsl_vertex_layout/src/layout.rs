//! Vertex buffer layouts for matched vertex structs.
use std::collections::HashMap;

use crate::{error::CreateLayoutError, matching::CandidatePool, vertex::VertexStruct};

/// The vertex format and memory layout of a Rust field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeType {
    pub format: wgpu::VertexFormat,
    /// The number of scalar components like `3` for `[f32; 3]`.
    pub components: u32,
    /// The size of the Rust type in bytes.
    pub size: u64,
    /// The alignment of the Rust type in bytes.
    pub align: u64,
}

impl AttributeType {
    /// An attribute with the size of `format` and the given alignment.
    pub fn new(format: wgpu::VertexFormat, components: u32, align: u64) -> Self {
        Self {
            format,
            components,
            size: format.size(),
            align,
        }
    }
}

/// Supported Rust types for vertex struct fields.
///
/// Types are identified by their source text with whitespace removed,
/// so `[f32; 3]` and `[f32;3]` refer to the same type.
/// [FieldTypes::default] supports scalars, arrays, and `glam` vectors.
///
/// # Examples
/// Types that are not supported by default can be added with their layout.
/**
```rust
use glsl_vertex_layout::{AttributeType, FieldTypes};

let mut types = FieldTypes::default();
types.insert("Rgba8", AttributeType::new(wgpu_types::VertexFormat::Unorm8x4, 4, 1));
assert!(types.get("Rgba8").is_some());
```
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTypes {
    types: HashMap<String, AttributeType>,
}

impl FieldTypes {
    /// A table with no supported types.
    pub fn empty() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Add or replace the layout for the Rust type `ty`.
    pub fn insert(&mut self, ty: &str, attribute_type: AttributeType) {
        self.types.insert(normalize_type(ty), attribute_type);
    }

    pub fn get(&self, ty: &str) -> Option<AttributeType> {
        self.types.get(&normalize_type(ty)).copied()
    }
}

impl Default for FieldTypes {
    fn default() -> Self {
        use wgpu::VertexFormat as F;

        let mut types = Self::empty();

        let scalars_and_arrays = [
            ("f32", F::Float32, 1, 4),
            ("[f32;2]", F::Float32x2, 2, 4),
            ("[f32;3]", F::Float32x3, 3, 4),
            ("[f32;4]", F::Float32x4, 4, 4),
            ("f64", F::Float64, 1, 8),
            ("[f64;2]", F::Float64x2, 2, 8),
            ("[f64;3]", F::Float64x3, 3, 8),
            ("[f64;4]", F::Float64x4, 4, 8),
            ("i32", F::Sint32, 1, 4),
            ("[i32;2]", F::Sint32x2, 2, 4),
            ("[i32;3]", F::Sint32x3, 3, 4),
            ("[i32;4]", F::Sint32x4, 4, 4),
            ("u32", F::Uint32, 1, 4),
            ("[u32;2]", F::Uint32x2, 2, 4),
            ("[u32;3]", F::Uint32x3, 3, 4),
            ("[u32;4]", F::Uint32x4, 4, 4),
            ("[u8;2]", F::Uint8x2, 2, 1),
            ("[u8;4]", F::Uint8x4, 4, 1),
            ("[i8;2]", F::Sint8x2, 2, 1),
            ("[i8;4]", F::Sint8x4, 4, 1),
            ("[u16;2]", F::Uint16x2, 2, 2),
            ("[u16;4]", F::Uint16x4, 4, 2),
            ("[i16;2]", F::Sint16x2, 2, 2),
            ("[i16;4]", F::Sint16x4, 4, 2),
        ];
        for (ty, format, components, align) in scalars_and_arrays {
            types.insert(ty, AttributeType::new(format, components, align));
        }

        // glam::Vec4 is 16 byte aligned, but the other float vectors are not.
        let glam_vectors = [
            ("Vec2", F::Float32x2, 2, 4),
            ("Vec3", F::Float32x3, 3, 4),
            ("Vec4", F::Float32x4, 4, 16),
            ("DVec2", F::Float64x2, 2, 8),
            ("DVec3", F::Float64x3, 3, 8),
            ("DVec4", F::Float64x4, 4, 8),
            ("IVec2", F::Sint32x2, 2, 4),
            ("IVec3", F::Sint32x3, 3, 4),
            ("IVec4", F::Sint32x4, 4, 4),
            ("UVec2", F::Uint32x2, 2, 4),
            ("UVec3", F::Uint32x3, 3, 4),
            ("UVec4", F::Uint32x4, 4, 4),
        ];
        for (ty, format, components, align) in glam_vectors {
            let attribute_type = AttributeType::new(format, components, align);
            types.insert(ty, attribute_type);
            types.insert(&format!("glam::{ty}"), attribute_type);
        }

        types
    }
}

fn normalize_type(ty: &str) -> String {
    ty.split_whitespace().collect()
}

/// The vertex buffer layout for a single vertex struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingPlan {
    /// The name or path of the vertex struct.
    pub vertex: String,
    /// The size of the vertex struct in bytes including trailing padding.
    /// This is a multiple of the largest field alignment and [VertexStruct::align].
    pub stride: u64,
    /// The attributes in the same order as the struct fields.
    pub attributes: Vec<AttributeBinding>,
}

/// A vertex struct field and its matched shader attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBinding {
    /// The name of the Rust field.
    pub field: String,
    /// The name of the matched GLSL attribute.
    pub attribute: String,
    /// The index of the attribute's declaration in the shader.
    pub shader_location: u32,
    pub format: wgpu::VertexFormat,
    pub components: u32,
    /// The offset of the field in bytes assuming `#[repr(C)]`.
    pub offset: u64,
}

impl BindingPlan {
    /// The attributes for a [wgpu::VertexBufferLayout](https://docs.rs/wgpu/latest/wgpu/struct.VertexBufferLayout.html).
    pub fn vertex_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.attributes
            .iter()
            .map(|a| wgpu::VertexAttribute {
                format: a.format,
                offset: a.offset,
                shader_location: a.shader_location,
            })
            .collect()
    }
}

/// Match each field of `vertex` to an attribute declared in `glsl_source` and calculate its layout.
///
/// Fields are matched in declaration order using a new [CandidatePool],
/// so each attribute is used by at most one field.
/// Attributes not used by any field are ignored.
pub fn binding_plan(
    glsl_source: &str,
    vertex: &VertexStruct,
    field_types: &FieldTypes,
) -> Result<BindingPlan, CreateLayoutError> {
    let mut pool = CandidatePool::from_source(glsl_source);
    let plan = assemble_plan(vertex, &mut pool, field_types)?;

    if !pool.is_empty() {
        log::debug!(
            "Attributes not used by {}: {}",
            vertex.name,
            pool.names().join(", ")
        );
    }

    Ok(plan)
}

fn assemble_plan(
    vertex: &VertexStruct,
    pool: &mut CandidatePool,
    field_types: &FieldTypes,
) -> Result<BindingPlan, CreateLayoutError> {
    let mut attributes = Vec::with_capacity(vertex.fields.len());
    let mut offset = 0;
    let mut max_align = vertex.align.max(1);

    for field in &vertex.fields {
        let attribute_type = field_types.get(&field.ty).ok_or_else(|| {
            CreateLayoutError::UnsupportedFieldType {
                vertex: vertex.name.clone(),
                field: field.name.clone(),
                ty: field.ty.clone(),
            }
        })?;

        let candidate = pool
            .take_best(field)
            .map_err(|source| CreateLayoutError::NoMatch {
                vertex: vertex.name.clone(),
                source,
            })?;

        log::debug!(
            "Matched {}.{} to attribute {} at location {}",
            vertex.name,
            field.name,
            candidate.declaration.name,
            candidate.location
        );

        offset = align_to(offset, attribute_type.align);
        attributes.push(AttributeBinding {
            field: field.name.clone(),
            attribute: candidate.declaration.name,
            shader_location: candidate.location,
            format: attribute_type.format,
            components: attribute_type.components,
            offset,
        });
        offset += attribute_type.size;
        max_align = max_align.max(attribute_type.align);
    }

    Ok(BindingPlan {
        vertex: vertex.name.clone(),
        stride: align_to(offset, max_align),
        attributes,
    })
}

fn align_to(value: u64, align: u64) -> u64 {
    value.div_ceil(align) * align
}
