use quote::ToTokens;
use syn::ext::IdentExt;

use crate::{error::CreateLayoutError, VariableDeclaration};

/// A Rust vertex struct with named fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexStruct {
    /// The name or path of the struct used in generated code like `"Vertex"` or `"crate::mesh::Vertex"`.
    pub name: String,
    /// The field names and Rust types.
    pub fields: Vec<VariableDeclaration>,
    /// The minimum alignment from `#[repr(align(N))]` or 1 if not specified.
    pub align: u64,
}

impl VertexStruct {
    pub fn new(name: impl Into<String>, fields: Vec<VariableDeclaration>) -> Self {
        Self {
            name: name.into(),
            fields,
            align: 1,
        }
    }

    /// Set the minimum alignment of the struct like `#[repr(C, align(16))]`.
    pub fn with_align(self, align: u64) -> Self {
        Self { align, ..self }
    }

    /// Describe the struct defined in `source`.
    ///
    /// The source should contain a single struct definition like `struct Vertex { position: [f32; 3] }`.
    /// Attributes, visibility, and doc comments are allowed.
    pub fn from_rust_struct(source: &str) -> Result<Self, CreateLayoutError> {
        let item: syn::ItemStruct =
            syn::parse_str(source).map_err(|e| CreateLayoutError::InvalidVertexStruct {
                reason: e.to_string(),
            })?;
        Self::from_item(&item)
    }

    /// Describe all the structs defined in the Rust file `source`.
    ///
    /// Structs nested in modules or functions are ignored.
    pub fn from_rust_file(source: &str) -> Result<Vec<Self>, CreateLayoutError> {
        let file = syn::parse_file(source).map_err(|e| CreateLayoutError::InvalidVertexStruct {
            reason: e.to_string(),
        })?;

        file.items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Struct(item) => Some(Self::from_item(item)),
                _ => None,
            })
            .collect()
    }

    fn from_item(item: &syn::ItemStruct) -> Result<Self, CreateLayoutError> {
        let name = item.ident.to_string();

        let repr = Repr::from_attrs(&item.attrs);
        if repr.packed {
            return Err(CreateLayoutError::InvalidVertexStruct {
                reason: format!("packed struct `{name}` has unaligned fields"),
            });
        }
        if !repr.c {
            // Generated code uses the actual offsets, but the computed plan assumes repr(C).
            log::warn!("Vertex struct {name} is not #[repr(C)]");
        }

        let fields = match &item.fields {
            syn::Fields::Named(fields) => fields
                .named
                .iter()
                .filter_map(|field| {
                    let name = field.ident.as_ref()?.unraw().to_string();
                    let ty = field.ty.to_token_stream().to_string();
                    Some(VariableDeclaration::new(name, ty))
                })
                .collect(),
            syn::Fields::Unnamed(_) => {
                return Err(CreateLayoutError::InvalidVertexStruct {
                    reason: format!("tuple struct `{name}` has no field names to match"),
                })
            }
            syn::Fields::Unit => {
                return Err(CreateLayoutError::InvalidVertexStruct {
                    reason: format!("unit struct `{name}` has no fields"),
                })
            }
        };

        Ok(Self::new(name, fields).with_align(repr.align.unwrap_or(1)))
    }
}

/// The layout options from `#[repr(...)]` attributes.
#[derive(Debug, Default, PartialEq, Eq)]
struct Repr {
    c: bool,
    packed: bool,
    align: Option<u64>,
}

impl Repr {
    fn from_attrs(attrs: &[syn::Attribute]) -> Self {
        let mut repr = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("repr")) {
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("C") {
                    repr.c = true;
                } else if meta.path.is_ident("packed") {
                    repr.packed = true;
                } else if meta.path.is_ident("align") {
                    let content;
                    syn::parenthesized!(content in meta.input);
                    let align: syn::LitInt = content.parse()?;
                    repr.align = Some(align.base10_parse()?);
                    return Ok(());
                }

                // Skip arguments like packed(2).
                if meta.input.peek(syn::token::Paren) {
                    let _content;
                    syn::parenthesized!(_content in meta.input);
                }
                Ok(())
            });

            if let Err(e) = result {
                log::debug!("Failed to parse repr attribute: {e}");
            }
        }
        repr
    }
}
