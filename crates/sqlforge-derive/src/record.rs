//! Record derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

use crate::attrs::field_attr;

/// One field of the record after attribute resolution.
enum Slot<'a> {
    Column {
        ident: &'a syn::Ident,
        ty: &'a syn::Type,
        column: String,
        omit_empty: bool,
        omit_update: bool,
    },
    Flatten {
        ident: &'a syn::Ident,
        ty: &'a syn::Type,
    },
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Record cannot be derived for generic structs",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut slots = Vec::new();
    for field in fields {
        let attr = field_attr(field)?;
        if attr.skip {
            continue;
        }
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        slots.push(if attr.flatten {
            Slot::Flatten { ident, ty: &field.ty }
        } else {
            Slot::Column {
                ident,
                ty: &field.ty,
                column: attr.rename.unwrap_or_else(|| ident.to_string()),
                omit_empty: attr.omit_empty,
                omit_update: attr.omit_update,
            }
        });
    }

    let descriptors = slots.iter().map(|slot| match slot {
        Slot::Column {
            ident,
            column,
            omit_empty,
            omit_update,
            ..
        } => {
            let path = ident.to_string();
            let omit_empty = omit_empty.then(|| quote!(.omit_empty()));
            let omit_update = omit_update.then(|| quote!(.omit_update()));
            quote! {
                fields.push(::sqlforge::Field::new(#column, #path) #omit_empty #omit_update);
            }
        }
        Slot::Flatten { ident, ty } => {
            let path = ident.to_string();
            quote! {
                fields.extend(
                    <#ty as ::sqlforge::Record>::fields()
                        .iter()
                        .map(|field| field.nested(#path)),
                );
            }
        }
    });

    let getters = slots.iter().map(|slot| match slot {
        Slot::Column { ident, .. } => quote! {
            if index == offset {
                return ::sqlforge::Value::from(::std::clone::Clone::clone(&self.#ident));
            }
            offset += 1;
        },
        Slot::Flatten { ident, ty } => quote! {
            let width = <#ty as ::sqlforge::Record>::fields().len();
            if index < offset + width {
                return ::sqlforge::Record::get(&self.#ident, index - offset);
            }
            offset += width;
        },
    });

    let setters = slots.iter().map(|slot| match slot {
        Slot::Column { ident, ty, .. } => quote! {
            if index == offset {
                self.#ident = <#ty as ::sqlforge::FromValue>::from_value(value)?;
                return ::std::result::Result::Ok(());
            }
            offset += 1;
        },
        Slot::Flatten { ident, ty } => quote! {
            let width = <#ty as ::sqlforge::Record>::fields().len();
            if index < offset + width {
                return ::sqlforge::Record::set(&mut self.#ident, index - offset, value);
            }
            offset += width;
        },
    });

    Ok(quote! {
        impl ::sqlforge::Record for #name {
            fn fields() -> &'static [::sqlforge::Field] {
                static FIELDS: ::std::sync::OnceLock<::std::vec::Vec<::sqlforge::Field>> =
                    ::std::sync::OnceLock::new();
                FIELDS.get_or_init(|| {
                    let mut fields = ::std::vec::Vec::new();
                    #(#descriptors)*
                    fields
                })
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn get(&self, index: usize) -> ::sqlforge::Value {
                let mut offset = 0_usize;
                #(#getters)*
                ::sqlforge::Value::Null
            }

            #[allow(unused_assignments, unused_mut, unused_variables)]
            fn set(
                &mut self,
                index: usize,
                value: ::sqlforge::Value,
            ) -> ::std::result::Result<(), ::sqlforge::ConversionError> {
                let mut offset = 0_usize;
                #(#setters)*
                ::std::result::Result::Ok(())
            }
        }

        impl ::sqlforge::Destination for #name {
            fn shape() -> ::sqlforge::Shape {
                ::sqlforge::Shape::Record(<Self as ::sqlforge::Record>::fields())
            }

            fn fill(
                &mut self,
                plan: &::sqlforge::Plan,
                row: ::std::vec::Vec<::sqlforge::Value>,
            ) -> ::sqlforge::Result<()> {
                plan.fill_record(self, row)
            }
        }
    })
}
