//! Field-level `#[db(...)]` attribute parsing.

use syn::Result;

/// Parsed options of one struct field.
#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct FieldAttr {
    pub rename: Option<String>,
    pub skip: bool,
    pub omit_empty: bool,
    pub omit_update: bool,
    pub flatten: bool,
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        while !input.is_empty() {
            let ident: syn::Ident = input.parse()?;
            if ident == "rename" {
                let _: syn::Token![=] = input.parse()?;
                let value: syn::LitStr = input.parse()?;
                if value.value().is_empty() {
                    return Err(syn::Error::new_spanned(value, "rename must not be empty"));
                }
                attr.rename = Some(value.value());
            } else if ident == "skip" {
                attr.skip = true;
            } else if ident == "omit_empty" {
                attr.omit_empty = true;
            } else if ident == "omit_update" {
                attr.omit_update = true;
            } else if ident == "flatten" {
                attr.flatten = true;
            } else {
                return Err(syn::Error::new_spanned(
                    &ident,
                    format!("unknown db attribute `{ident}`"),
                ));
            }

            if input.is_empty() {
                break;
            }
            let _: syn::Token![,] = input.parse()?;
        }

        if attr.flatten && attr.rename.is_some() {
            return Err(input.error("flatten cannot be combined with rename"));
        }
        Ok(attr)
    }
}

/// Merge every `#[db(...)]` attribute on a field.
pub(crate) fn field_attr(field: &syn::Field) -> Result<FieldAttr> {
    let mut merged = FieldAttr::default();
    for attr in &field.attrs {
        if !attr.path().is_ident("db") {
            continue;
        }
        let parsed: FieldAttr = attr.parse_args()?;
        merged.rename = parsed.rename.or(merged.rename);
        merged.skip |= parsed.skip;
        merged.omit_empty |= parsed.omit_empty;
        merged.omit_update |= parsed.omit_update;
        merged.flatten |= parsed.flatten;
    }
    Ok(merged)
}
