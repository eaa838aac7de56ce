use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input, spanned::Spanned};

use crate::utils;

pub fn derive_kv_display_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let struct_ident = input.ident.clone();

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new(input.span(), "KvDisplay can only be derived for structs")
            .to_compile_error()
            .into();
    };
    let Fields::Named(fields) = &data_struct.fields else {
        return syn::Error::new(input.span(), "KvDisplay requires named fields")
            .to_compile_error()
            .into();
    };

    let mut rows: Vec<(String, proc_macro2::TokenStream)> = Vec::new();

    for field in &fields.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let pairs = match utils::string_pairs(&field.attrs, "kv", &["name", "fmt"]) {
            Ok(pairs) => pairs,
            Err(err) => return err.to_compile_error().into(),
        };

        let mut key = field_ident.to_string();
        let mut mode = String::from("display");
        for (attr_key, value) in pairs {
            if attr_key == "name" {
                key = value;
            } else {
                mode = value;
            }
        }

        let value = match mode.as_str() {
            "skip" => continue,
            "display" => quote! { self.#field_ident.to_string() },
            "debug" => quote! { format!("{:?}", self.#field_ident) },
            "len" => quote! { self.#field_ident.len().to_string() },
            "opt" => quote! {
                self.#field_ident
                    .as_ref()
                    .map_or_else(|| String::from("-"), ToString::to_string)
            },
            "list" => quote! {
                self.#field_ident
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",")
            },
            other => {
                return syn::Error::new(field.span(), format!("unsupported kv fmt mode: {other}"))
                    .to_compile_error()
                    .into();
            }
        };
        rows.push((key, value));
    }

    let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let lines: Vec<String> = rows
        .iter()
        .map(|(key, _)| format!("\t{key:<width$} = {{}}"))
        .collect();
    let format_lit = LitStr::new(&format!("\n{}", lines.join("\n")), Span::call_site());
    let values = rows.iter().map(|(_, value)| value);

    let expanded = quote! {
        impl std::fmt::Display for #struct_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, #format_lit, #(#values),*)
            }
        }
    };

    TokenStream::from(expanded)
}
