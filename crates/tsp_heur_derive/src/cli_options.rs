use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, Path, parse_macro_input, spanned::Spanned};

use crate::utils;

/// Generates `split_arg` and `apply_cli_option` for structs whose fields carry
/// `#[cli(long = "...")]`. `bool` fields become flags with a `--no-<long>`
/// negation, `Option<T>` fields parse `T` and store `Some`.
pub fn derive_cli_options_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let struct_ident = input.ident.clone();

    let Data::Struct(data_struct) = &input.data else {
        return syn::Error::new(input.span(), "CliOptions can only be derived for structs")
            .to_compile_error()
            .into();
    };
    let Fields::Named(fields) = &data_struct.fields else {
        return syn::Error::new(input.span(), "CliOptions requires named fields")
            .to_compile_error()
            .into();
    };

    let mut arms = Vec::new();

    for field in &fields.named {
        let Some(field_ident) = &field.ident else {
            continue;
        };
        let pairs = match utils::string_pairs(&field.attrs, "cli", &["long", "parse_with"]) {
            Ok(pairs) => pairs,
            Err(err) => return err.to_compile_error().into(),
        };

        let mut long_name = None;
        let mut parse_with: Option<Path> = None;
        for (key, value) in pairs {
            match key.as_str() {
                "long" => long_name = Some(value),
                _ => match syn::parse_str(&value) {
                    Ok(path) => parse_with = Some(path),
                    Err(err) => return err.to_compile_error().into(),
                },
            }
        }
        let Some(long_name) = long_name else {
            continue;
        };
        let long_lit = LitStr::new(&long_name, Span::call_site());

        if utils::is_bool(&field.ty) {
            let negated_lit = LitStr::new(&format!("no-{long_name}"), Span::call_site());
            arms.push(quote! {
                #long_lit => {
                    self.#field_ident = match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
                        None | Some("1" | "true" | "yes" | "on") => true,
                        Some("0" | "false" | "no" | "off") => false,
                        Some(other) => {
                            return Err(crate::Error::invalid_input(format!(
                                "Invalid boolean for --{name}: {other} (expected true/false)"
                            )));
                        }
                    };
                    Ok(true)
                }
            });
            arms.push(quote! {
                #negated_lit => {
                    if value.is_some() {
                        return Err(crate::Error::invalid_input(format!(
                            "Flag --{name} does not take a value"
                        )));
                    }
                    self.#field_ident = false;
                    Ok(true)
                }
            });
            continue;
        }

        let (parse_ty, wrap_some) = match utils::inner_of_option(&field.ty) {
            Some(inner) => (inner, true),
            None => (&field.ty, false),
        };
        let parse_expr = utils::build_cli_parse_expr(parse_ty, parse_with.as_ref());
        let assign = if wrap_some {
            quote! { self.#field_ident = Some(#parse_expr); }
        } else {
            quote! { self.#field_ident = #parse_expr; }
        };

        arms.push(quote! {
            #long_lit => {
                let raw = value.ok_or_else(|| {
                    crate::Error::invalid_input(format!("Missing value for --{name}"))
                })?;
                #assign
                Ok(true)
            }
        });
    }

    let expanded = quote! {
        impl #struct_ident {
            fn split_arg(
                raw_name: &str,
                args: &mut std::iter::Peekable<impl Iterator<Item = String>>,
            ) -> (String, Option<String>) {
                if let Some((key, value)) = raw_name.split_once('=') {
                    return (key.to_string(), Some(value.to_string()));
                }
                let value = args.next_if(|next| !next.starts_with("--"));
                (raw_name.to_string(), value)
            }

            fn apply_cli_option(
                &mut self,
                name: &str,
                value: Option<String>,
            ) -> crate::Result<bool> {
                match name {
                    #(#arms,)*
                    _ => Ok(false),
                }
            }
        }
    };

    TokenStream::from(expanded)
}
