use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input, spanned::Spanned};

use crate::utils;

pub fn derive_cli_value_inner(item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    let enum_ident = input.ident.clone();

    let Data::Enum(data_enum) = input.data else {
        return syn::Error::new(input.span(), "CliValue can only be derived for enums")
            .to_compile_error()
            .into();
    };

    let option_name = match utils::string_pairs(&input.attrs, "cli_value", &["option"]) {
        Ok(pairs) => pairs
            .into_iter()
            .map(|(_, value)| value)
            .last()
            .unwrap_or_else(|| utils::to_kebab_case(&enum_ident.to_string())),
        Err(err) => return err.to_compile_error().into(),
    };

    let mut parse_arms = Vec::new();
    let mut display_arms = Vec::new();
    let mut canonical_names = Vec::new();

    for variant in data_enum.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return syn::Error::new(variant.span(), "CliValue variants must be unit variants")
                .to_compile_error()
                .into();
        }

        let pairs = match utils::string_pairs(&variant.attrs, "cli", &["name", "alias"]) {
            Ok(pairs) => pairs,
            Err(err) => return err.to_compile_error().into(),
        };
        let variant_ident = variant.ident;
        let canonical = pairs
            .iter()
            .filter(|(key, _)| key == "name")
            .map(|(_, value)| value.clone())
            .last()
            .unwrap_or_else(|| utils::to_kebab_case(&variant_ident.to_string()));

        let accepted: Vec<LitStr> = std::iter::once(canonical.clone())
            .chain(
                pairs
                    .into_iter()
                    .filter(|(key, _)| key == "alias")
                    .map(|(_, value)| value),
            )
            .map(|value| LitStr::new(&value, Span::call_site()))
            .collect();
        let canonical_lit = LitStr::new(&canonical, Span::call_site());

        parse_arms.push(quote! { #(#accepted)|* => Ok(Self::#variant_ident), });
        display_arms.push(quote! { Self::#variant_ident => #canonical_lit, });
        canonical_names.push(canonical);
    }

    let expected_lit = LitStr::new(&canonical_names.join("|"), Span::call_site());
    let option_lit = LitStr::new(&option_name, Span::call_site());

    let expanded = quote! {
        impl #enum_ident {
            pub fn parse(raw: &str) -> crate::Result<Self> {
                match raw.trim().to_ascii_lowercase().as_str() {
                    #(#parse_arms)*
                    _ => Err(crate::Error::invalid_input(format!(
                        "Invalid value for --{}: {} (expected {})",
                        #option_lit,
                        raw,
                        #expected_lit
                    ))),
                }
            }

            pub fn as_str(&self) -> &'static str {
                match self {
                    #(#display_arms)*
                }
            }
        }

        impl std::fmt::Display for #enum_ident {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };

    TokenStream::from(expanded)
}
