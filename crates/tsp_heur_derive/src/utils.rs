use quote::quote;
use syn::{
    AngleBracketedGenericArguments, Attribute, GenericArgument, LitStr, Path, PathArguments, Type,
    TypePath,
};

/// Returns `T` for `Option<T>`, `std::option::Option<T>` and `core::option::Option<T>`.
pub fn inner_of_option(ty: &Type) -> Option<&Type> {
    let Type::Path(TypePath { path, qself: None }) = ty else {
        return None;
    };
    let idents: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    let is_option = match idents.as_slice() {
        [only] => only == "Option",
        [root, module, name] => {
            (root == "std" || root == "core") && module == "option" && name == "Option"
        }
        _ => false,
    };
    if !is_option {
        return None;
    }

    let seg = path.segments.last()?;
    let PathArguments::AngleBracketed(AngleBracketedGenericArguments { args, .. }) =
        &seg.arguments
    else {
        return None;
    };
    match args.first() {
        Some(GenericArgument::Type(inner)) => Some(inner),
        _ => None,
    }
}

pub fn is_bool(ty: &Type) -> bool {
    matches!(ty, Type::Path(TypePath { path, qself: None }) if path.is_ident("bool"))
}

/// `TwoOpt` -> `two-opt`
pub fn to_kebab_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 4);
    for (idx, ch) in s.chars().enumerate() {
        if ch == '_' {
            out.push('-');
        } else if ch.is_ascii_uppercase() {
            if idx != 0 && !out.ends_with('-') {
                out.push('-');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Reads every `key = "value"` pair of `#[<attr_name>(...)]` attributes.
pub fn string_pairs(attrs: &[Attribute], attr_name: &str, allowed: &[&str]) -> syn::Result<Vec<(String, String)>> {
    let mut pairs = Vec::new();
    for attr in attrs.iter().filter(|a| a.path().is_ident(attr_name)) {
        attr.parse_nested_meta(|meta| {
            let Some(key) = allowed.iter().find(|k| meta.path.is_ident(k)) else {
                return Err(meta.error(format!(
                    "unsupported {attr_name} attribute; expected one of {}",
                    allowed.join("/")
                )));
            };
            let lit: LitStr = meta.value()?.parse()?;
            pairs.push(((*key).to_string(), lit.value()));
            Ok(())
        })?;
    }
    Ok(pairs)
}

pub fn build_cli_parse_expr(ty: &Type, parse_with: Option<&Path>) -> proc_macro2::TokenStream {
    if let Some(parse_with) = parse_with {
        return quote! { #parse_with(&raw)? };
    }
    quote! {
        raw.parse::<#ty>().map_err(|e| {
            crate::Error::invalid_input(format!("Invalid value for --{name}: {raw} ({e})"))
        })?
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::{inner_of_option, is_bool, to_kebab_case};

    #[test]
    fn inner_of_option_handles_qualified_paths() {
        let short_ty: syn::Type = parse_quote!(Option<u64>);
        let std_ty: syn::Type = parse_quote!(std::option::Option<usize>);
        let vec_ty: syn::Type = parse_quote!(Vec<u64>);

        let short_inner = inner_of_option(&short_ty).expect("Option<u64> has an inner type");
        let std_inner = inner_of_option(&std_ty).expect("std Option has an inner type");

        assert_eq!(quote::quote!(#short_inner).to_string(), "u64");
        assert_eq!(quote::quote!(#std_inner).to_string(), "usize");
        assert!(inner_of_option(&vec_ty).is_none());
    }

    #[test]
    fn is_bool_only_matches_plain_bool() {
        let plain: syn::Type = parse_quote!(bool);
        let wrapped: syn::Type = parse_quote!(Option<bool>);
        assert!(is_bool(&plain));
        assert!(!is_bool(&wrapped));
    }

    #[test]
    fn to_kebab_case_handles_pascal_and_snake() {
        assert_eq!(to_kebab_case("NearestNeighbor"), "nearest-neighbor");
        assert_eq!(to_kebab_case("two_opt"), "two-opt");
        assert_eq!(to_kebab_case("Ga"), "ga");
    }
}
