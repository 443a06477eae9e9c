use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derives the `Choice` trait for enums.
///
/// This macro implements `VARIANTS`, `from_str` and `as_str` for a unit enum,
/// using the lowercased variant names as the accepted spellings. The result can
/// be used with `ArgType::choice_of` to parse a closed set of keywords.
///
/// # Example
///
/// ```ignore
/// use mavis::Choice;
///
/// #[derive(Debug, Copy, Clone, PartialEq, Eq, Choice)]
/// pub enum Mode {
///     Add,
///     Remove,
///     List,
/// }
/// ```
///
/// This generates:
///
/// ```ignore
/// impl ::mavis::args::Choice for Mode {
///     const VARIANTS: &'static [&'static str] = &["add", "remove", "list"];
///
///     fn from_str(s: &str) -> Option<Self> {
///         match s {
///             "add" => Some(Self::Add),
///             "remove" => Some(Self::Remove),
///             "list" => Some(Self::List),
///             _ => None,
///         }
///     }
///
///     fn as_str(&self) -> &'static str {
///         match self {
///             Self::Add => "add",
///             Self::Remove => "remove",
///             Self::List => "list",
///         }
///     }
/// }
/// ```
///
/// # Requirements
///
/// - The type must be an enum with at least one variant
/// - All variants must be unit variants (no fields)
/// - Matching is case-sensitive against the lowercased variant name
#[proc_macro_derive(Choice)]
pub fn derive_choice(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(data_enum) => &data_enum.variants,
        _ => {
            return syn::Error::new_spanned(&input, "Choice can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    if variants.is_empty() {
        return syn::Error::new_spanned(&input, "Choice needs at least one variant")
            .to_compile_error()
            .into();
    }

    for variant in variants {
        if !matches!(variant.fields, Fields::Unit) {
            return syn::Error::new_spanned(
                variant,
                "Choice can only be derived for enums with unit variants (no fields)",
            )
            .to_compile_error()
            .into();
        }
    }

    let spellings: Vec<String> = variants
        .iter()
        .map(|variant| variant.ident.to_string().to_lowercase())
        .collect();

    let from_str_arms = variants.iter().zip(&spellings).map(|(variant, spelling)| {
        let variant_name = &variant.ident;
        quote! {
            #spelling => Some(Self::#variant_name)
        }
    });

    let as_str_arms = variants.iter().zip(&spellings).map(|(variant, spelling)| {
        let variant_name = &variant.ident;
        quote! {
            Self::#variant_name => #spelling
        }
    });

    let expanded = quote! {
        impl ::mavis::args::Choice for #name {
            const VARIANTS: &'static [&'static str] = &[#(#spellings),*];

            fn from_str(s: &str) -> Option<Self> {
                match s {
                    #(#from_str_arms,)*
                    _ => None,
                }
            }

            fn as_str(&self) -> &'static str {
                match self {
                    #(#as_str_arms,)*
                }
            }
        }
    };

    TokenStream::from(expanded)
}
