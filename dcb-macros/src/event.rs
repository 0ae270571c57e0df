use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DataEnum, DeriveInput, Error, Fields, Result};

const TAG_ATTR: &str = "tag";

pub fn event_inner(ast: &DeriveInput) -> Result<TokenStream> {
    match ast.data {
        Data::Enum(ref data) => impl_enum(ast, data),
        _ => Err(Error::new_spanned(
            ast,
            "Event can only be derived for enums",
        )),
    }
}

fn impl_enum(ast: &DeriveInput, data: &DataEnum) -> Result<TokenStream> {
    let name = &ast.ident;

    let event_type_arms = data.variants.iter().map(|variant| {
        let variant_ident = &variant.ident;
        let event_type = variant_ident.to_string();
        let pattern = match &variant.fields {
            Fields::Unit => quote! { #name::#variant_ident },
            Fields::Named(_) => quote! { #name::#variant_ident { .. } },
            Fields::Unnamed(_) => quote! { #name::#variant_ident( .. ) },
        };
        quote! {
            #pattern => #event_type,
        }
    });

    let tags_arms = data
        .variants
        .iter()
        .map(|variant| {
            let variant_ident = &variant.ident;
            match &variant.fields {
                Fields::Named(fields) => {
                    let tag_fields: Vec<_> = fields
                        .named
                        .iter()
                        .filter(|f| f.attrs.iter().any(|attr| attr.path().is_ident(TAG_ATTR)))
                        .filter_map(|f| f.ident.as_ref())
                        .collect();
                    Ok(quote! {
                        #name::#variant_ident { #(#tag_fields,)* .. } => {
                            #[allow(unused_mut)]
                            let mut tags = dcb_core::tags::TagSet::new();
                            #(tags.insert(dcb_core::tags::Tag::new(stringify!(#tag_fields), #tag_fields.to_string()));)*
                            tags
                        }
                    })
                }
                Fields::Unit => Ok(quote! {
                    #name::#variant_ident => dcb_core::tags::TagSet::new(),
                }),
                Fields::Unnamed(_) => Err(Error::new_spanned(
                    variant,
                    "Event derive does not support tuple variants; use named fields with #[tag]",
                )),
            }
        })
        .collect::<Result<Vec<TokenStream>>>()?;

    Ok(quote! {
        impl dcb_core::Event for #name {
            fn event_type(&self) -> &'static str {
                match self {
                    #(#event_type_arms)*
                }
            }

            fn tags(&self) -> dcb_core::TagSet {
                match self {
                    #(#tags_arms)*
                }
            }
        }
    })
}
