//! Procedural macros for consensus encoding and decoding.

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, parse_macro_input};

/// Derives `Encodable` and `Decodable` for a struct by encoding every field in
/// declaration order.
///
/// The generated code refers to `crate::faircoin::consensus` and
/// `crate::faircoin::io`, so the macro is meant for types defined inside
/// `fairchain-common`.
///
/// # Example
///
/// ```ignore
/// use fairchain_derive::ConsensusCodec;
///
/// #[derive(ConsensusCodec)]
/// struct CheckpointPayload {
///     version: u32,
///     checkpoint_hash: BlockHash,
/// }
/// ```
#[proc_macro_derive(ConsensusCodec)]
pub fn derive_consensus_codec(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(_) | Data::Union(_) => {
            return syn::Error::new_spanned(&input, "ConsensusCodec can only be derived for structs")
                .to_compile_error()
                .into();
        }
    };

    let (accessors, constructor) = match fields {
        Fields::Named(named) => {
            let idents: Vec<_> = named.named.iter().filter_map(|f| f.ident.as_ref()).collect();
            let accessors: Vec<_> = idents.iter().map(|ident| quote! { self.#ident }).collect();
            let constructor = quote! {
                #name {
                    #(
                        #idents: crate::faircoin::consensus::Decodable::consensus_decode_from_finite_reader(reader)?,
                    )*
                }
            };
            (accessors, constructor)
        }
        Fields::Unnamed(unnamed) => {
            let accessors: Vec<_> = (0..unnamed.unnamed.len())
                .map(|i| {
                    let index = syn::Index::from(i);
                    quote! { self.#index }
                })
                .collect();
            let decoders = unnamed.unnamed.iter().map(|_| {
                quote! {
                    crate::faircoin::consensus::Decodable::consensus_decode_from_finite_reader(reader)?
                }
            });
            (accessors, quote! { #name(#(#decoders),*) })
        }
        Fields::Unit => {
            return syn::Error::new_spanned(&input, "ConsensusCodec cannot be derived for unit structs")
                .to_compile_error()
                .into();
        }
    };

    let expanded = quote! {
        impl #impl_generics crate::faircoin::consensus::Encodable for #name #ty_generics #where_clause {
            #[inline]
            fn consensus_encode<W: crate::faircoin::io::Write + ?Sized>(
                &self,
                writer: &mut W,
            ) -> core::result::Result<usize, crate::faircoin::io::Error> {
                let mut len: usize = 0;
                #(
                    len = len.saturating_add(
                        crate::faircoin::consensus::Encodable::consensus_encode(&#accessors, writer)?,
                    );
                )*
                Ok(len)
            }
        }

        impl #impl_generics crate::faircoin::consensus::Decodable for #name #ty_generics #where_clause {
            #[inline]
            fn consensus_decode_from_finite_reader<R: crate::faircoin::io::Read + ?Sized>(
                reader: &mut R,
            ) -> core::result::Result<Self, crate::faircoin::consensus::EncodeDecodeError> {
                Ok(#constructor)
            }
        }
    };

    TokenStream::from(expanded)
}
