mod event;

extern crate proc_macro;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `dcb_core::Event` for an enum of event variants.
///
/// Each variant's name becomes its `event_type()`. Named fields marked
/// `#[tag]` become entries in `tags()`; unmarked fields and unit variants
/// contribute none. Tuple variants are not supported — flatten payloads into
/// named fields first.
///
/// # Example
///
/// ```rust
/// use dcb_macros::Event;
///
/// #[derive(Event)]
/// enum WalletEvent {
///     Opened {
///         #[tag]
///         wallet_id: String,
///     },
///     Transferred {
///         #[tag]
///         from_wallet_id: String,
///         #[tag]
///         to_wallet_id: String,
///         amount: u64,
///     },
///     Frozen,
/// }
/// ```
#[proc_macro_derive(Event, attributes(tag))]
pub fn event(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    match event::event_inner(&ast) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
