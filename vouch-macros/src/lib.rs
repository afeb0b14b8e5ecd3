use proc_macro::TokenStream;
use syn::{DeriveInput, ItemImpl, parse_macro_input};

mod parsed;

use parsed::{ConstrainedImpl, ParsedBean};

/// Derives `BeanMetadata` and `Validate` from `#[validate(...)]` field attributes.
///
/// ```text
/// #[derive(Validate)]
/// pub struct PersonRecord {
///     #[validate(not_blank(message = "Name cannot be null or empty"))]
///     pub name: Option<String>,
///     #[validate(positive, max = 150)]
///     pub age: i32,
///     #[validate(each(not_blank, size(max = 16)))]
///     pub tags: Vec<String>,
///     #[validate(nested)]
///     pub address: Option<Address>,
/// }
/// ```
///
/// Constraints placed on a field type that cannot support them are compile errors.
#[proc_macro_derive(Validate, attributes(validate))]
pub fn derive_validate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedBean::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}

/// Enables `#[validate(...)]` on constructor parameters of an inherent impl block.
///
/// A constructor is an associated function without a receiver returning
/// `Result<Self, E>`, where `E: From<vouch::ValidationError> + From<vouch::ConstraintViolationError>`
/// (`vouch::Error` qualifies). Its parameters are validated before the body runs.
/// Parameter constraints on any other method are rejected.
#[proc_macro_attribute]
pub fn constrained(args: TokenStream, input: TokenStream) -> TokenStream {
    if !args.is_empty() {
        let args = proc_macro2::TokenStream::from(args);
        return syn::Error::new_spanned(args, "#[constrained] takes no arguments")
            .to_compile_error()
            .into();
    }
    let item = parse_macro_input!(input as ItemImpl);

    match ConstrainedImpl::from_item(item).and_then(ConstrainedImpl::emit) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
