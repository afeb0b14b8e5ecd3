use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Error, FnArg, Ident, ImplItem, ImplItemFn, ItemImpl, Pat, Result, ReturnType, Type, parse_quote};

use super::constraint::{DeclaredConstraints, Scope, is_validate_attr, parse_validate_attrs};
use super::types::{TypeInfo, classify_type, is_self_type, result_ok_type};

/// An inherent impl block annotated with `#[constrained]`.
pub(crate) struct ConstrainedImpl {
    item: ItemImpl,
    self_name: String,
}

struct ConstrainedParameter {
    ident: Ident,
    position: usize,
    ty: TypeInfo,
    declared: DeclaredConstraints,
}

impl ConstrainedImpl {
    pub fn from_item(item: ItemImpl) -> Result<Self> {
        if let Some((_, path, _)) = &item.trait_ {
            return Err(Error::new_spanned(
                path,
                "#[constrained] can only be placed on an inherent impl block",
            ));
        }
        let self_name = match item.self_ty.as_ref() {
            Type::Path(path) => path
                .path
                .segments
                .last()
                .map(|segment| segment.ident.to_string())
                .ok_or_else(|| Error::new_spanned(&item.self_ty, "expected a named type"))?,
            other => return Err(Error::new_spanned(other, "#[constrained] requires a named self type")),
        };
        Ok(Self { item, self_name })
    }

    pub fn emit(mut self) -> Result<TokenStream2> {
        let self_name = self.self_name.clone();
        for impl_item in &mut self.item.items {
            if let ImplItem::Fn(method) = impl_item {
                instrument_method(method, &self_name)?;
            }
        }
        let item = &self.item;
        Ok(quote! { #item })
    }
}

fn instrument_method(method: &mut ImplItemFn, self_name: &str) -> Result<()> {
    let parameters = take_parameters(method)?;
    if parameters.is_empty() {
        return Ok(());
    }

    let has_receiver = method.sig.receiver().is_some();
    let return_type = match &method.sig.output {
        ReturnType::Type(_, ty) => Some(ty.as_ref()),
        ReturnType::Default => None,
    };
    let returns_result_self = return_type
        .and_then(result_ok_type)
        .is_some_and(|ok| is_self_type(ok, self_name));

    if has_receiver || !returns_result_self {
        let method_name = &method.sig.ident;
        let returns_self = return_type.is_some_and(|ty| is_self_type(ty, self_name));
        return Err(if !has_receiver && returns_self {
            Error::new(
                method_name.span(),
                format!("constructor `{method_name}` declares parameter constraints and must return `Result<Self, E>`"),
            )
        } else {
            let span = parameters[0].declared.first_span.unwrap_or_else(|| parameters[0].ident.span());
            Error::new(
                span,
                format!("parameter constraints are only allowed on constructors; `{method_name}` is not a constructor"),
            )
        });
    }

    let executable_name = method.sig.ident.to_string();
    let descriptors = parameters.iter().map(ConstrainedParameter::descriptor_tokens);
    let checks = parameters
        .iter()
        .enumerate()
        .map(|(slot, parameter)| parameter.check_tokens(slot));

    let original = &method.block;
    method.block = parse_quote! {{
        {
            static EXECUTABLE: ::std::sync::OnceLock<::vouch::types::ExecutableDescriptor> =
                ::std::sync::OnceLock::new();
            let __executable = EXECUTABLE.get_or_init(|| {
                ::vouch::types::ExecutableDescriptor::constructor(#executable_name, vec![#(#descriptors),*])
            });
            let violations = ::vouch::validator::default_validator()
                .for_executables()
                .validate_parameters(#self_name, __executable, |__ctx| {
                    #(#checks)*
                    Ok(())
                })?;
            ::vouch::errors::ConstraintViolationError::check(violations)?;
        }
        #original
    }};
    Ok(())
}

/// Strips `#[validate]` from the parameters and returns the constrained ones.
fn take_parameters(method: &mut ImplItemFn) -> Result<Vec<ConstrainedParameter>> {
    let mut parameters = Vec::new();
    let mut position = 0;
    for input in &mut method.sig.inputs {
        let pat_type = match input {
            FnArg::Receiver(receiver) => {
                if let Some(attr) = receiver.attrs.iter().find(|attr| is_validate_attr(attr)) {
                    return Err(Error::new_spanned(attr, "constraints cannot be placed on `self`"));
                }
                continue;
            }
            FnArg::Typed(pat_type) => pat_type,
        };
        let index = position;
        position += 1;

        let (validate_attrs, other_attrs) = std::mem::take(&mut pat_type.attrs)
            .into_iter()
            .partition::<Vec<_>, _>(is_validate_attr);
        pat_type.attrs = other_attrs;
        if validate_attrs.is_empty() {
            continue;
        }

        let ident = match pat_type.pat.as_ref() {
            Pat::Ident(pat) => pat.ident.clone(),
            other => {
                return Err(Error::new_spanned(
                    other,
                    "constrained parameters must be bound to a plain identifier",
                ));
            }
        };
        let ty = classify_type(&pat_type.ty);
        let declared = parse_validate_attrs(&validate_attrs, &ty)?;
        if declared.is_empty() {
            continue;
        }
        parameters.push(ConstrainedParameter {
            ident,
            position: index,
            ty,
            declared,
        });
    }
    Ok(parameters)
}

impl ConstrainedParameter {
    fn descriptor_tokens(&self) -> TokenStream2 {
        let position = self.position;
        let name = self.ident.to_string().trim_start_matches("r#").to_string();
        let constraints = self.declared.constraints.iter().map(|constraint| constraint.descriptor_tokens());
        let cascaded = self.declared.nested.then(|| quote! { .cascaded() });
        quote! {
            ::vouch::types::ParameterDescriptor::new(#position, #name) #(.with_constraint(#constraints))* #cascaded
        }
    }

    /// Statements validating this parameter; `__executable.parameters[slot]` is its descriptor.
    fn check_tokens(&self, slot: usize) -> TokenStream2 {
        let ident = &self.ident;
        let mut statements = Vec::new();

        if self.declared.has_scope(Scope::Field) {
            statements.push(quote! {
                __ctx.validate_parameter(&__executable.parameters[#slot], &#ident)?;
            });
        }
        if self.declared.has_scope(Scope::EachElement) {
            statements.push(quote! {
                __ctx.validate_parameter_elements(&__executable.parameters[#slot], &#ident)?;
            });
        }
        if self.declared.nested {
            statements.push(if self.ty.is_collection() {
                quote! { __ctx.cascade_parameter_elements(&__executable.parameters[#slot], &#ident)?; }
            } else if self.ty.optional {
                quote! {
                    if let Some(value) = &#ident {
                        __ctx.cascade_parameter(&__executable.parameters[#slot], value)?;
                    }
                }
            } else {
                quote! { __ctx.cascade_parameter(&__executable.parameters[#slot], &#ident)?; }
            });
        }

        quote! { #(#statements)* }
    }
}
