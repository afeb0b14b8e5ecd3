use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, Generics, Ident, Result, spanned::Spanned};

use super::constraint::{DeclaredConstraints, Scope, parse_validate_attrs};
use super::types::{TypeInfo, classify_type};

pub(crate) struct ParsedBean {
    ident: Ident,
    generics: Generics,
    fields: Vec<ParsedField>,
}

struct ParsedField {
    ident: Ident,
    name: String,
    ty: TypeInfo,
    declared: DeclaredConstraints,
}

impl ParsedBean {
    pub fn from_input(input: &DeriveInput) -> Result<Self> {
        let named = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => &named.named,
                _ => {
                    return Err(Error::new(
                        input.ident.span(),
                        "Validate can only be derived for structs with named fields",
                    ));
                }
            },
            _ => {
                return Err(Error::new(
                    input.ident.span(),
                    "Validate can only be derived for structs with named fields",
                ));
            }
        };

        let mut fields = Vec::with_capacity(named.len());
        for field in named {
            let ident = field
                .ident
                .clone()
                .ok_or_else(|| Error::new(field.span(), "Validate requires named fields"))?;
            let ty = classify_type(&field.ty);
            let declared = parse_validate_attrs(&field.attrs, &ty)?;
            let name = ident.to_string().trim_start_matches("r#").to_string();
            fields.push(ParsedField {
                ident,
                name,
                ty,
                declared,
            });
        }

        Ok(Self {
            ident: input.ident.clone(),
            generics: input.generics.clone(),
            fields,
        })
    }

    pub fn emit(&self) -> TokenStream2 {
        let ident = &self.ident;
        let bean_name = ident.to_string();
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();

        let properties = self.fields.iter().map(ParsedField::descriptor_tokens);
        let checks: Vec<TokenStream2> = self
            .fields
            .iter()
            .enumerate()
            .map(|(index, field)| field.check_tokens(index))
            .collect();
        let property_arms = self.fields.iter().zip(&checks).map(|(field, check)| {
            let name = &field.name;
            quote! { #name => { #check } }
        });

        // Generic beans have no single `TypeId` to register.
        let registration = self.generics.params.is_empty().then(|| {
            quote! {
                ::vouch::inventory::submit! {
                    ::vouch::registry::BeanRegistration {
                        type_name: #bean_name,
                        type_id: ::std::any::TypeId::of::<#ident>,
                        descriptor_fn: <#ident as ::vouch::types::BeanMetadata>::bean_descriptor,
                    }
                }
            }
        });

        quote! {
            impl #impl_generics ::vouch::types::BeanMetadata for #ident #ty_generics #where_clause {
                fn bean_descriptor() -> &'static ::vouch::types::BeanDescriptor {
                    static DESCRIPTOR: ::std::sync::OnceLock<::vouch::types::BeanDescriptor> =
                        ::std::sync::OnceLock::new();
                    DESCRIPTOR.get_or_init(|| {
                        ::vouch::types::BeanDescriptor::new(#bean_name, vec![#(#properties),*])
                    })
                }
            }

            impl #impl_generics ::vouch::types::Validate for #ident #ty_generics #where_clause {
                #[allow(unused_variables)]
                fn validate_into(
                    &self,
                    ctx: &mut ::vouch::context::ValidationContext<'_>,
                ) -> ::vouch::errors::ValidationResult<()> {
                    let descriptor = <Self as ::vouch::types::BeanMetadata>::bean_descriptor();
                    #(#checks)*
                    Ok(())
                }

                #[allow(unused_variables)]
                fn validate_property_into(
                    &self,
                    property: &str,
                    ctx: &mut ::vouch::context::ValidationContext<'_>,
                ) -> ::vouch::errors::ValidationResult<()> {
                    let descriptor = <Self as ::vouch::types::BeanMetadata>::bean_descriptor();
                    match property {
                        #(#property_arms)*
                        _ => {
                            return Err(::vouch::errors::ValidationError::UnknownProperty {
                                bean: #bean_name.to_string(),
                                property: property.to_string(),
                            });
                        }
                    }
                    Ok(())
                }
            }

            #registration
        }
    }
}

impl ParsedField {
    fn descriptor_tokens(&self) -> TokenStream2 {
        let name = &self.name;
        let constraints = self.declared.constraints.iter().map(|constraint| constraint.descriptor_tokens());
        let cascaded = self.declared.nested.then(|| quote! { .cascaded() });
        quote! {
            ::vouch::types::PropertyDescriptor::new(#name) #(.with_constraint(#constraints))* #cascaded
        }
    }

    /// Statements validating this field; `descriptor.properties[index]` is its descriptor.
    fn check_tokens(&self, index: usize) -> TokenStream2 {
        let ident = &self.ident;
        let name = &self.name;
        let mut statements = Vec::new();

        if self.declared.has_scope(Scope::Field) {
            statements.push(quote! {
                ctx.validate_property(&descriptor.properties[#index], &self.#ident)?;
            });
        }
        if self.declared.has_scope(Scope::EachElement) {
            statements.push(quote! {
                ctx.validate_elements(&descriptor.properties[#index], &self.#ident)?;
            });
        }
        if self.declared.nested {
            statements.push(if self.ty.is_collection() {
                quote! { ctx.cascade_elements(#name, &self.#ident)?; }
            } else if self.ty.optional {
                quote! {
                    if let Some(value) = &self.#ident {
                        ctx.cascade(#name, value)?;
                    }
                }
            } else {
                quote! { ctx.cascade(#name, &self.#ident)?; }
            });
        }

        quote! { #(#statements)* }
    }
}
