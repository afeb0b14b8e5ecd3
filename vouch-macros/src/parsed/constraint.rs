use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::{Attribute, Error, Ident, LitBool, LitInt, LitStr, Result, Token};

use super::types::{FieldBase, TypeInfo};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    Field,
    EachElement,
}

pub(crate) enum ConstraintData {
    NotNull,
    Null,
    NotBlank,
    NotEmpty,
    Size { min: usize, max: usize },
    AssertTrue,
    AssertFalse,
    Positive,
    PositiveOrZero,
    Negative,
    NegativeOrZero,
    Min(i64),
    Max(i64),
    Range { min: i64, max: i64 },
    Pattern { regexp: String, case_insensitive: bool },
    Email,
    Url,
    Uuid,
    Past,
    PastOrPresent,
    Future,
    FutureOrPresent,
}

pub(crate) struct ParsedConstraint {
    pub data: ConstraintData,
    pub message: Option<String>,
    pub scope: Scope,
}

/// Everything declared through `#[validate(...)]` on one field or parameter.
#[derive(Default)]
pub(crate) struct DeclaredConstraints {
    pub constraints: Vec<ParsedConstraint>,
    pub nested: bool,
    /// Span of the first constraint name, for placement errors.
    pub first_span: Option<Span>,
}

impl DeclaredConstraints {
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty() && !self.nested
    }

    pub fn has_scope(&self, scope: Scope) -> bool {
        self.constraints.iter().any(|constraint| constraint.scope == scope)
    }
}

/// Parses every `#[validate(...)]` attribute in `attrs` against the type `ty`.
pub(crate) fn parse_validate_attrs(attrs: &[Attribute], ty: &TypeInfo) -> Result<DeclaredConstraints> {
    let mut declared = DeclaredConstraints::default();
    for attr in attrs.iter().filter(|attr| is_validate_attr(attr)) {
        attr.parse_nested_meta(|meta| parse_entry(meta, ty, Scope::Field, &mut declared))?;
    }
    Ok(declared)
}

pub(crate) fn is_validate_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("validate")
}

fn parse_entry(meta: ParseNestedMeta, ty: &TypeInfo, scope: Scope, declared: &mut DeclaredConstraints) -> Result<()> {
    let ident: Ident = meta
        .path
        .get_ident()
        .cloned()
        .ok_or_else(|| meta.error("expected a constraint name"))?;
    declared.first_span.get_or_insert(ident.span());
    let name = ident.to_string();

    match name.as_str() {
        "nested" => {
            if scope == Scope::EachElement {
                return Err(Error::new(
                    ident.span(),
                    "`nested` cannot be used inside `each`; put it next to `each` instead",
                ));
            }
            declared.nested = true;
            return Ok(());
        }
        "each" => {
            if scope == Scope::EachElement {
                return Err(Error::new(ident.span(), "`each` cannot be nested"));
            }
            let element = element_type(ty, &ident)?;
            return meta.parse_nested_meta(|inner| parse_entry(inner, &element, Scope::EachElement, declared));
        }
        _ => {}
    }

    let kind = ConstraintName::from_ident(&name)
        .ok_or_else(|| Error::new(ident.span(), format!("unknown constraint `{name}`")))?;
    ensure_supported(kind, ty, &ident)?;

    let mut args = ConstraintArgs::parse(&meta, kind, &ident)?;
    let message = args.message.take();
    let data = args.into_data(kind, &ident)?;
    declared.constraints.push(ParsedConstraint { data, message, scope });
    Ok(())
}

fn element_type(ty: &TypeInfo, ident: &Ident) -> Result<TypeInfo> {
    match ty.base {
        FieldBase::Collection => Ok(ty
            .element
            .as_deref()
            .cloned()
            .unwrap_or_else(|| TypeInfo::unknown(ty.display.clone()))),
        FieldBase::Other => Ok(TypeInfo::unknown(ty.display.clone())),
        _ => Err(Error::new(
            ident.span(),
            format!("`each` requires a collection type, found `{}`", ty.display),
        )),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum ConstraintName {
    NotNull,
    Null,
    NotBlank,
    NotEmpty,
    Size,
    AssertTrue,
    AssertFalse,
    Positive,
    PositiveOrZero,
    Negative,
    NegativeOrZero,
    Min,
    Max,
    Range,
    Pattern,
    Email,
    Url,
    Uuid,
    Past,
    PastOrPresent,
    Future,
    FutureOrPresent,
}

impl ConstraintName {
    fn from_ident(name: &str) -> Option<Self> {
        Some(match name {
            "not_null" => Self::NotNull,
            "null" => Self::Null,
            "not_blank" => Self::NotBlank,
            "not_empty" => Self::NotEmpty,
            "size" => Self::Size,
            "assert_true" => Self::AssertTrue,
            "assert_false" => Self::AssertFalse,
            "positive" => Self::Positive,
            "positive_or_zero" => Self::PositiveOrZero,
            "negative" => Self::Negative,
            "negative_or_zero" => Self::NegativeOrZero,
            "min" => Self::Min,
            "max" => Self::Max,
            "range" => Self::Range,
            "pattern" => Self::Pattern,
            "email" => Self::Email,
            "url" => Self::Url,
            "uuid" => Self::Uuid,
            "past" => Self::Past,
            "past_or_present" => Self::PastOrPresent,
            "future" => Self::Future,
            "future_or_present" => Self::FutureOrPresent,
            _ => return None,
        })
    }

    fn allowed_args(self) -> &'static [&'static str] {
        match self {
            Self::Size | Self::Range => &["min", "max", "message"],
            Self::Min | Self::Max => &["value", "message"],
            Self::Pattern => &["regexp", "case_insensitive", "message"],
            _ => &["message"],
        }
    }
}

fn ensure_supported(kind: ConstraintName, ty: &TypeInfo, ident: &Ident) -> Result<()> {
    use ConstraintName::*;

    if ty.base == FieldBase::Other {
        return Ok(());
    }
    let (supported, expected) = match kind {
        NotNull | Null => return Ok(()),
        NotBlank | Pattern | Email | Url | Uuid => (ty.base == FieldBase::Text, "a string type"),
        NotEmpty | Size => (
            matches!(ty.base, FieldBase::Text | FieldBase::Collection),
            "a string or collection type",
        ),
        AssertTrue | AssertFalse => (ty.base == FieldBase::Boolean, "`bool`"),
        Positive | PositiveOrZero | Negative | NegativeOrZero | Min | Max | Range => {
            (ty.base == FieldBase::Numeric, "a numeric type")
        }
        Past | PastOrPresent | Future | FutureOrPresent => (ty.base == FieldBase::Temporal, "a date or time type"),
    };
    if supported {
        Ok(())
    } else {
        Err(Error::new(
            ident.span(),
            format!("`{ident}` is not supported on `{}`; expected {expected}", ty.display),
        ))
    }
}

#[derive(Default)]
struct ConstraintArgs {
    message: Option<String>,
    min: Option<i64>,
    max: Option<i64>,
    value: Option<i64>,
    regexp: Option<LitStr>,
    case_insensitive: bool,
}

impl ConstraintArgs {
    /// Accepts `name`, `name = 5` (min/max shorthand) and `name(key = value, ...)`.
    fn parse(meta: &ParseNestedMeta, kind: ConstraintName, ident: &Ident) -> Result<Self> {
        let mut args = Self::default();

        if meta.input.peek(Token![=]) {
            if !matches!(kind, ConstraintName::Min | ConstraintName::Max) {
                return Err(Error::new(
                    ident.span(),
                    format!("`{ident}` does not take a value; use `{ident}(...)`"),
                ));
            }
            let input = meta.value()?;
            args.value = Some(parse_signed(input)?);
        } else if meta.input.peek(syn::token::Paren) {
            let allowed = kind.allowed_args();
            meta.parse_nested_meta(|arg| {
                let key = arg
                    .path
                    .get_ident()
                    .map(Ident::to_string)
                    .unwrap_or_default();
                if !allowed.contains(&key.as_str()) {
                    return Err(arg.error(format!("unknown argument `{key}` for `{ident}`")));
                }
                match key.as_str() {
                    "message" => args.message = Some(arg.value()?.parse::<LitStr>()?.value()),
                    "min" => args.min = Some(parse_signed(arg.value()?)?),
                    "max" => args.max = Some(parse_signed(arg.value()?)?),
                    "value" => args.value = Some(parse_signed(arg.value()?)?),
                    "regexp" => args.regexp = Some(arg.value()?.parse::<LitStr>()?),
                    "case_insensitive" => {
                        args.case_insensitive = if arg.input.peek(Token![=]) {
                            arg.value()?.parse::<LitBool>()?.value
                        } else {
                            true
                        };
                    }
                    _ => return Err(arg.error(format!("unknown argument `{key}` for `{ident}`"))),
                }
                Ok(())
            })?;
        }

        Ok(args)
    }

    fn into_data(self, kind: ConstraintName, ident: &Ident) -> Result<ConstraintData> {
        use ConstraintName::*;

        Ok(match kind {
            NotNull => ConstraintData::NotNull,
            Null => ConstraintData::Null,
            NotBlank => ConstraintData::NotBlank,
            NotEmpty => ConstraintData::NotEmpty,
            Size => {
                let min = non_negative(self.min.unwrap_or(0), ident, "min")?;
                let max = match self.max {
                    Some(max) => non_negative(max, ident, "max")?,
                    None => usize::MAX,
                };
                if min > max {
                    return Err(Error::new(ident.span(), "`size` requires min <= max"));
                }
                ConstraintData::Size { min, max }
            }
            AssertTrue => ConstraintData::AssertTrue,
            AssertFalse => ConstraintData::AssertFalse,
            Positive => ConstraintData::Positive,
            PositiveOrZero => ConstraintData::PositiveOrZero,
            Negative => ConstraintData::Negative,
            NegativeOrZero => ConstraintData::NegativeOrZero,
            Min => ConstraintData::Min(self.required_value(ident)?),
            Max => ConstraintData::Max(self.required_value(ident)?),
            Range => {
                let min = self.min.unwrap_or(i64::MIN);
                let max = self.max.unwrap_or(i64::MAX);
                if min > max {
                    return Err(Error::new(ident.span(), "`range` requires min <= max"));
                }
                ConstraintData::Range { min, max }
            }
            Pattern => {
                let lit = self
                    .regexp
                    .ok_or_else(|| Error::new(ident.span(), "`pattern` requires `regexp = \"...\"`"))?;
                let regexp = lit.value();
                ensure_valid_regex(&regexp, self.case_insensitive, lit.span())?;
                ConstraintData::Pattern {
                    regexp,
                    case_insensitive: self.case_insensitive,
                }
            }
            Email => ConstraintData::Email,
            Url => ConstraintData::Url,
            Uuid => ConstraintData::Uuid,
            Past => ConstraintData::Past,
            PastOrPresent => ConstraintData::PastOrPresent,
            Future => ConstraintData::Future,
            FutureOrPresent => ConstraintData::FutureOrPresent,
        })
    }

    fn required_value(&self, ident: &Ident) -> Result<i64> {
        self.value
            .ok_or_else(|| Error::new(ident.span(), format!("`{ident}` requires a value, e.g. `{ident} = 10`")))
    }
}

fn parse_signed(input: syn::parse::ParseStream) -> Result<i64> {
    let negative = input.peek(Token![-]);
    if negative {
        input.parse::<Token![-]>()?;
    }
    let lit: LitInt = input.parse()?;
    if negative {
        let magnitude: u64 = lit.base10_parse()?;
        0i64.checked_sub_unsigned(magnitude)
            .ok_or_else(|| Error::new(lit.span(), "value does not fit in i64"))
    } else {
        lit.base10_parse()
    }
}

fn non_negative(value: i64, ident: &Ident, arg: &str) -> Result<usize> {
    usize::try_from(value).map_err(|_| Error::new(ident.span(), format!("`{ident}` requires a non-negative `{arg}`")))
}

fn ensure_valid_regex(pattern: &str, case_insensitive: bool, span: Span) -> Result<()> {
    regex::RegexBuilder::new(&format!("^(?:{pattern})$"))
        .case_insensitive(case_insensitive)
        .build()
        .map(|_| ())
        .map_err(|_| Error::new(span, format!("invalid regex pattern `{pattern}`")))
}

impl ParsedConstraint {
    /// Tokens building the runtime `ConstraintDescriptor`.
    pub fn descriptor_tokens(&self) -> TokenStream2 {
        let constraint = self.constraint_tokens();
        let message = self.message.as_ref().map(|message| quote! { .with_message(#message) });
        let scope = (self.scope == Scope::EachElement).then(|| quote! { .each_element() });
        quote! {
            ::vouch::types::ConstraintDescriptor::new(#constraint) #message #scope
        }
    }

    fn constraint_tokens(&self) -> TokenStream2 {
        let path = quote! { ::vouch::constraints::Constraint };
        match &self.data {
            ConstraintData::NotNull => quote! { #path::NotNull },
            ConstraintData::Null => quote! { #path::Null },
            ConstraintData::NotBlank => quote! { #path::NotBlank },
            ConstraintData::NotEmpty => quote! { #path::NotEmpty },
            ConstraintData::Size { min, max } => quote! { #path::Size { min: #min, max: #max } },
            ConstraintData::AssertTrue => quote! { #path::AssertTrue },
            ConstraintData::AssertFalse => quote! { #path::AssertFalse },
            ConstraintData::Positive => quote! { #path::Positive },
            ConstraintData::PositiveOrZero => quote! { #path::PositiveOrZero },
            ConstraintData::Negative => quote! { #path::Negative },
            ConstraintData::NegativeOrZero => quote! { #path::NegativeOrZero },
            ConstraintData::Min(value) => quote! { #path::Min(#value) },
            ConstraintData::Max(value) => quote! { #path::Max(#value) },
            ConstraintData::Range { min, max } => quote! { #path::Range { min: #min, max: #max } },
            ConstraintData::Pattern {
                regexp,
                case_insensitive,
            } => quote! {
                #path::Pattern(::vouch::constraints::Pattern::new(#regexp, #case_insensitive))
            },
            ConstraintData::Email => quote! { #path::Email },
            ConstraintData::Url => quote! { #path::Url },
            ConstraintData::Uuid => quote! { #path::Uuid },
            ConstraintData::Past => quote! { #path::Past },
            ConstraintData::PastOrPresent => quote! { #path::PastOrPresent },
            ConstraintData::Future => quote! { #path::Future },
            ConstraintData::FutureOrPresent => quote! { #path::FutureOrPresent },
        }
    }
}
