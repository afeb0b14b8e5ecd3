use quote::ToTokens;
use syn::{GenericArgument, PathArguments, Type, TypePath};

/// What the macro can tell about a field or parameter type from its syntax.
#[derive(Clone)]
pub(crate) struct TypeInfo {
    pub optional: bool,
    pub base: FieldBase,
    pub element: Option<Box<TypeInfo>>,
    /// Rendered type, used in error messages.
    pub display: String,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldBase {
    Text,
    Numeric,
    Boolean,
    Collection,
    Temporal,
    /// Not recognised; support is left to the `ConstraintTarget` bound.
    Other,
}

impl TypeInfo {
    pub fn unknown(display: impl Into<String>) -> Self {
        Self {
            optional: false,
            base: FieldBase::Other,
            element: None,
            display: display.into(),
        }
    }

    pub fn is_collection(&self) -> bool {
        self.base == FieldBase::Collection
    }
}

pub(crate) fn classify_type(ty: &Type) -> TypeInfo {
    let display = render(ty);
    match ty {
        Type::Reference(reference) => classify_type(&reference.elem),
        Type::Paren(paren) => classify_type(&paren.elem),
        Type::Group(group) => classify_type(&group.elem),
        Type::Slice(slice) => TypeInfo {
            optional: false,
            base: FieldBase::Collection,
            element: Some(Box::new(classify_type(&slice.elem))),
            display,
        },
        Type::Path(path) => classify_path(path, display),
        _ => TypeInfo::unknown(display),
    }
}

fn classify_path(path: &TypePath, display: String) -> TypeInfo {
    let Some(ident) = last_ident_str(path) else {
        return TypeInfo::unknown(display);
    };
    let arguments = generic_types(path);
    match ident.as_str() {
        "Option" => match arguments.first() {
            Some(inner) => {
                let mut info = classify_type(inner);
                info.optional = true;
                info.display = display;
                info
            }
            None => TypeInfo::unknown(display),
        },
        "Box" | "Rc" | "Arc" => match arguments.first() {
            Some(inner) => classify_type(inner),
            None => TypeInfo::unknown(display),
        },
        "Vec" | "VecDeque" | "HashSet" | "BTreeSet" => collection(arguments.first().copied(), display),
        "HashMap" | "BTreeMap" => collection(arguments.get(1).copied(), display),
        "String" | "str" | "Cow" => simple(FieldBase::Text, display),
        "bool" => simple(FieldBase::Boolean, display),
        "DateTime" | "NaiveDate" | "NaiveDateTime" | "SystemTime" => simple(FieldBase::Temporal, display),
        other if is_numeric_ident(other) => simple(FieldBase::Numeric, display),
        _ => TypeInfo::unknown(display),
    }
}

fn simple(base: FieldBase, display: String) -> TypeInfo {
    TypeInfo {
        optional: false,
        base,
        element: None,
        display,
    }
}

fn collection(element: Option<&Type>, display: String) -> TypeInfo {
    TypeInfo {
        optional: false,
        base: FieldBase::Collection,
        element: element.map(|ty| Box::new(classify_type(ty))),
        display,
    }
}

fn is_numeric_ident(ident: &str) -> bool {
    matches!(
        ident,
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64" | "u128" | "usize" | "f32" | "f64"
    )
}

fn last_ident_str(path: &TypePath) -> Option<String> {
    path.path.segments.last().map(|seg| seg.ident.to_string())
}

fn generic_types(path: &TypePath) -> Vec<&Type> {
    match path.path.segments.last().map(|seg| &seg.arguments) {
        Some(PathArguments::AngleBracketed(args)) => args
            .args
            .iter()
            .filter_map(|arg| match arg {
                GenericArgument::Type(inner) => Some(inner),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Renders a type compactly, e.g. `Option<String>` rather than `Option < String >`.
pub(crate) fn render(ty: &Type) -> String {
    let raw = ty.to_token_stream().to_string();
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == ' ' {
            let keep = out.chars().last().is_some_and(|prev| prev.is_alphanumeric() || prev == '_')
                && chars.peek().is_some_and(|next| next.is_alphanumeric() || *next == '_');
            if keep {
                out.push(ch);
            }
            continue;
        }
        out.push(ch);
    }
    out
}

/// Returns the `T` of a `Result<T, E>` return type.
pub(crate) fn result_ok_type(ty: &Type) -> Option<&Type> {
    match ty {
        Type::Path(path) if last_ident_str(path).as_deref() == Some("Result") => generic_types(path).first().copied(),
        _ => None,
    }
}

/// True when `ty` is `Self` or a path ending in `self_name`.
pub(crate) fn is_self_type(ty: &Type, self_name: &str) -> bool {
    match ty {
        Type::Path(path) => last_ident_str(path).is_some_and(|ident| ident == "Self" || ident == self_name),
        _ => false,
    }
}
