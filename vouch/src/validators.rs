use email_address::EmailAddress;
use url::Url;
use uuid::Uuid;

/// Returns `true` when the text contains at least one non-whitespace character.
pub fn is_not_blank(value: &str) -> bool {
    !value.chars().all(char::is_whitespace)
}

/// Length in characters, which is what `size` measures on text.
pub fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Returns `true` if the provided string is a syntactically valid email address.
/// Empty text is accepted; pair with `not_blank` to require a value.
pub fn is_valid_email(value: &str) -> bool {
    value.is_empty() || EmailAddress::is_valid(value)
}

/// Returns `true` if the provided string parses as a URL with a scheme.
/// Empty text is accepted.
pub fn is_valid_url(value: &str) -> bool {
    value.is_empty() || Url::parse(value).is_ok()
}

/// Returns `true` if the provided string parses as a UUID.
/// Empty text is accepted.
pub fn is_valid_uuid(value: &str) -> bool {
    value.is_empty() || Uuid::parse_str(value).is_ok()
}
