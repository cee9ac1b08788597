//! Tag vocabulary shared by the decoder, the encoder and the JSON view.
//!
//! Every value JSON cannot express natively is written as an object whose
//! [`TAG_KEY`] member names the variant:
//!
//! | Ion value | JSON |
//! |-----------|------|
//! | `null.int` | `{"__ion": "null", "value": "int"}` |
//! | `42` | `{"__ion": "int", "value": "42"}` |
//! | `nan`, `+inf`, `-inf`, `-0e0` | `{"__ion": "float", "value": "nan"}` |
//! | `1.50` | `{"__ion": "decimal", "exp": "-2", "coef": "150"}` |
//! | `2007-02-23T12:14Z` | `{"__ion": "timestamp", "value": "2007-02-23T12:14Z"}` |
//! | `foo` (symbol) | `{"__ion": "symbol", "value": "foo"}` |
//! | `{{aGk=}}` | `{"__ion": "blob", "value": "aGk="}` |
//! | `(a b)` | `{"__ion": "sexp", "value": [...]}` |
//! | `x::y::1` | `{"__ion": "annotation", "annotations": ["x", "y"], "value": ...}` |
//!
//! Booleans, strings, ordinary floats, `null` and lists map to their JSON
//! counterparts; structs map to objects.
//!
//! # Field escaping
//!
//! A struct field is stored under `"__ion:" + name` (an array "bucket") when its
//! name is reserved or repeats a name already present:
//!
//! ```text
//! {__ion: 'foo', a: 3e0, a: 4e0}  =>  {"__ion:__ion": [{"__ion":"symbol","value":"foo"}],
//!                                      "a": 3.0, "__ion:a": [4.0]}
//! ```

/// Object key that marks a tagged value.
pub const TAG_KEY: &str = "__ion";

/// Prefix of escaped field buckets.
pub const ESCAPE_PREFIX: &str = "__ion:";

pub const TAG_NULL: &str = "null";
pub const TAG_INT: &str = "int";
pub const TAG_FLOAT: &str = "float";
pub const TAG_DECIMAL: &str = "decimal";
pub const TAG_TIMESTAMP: &str = "timestamp";
pub const TAG_SYMBOL: &str = "symbol";
pub const TAG_BLOB: &str = "blob";
pub const TAG_CLOB: &str = "clob";
pub const TAG_SEXP: &str = "sexp";
pub const TAG_ANNOTATION: &str = "annotation";

/// Member names used inside tagged objects.
pub const VALUE_KEY: &str = "value";
pub const EXPONENT_KEY: &str = "exp";
pub const COEFFICIENT_KEY: &str = "coef";
pub const ANNOTATIONS_KEY: &str = "annotations";

/// Returns `true` if a real field with this name can never be stored as a plain key.
///
/// # Examples
///
/// ```rust
/// use ion_json::tags::is_reserved_field;
///
/// assert!(is_reserved_field("__ion"));
/// assert!(is_reserved_field("__ion:a"));
/// assert!(!is_reserved_field("ion"));
/// ```
#[inline]
#[must_use]
pub fn is_reserved_field(name: &str) -> bool {
    name == TAG_KEY || name.starts_with(ESCAPE_PREFIX)
}

/// Returns the bucket key for a field name.
#[inline]
#[must_use]
pub fn escape_field(name: &str) -> String {
    let mut escaped = String::with_capacity(ESCAPE_PREFIX.len() + name.len());
    escaped.push_str(ESCAPE_PREFIX);
    escaped.push_str(name);
    escaped
}

/// Returns the real field name of a bucket key, or `None` for a plain key.
///
/// # Examples
///
/// ```rust
/// use ion_json::tags::unescape_field;
///
/// assert_eq!(unescape_field("__ion:a"), Some("a"));
/// assert_eq!(unescape_field("__ion:__ion"), Some("__ion"));
/// assert_eq!(unescape_field("a"), None);
/// ```
#[inline]
#[must_use]
pub fn unescape_field(key: &str) -> Option<&str> {
    key.strip_prefix(ESCAPE_PREFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_roundtrip() {
        for name in ["a", "", "__ion", "__ion:x", "ion:", "with space"] {
            assert_eq!(unescape_field(&escape_field(name)), Some(name));
        }
    }

    #[test]
    fn test_tag_key_is_not_a_bucket() {
        assert_eq!(unescape_field(TAG_KEY), None);
        assert!(is_reserved_field(TAG_KEY));
    }
}
