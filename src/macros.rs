/// Builds a [`TaggedValue`](crate::TaggedValue) from JSON-like syntax.
///
/// Literals go through the `From` conversions of `TaggedValue`: integer
/// literals become Ion ints, float literals plain numbers and string literals
/// strings. Any other expression is converted the same way.
///
/// # Examples
///
/// ```rust
/// use ion_json::{tagged, TaggedValue};
///
/// let value = tagged!({
///     "name": "Alice",
///     "age": 30,
///     "tags": ["ion", "json"]
/// });
///
/// if let TaggedValue::Object(map) = value {
///     assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
/// }
/// ```
#[macro_export]
macro_rules! tagged {
    (null) => {
        $crate::TaggedValue::Null
    };

    (true) => {
        $crate::TaggedValue::Bool(true)
    };

    (false) => {
        $crate::TaggedValue::Bool(false)
    };

    ([]) => {
        $crate::TaggedValue::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::TaggedValue::Array(vec![$($crate::tagged!($elem)),*])
    };

    ({}) => {
        $crate::TaggedValue::Object($crate::TaggedMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::TaggedMap::new();
        $(
            object.insert($key.to_string(), $crate::tagged!($value));
        )*
        $crate::TaggedValue::Object(object)
    }};

    ($other:expr) => {
        $crate::TaggedValue::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{TaggedMap, TaggedValue};
    use num_bigint::BigInt;

    #[test]
    fn test_tagged_macro_primitives() {
        assert_eq!(tagged!(null), TaggedValue::Null);
        assert_eq!(tagged!(true), TaggedValue::Bool(true));
        assert_eq!(tagged!(42), TaggedValue::Int(BigInt::from(42)));
        assert_eq!(tagged!(3.5), TaggedValue::Number(3.5));
        assert_eq!(tagged!("hello"), TaggedValue::String("hello".to_string()));
    }

    #[test]
    fn test_tagged_macro_nested() {
        assert_eq!(tagged!({}), TaggedValue::Object(TaggedMap::new()));

        let value = tagged!({"list": [1, [], {"x": null}]});
        let list = value
            .as_object()
            .and_then(|map| map.get("list"))
            .and_then(TaggedValue::as_array)
            .unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[1], TaggedValue::Array(vec![]));
        assert!(list[2].is_object());
    }

    #[test]
    fn test_tagged_macro_expressions() {
        let name = String::from("dynamic");
        assert_eq!(tagged!(name), TaggedValue::String("dynamic".to_string()));
        assert_eq!(tagged!(f64::NAN).tag(), Some("float"));
    }
}
