use ion_json::{tagged, to_json_string, to_text, TaggedMap, TaggedValue};
use num_bigint::BigInt;

#[test]
fn test_tagged_macro_null() {
    assert_eq!(tagged!(null), TaggedValue::Null);
}

#[test]
fn test_tagged_macro_booleans() {
    assert_eq!(tagged!(true), TaggedValue::Bool(true));
    assert_eq!(tagged!(false), TaggedValue::Bool(false));
}

#[test]
fn test_tagged_macro_numbers() {
    assert_eq!(tagged!(42), TaggedValue::Int(BigInt::from(42)));
    assert_eq!(tagged!(-123), TaggedValue::Int(BigInt::from(-123)));
    assert_eq!(tagged!(3.5), TaggedValue::Number(3.5));
    assert_eq!(tagged!(-0.0).tag(), Some("float"));
}

#[test]
fn test_tagged_macro_strings() {
    assert_eq!(tagged!("hello world"), TaggedValue::String("hello world".to_string()));
    assert_eq!(tagged!(""), TaggedValue::String(String::new()));
}

#[test]
fn test_tagged_macro_arrays() {
    assert_eq!(tagged!([]), TaggedValue::Array(vec![]));
    assert_eq!(
        tagged!([1, "two", true,]),
        TaggedValue::Array(vec![
            TaggedValue::Int(BigInt::from(1)),
            TaggedValue::String("two".to_string()),
            TaggedValue::Bool(true),
        ])
    );
}

#[test]
fn test_tagged_macro_objects() {
    let value = tagged!({
        "name": "Ada",
        "langs": ["ion", "json"],
        "meta": {"active": true, "score": 9.5}
    });

    let mut meta = TaggedMap::new();
    meta.insert("active".to_string(), TaggedValue::Bool(true));
    meta.insert("score".to_string(), TaggedValue::Number(9.5));
    let mut expected = TaggedMap::new();
    expected.insert("name".to_string(), TaggedValue::from("Ada"));
    expected.insert("langs".to_string(), tagged!(["ion", "json"]));
    expected.insert("meta".to_string(), TaggedValue::Object(meta));

    assert_eq!(value, TaggedValue::Object(expected));
}

#[test]
fn test_tagged_macro_output() {
    let value = tagged!({"id": 7, "ok": false, "scores": [1.5, null]});
    assert_eq!(
        to_json_string(&value).unwrap(),
        r#"{"id":{"__ion":"int","value":"7"},"ok":false,"scores":[1.5,null]}"#
    );
    assert_eq!(to_text(&value).unwrap(), "{id:7,ok:false,scores:[1.5e0,null]}");
}
