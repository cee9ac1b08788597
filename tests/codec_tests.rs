//! End-to-end tests of the Ion ⇄ tagged JSON conversion.

use ion_json::{
    decode_all, decode_document, decode_document_with_options, encode_document,
    encode_document_with_options, from_json_str, to_json_string, to_text, CodecOptions,
    DuplicateFields, Error, IonType, OutputFormat, TaggedMap, TaggedValue,
};
use serde_json::{json, Value};

const FORMATS: [OutputFormat; 3] = [OutputFormat::Binary, OutputFormat::Text, OutputFormat::Pretty];

fn decode_text(text: &str) -> TaggedValue {
    decode_document(text.as_bytes()).unwrap()
}

fn roundtrip(value: &TaggedValue, format: OutputFormat) -> TaggedValue {
    let bytes = encode_document(value, format).unwrap();
    decode_document(&bytes).unwrap()
}

fn assert_roundtrips(value: &TaggedValue) {
    for format in FORMATS {
        assert_eq!(&roundtrip(value, format), value, "format {:?}", format);
    }
}

#[test]
fn test_plain_scalars_roundtrip() {
    let values = [
        TaggedValue::Bool(true),
        TaggedValue::Bool(false),
        TaggedValue::from(""),
        TaggedValue::from("plain"),
        TaggedValue::from("quotes \" and \\ and 'single'"),
        TaggedValue::from("line\nbreak\ttab\u{7f}\u{0}"),
        TaggedValue::from("emoji 😀 and accents é"),
        TaggedValue::from("__ion"),
        TaggedValue::Number(1.5),
        TaggedValue::Number(-2.25e10),
        TaggedValue::Number(0.0),
        TaggedValue::Number(f64::MAX),
        TaggedValue::Number(f64::MIN_POSITIVE),
        TaggedValue::Number(5e-324),
        TaggedValue::Null,
    ];
    for value in &values {
        assert_roundtrips(value);
    }
}

#[test]
fn test_special_floats_are_idempotent() {
    for name in ["nan", "+inf", "-inf", "-0"] {
        let json = json!({"__ion": "float", "value": name});
        let value = TaggedValue::from_json(&json).unwrap();
        for format in FORMATS {
            assert_eq!(roundtrip(&value, format).to_json(), json, "{} via {:?}", name, format);
        }
    }
}

#[test]
fn test_integer_exactness() {
    let value = decode_text("2147483647");
    assert_eq!(value.to_json(), json!({"__ion": "int", "value": "2147483647"}));
    assert_roundtrips(&value);

    let big = decode_text("-123456789012345678901234567890123456789");
    assert_eq!(
        big.to_json(),
        json!({"__ion": "int", "value": "-123456789012345678901234567890123456789"})
    );
    assert_roundtrips(&big);
}

#[test]
fn test_int_binary_layout() {
    let value = from_json_str(r#"{"__ion":"int","value":"2147483646"}"#).unwrap();
    assert_eq!(
        encode_document(&value, OutputFormat::Binary).unwrap(),
        [0xE0, 0x01, 0x00, 0xEA, 0x24, 0x7F, 0xFF, 0xFF, 0xFE]
    );
}

#[test]
fn test_duplicate_field_keeps_first_plain() {
    let value = decode_text("{a: 3e0, a: 4e0, a: 6}");
    assert_eq!(
        value.to_json(),
        json!({"a": 3.0, "__ion:a": [4.0, {"__ion": "int", "value": "6"}]})
    );
    assert_eq!(
        encode_document(&value, OutputFormat::Text).unwrap(),
        b"{a:3e0,a:4e0,a:6}"
    );
}

#[test]
fn test_duplicate_field_bucket_policy() {
    let options = CodecOptions::new().with_duplicate_fields(DuplicateFields::Bucket);
    let value = decode_document_with_options(b"{a: 3e0, b: 1, a: 4e0}", &options).unwrap();
    assert_eq!(
        value.to_json(),
        json!({"b": {"__ion": "int", "value": "1"}, "__ion:a": [3.0, 4.0]})
    );
    assert_eq!(to_text(&value).unwrap(), "{b:1,a:3e0,a:4e0}");
}

#[test]
fn test_duplicates_survive_binary() {
    let value = decode_text("{x: 1, y: 2, x: 3, y: 4, x: 5}");
    let again = roundtrip(&value, OutputFormat::Binary);
    assert_eq!(again, value);
}

#[test]
fn test_annotation_roundtrip() {
    let value = decode_text("foo::bar::2147483647");
    assert_eq!(
        value.to_json(),
        json!({
            "__ion": "annotation",
            "annotations": ["foo", "bar"],
            "value": {"__ion": "int", "value": "2147483647"}
        })
    );
    assert_roundtrips(&value);
    assert_eq!(to_text(&value).unwrap(), "foo::bar::2147483647");
}

#[test]
fn test_struct_without_special_fields() {
    let value = decode_text("{a: 1, b: \"x\"}");
    for format in FORMATS {
        let again = roundtrip(&value, format);
        let map = again.as_object().unwrap();
        assert_eq!(map.get("a"), Some(&TaggedValue::from(1)));
        assert_eq!(map.get("b"), Some(&TaggedValue::from("x")));
        assert_eq!(map.len(), 2);
    }
}

#[test]
fn test_reserved_field_name_roundtrip() {
    let value = decode_text("{__ion: 'foo'}");
    assert_eq!(
        value.to_json(),
        json!({"__ion:__ion": [{"__ion": "symbol", "value": "foo"}]})
    );
    assert_eq!(to_text(&value).unwrap(), "{__ion:foo}");
    assert_roundtrips(&value);

    let prefixed = decode_text("{'__ion:x': 1}");
    assert_eq!(
        prefixed.to_json(),
        json!({"__ion:__ion:x": [{"__ion": "int", "value": "1"}]})
    );
    assert_roundtrips(&prefixed);
}

#[test]
fn test_blob_and_clob_base64() {
    let blob = decode_text("{{AAECAwQ=}}");
    assert_eq!(blob.to_json(), json!({"__ion": "blob", "value": "AAECAwQ="}));
    assert_roundtrips(&blob);

    let clob = decode_text(r#"{{"hello\x00"}}"#);
    assert_eq!(clob.to_json(), json!({"__ion": "clob", "value": "aGVsbG8A"}));
    assert_roundtrips(&clob);
}

#[test]
fn test_every_typed_null_roundtrips() {
    for ion_type in IonType::ALL {
        let value = if ion_type == IonType::Null {
            TaggedValue::Null
        } else {
            TaggedValue::TypedNull(ion_type)
        };
        assert_roundtrips(&value);
    }
}

#[test]
fn test_timestamps_keep_precision() {
    let inputs = [
        "2007T",
        "2007-02T",
        "2007-02-23",
        "2007-02-23T12:14Z",
        "2007-02-23T12:14:33.079-08:00",
        "2007-02-23T12:14:33.000-00:00",
        "2007-02-23T23:59:59.5+05:30",
        "2000-03-01T00:30+01:00",
    ];
    for input in inputs {
        let value = decode_text(input);
        assert_eq!(
            value.to_json(),
            json!({"__ion": "timestamp", "value": input}),
            "decoding {}",
            input
        );
        assert_roundtrips(&value);
    }
}

#[test]
fn test_decimals_are_exact() {
    let cases = [
        ("-0.0", "-1", "-0"),
        ("1.50", "-2", "150"),
        ("123456789012345678901234567890.5", "-1", "1234567890123456789012345678905"),
        ("1d100", "100", "1"),
        ("0.", "0", "0"),
    ];
    for (input, exp, coef) in cases {
        let value = decode_text(input);
        assert_eq!(
            value.to_json(),
            json!({"__ion": "decimal", "exp": exp, "coef": coef}),
            "decoding {}",
            input
        );
        assert_roundtrips(&value);
    }
}

#[test]
fn test_sexp_and_symbols() {
    let value = decode_text("(+ a 'b c' 1 \"s\")");
    assert_eq!(
        value.to_json(),
        json!({"__ion": "sexp", "value": [
            {"__ion": "symbol", "value": "+"},
            {"__ion": "symbol", "value": "a"},
            {"__ion": "symbol", "value": "b c"},
            {"__ion": "int", "value": "1"},
            "s"
        ]})
    );
    assert_roundtrips(&value);
}

#[test]
fn test_decode_depth_limit() {
    let deep = format!("{}{}", "[".repeat(300), "]".repeat(300));
    assert_eq!(
        decode_document(deep.as_bytes()),
        Err(Error::DepthLimitExceeded { limit: 256 })
    );

    let options = CodecOptions::new().with_max_depth(400);
    assert!(decode_document_with_options(deep.as_bytes(), &options).is_ok());
}

#[test]
fn test_encode_depth_limit() {
    let mut value = TaggedValue::Null;
    for _ in 0..300 {
        value = TaggedValue::Array(vec![value]);
    }
    assert_eq!(
        encode_document(&value, OutputFormat::Binary),
        Err(Error::DepthLimitExceeded { limit: 256 })
    );
}

#[test]
fn test_empty_documents_are_malformed() {
    let inputs: [&[u8]; 4] = [b"", b"  // only a comment\n", b"$ion_1_0", &[0xE0, 0x01, 0x00, 0xEA]];
    for input in inputs {
        assert!(
            matches!(decode_document(input), Err(Error::MalformedInput(_))),
            "{:?}",
            input
        );
    }
}

#[test]
fn test_encoding_mismatch() {
    assert!(matches!(
        from_json_str(r#"{"__ion":"wat","value":1}"#),
        Err(Error::EncodingMismatch(_))
    ));
    assert!(matches!(
        from_json_str(r#"{"a":1,"__ion:a":{"nested":true}}"#),
        Err(Error::EncodingMismatch(_))
    ));

    let mut map = TaggedMap::new();
    map.insert("__ion".to_string(), TaggedValue::from(1));
    assert!(matches!(
        encode_document(&TaggedValue::Object(map), OutputFormat::Text),
        Err(Error::EncodingMismatch(_))
    ));
}

#[test]
fn test_incomplete_typed_null_is_malformed() {
    assert!(matches!(
        from_json_str(r#"{"__ion":"null"}"#),
        Err(Error::MalformedInput(_))
    ));
}

#[test]
fn test_json_text_roundtrip() {
    let value = decode_text(
        "ann::{s: sym, n: null.list, d: 2.0, t: 2020-01-01T, b: {{aGk=}}, l: [1, 2e0, \"x\"], a: 1, a: 2}",
    );
    let text = to_json_string(&value).unwrap();
    let parsed: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, value.to_json());
    assert_eq!(from_json_str(&text).unwrap(), value);
}

#[test]
fn test_decode_all_reads_every_value() {
    let values = decode_all(b"1 {a: 2} [3]", &CodecOptions::default()).unwrap();
    assert_eq!(values.len(), 3);
    assert!(values[1].is_object());

    let options = CodecOptions::default();
    let bytes = encode_document_with_options(&TaggedValue::from("x"), OutputFormat::Binary, &options)
        .unwrap();
    assert_eq!(decode_all(&bytes, &options).unwrap(), [TaggedValue::from("x")]);
}

#[test]
fn test_system_symbol_texts_roundtrip() {
    for text in ["$ion_1_0", "$ion_symbol_table", "$ion_foo", "$ion"] {
        let value = TaggedValue::Symbol(text.to_string());
        assert_roundtrips(&value);
        assert_roundtrips(&TaggedValue::Array(vec![value.clone(), value]));
    }
    assert_eq!(
        to_text(&TaggedValue::Symbol("$ion_1_0".to_string())).unwrap(),
        "'$ion_1_0'"
    );
}

#[test]
fn test_timestamps_at_the_utc_year_bounds() {
    for input in ["0001-01-01T00:00+01:00", "9999-12-31T23:30-01:00"] {
        let value = decode_text(input);
        assert!(
            matches!(
                encode_document(&value, OutputFormat::Binary),
                Err(Error::UnrepresentableMagnitude(_))
            ),
            "{}",
            input
        );
        assert_eq!(roundtrip(&value, OutputFormat::Text), value);
    }
    for input in ["0001-01-01T01:00+01:00", "9999-12-31T22:59-01:00"] {
        assert_roundtrips(&decode_text(input));
    }
}
