//! Converting an Ion document to tagged JSON and back.
//!
//! Run with: cargo run --example round_trip

use ion_json::{
    decode_document, encode_document, from_json_str, to_json_string_pretty, OutputFormat,
};
use std::error::Error;

const DOCUMENT: &str = r#"
// A shipment record using Ion-only types
shipment::{
    id: 18446744073709551616,
    carrier: ups,
    weight: 12.50,
    ratio: 0.75e0,
    shipped: 2024-05-17T08:30:00.250-07:00,
    label: {{SGVsbG8gSW9u}},
    route: (leg SEA PDX),
    note: null.string,
    stop: "Seattle",
    stop: "Portland"
}
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let value = decode_document(DOCUMENT.as_bytes())?;

    println!("Tagged JSON:");
    let json = to_json_string_pretty(&value)?;
    println!("{}\n", json);

    // The JSON text alone is enough to rebuild the Ion document
    let rebuilt = from_json_str(&json)?;
    assert_eq!(rebuilt, value);

    println!("Ion text:");
    let text = encode_document(&rebuilt, OutputFormat::Pretty)?;
    println!("{}\n", String::from_utf8(text)?);

    let binary = encode_document(&rebuilt, OutputFormat::Binary)?;
    println!("Ion binary: {} bytes", binary.len());
    let hex: Vec<String> = binary.iter().take(16).map(|b| format!("{:02X}", b)).collect();
    println!("First bytes: {}", hex.join(" "));

    assert_eq!(decode_document(&binary)?, value);
    println!("\nBinary round trip preserved every value.");

    Ok(())
}
