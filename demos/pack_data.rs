//! Packing data against a schema, with defaults as the fallback.
//!
//! Run with: cargo run --example pack_data

use schema_token::{bitpack, default_object, value, CodecOptions, Node, Value};
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let fields = vec![
        Node::object(
            "offset",
            vec![Node::int("start", -256, 255)?, Node::int("end", -256, 255)?],
        )?,
        Node::optional("label", Node::enumeration("labelValue", ["low", "high"])?),
    ];
    let options = CodecOptions::default();

    let defaults = Value::Object(default_object(&fields));
    println!("Defaults: {:?}\n", defaults);

    let data = value!({"offset": {"start": (-12), "end": 40}, "label": "high"});
    let token = bitpack::encode(&fields, &data, &options)?;
    println!("Data token ({} chars): {}", token.len(), token);

    let decoded = bitpack::decode(&fields, &token, &options)?;
    assert_eq!(decoded, data);
    println!("✓ Round-trip successful");

    // A token that does not fit the schema falls back to the defaults
    let recovered = bitpack::decode(&fields, "!", &options).unwrap_or(defaults.clone());
    assert_eq!(recovered, defaults);
    println!("✓ Bad token replaced by defaults");

    Ok(())
}
