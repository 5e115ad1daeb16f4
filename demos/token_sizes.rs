//! Packed vs compressed schema tokens.
//!
//! Run with: cargo run --example token_sizes

use schema_token::{
    decode_compressed, decode_packed, encode_compressed, encode_packed, EnumNode, Node, SchemaFile,
};
use std::error::Error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let fields = vec![
        Node::bool("enabled"),
        Node::int("retries", 0, 10)?,
        Node::fixed("ratio", 0.0, 1.0, 0.01)?,
        Node::enum_array("tags", 0, 4, EnumNode::new("tag", ["red", "green", "blue"])?)?,
        Node::union(
            "action",
            EnumNode::new("type", ["start", "stop"])?,
            vec![
                ("start".to_string(), vec![Node::int("delay", 0, 60)?]),
                ("stop".to_string(), vec![Node::bool("force")]),
            ],
        )?,
    ];

    let json = SchemaFile::new("settings", fields.clone()).to_string_pretty()?;
    println!("JSON ({} chars):\n{}\n", json.len(), json);

    let packed = encode_packed("settings", &fields)?;
    println!("Packed ({} chars): {}", packed.len(), packed);

    let compressed = encode_compressed("settings", &fields).await?;
    println!("Compressed ({} chars): {}\n", compressed.len(), compressed);

    assert_eq!(decode_packed(&packed)?.fields, fields);
    assert_eq!(decode_compressed(&compressed).await?.fields, fields);
    println!("✓ Both tokens decode to the same schema");

    Ok(())
}
