//! Decode command - interprets a wire document and writes it back canonically.

use opwire::{Value, codec, traverse};

use crate::cli::DecodeArgs;
use crate::output::{OutputFormat, print_table};

/// Decodes `wire` and re-encodes it, embedding clean entities when `embed` is set.
pub(crate) fn canonicalize(
    wire: serde_json::Value,
    key: Option<&str>,
    embed: bool,
) -> opwire::Result<(Value, serde_json::Value)> {
    let value = codec::decode_json(key, wire);
    let seen = embed.then_some(&[][..]);
    let encoded = codec::encode(&value, seen, false)?;
    Ok((value, encoded))
}

/// Run the decode command
pub fn run(args: &DecodeArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let wire = super::read_json(args.file.as_deref())?;
    let (value, encoded) = canonicalize(wire, args.key.as_deref(), args.embed)?;
    let entities = traverse::entities(&value);
    tracing::debug!(kind = value.type_name(), entities = entities.len(), "Decoded wire document");

    match format {
        OutputFormat::Human => {
            println!("Kind:      {}", value.type_name());
            println!("Entities:  {}", entities.len());
            let rows: Vec<Vec<String>> = entities
                .iter()
                .map(|entity| {
                    vec![
                        entity.class_name(),
                        entity.id().unwrap_or_else(|| "-".to_string()),
                        entity.has_fetched_data().to_string(),
                    ]
                })
                .collect();
            if !rows.is_empty() {
                println!();
                print_table(&["CLASS", "ID", "FETCHED"], &rows);
            }
            println!();
            println!("{}", serde_json::to_string_pretty(&encoded)?);
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "kind": value.type_name(),
                "entities": entities.len(),
                "wire": encoded,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
