//! Fold command - collapses a sequence of wire operations on one field.

use opwire::{OpRegistry, Operation, Value, codec, ops::PendingOps};

use crate::cli::FoldArgs;
use crate::output::OutputFormat;

/// The folded operation for a field and, given a base value, its estimate.
#[derive(Debug)]
pub(crate) struct Folded {
    pub operation: Option<Operation>,
    pub estimate: Option<Value>,
}

/// Decodes every operation in `ops` and merges them in order.
///
/// Fails on a non-array input, an unrecognized operation tag or an invalid
/// sequence.
pub(crate) fn fold(
    ops: serde_json::Value,
    key: &str,
    base: Option<serde_json::Value>,
) -> Result<Folded, Box<dyn std::error::Error>> {
    let serde_json::Value::Array(ops) = ops else {
        return Err("expected a JSON array of operations".into());
    };

    let registry = OpRegistry::global();
    let mut queue = PendingOps::new();
    for (index, wire) in ops.into_iter().enumerate() {
        let op = registry
            .decode_json(wire)?
            .ok_or_else(|| format!("operation {index} has no registered __op tag"))?;
        queue.apply(key, op)?;
    }

    let base = base.map(|base| codec::decode_json(Some(key), base));
    let estimate = queue.estimate(key, base.as_ref())?;

    Ok(Folded {
        operation: queue.remove(key),
        estimate,
    })
}

/// Run the fold command
pub fn run(args: &FoldArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let ops = super::read_json(args.file.as_deref())?;
    let base = args
        .base
        .as_deref()
        .map(serde_json::from_str::<serde_json::Value>)
        .transpose()?;
    let folded = fold(ops, &args.key, base)?;

    let wire = folded.operation.as_ref().map(Operation::to_wire).transpose()?;
    let estimate = folded
        .estimate
        .as_ref()
        .map(|value| codec::encode(value, None, false))
        .transpose()?;

    match format {
        OutputFormat::Human => {
            match &folded.operation {
                Some(op) => println!("Operation: {}", op.kind()),
                None => println!("Operation: none"),
            }
            if let Some(wire) = &wire {
                println!("Wire:      {}", serde_json::to_string(wire)?);
            }
            if args.base.is_some() {
                match &folded.estimate {
                    Some(value) => println!("Estimate:  {value}"),
                    None => println!("Estimate:  (absent)"),
                }
            }
        }
        OutputFormat::Json => {
            let value = serde_json::json!({
                "key": args.key,
                "operation": wire,
                "estimate": estimate,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }

    Ok(())
}
