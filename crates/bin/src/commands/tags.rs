//! Tags command - lists the registered operation tags.

use opwire::OpRegistry;

use crate::output::{OutputFormat, print_table};

/// Run the tags command
pub fn run(format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let tags = OpRegistry::global().tags();

    match format {
        OutputFormat::Human => {
            let rows: Vec<Vec<String>> = tags.into_iter().map(|tag| vec![tag]).collect();
            print_table(&["TAG"], &rows);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&tags)?);
        }
    }

    Ok(())
}
