//! Schema command implementation.

use crate::cli::SchemaArgs;
use crate::error::Result;
use crate::output::Formatter;
use cropwatch_domain::RequestKind;

/// Execute the schema command.
pub fn execute_schema(args: SchemaArgs, formatter: &Formatter) -> Result<()> {
    let kinds = match args.kind {
        Some(kind) => vec![kind],
        None => RequestKind::ALL.to_vec(),
    };
    println!("{}", formatter.format_schemas(&kinds)?);
    Ok(())
}
