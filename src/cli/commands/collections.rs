//! Collections command implementation

use crate::cli::commands::Connection;
use crate::cli::error::CliError;

/// Handle the collections command: list the database's collections
pub fn handle_collections(connection: &Connection) -> Result<(), CliError> {
    let store = connection.connect()?;
    let mut names = store.collection_names()?;
    names.sort();

    if names.is_empty() {
        println!("No collections found");
        return Ok(());
    }

    println!("Found {} collection(s):", names.len());
    for name in names {
        println!("  - {}", name);
    }
    Ok(())
}
