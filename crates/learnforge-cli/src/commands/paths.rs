//! The `learnforge paths` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use learnforge_core::learning_path::completion_percent;

use crate::client::ApiClient;

pub async fn execute(server: String, token: String) -> Result<()> {
    let mut client = ApiClient::new(&server, &token);
    let paths = client.list_learning_paths().await?;

    if paths.is_empty() {
        println!("No learning paths.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Status", "Modules", "Complete"]);
    for path in &paths {
        table.add_row(vec![
            Cell::new(path.id),
            Cell::new(&path.title),
            Cell::new(path.status),
            Cell::new(path.modules.len()),
            Cell::new(format!("{}%", completion_percent(&path.modules))),
        ]);
    }
    println!("{table}");
    Ok(())
}
