//! CLI Personas Command

use anyhow::Result;

use promptproxy_prompt::PersonaRegistry;

use crate::terminal_output::{render_table, Column};

pub fn run(json: bool) -> Result<()> {
    let registry = PersonaRegistry::builtin();

    if json {
        println!("{}", serde_json::to_string_pretty(registry.list())?);
        return Ok(());
    }

    let columns = [
        Column::left("Key"),
        Column::left("Label"),
        Column::left("Description").max_width(72),
    ];
    let rows: Vec<Vec<String>> = registry
        .list()
        .iter()
        .map(|p| vec![p.key.to_string(), p.label.clone(), p.description.to_string()])
        .collect();
    print!("{}", render_table(&columns, &rows));
    Ok(())
}
