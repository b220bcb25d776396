//! `list` command - show texture paths, their candidates and selections.

use console::style;
use packmixer::catalog::{Catalog, CatalogFilter, CatalogRow};
use packmixer::SelectionState;
use serde_json::{json, Value};

use super::common::{open_mixer, PathOverrides};
use crate::error::CliError;

/// Arguments for the list command.
pub struct ListArgs {
    pub unselected: bool,
    pub search: Option<String>,
    pub json: bool,
}

/// Run the list command.
pub fn run(overrides: &PathOverrides, args: ListArgs) -> Result<(), CliError> {
    let mixer = open_mixer(overrides)?;
    let filter = CatalogFilter {
        unselected_only: args.unselected,
        search: args.search,
    };
    let catalog = mixer.catalog(&filter)?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&catalog_json(&catalog))
            .map_err(|e| CliError::Output(e.to_string()))?;
        println!("{}", rendered);
        return Ok(());
    }

    if catalog.is_empty() {
        println!("No textures match.");
        return Ok(());
    }

    for row in catalog.rows() {
        println!("{}", format_row(row));
    }

    let summary = catalog.summary();
    println!();
    println!(
        "{} textures: {} selected, {} untracked, {} unselected",
        summary.assets, summary.selected, summary.untracked, summary.absent
    );
    Ok(())
}

fn state_label(state: &SelectionState) -> String {
    match state {
        SelectionState::Absent => "-".to_string(),
        SelectionState::Selected(candidate) => candidate.pack_name.clone(),
        SelectionState::Untracked => "untracked".to_string(),
    }
}

fn format_row(row: &CatalogRow) -> String {
    let label = state_label(&row.state);
    let label = match row.state {
        SelectionState::Selected(_) => style(label).green(),
        SelectionState::Untracked => style(label).yellow(),
        SelectionState::Absent => style(label).dim(),
    };

    format!(
        "{:<40} {:<16} [{}]",
        row.display_name,
        label,
        row.candidates.join(", ")
    )
}

fn row_json(row: &CatalogRow) -> Value {
    let (state, selected) = match &row.state {
        SelectionState::Absent => ("absent", Value::Null),
        SelectionState::Selected(candidate) => ("selected", json!(candidate.pack_name)),
        SelectionState::Untracked => ("untracked", Value::Null),
    };

    json!({
        "path": row.rel_path,
        "name": row.display_name,
        "candidates": row.candidates,
        "state": state,
        "selected": selected,
    })
}

fn catalog_json(catalog: &Catalog) -> Value {
    let summary = catalog.summary();
    json!({
        "textures": catalog.rows().iter().map(row_json).collect::<Vec<_>>(),
        "summary": {
            "assets": summary.assets,
            "selected": summary.selected,
            "untracked": summary.untracked,
            "absent": summary.absent,
        },
    })
}
