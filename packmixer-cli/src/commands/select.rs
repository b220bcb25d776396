//! `select` and `clear` commands.
//!
//! The texture can be named by its full relative path or by any fragment of
//! it; an ambiguous fragment opens a picker.

use dialoguer::Select;
use packmixer::catalog::{Catalog, CatalogFilter};
use packmixer::selection::SelectOutcome;
use packmixer::{MixError, Mixer, SelectionMap, SelectionState};

use super::common::{open_mixer, PathOverrides};
use crate::error::CliError;

/// Run the select command.
pub fn run_select(
    overrides: &PathOverrides,
    query: &str,
    pack: Option<String>,
) -> Result<(), CliError> {
    let mixer = open_mixer(overrides)?;
    let rel_path = resolve_target(&mixer, query)?;

    let pack = match pack {
        Some(pack) => pack,
        None => prompt_pack(&mixer, &rel_path)?,
    };

    match mixer.apply_selection(&rel_path, &pack)? {
        SelectOutcome::Written => println!("Selected {} for {}", pack, rel_path),
        SelectOutcome::Unchanged => println!("{} is already selected for {}", pack, rel_path),
    }
    Ok(())
}

/// Run the clear command.
pub fn run_clear(overrides: &PathOverrides, query: &str) -> Result<(), CliError> {
    let mixer = open_mixer(overrides)?;
    let rel_path = resolve_target(&mixer, query)?;

    if mixer.clear_selection(&rel_path)? {
        println!("Cleared selection for {}", rel_path);
    } else {
        println!("Nothing selected for {}", rel_path);
    }
    Ok(())
}

/// Map a user-supplied path or fragment to an indexed relative path.
fn resolve_target(mixer: &Mixer, query: &str) -> Result<String, CliError> {
    let query = query.replace('\\', "/");
    let index = mixer.index()?;
    if index.contains(&query) {
        return Ok(query);
    }

    let catalog = Catalog::build(&index, &SelectionMap::new(), &CatalogFilter::default());
    let matches = search_matches(&catalog, &query);

    match matches.as_slice() {
        [] => Err(MixError::UnknownAsset(query).into()),
        [only] => Ok(only.clone()),
        _ => {
            let choice = Select::new()
                .with_prompt(format!("{} textures match '{}'", matches.len(), query))
                .items(&matches)
                .default(0)
                .interact_opt()
                .map_err(|e| CliError::Prompt(e.to_string()))?;
            choice
                .map(|i| matches[i].clone())
                .ok_or_else(|| CliError::Prompt("no texture chosen".to_string()))
        }
    }
}

/// All row paths matching `query`, in catalog order.
fn search_matches(catalog: &Catalog, query: &str) -> Vec<String> {
    let mut cursor = catalog.search(query);
    let mut matches = Vec::with_capacity(cursor.match_count());
    for _ in 0..cursor.match_count() {
        if let Some(row) = cursor.next() {
            matches.push(catalog.rows()[row].rel_path.clone());
        }
    }
    matches
}

/// Ask which pack to use, preselecting the current choice.
fn prompt_pack(mixer: &Mixer, rel_path: &str) -> Result<String, CliError> {
    let index = mixer.index()?;
    let packs: Vec<String> = index
        .candidates(rel_path)
        .iter()
        .map(|c| c.pack_name.clone())
        .collect();

    let current = match mixer.path_state(rel_path)? {
        SelectionState::Selected(candidate) => packs.iter().position(|p| *p == candidate.pack_name),
        _ => None,
    };

    let choice = Select::new()
        .with_prompt(format!("Pack for {}", rel_path))
        .items(&packs)
        .default(current.unwrap_or(0))
        .interact_opt()
        .map_err(|e| CliError::Prompt(e.to_string()))?;

    choice
        .map(|i| packs[i].clone())
        .ok_or_else(|| CliError::Prompt("no pack chosen".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use packmixer::{Candidate, TextureIndex};

    #[test]
    fn test_search_matches_in_order() {
        let mut index = TextureIndex::new();
        index.add_pack("A");
        for path in [
            "assets/minecraft/textures/item/stone_axe.png",
            "assets/minecraft/textures/block/stone.png",
            "assets/minecraft/textures/block/dirt.png",
        ] {
            index.insert(path, Candidate::new("A", format!("/mix/A/{path}")));
        }
        let catalog = Catalog::build(&index, &SelectionMap::new(), &CatalogFilter::default());

        assert_eq!(
            search_matches(&catalog, "STONE"),
            vec![
                "assets/minecraft/textures/block/stone.png".to_string(),
                "assets/minecraft/textures/item/stone_axe.png".to_string(),
            ]
        );
        assert!(search_matches(&catalog, "lava").is_empty());
    }

    #[test]
    fn test_resolve_target_by_fragment() {
        let temp = tempfile::TempDir::new().unwrap();
        let mix = temp.path().join("mix");
        let stone = "assets/minecraft/textures/block/stone.png";
        let path = mix.join("A").join(stone);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"stone").unwrap();

        let mixer = Mixer::open(packmixer::MixerConfig::new(&mix, temp.path().join("out"))).unwrap();

        assert_eq!(resolve_target(&mixer, stone).unwrap(), stone);
        assert_eq!(resolve_target(&mixer, "block\\stone").unwrap(), stone);
        assert!(matches!(
            resolve_target(&mixer, "lava"),
            Err(CliError::Mix(MixError::UnknownAsset(_)))
        ));
    }
}
