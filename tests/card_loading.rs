//! Card loading tests
//!
//! Loads the shared test deck from disk and checks that effect notation,
//! gates and scopes come through intact.

use bushfire_engine::core::{Gate, Keyword, Phase, ResourceKind, TargetScope, TileEffectKind, TileType, ValueMode};
use bushfire_engine::loader::{CardCatalog, CardLoader};
use bushfire_engine::{EngineError, Result};
use std::path::PathBuf;

fn deck_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/cards.txt")
}

#[test]
fn test_load_shared_deck() -> Result<()> {
    let catalog = CardCatalog::load_from_path(&deck_path())?;
    assert_eq!(catalog.len(), 15);
    assert!(catalog.contains("#F10"));
    assert!(catalog.contains("f10"));
    assert_eq!(catalog.count_with_keyword(Keyword::Cultural), 3);
    assert_eq!(catalog.count_with_keyword(Keyword::Preparation), 4);

    let codes: Vec<&str> = catalog.cards().iter().map(|c| c.code.as_str()).collect();
    let mut sorted = codes.clone();
    sorted.sort_unstable();
    assert_eq!(codes, sorted);
    Ok(())
}

#[test]
fn test_phase_and_input_effects() -> Result<()> {
    let catalog = CardCatalog::load_from_path(&deck_path())?;
    let drive = catalog.get_card("F10").expect("F10 in deck");
    assert_eq!(drive.name.as_str(), "Equipment Drive");
    assert!(drive.uses_phases());
    assert!(!drive.uses_outcomes());

    let bushfire = drive.resource_effects(Some(Phase::Bushfire), None);
    assert_eq!(bushfire.len(), 2);
    assert_eq!(bushfire[1].resource, ResourceKind::FirefightingEquipment);
    assert_eq!(bushfire[1].mode, ValueMode::UseInput(-1));
    assert!(drive.needs_input(Some(Phase::Bushfire), None));
    assert!(!drive.needs_input(Some(Phase::Preparation), None));
    Ok(())
}

#[test]
fn test_outcome_card() -> Result<()> {
    let catalog = CardCatalog::load_from_path(&deck_path())?;
    let harvest = catalog.get_card("C02").expect("C02 in deck");
    assert!(harvest.uses_outcomes());
    assert_eq!(harvest.resource_blocks.len(), 6);
    assert_eq!(harvest.resource_blocks[5].gate, Gate::Outcome(6));
    assert_eq!(harvest.resource_effects(None, Some(6)).len(), 2);
    assert!(harvest.resource_effects(None, Some(7)).is_empty());
    Ok(())
}

#[test]
fn test_tile_effect_scopes() -> Result<()> {
    let catalog = CardCatalog::load_from_path(&deck_path())?;
    let plough = catalog.get_card("C06").expect("C06 in deck");
    let effects = plough.tile_effects(None, None);
    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].kind, TileEffectKind::FuelDelta);
    assert_eq!(effects[0].scope, TargetScope::Class(TileType::Grassland));
    assert_eq!(effects[0].demand(None), 0);

    let truck = catalog.get_card("B05").expect("B05 in deck");
    let effects = truck.tile_effects(Some(Phase::Bushfire), None);
    assert_eq!(effects[0].demand(Some(3)), 3);
    assert!(truck.tile_effects(Some(Phase::Preparation), None).is_empty());
    Ok(())
}

#[test]
fn test_single_card_file() -> Result<()> {
    let dir = std::env::temp_dir().join("bushfire_single_card_test");
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("e09.txt");
    std::fs::write(&path, "ID:E09\nName:Evacuation Drill\nAP:2\nEffects:Happiness:-1; Education:+2\n")?;

    let card = CardLoader::load_from_file(&path)?;
    assert_eq!(card.code.as_str(), "E09");
    assert_eq!(card.action_points, 2);

    let catalog = CardCatalog::load_from_path(&dir)?;
    assert!(catalog.contains("E09"));
    std::fs::remove_dir_all(&dir)?;
    Ok(())
}

#[test]
fn test_duplicate_and_missing_paths() {
    let text = "ID:A01\nName:One\n\nID:#a01\nName:Again\n";
    assert!(CardCatalog::from_text(text).is_err());

    let missing = PathBuf::from("tests/data/does_not_exist.txt");
    assert!(matches!(
        CardCatalog::load_from_path(&missing),
        Err(EngineError::IoError(_))
    ));
}
