//! Declarative content bundles: races, classes, items, spells, factions,
//! stories, origins, and per-region world templates (locations, connections,
//! NPCs, quests, shops). Authored as TOML, loaded once at startup into an
//! in-memory `ContentCatalog`, and later instantiated into runtime entities
//! with fresh ids when a new game is created.

mod instantiate;
mod templates;

pub use instantiate::{instantiate_character, instantiate_region};
pub use templates::*;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use wrldcore_domain::model::content_defs::{
    ClassDef, FactionDef, ItemDef, OriginDef, RaceDef, RecipeDef, SpellDef, StoryDef,
};

use crate::error::{EngineError, EngineResult};

/// Every content bundle the core has loaded, keyed by the definition's `id`.
#[derive(Debug, Default, Clone)]
pub struct ContentCatalog {
    pub races: HashMap<String, RaceDef>,
    pub classes: HashMap<String, ClassDef>,
    pub items: HashMap<String, ItemDef>,
    pub spells: HashMap<String, SpellDef>,
    pub factions: HashMap<String, FactionDef>,
    pub stories: HashMap<String, StoryDef>,
    pub origins: HashMap<String, OriginDef>,
    pub recipes: HashMap<String, RecipeDef>,
    pub regions: HashMap<String, RegionBundle>,
}

/// A single region's full template set, grouped the way content authors lay
/// the region out on disk: `regions/<id>/{region,locations,connections,npcs,quests,shops}.toml`.
#[derive(Debug, Default, Clone)]
pub struct RegionBundle {
    pub region: Option<RegionTemplate>,
    pub locations: Vec<LocationTemplate>,
    pub connections: Vec<ConnectionTemplate>,
    pub npcs: Vec<NpcTemplate>,
    pub quests: Vec<QuestTemplate>,
    pub shops: Vec<ShopTemplate>,
}

pub struct ContentLoader;

impl ContentLoader {
    /// Load every bundle under `content_dir`. Missing optional files (a
    /// content pack may not define every category) are skipped, not errors;
    /// a malformed TOML file is a hard `EngineError::SchemaFailure`.
    pub fn load_all(content_dir: impl AsRef<Path>) -> EngineResult<ContentCatalog> {
        let root = content_dir.as_ref();
        let mut catalog = ContentCatalog::default();

        catalog.races = Self::load_table(root, "races.toml", "races")?;
        catalog.classes = Self::load_table(root, "classes.toml", "classes")?;
        catalog.items = Self::load_table(root, "items.toml", "items")?;
        catalog.spells = Self::load_table(root, "spells.toml", "spells")?;
        catalog.factions = Self::load_table(root, "factions.toml", "factions")?;
        catalog.stories = Self::load_table(root, "stories.toml", "stories")?;
        catalog.origins = Self::load_table(root, "origins.toml", "origins")?;
        catalog.recipes = Self::load_table(root, "recipes.toml", "recipes")?;

        let regions_dir = root.join("regions");
        if regions_dir.is_dir() {
            for entry in fs::read_dir(&regions_dir).map_err(|e| schema_err(&regions_dir, e))? {
                let entry = entry.map_err(|e| schema_err(&regions_dir, e))?;
                if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                    continue;
                }
                let region_path = entry.path();
                let bundle = Self::load_region_bundle(&region_path)?;
                if let Some(region) = &bundle.region {
                    catalog.regions.insert(region.id.clone(), bundle);
                } else {
                    let id = region_path.file_name().and_then(|n| n.to_str()).unwrap_or("unknown").to_string();
                    catalog.regions.insert(id, bundle);
                }
            }
        }

        Ok(catalog)
    }

    fn load_region_bundle(dir: &Path) -> EngineResult<RegionBundle> {
        Ok(RegionBundle {
            region: Self::load_optional_single(dir, "region.toml")?,
            locations: Self::load_optional_list(dir, "locations.toml", "locations")?,
            connections: Self::load_optional_list(dir, "connections.toml", "connections")?,
            npcs: Self::load_optional_list(dir, "npcs.toml", "npcs")?,
            quests: Self::load_optional_list(dir, "quests.toml", "quests")?,
            shops: Self::load_optional_list(dir, "shops.toml", "shops")?,
        })
    }

    fn load_table<T: DeserializeOwned>(root: &Path, filename: &str, key: &str) -> EngineResult<HashMap<String, T>>
    where
        T: HasId,
    {
        let list: Vec<T> = Self::load_optional_list(root, filename, key)?;
        Ok(list.into_iter().map(|item| (item.id().to_string(), item)).collect())
    }

    fn load_optional_list<T: DeserializeOwned>(dir: &Path, filename: &str, key: &str) -> EngineResult<Vec<T>> {
        let path = dir.join(filename);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&path).map_err(|e| schema_err(&path, e))?;
        let parsed: toml::Value = toml::from_str(&raw).map_err(|e| schema_toml_err(&path, e))?;
        let array = parsed.get(key).cloned().unwrap_or(toml::Value::Array(Vec::new()));
        Vec::<T>::deserialize(array).map_err(|e: toml::de::Error| schema_toml_err(&path, e))
    }

    fn load_optional_single<T: DeserializeOwned>(dir: &Path, filename: &str) -> EngineResult<Option<T>> {
        let path = dir.join(filename);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path).map_err(|e| schema_err(&path, e))?;
        let parsed = toml::from_str(&raw).map_err(|e| schema_toml_err(&path, e))?;
        Ok(Some(parsed))
    }
}

trait HasId {
    fn id(&self) -> &str;
}

macro_rules! impl_has_id {
    ($ty:ty) => {
        impl HasId for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

impl_has_id!(RaceDef);
impl_has_id!(ClassDef);
impl_has_id!(ItemDef);
impl_has_id!(SpellDef);
impl_has_id!(FactionDef);
impl_has_id!(StoryDef);
impl_has_id!(OriginDef);
impl_has_id!(RecipeDef);

fn schema_err(path: &Path, err: std::io::Error) -> EngineError {
    EngineError::SchemaFailure(format!("{}: {}", path.display(), err))
}

fn schema_toml_err(path: &PathBuf, err: toml::de::Error) -> EngineError {
    EngineError::SchemaFailure(format!("{}: {}", path.display(), err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_flat_category_files() {
        let dir = tempfile::tempdir().unwrap();
        let races_path = dir.path().join("races.toml");
        let mut f = fs::File::create(&races_path).unwrap();
        writeln!(
            f,
            r#"
            [[races]]
            id = "elf"
            name = "Elf"

            [[races]]
            id = "dwarf"
            name = "Dwarf"
            "#
        )
        .unwrap();

        let catalog = ContentLoader::load_all(dir.path()).unwrap();
        assert_eq!(catalog.races.len(), 2);
        assert!(catalog.races.contains_key("elf"));
    }

    #[test]
    fn missing_category_files_are_not_errors() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = ContentLoader::load_all(dir.path()).unwrap();
        assert!(catalog.races.is_empty());
        assert!(catalog.regions.is_empty());
    }
}
