//! Tag vocabularies and the per-form tag selection
//!
//! The taxonomy is static data: an ordered list of categories, each with an
//! ordered list of allowed tags. The built-in vocabulary can be replaced by a
//! TOML file without touching the code.

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use crate::error::{Error, Result};

const BUILTIN_TAXONOMY: &[(&str, &[&str])] = &[
    (
        "category",
        &[
            "humanoid", "aberrant", "aquatic", "bestial", "constructed", "divine", "draconic",
            "elemental", "fey", "fiendish", "fungal", "monitor", "planar", "plant", "undead",
        ],
    ),
    (
        "ancestry",
        &[
            "dwarf", "elf", "gnome", "goblin", "halfling", "human", "leshy", "orc", "amurrun",
            "azarketi", "fetchling", "hobgoblin", "iruxi", "kholo", "kitsune", "kobold",
            "nagaji", "tengu", "tripkee", "vanara", "ysoki", "anadi", "android", "automaton",
            "conrasu", "fleshwarp", "ghoran", "goloma", "kashrishi", "poppet", "shisk",
            "shoony", "skeleton", "sprite", "strix", "vishkanya", "aiuvarin", "beastkin",
            "changeling", "dhampir", "dromaar", "geniekin", "nephilim",
        ],
    ),
    (
        "equipment",
        &[
            "axe", "bludgeon", "bomb", "bow", "brawling", "crossbow", "dart", "firearm",
            "flail", "knife", "pick", "polearm", "shield", "sling", "sword", "tome", "scroll",
            "focus", "unarmored", "clothing", "light", "medium", "heavy",
        ],
    ),
    (
        "features",
        &[
            "magic", "music", "alchemy", "companion", "dual-wielding", "prosthetic", "nature",
            "tech", "winged",
        ],
    ),
    (
        "family",
        &[
            "civilian", "warrior", "sage", "seafarer", "officer", "outcast", "worker",
            "artisan", "affluent",
        ],
    ),
    ("special", &["bust", "unique", "iconic", "deity"]),
];

/// Categories laid out two checkboxes wide; everything else gets three
const NARROW_CATEGORIES: &[&str] = &["category", "features", "family", "special", "equipment"];

/// One tag group, e.g. `ancestry`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagCategory {
    pub name: String,
    pub tags: Vec<String>,
}

impl TagCategory {
    /// How many checkbox columns the group is laid out in
    pub fn columns(&self) -> usize {
        if NARROW_CATEGORIES.contains(&self.name.as_str()) {
            2
        } else {
            3
        }
    }
}

/// The full, ordered tag vocabulary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    categories: Vec<TagCategory>,
}

#[derive(Deserialize)]
struct TaxonomyFile {
    category: Vec<TagCategory>,
}

impl Taxonomy {
    /// The vocabulary compiled into the binary
    pub fn builtin() -> Self {
        let categories = BUILTIN_TAXONOMY
            .iter()
            .map(|(name, tags)| TagCategory {
                name: name.to_string(),
                tags: tags.iter().map(|t| t.to_string()).collect(),
            })
            .collect();
        Self { categories }
    }

    /// Build a taxonomy, rejecting empty or duplicated categories
    pub fn new(categories: Vec<TagCategory>) -> Result<Self> {
        let mut seen = HashSet::new();
        for category in &categories {
            if !seen.insert(category.name.as_str()) {
                return Err(Error::Config(format!(
                    "tag category '{}' is defined twice",
                    category.name
                )));
            }
            if category.tags.is_empty() {
                return Err(Error::Config(format!(
                    "tag category '{}' has no tags",
                    category.name
                )));
            }
        }
        Ok(Self { categories })
    }

    /// Load `[[category]]` tables from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let file: TaxonomyFile = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        Self::new(file.category)
    }

    /// Configured file if any, otherwise the built-in vocabulary
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn categories(&self) -> &[TagCategory] {
        &self.categories
    }
}

/// Selected tags per category, in taxonomy order.
///
/// Serializes as a JSON object whose keys keep insertion order; categories
/// without any selected tag are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSelection {
    groups: Vec<(String, Vec<String>)>,
}

impl TagSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category; empty tag lists are dropped
    pub fn insert(&mut self, category: impl Into<String>, tags: Vec<String>) {
        if tags.is_empty() {
            return;
        }
        let category = category.into();
        match self.groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, existing)) => *existing = tags,
            None => self.groups.push((category, tags)),
        }
    }

    pub fn get(&self, category: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, tags)| tags.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups.iter().map(|(name, tags)| (name.as_str(), tags.as_slice()))
    }
}

impl Serialize for TagSelection {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.groups.iter().map(|(name, tags)| (name, tags)))
    }
}

impl<'de> Deserialize<'de> for TagSelection {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SelectionVisitor;

        impl<'de> Visitor<'de> for SelectionVisitor {
            type Value = TagSelection;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of category names to tag lists")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut map: A,
            ) -> std::result::Result<TagSelection, A::Error> {
                let mut selection = TagSelection::new();
                while let Some((name, tags)) = map.next_entry::<String, Vec<String>>()? {
                    selection.insert(name, tags);
                }
                Ok(selection)
            }
        }

        deserializer.deserialize_map(SelectionVisitor)
    }
}

/// Checkbox state behind the tag panel.
///
/// Each category carries a "keep tags" flag; after a save only the categories
/// without it are cleared, so a run of similar images can share tags.
#[derive(Debug, Clone)]
pub struct TagBoard {
    taxonomy: Taxonomy,
    /// checked[category][tag], parallel to the taxonomy
    checked: Vec<Vec<bool>>,
    keep: Vec<bool>,
}

impl TagBoard {
    pub fn new(taxonomy: Taxonomy) -> Self {
        let checked = taxonomy
            .categories()
            .iter()
            .map(|c| vec![false; c.tags.len()])
            .collect();
        let keep = vec![false; taxonomy.categories().len()];
        Self {
            taxonomy,
            checked,
            keep,
        }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Check or uncheck a tag; unknown names are ignored
    pub fn toggle(&mut self, category: &str, tag: &str, checked: bool) {
        if let Some((c, t)) = self.position(category, tag) {
            self.checked[c][t] = checked;
        }
    }

    pub fn is_checked(&self, category: &str, tag: &str) -> bool {
        self.position(category, tag)
            .map(|(c, t)| self.checked[c][t])
            .unwrap_or(false)
    }

    pub fn set_keep(&mut self, category: &str, keep: bool) {
        if let Some(c) = self.category_index(category) {
            self.keep[c] = keep;
        }
    }

    pub fn keeps(&self, category: &str) -> bool {
        self.category_index(category)
            .map(|c| self.keep[c])
            .unwrap_or(false)
    }

    /// The checked tags, in taxonomy order, without empty categories
    pub fn selection(&self) -> TagSelection {
        let mut selection = TagSelection::new();
        for (category, checked) in self.taxonomy.categories().iter().zip(&self.checked) {
            let tags = category
                .tags
                .iter()
                .zip(checked)
                .filter(|(_, on)| **on)
                .map(|(tag, _)| tag.clone())
                .collect();
            selection.insert(category.name.clone(), tags);
        }
        selection
    }

    /// Clear every category whose keep flag is off
    pub fn reset_unkept(&mut self) {
        for (checked, &keep) in self.checked.iter_mut().zip(&self.keep) {
            if !keep {
                checked.iter_mut().for_each(|on| *on = false);
            }
        }
    }

    fn category_index(&self, category: &str) -> Option<usize> {
        self.taxonomy
            .categories()
            .iter()
            .position(|c| c.name == category)
    }

    fn position(&self, category: &str, tag: &str) -> Option<(usize, usize)> {
        let c = self.category_index(category)?;
        let t = self.taxonomy.categories()[c]
            .tags
            .iter()
            .position(|name| name == tag)?;
        Some((c, t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let taxonomy = Taxonomy::builtin();
        let names: Vec<&str> = taxonomy.categories().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            ["category", "ancestry", "equipment", "features", "family", "special"]
        );
        assert_eq!(taxonomy.categories()[5].tags, ["bust", "unique", "iconic", "deity"]);
    }

    #[test]
    fn test_columns() {
        let taxonomy = Taxonomy::builtin();
        let ancestry = &taxonomy.categories()[1];
        assert_eq!(ancestry.columns(), 3);
        assert_eq!(taxonomy.categories()[0].columns(), 2);
    }

    #[test]
    fn test_selection_omits_empty_categories() {
        let mut board = TagBoard::new(Taxonomy::builtin());
        board.toggle("ancestry", "goblin", true);

        let json = serde_json::to_value(board.selection()).unwrap();
        assert_eq!(json, serde_json::json!({ "ancestry": ["goblin"] }));
        assert!(board.selection().get("category").is_none());
    }

    #[test]
    fn test_selection_keeps_taxonomy_order() {
        let mut board = TagBoard::new(Taxonomy::builtin());
        board.toggle("special", "unique", true);
        board.toggle("family", "warrior", true);
        board.toggle("ancestry", "orc", true);
        board.toggle("ancestry", "dwarf", true);

        let json = serde_json::to_string(&board.selection()).unwrap();
        assert_eq!(
            json,
            r#"{"ancestry":["dwarf","orc"],"family":["warrior"],"special":["unique"]}"#
        );
    }

    #[test]
    fn test_unknown_tags_are_ignored() {
        let mut board = TagBoard::new(Taxonomy::builtin());
        board.toggle("ancestry", "dragon", true);
        board.toggle("colour", "red", true);
        assert!(board.selection().is_empty());
    }

    #[test]
    fn test_reset_respects_keep_flags() {
        let mut board = TagBoard::new(Taxonomy::builtin());
        board.toggle("ancestry", "elf", true);
        board.toggle("family", "sage", true);
        board.set_keep("family", true);

        board.reset_unkept();

        assert!(!board.is_checked("ancestry", "elf"));
        assert!(board.is_checked("family", "sage"));
        assert!(board.keeps("family"));
    }

    #[test]
    fn test_taxonomy_rejects_duplicates() {
        let category = TagCategory {
            name: "family".into(),
            tags: vec!["sage".into()],
        };
        assert!(Taxonomy::new(vec![category.clone(), category]).is_err());
        assert!(Taxonomy::new(vec![TagCategory {
            name: "empty".into(),
            tags: vec![],
        }])
        .is_err());
    }

    #[test]
    fn test_taxonomy_from_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tags.toml");
        std::fs::write(
            &path,
            "[[category]]\nname = \"mood\"\ntags = [\"grim\", \"cheerful\"]\n",
        )
        .unwrap();

        let taxonomy = Taxonomy::load(Some(path.as_path())).unwrap();
        assert_eq!(taxonomy.categories().len(), 1);
        assert_eq!(taxonomy.categories()[0].tags, ["grim", "cheerful"]);
    }

    #[test]
    fn test_selection_deserializes_in_order() {
        let selection: TagSelection =
            serde_json::from_str(r#"{"family":["sage"],"ancestry":[],"special":["bust"]}"#)
                .unwrap();
        let names: Vec<&str> = selection.iter().map(|(name, _)| name).collect();
        assert_eq!(names, ["family", "special"]);
    }
}
