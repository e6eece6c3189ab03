//! Shared data structures for the application state
//!
//! These structs represent the records that flow from the form
//! into the datasheet on disk.

use serde::{Deserialize, Serialize};

use crate::tags::TagSelection;

/// Lowest and highest accepted token scale
pub const SCALE_MIN: u8 = 1;
pub const SCALE_MAX: u8 = 10;

/// One tagged image, as stored in the datasheet
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Display name typed by the operator (e.g. "Goblin Warrior")
    pub label: String,
    /// Identifier derived from the label ("Goblin-Warrior") or a fixed constant
    pub key: String,
    /// Name of the collection the art comes from
    pub source: String,
    /// Image references and token scale
    pub art: Art,
    /// Selected tags per category; empty categories are absent
    pub tags: TagSelection,
}

/// Image references of an entry.
///
/// `portrait` and `thumb` always point at image 1; `token` and `subject`
/// point at image 2, which falls back to image 1.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Art {
    pub portrait: String,
    pub thumb: String,
    pub token: String,
    pub subject: String,
    /// Token scale, 1 to 10
    pub scale: u8,
}

impl Art {
    /// Fill all four slots from the two image paths
    pub fn from_paths(primary: String, secondary: String, scale: u8) -> Self {
        Self {
            thumb: primary.clone(),
            portrait: primary,
            subject: secondary.clone(),
            token: secondary,
            scale,
        }
    }
}

/// Turn a label into an entry key: spaces become hyphens
pub fn derive_key(label: &str) -> String {
    label.replace(' ', "-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_key() {
        assert_eq!(derive_key("Goblin Warrior"), "Goblin-Warrior");
        assert_eq!(derive_key("Elf  Sage"), "Elf--Sage");
        assert_eq!(derive_key("Kobold"), "Kobold");
    }

    #[test]
    fn test_entry_field_order() {
        let mut tags = TagSelection::new();
        tags.insert("ancestry", vec!["goblin".to_string()]);
        let entry = Entry {
            label: "Goblin".into(),
            key: "Goblin".into(),
            source: "Token Sammlung".into(),
            art: Art::from_paths("/m/a.png".into(), "/m/b.png".into(), 2),
            tags,
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(
            json,
            concat!(
                r#"{"label":"Goblin","key":"Goblin","source":"Token Sammlung","#,
                r#""art":{"portrait":"/m/a.png","thumb":"/m/a.png","token":"/m/b.png","#,
                r#""subject":"/m/b.png","scale":2},"tags":{"ancestry":["goblin"]}}"#
            )
        );
    }
}
