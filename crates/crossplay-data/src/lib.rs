include!(concat!(env!("OUT_DIR"), "/generated.rs"));

mod mappings;

pub use mappings::*;

/// Bedrock entity identifier for a Java entity type name.
pub fn bedrock_entity_identifier(java_name: &str) -> Option<&'static str> {
    let identifier = match java_name {
        "arrow" => "minecraft:arrow",
        "cat" => "minecraft:cat",
        "creeper" => "minecraft:creeper",
        "ghast" => "minecraft:ghast",
        "item" => "minecraft:item",
        "pig" => "minecraft:pig",
        "skeleton" => "minecraft:skeleton",
        "slime" => "minecraft:slime",
        "wolf" => "minecraft:wolf",
        "zombie" => "minecraft:zombie",
        "player" => "minecraft:player",
        _ => return None,
    };
    Some(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_tables() {
        assert_eq!(java_entity_name(124), Some("wolf"));
        assert_eq!(java_entity_id("creeper"), Some(29));
        assert_eq!(java_entity_dimensions(128), Some((0.6, 1.8)));
        assert_eq!(java_entity_name(-1), None);
    }

    #[test]
    fn test_every_entity_has_bedrock_identifier() {
        for id in 0..200 {
            if let Some(name) = java_entity_name(id) {
                assert!(bedrock_entity_identifier(name).is_some(), "{name} has no identifier");
            }
        }
    }

    #[test]
    fn test_menu_tables() {
        assert_eq!(java_menu_name(2), Some("generic_9x3"));
        assert_eq!(java_menu_slots(5), Some(54));
        assert_eq!(java_menu_slots(8), Some(3));
    }

    #[test]
    fn test_item_tables() {
        let barrier = java_item_id("barrier").unwrap();
        assert_eq!(java_item_name(barrier), Some("barrier"));
        assert_eq!(bedrock_item_id(barrier), Some(-161));
        assert_eq!(bedrock_item_id(0), Some(0));
    }

    #[test]
    fn test_remaps_are_bundled() {
        assert!(BUNDLED_REMAPS.iter().any(|(name, _)| *name == "765_767.json"));
    }
}
