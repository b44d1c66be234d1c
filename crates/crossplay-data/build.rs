use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::Path;

#[derive(Deserialize)]
struct EntityType {
    id: i32,
    name: String,
    width: f32,
    height: f32,
}

#[derive(Deserialize)]
struct Menu {
    id: i32,
    name: String,
    slots: i32,
}

#[derive(Deserialize)]
struct Item {
    id: i32,
    name: String,
    bedrock_id: i32,
}

/// Load a JSON array file and sort it by ID.
fn load_sorted<T: serde::de::DeserializeOwned>(path: &Path, id_fn: fn(&T) -> i32) -> Vec<T> {
    let contents =
        fs::read_to_string(path).unwrap_or_else(|e| panic!("Cannot read {:?}: {}", path, e));
    let mut items: Vec<T> = serde_json::from_str(&contents)
        .unwrap_or_else(|e| panic!("Invalid JSON in {:?}: {}", path, e));
    items.sort_by_key(|item| id_fn(item));
    items
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").unwrap();
    let data_dir = Path::new(&manifest_dir)
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("data");
    let out_dir = std::env::var("OUT_DIR").unwrap();
    println!("cargo:rerun-if-changed={}", data_dir.display());

    let java_dir = data_dir.join("java");
    let entities: Vec<EntityType> = load_sorted(&java_dir.join("entities.json"), |e| e.id);
    let menus: Vec<Menu> = load_sorted(&java_dir.join("menus.json"), |m| m.id);
    let items: Vec<Item> = load_sorted(&java_dir.join("items.json"), |i| i.id);

    let mut out = fs::File::create(Path::new(&out_dir).join("generated.rs")).unwrap();

    // java_entity_name
    writeln!(out, "/// Map Java entity type ID to its name.").unwrap();
    writeln!(out, "pub fn java_entity_name(id: i32) -> Option<&'static str> {{").unwrap();
    writeln!(out, "    match id {{").unwrap();
    for e in &entities {
        writeln!(out, "        {} => Some(\"{}\"),", e.id, e.name).unwrap();
    }
    writeln!(out, "        _ => None,").unwrap();
    writeln!(out, "    }}").unwrap();
    writeln!(out, "}}").unwrap();
    writeln!(out).unwrap();

    // java_entity_id
    writeln!(out, "/// Map Java entity type name to its ID.").unwrap();
    writeln!(out, "pub fn java_entity_id(name: &str) -> Option<i32> {{").unwrap();
    writeln!(out, "    match name {{").unwrap();
    for e in &entities {
        writeln!(out, "        \"{}\" => Some({}),", e.name, e.id).unwrap();
    }
    writeln!(out, "        _ => None,").unwrap();
    writeln!(out, "    }}").unwrap();
    writeln!(out, "}}").unwrap();
    writeln!(out).unwrap();

    // java_entity_dimensions
    writeln!(out, "/// Map Java entity type ID to its (width, height).").unwrap();
    writeln!(out, "pub fn java_entity_dimensions(id: i32) -> Option<(f32, f32)> {{").unwrap();
    writeln!(out, "    match id {{").unwrap();
    for e in &entities {
        writeln!(out, "        {} => Some(({:?}f32, {:?}f32)),", e.id, e.width, e.height).unwrap();
    }
    writeln!(out, "        _ => None,").unwrap();
    writeln!(out, "    }}").unwrap();
    writeln!(out, "}}").unwrap();
    writeln!(out).unwrap();

    // java_menu_name / java_menu_slots
    writeln!(out, "/// Map Java menu type ID to its name.").unwrap();
    writeln!(out, "pub fn java_menu_name(id: i32) -> Option<&'static str> {{").unwrap();
    writeln!(out, "    match id {{").unwrap();
    for m in &menus {
        writeln!(out, "        {} => Some(\"{}\"),", m.id, m.name).unwrap();
    }
    writeln!(out, "        _ => None,").unwrap();
    writeln!(out, "    }}").unwrap();
    writeln!(out, "}}").unwrap();
    writeln!(out).unwrap();

    writeln!(out, "/// Number of container slots (excluding the player inventory) for a Java menu type.").unwrap();
    writeln!(out, "pub fn java_menu_slots(id: i32) -> Option<i32> {{").unwrap();
    writeln!(out, "    match id {{").unwrap();
    for m in &menus {
        writeln!(out, "        {} => Some({}),", m.id, m.slots).unwrap();
    }
    writeln!(out, "        _ => None,").unwrap();
    writeln!(out, "    }}").unwrap();
    writeln!(out, "}}").unwrap();
    writeln!(out).unwrap();

    // items
    writeln!(out, "/// Map Java item ID to item name.").unwrap();
    writeln!(out, "pub fn java_item_name(id: i32) -> Option<&'static str> {{").unwrap();
    writeln!(out, "    match id {{").unwrap();
    for i in &items {
        writeln!(out, "        {} => Some(\"{}\"),", i.id, i.name).unwrap();
    }
    writeln!(out, "        _ => None,").unwrap();
    writeln!(out, "    }}").unwrap();
    writeln!(out, "}}").unwrap();
    writeln!(out).unwrap();

    writeln!(out, "/// Map Java item name to item ID.").unwrap();
    writeln!(out, "pub fn java_item_id(name: &str) -> Option<i32> {{").unwrap();
    writeln!(out, "    match name {{").unwrap();
    for i in &items {
        writeln!(out, "        \"{}\" => Some({}),", i.name, i.id).unwrap();
    }
    writeln!(out, "        _ => None,").unwrap();
    writeln!(out, "    }}").unwrap();
    writeln!(out, "}}").unwrap();
    writeln!(out).unwrap();

    writeln!(out, "/// Map Java item ID to the Bedrock item ID.").unwrap();
    writeln!(out, "pub fn bedrock_item_id(java_id: i32) -> Option<i32> {{").unwrap();
    writeln!(out, "    match java_id {{").unwrap();
    for i in &items {
        writeln!(out, "        {} => Some({}),", i.id, i.bedrock_id).unwrap();
    }
    writeln!(out, "        _ => None,").unwrap();
    writeln!(out, "    }}").unwrap();
    writeln!(out, "}}").unwrap();
    writeln!(out).unwrap();

    // Bundled remap tables: every file under data/mappings/remap.
    let remap_dir = data_dir.join("mappings").join("remap");
    let mut remaps: Vec<_> = fs::read_dir(&remap_dir)
        .unwrap_or_else(|e| panic!("Cannot read directory {:?}: {}", remap_dir, e))
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .collect();
    remaps.sort_by_key(|e| e.file_name());

    writeln!(out, "/// Bundled version remap tables as (file name, contents).").unwrap();
    writeln!(out, "pub const BUNDLED_REMAPS: &[(&str, &str)] = &[").unwrap();
    for entry in remaps {
        writeln!(
            out,
            "    ({:?}, include_str!({:?})),",
            entry.file_name().to_string_lossy(),
            entry.path().display().to_string()
        )
        .unwrap();
    }
    writeln!(out, "];").unwrap();
}
