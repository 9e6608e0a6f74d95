use super::*;

use tempfile::TempDir;

use crate::record::ProviderMap;

fn payload(name: &str) -> ProviderMap {
    let mut map = ProviderMap::new();
    map.insert(
        "FR".to_string(),
        crate::record::RegionAvailability {
            link: None,
            rent: Vec::new(),
            buy: Vec::new(),
            flatrate: vec![name.to_string()],
        },
    );
    map
}

#[test]
fn missing_file_is_cold_start() {
    let dir = TempDir::new().unwrap();
    let cache: Cache<ProviderMap> = Cache::load(dir.path().join("providers_cache.json"));
    assert!(cache.is_empty());
}

#[test]
fn malformed_file_is_cold_start() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("providers_cache.json");
    fs::write(&path, "{ not json").unwrap();

    let cache: Cache<ProviderMap> = Cache::load(path);
    assert!(cache.is_empty());
}

#[test]
fn checkpoint_round_trips() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("providers_cache.json");

    let mut cache: Cache<ProviderMap> = Cache::load(path.clone());
    cache.insert(603, payload("Netflix"));
    cache.insert(604, payload("Canal+"));
    cache.checkpoint().unwrap();

    let reloaded: Cache<ProviderMap> = Cache::load(path);
    assert_eq!(reloaded.len(), 2);
    assert_eq!(reloaded.get(603), Some(&payload("Netflix")));
    assert!(reloaded.contains(604));
    assert!(!reloaded.contains(605));
}

#[test]
fn checkpoint_leaves_no_temp_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cast_cache.json");

    let mut cache: Cache<ProviderMap> = Cache::load(path);
    cache.insert(1, payload("Netflix"));
    cache.checkpoint().unwrap();

    let names: Vec<String> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["cast_cache.json".to_string()]);
}

#[test]
fn checkpoint_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("cache").join("cast_cache.json");

    let mut cache: Cache<ProviderMap> = Cache::load(path.clone());
    cache.insert(1, payload("Netflix"));
    cache.checkpoint().unwrap();

    assert!(path.exists());
}

#[test]
fn keys_are_stringified_ids() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("providers_cache.json");

    let mut cache: Cache<ProviderMap> = Cache::load(path.clone());
    cache.insert(603, payload("Netflix"));
    cache.checkpoint().unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert!(raw.get("603").is_some());
}
