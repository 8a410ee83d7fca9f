#![deny(warnings)]

//! Scenario storage: an in-memory repository plus JSON snapshot files.

use outlet_core::{validate_scenario, ScenarioConfig, ScenarioRepository, ValidationError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Default location of the local scenario snapshot.
pub fn default_scenario_path() -> &'static str {
    "./saves/scenarios.json"
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scenario file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scenario {id} is invalid: {source}")]
    Invalid {
        id: String,
        #[source]
        source: ValidationError,
    },
}

/// Scenarios keyed by id. Inserting an existing id replaces it.
#[derive(Clone, Debug, Default)]
pub struct InMemoryRepository {
    scenarios: BTreeMap<String, ScenarioConfig>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a scenario, refreshing its totals snapshot.
    /// Returns the scenario it replaced, if any.
    pub fn insert(&mut self, mut s: ScenarioConfig) -> Result<Option<ScenarioConfig>, StoreError> {
        validate_scenario(&s).map_err(|source| StoreError::Invalid {
            id: s.id.clone(),
            source,
        })?;
        s.totals = Some(s.totals());
        Ok(self.scenarios.insert(s.id.clone(), s))
    }

    pub fn remove(&mut self, id: &str) -> Option<ScenarioConfig> {
        self.scenarios.remove(id)
    }

    /// Stored ids in ascending order.
    pub fn ids(&self) -> Vec<&str> {
        self.scenarios.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScenarioConfig> {
        self.scenarios.values()
    }

    /// Repository holding every scenario in a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut repo = Self::new();
        for s in load_json(path)? {
            repo.insert(s)?;
        }
        Ok(repo)
    }

    /// Write every stored scenario to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let all: Vec<ScenarioConfig> = self.iter().cloned().collect();
        save_json(path, &all)
    }
}

impl ScenarioRepository for InMemoryRepository {
    fn get(&self, id: &str) -> Option<ScenarioConfig> {
        self.scenarios.get(id).cloned()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<ScenarioConfig>),
    One(Box<ScenarioConfig>),
}

/// Parse a JSON document holding either one scenario or an array of them.
pub fn parse_json(src: &str) -> Result<Vec<ScenarioConfig>, StoreError> {
    Ok(match serde_json::from_str(src)? {
        OneOrMany::Many(v) => v,
        OneOrMany::One(s) => vec![*s],
    })
}

pub fn load_json(path: impl AsRef<Path>) -> Result<Vec<ScenarioConfig>, StoreError> {
    let path = path.as_ref();
    let scenarios = parse_json(&fs::read_to_string(path)?)?;
    info!(path = %path.display(), count = scenarios.len(), "scenarios loaded");
    Ok(scenarios)
}

/// Write scenarios as a pretty-printed JSON array, creating parent
/// directories as needed.
pub fn save_json(path: impl AsRef<Path>, scenarios: &[ScenarioConfig]) -> Result<(), StoreError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(scenarios)?)?;
    info!(path = %path.display(), count = scenarios.len(), "scenarios saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use outlet_core::{Role, StaffPosition};
    use proptest::prelude::*;
    use rust_decimal::Decimal;
    use std::path::PathBuf;

    fn scenario(id: &str, waiters: u32) -> ScenarioConfig {
        let mut s = ScenarioConfig::named(id, format!("Scenario {id}"));
        s.foh_positions = vec![StaffPosition::for_role(
            Role::Waiter,
            Decimal::from(3500),
            waiters,
        )];
        s
    }

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("outlet-persistence-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn default_path_is_json() {
        assert!(default_scenario_path().ends_with(".json"));
    }

    #[test]
    fn insert_replace_remove() {
        let mut repo = InMemoryRepository::new();
        assert!(repo.insert(scenario("b", 2)).unwrap().is_none());
        assert!(repo.insert(scenario("a", 1)).unwrap().is_none());
        let replaced = repo.insert(scenario("a", 5)).unwrap();
        assert_eq!(replaced.map(|s| s.total_staff()), Some(1));
        assert_eq!(repo.ids(), ["a", "b"]);
        assert_eq!(repo.get("a").map(|s| s.total_staff()), Some(5));
        assert!(repo.remove("b").is_some());
        assert_eq!(repo.get("b"), None);
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn insert_refreshes_totals() {
        let mut repo = InMemoryRepository::new();
        repo.insert(scenario("a", 4)).unwrap();
        let totals = repo.get("a").and_then(|s| s.totals).unwrap();
        assert_eq!(totals.grand.staff, 4);
        assert_eq!(totals.foh.labor_cost, Decimal::from(14_000));
    }

    #[test]
    fn invalid_scenarios_are_refused() {
        let mut repo = InMemoryRepository::new();
        let err = repo.insert(ScenarioConfig::named("x", "")).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Invalid {
                source: ValidationError::EmptyName,
                ..
            }
        ));
        assert!(repo.is_empty());
    }

    #[test]
    fn parses_single_or_array() {
        let one = r#"{"id":"a","name":"A","foh_positions":[],"boh_positions":[]}"#;
        assert_eq!(parse_json(one).unwrap().len(), 1);
        let many = format!("[{one},{}]", one.replace("\"a\"", "\"b\""));
        let parsed = parse_json(&many).unwrap();
        assert_eq!(parsed[1].id, "b");
        assert!(matches!(parse_json("{\"id\": 3}"), Err(StoreError::Json(_))));
    }

    #[test]
    fn file_round_trip() {
        let path = temp_file("round_trip.json");
        let mut repo = InMemoryRepository::new();
        repo.insert(scenario("a", 3)).unwrap();
        repo.insert(scenario("b", 7)).unwrap();
        repo.save(&path).unwrap();
        let loaded = InMemoryRepository::load(&path).unwrap();
        assert_eq!(loaded.ids(), ["a", "b"]);
        assert_eq!(loaded.get("b"), repo.get("b"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            load_json(temp_file("absent.json")),
            Err(StoreError::Io(_))
        ));
    }

    proptest! {
        #[test]
        fn ids_stay_sorted_and_unique(ids in proptest::collection::vec("[a-z]{1,4}", 0..12)) {
            let mut repo = InMemoryRepository::new();
            for id in &ids {
                repo.insert(scenario(id, 1)).unwrap();
            }
            let listed = repo.ids();
            let mut expected: Vec<&str> = ids.iter().map(String::as_str).collect();
            expected.sort_unstable();
            expected.dedup();
            prop_assert_eq!(listed, expected);
        }
    }
}
