use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    carousels: HashMap<String, String>,
    traces: HashMap<String, TraceEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TraceEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        config: Option<String>,
    },
}

impl TraceEntry {
    fn as_path(&self) -> &str {
        match self {
            TraceEntry::Path(path) => path,
            TraceEntry::Detailed { path, .. } => path,
        }
    }

    fn config(&self) -> Option<&str> {
        match self {
            TraceEntry::Path(_) => None,
            TraceEntry::Detailed { config, .. } => config.as_deref(),
        }
    }
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json<T: DeserializeOwned>(rel: &str) -> Result<T> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

/// Carousel configurations (partial `CarouselConfig` JSON objects).
pub mod carousels {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.carousels.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.carousels, "carousel", name)?;
        read_to_string(rel)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let rel = lookup(&MANIFEST.carousels, "carousel", name)?;
        super::load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.carousels, "carousel", name)?;
        Ok(resolve_path(rel))
    }
}

/// Recorded input traces with the state expected after replaying them.
pub mod traces {
    use super::*;

    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.traces.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.traces, "trace", name)?;
        read_to_string(entry.as_path())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        let entry = lookup(&MANIFEST.traces, "trace", name)?;
        super::load_json(entry.as_path())
    }

    /// Name of the carousel config the trace was recorded with, if not the default.
    pub fn config_name(name: &str) -> Result<Option<String>> {
        let entry = lookup(&MANIFEST.traces, "trace", name)?;
        Ok(entry.config().map(str::to_string))
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let entry = lookup(&MANIFEST.traces, "trace", name)?;
        Ok(resolve_path(entry.as_path()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_entries_exist_on_disk() {
        for name in carousels::keys() {
            assert!(carousels::path(&name).unwrap().exists(), "{name}");
        }
        for name in traces::keys() {
            assert!(traces::path(&name).unwrap().exists(), "{name}");
            if let Some(cfg) = traces::config_name(&name).unwrap() {
                assert!(carousels::path(&cfg).is_ok(), "{name} -> {cfg}");
            }
        }
    }

    #[test]
    fn unknown_names_are_errors() {
        assert!(carousels::json("missing").is_err());
        assert!(traces::load::<serde_json::Value>("missing").is_err());
    }
}
