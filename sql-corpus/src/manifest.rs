use crate::engine::Engine;
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Parsed `suite.properties`
///
/// Java-properties format, `#` comments. Recognized keys:
///
/// ```text
/// suite.name=rtabench
/// query.<stem>.iterations=5
/// query.<stem>.incompatible=monetdb,questdb
/// ```
///
/// `incompatible` marks engines for which the scenario is intentionally
/// omitted (a feature the dialect cannot express), so a common variant
/// must not be offered to them.
#[derive(Debug, Clone, Default)]
pub struct SuiteManifest {
    pub suite_name: Option<String>,
    iterations: HashMap<String, u32>,
    incompatible: HashMap<String, Vec<Engine>>,
}

impl SuiteManifest {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let mut manifest = SuiteManifest::default();

        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some(idx) = line.find('=') else { continue };
            let key = line[..idx].trim();
            let value = line[idx + 1..].trim();

            if key == "suite.name" {
                manifest.suite_name = Some(value.to_string());
                continue;
            }

            let Some(rest) = key.strip_prefix("query.") else {
                continue;
            };

            // Last segment is the property, everything before is the stem
            let Some(dot) = rest.rfind('.') else { continue };
            let stem = &rest[..dot];
            let property = &rest[dot + 1..];

            match property {
                "iterations" => {
                    let n = value.parse::<u32>().map_err(|e| {
                        Error::Parse(format!("Invalid iterations '{}': {}", value, e))
                    })?;
                    manifest.iterations.insert(stem.to_string(), n);
                }
                "incompatible" => {
                    let engines = value
                        .split(',')
                        .map(|name| Engine::from_string(name.trim()))
                        .collect::<Result<Vec<_>>>()?;
                    manifest.incompatible.insert(stem.to_string(), engines);
                }
                _ => {} // Ignore unknown properties
            }
        }

        Ok(manifest)
    }

    /// Harness repetitions for a query, 1 when unspecified
    pub fn iterations(&self, stem: &str) -> u32 {
        self.iterations.get(stem).copied().unwrap_or(1)
    }

    pub fn is_incompatible(&self, stem: &str, engine: Engine) -> bool {
        self.incompatible
            .get(stem)
            .is_some_and(|engines| engines.contains(&engine))
    }
}
