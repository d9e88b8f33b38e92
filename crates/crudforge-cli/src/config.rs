//! Project configuration
//!
//! Defaults for generation runs come from a `crudforge.{toml,yaml,yml,json}` file at the
//! project root, overridden by `CRUDFORGE_*` environment variables. Command-line flags
//! are applied on top by the `generate` command.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use crudforge_generation::{
    ArtifactKind, ConflictPolicy, FeatureFlags, GenerationOptions, OptionsOverlay, ShellVariant,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Config file names looked up at the project root, in order
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    "crudforge.toml",
    "crudforge.yaml",
    "crudforge.yml",
    "crudforge.json",
];

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "CRUDFORGE_";

/// Project-level generation defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Shell layout
    pub variant: Option<ShellVariant>,
    /// Behaviour for existing files
    pub conflict_policy: Option<ConflictPolicy>,
    /// Artifact kinds to emit
    pub artifact_kinds: Option<BTreeSet<ArtifactKind>>,
    /// Host application under `apps/`
    pub app: Option<String>,
    /// Layout theme preset
    pub theme: Option<String>,
    /// Optional templates
    pub features: Option<FeatureFlags>,
    /// Irregular plurals, singular -> plural
    pub plural_overrides: BTreeMap<String, String>,
}

impl ProjectConfig {
    /// Run options with every unset value taken from the built-in defaults
    pub fn to_options(&self) -> GenerationOptions {
        let defaults = GenerationOptions::default();
        GenerationOptions {
            variant: self.variant.unwrap_or(defaults.variant),
            conflict_policy: self.conflict_policy.unwrap_or(defaults.conflict_policy),
            artifact_kinds: self
                .artifact_kinds
                .clone()
                .unwrap_or(defaults.artifact_kinds),
            features: self.features.unwrap_or(defaults.features),
            theme: self.theme.clone().unwrap_or(defaults.theme),
            app: self.app.clone().unwrap_or(defaults.app),
            plural_overrides: self.plural_overrides.clone(),
            ..defaults
        }
    }

    /// Layer this config under options declared in a schema file
    ///
    /// Only keys the schema sets replace configured values; plural overrides are
    /// merged with the schema's entries taking precedence.
    pub fn merge_schema_options(&self, schema: Option<&OptionsOverlay>) -> GenerationOptions {
        let mut options = self.to_options();
        if let Some(overlay) = schema {
            overlay.apply_to(&mut options);
        }
        options
    }
}

/// Reads project configuration files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a file, picking the format from its extension
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> CliResult<ProjectConfig> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        let parsed = match extension {
            "toml" => toml::from_str(&content).map_err(|e| e.to_string()),
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            "json" => serde_json::from_str(&content).map_err(|e| e.to_string()),
            other => Err(format!("Unsupported file format: {}", other)),
        };

        parsed.map_err(|message| CliError::Config(format!("{}: {}", path.display(), message)))
    }

    /// Load the first config file found in `root`, or defaults if there is none
    pub fn discover(root: &Path) -> CliResult<ProjectConfig> {
        for name in CONFIG_FILE_NAMES {
            let candidate = root.join(name);
            if candidate.is_file() {
                debug!(path = %candidate.display(), "Loading project config");
                return Self::load_from_file(candidate);
            }
        }
        Ok(ProjectConfig::default())
    }

    /// Discover the config in `root` and apply the process environment on top
    pub fn load(root: &Path) -> CliResult<ProjectConfig> {
        let mut config = Self::discover(root)?;
        EnvOverrides::apply(&mut config, std::env::vars())?;
        Ok(config)
    }
}

/// `CRUDFORGE_*` environment overrides
pub struct EnvOverrides;

impl EnvOverrides {
    /// Apply recognised variables from `vars`; unknown `CRUDFORGE_` keys are ignored
    pub fn apply<I>(config: &mut ProjectConfig, vars: I) -> CliResult<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "VARIANT" => {
                    let variant = value
                        .parse::<ShellVariant>()
                        .map_err(|e| CliError::Config(format!("{}: {}", key, e)))?;
                    config.variant = Some(variant);
                }
                "CONFLICT_POLICY" => {
                    let policy = value
                        .parse::<ConflictPolicy>()
                        .map_err(|e| CliError::Config(format!("{}: {}", key, e)))?;
                    config.conflict_policy = Some(policy);
                }
                "APP" => config.app = Some(value),
                "THEME" => config.theme = Some(value),
                _ => debug!(key = %key, "Ignoring unknown environment override"),
            }
        }
        Ok(())
    }
}

/// Walk up from `start` to the first directory containing `apps/`
///
/// Falls back to `start` when no ancestor qualifies.
pub fn find_project_root(start: &Path) -> PathBuf {
    start
        .ancestors()
        .find(|dir| dir.join("apps").is_dir())
        .unwrap_or(start)
        .to_path_buf()
}
