// Show the name variants derived from an entity name

use crudforge_generation::{NameResolver, NameVariants};

use super::Command;
use crate::config::{find_project_root, ConfigLoader};
use crate::error::{CliError, CliResult};
use crate::output::OutputStyle;

/// Print every casing and plural form of a name
pub struct NamesCommand {
    name: String,
    json: bool,
}

impl NamesCommand {
    pub fn new(name: impl Into<String>, json: bool) -> Self {
        Self {
            name: name.into(),
            json,
        }
    }

    /// Resolve with the project's plural overrides
    pub fn resolve(&self) -> CliResult<NameVariants> {
        let root = find_project_root(&std::env::current_dir()?);
        let config = ConfigLoader::load(&root)?;
        let resolver = NameResolver::with_overrides(&config.plural_overrides);
        Ok(resolver.resolve(&self.name)?)
    }

    fn render(style: &OutputStyle, names: &NameVariants) -> Vec<String> {
        let mut lines = vec![style.header(&names.pascal)];
        for (key, value) in [
            ("kebab", &names.kebab),
            ("pascal", &names.pascal),
            ("camel", &names.camel),
            ("snake", &names.snake),
            ("screaming", &names.screaming_snake),
            ("title", &names.title),
            ("plural kebab", &names.plural_kebab),
            ("plural pascal", &names.plural_pascal),
            ("plural camel", &names.plural_camel),
            ("plural snake", &names.plural_snake),
        ] {
            lines.push(style.key_value(key, &style.code(value)));
        }
        lines
    }
}

#[async_trait::async_trait]
impl Command for NamesCommand {
    async fn execute(&self) -> CliResult<()> {
        let names = self.resolve()?;

        if self.json {
            let json = serde_json::to_string_pretty(&names)
                .map_err(|e| CliError::Internal(format!("Failed to serialize names: {}", e)))?;
            println!("{}", json);
        } else {
            for line in Self::render(&OutputStyle::default(), &names) {
                println!("{}", line);
            }
        }
        Ok(())
    }
}
