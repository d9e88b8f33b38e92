//! Naming resolution
//!
//! Derives every casing of an entity name that templates refer to. Pluralization is a
//! fixed suffix rule set applied to the last word, with a caller-supplied override table
//! taking precedence for irregular nouns.

use std::collections::BTreeMap;

use heck::{
    ToKebabCase, ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase, ToTitleCase,
};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::{error::GenerationError, models::NameVariants};

static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9_\- ]*$").expect("name pattern is a valid regex")
});

/// Resolves entity names into [`NameVariants`]
#[derive(Debug, Clone, Default)]
pub struct NameResolver {
    /// Irregular plurals keyed by kebab-case singular
    overrides: BTreeMap<String, String>,
}

impl NameResolver {
    /// Resolver using only the suffix rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with an override table for irregular plurals
    ///
    /// Keys and values may be in any casing; both are normalized to kebab-case. An
    /// override may name a whole entity (`"drug-unit" -> "drug-units"`) or a single
    /// trailing word (`"person" -> "people"`).
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let overrides = overrides
            .iter()
            .map(|(singular, plural)| (singular.to_kebab_case(), plural.to_kebab_case()))
            .collect();
        Self { overrides }
    }

    /// Validate a raw entity name
    pub fn validate(name: &str) -> Result<(), GenerationError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(GenerationError::InvalidName {
                name: name.to_string(),
                reason: "name is empty".to_string(),
            });
        }
        if !NAME_PATTERN.is_match(trimmed) {
            let reason = if trimmed.starts_with(|c: char| c.is_ascii_alphabetic()) {
                "only letters, digits, '_', '-' and spaces are allowed"
            } else {
                "name must start with a letter"
            };
            return Err(GenerationError::InvalidName {
                name: name.to_string(),
                reason: reason.to_string(),
            });
        }
        Ok(())
    }

    /// Compute every name variant for `name`
    pub fn resolve(&self, name: &str) -> Result<NameVariants, GenerationError> {
        Self::validate(name)?;

        let kebab = name.trim().to_kebab_case();
        if kebab.is_empty() {
            return Err(GenerationError::InvalidName {
                name: name.to_string(),
                reason: "name has no word characters".to_string(),
            });
        }
        let plural_kebab = self.pluralize(&kebab);

        Ok(NameVariants {
            pascal: kebab.to_pascal_case(),
            camel: kebab.to_lower_camel_case(),
            snake: kebab.to_snake_case(),
            screaming_snake: kebab.to_shouty_snake_case(),
            title: kebab.to_title_case(),
            plural_pascal: plural_kebab.to_pascal_case(),
            plural_camel: plural_kebab.to_lower_camel_case(),
            plural_snake: plural_kebab.to_snake_case(),
            plural_kebab,
            kebab,
        })
    }

    /// Pluralize a kebab-case name
    fn pluralize(&self, kebab: &str) -> String {
        if let Some(plural) = self.overrides.get(kebab) {
            return plural.clone();
        }

        let (head, last) = match kebab.rsplit_once('-') {
            Some((head, last)) => (Some(head), last),
            None => (None, kebab),
        };

        let plural_last = self
            .overrides
            .get(last)
            .cloned()
            .unwrap_or_else(|| pluralize_word(last));

        match head {
            Some(head) => format!("{}-{}", head, plural_last),
            None => plural_last,
        }
    }
}

/// Regular English suffix rules
fn pluralize_word(word: &str) -> String {
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u');

    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !is_vowel(c)) {
            return format!("{}ies", stem);
        }
    }

    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        return format!("{}es", word);
    }

    format!("{}s", word)
}
