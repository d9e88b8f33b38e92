//! Static template catalog
//!
//! The catalog is built once per process and never mutated. Entries are kept in emission
//! order: types and config come before the files importing them, the routes file after
//! the pages it loads, and the barrel file last.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::{
    error::GenerationError,
    models::{ArtifactKind, FeatureFlag, ShellVariant},
};

const ALL_VARIANTS: &[ShellVariant] = &[
    ShellVariant::Simple,
    ShellVariant::Enterprise,
    ShellVariant::MultiApp,
];
const SIMPLE_ONLY: &[ShellVariant] = &[ShellVariant::Simple];
const ENTERPRISE_LAYOUTS: &[ShellVariant] = &[ShellVariant::Enterprise, ShellVariant::MultiApp];

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDescriptor {
    /// Stable template identifier
    pub id: &'static str,
    /// Kind of file produced
    pub artifact_kind: ArtifactKind,
    /// Shell variants the template applies to
    pub variants: &'static [ShellVariant],
    /// Target path pattern, relative to the project root
    pub target_path_template: &'static str,
    /// Flag that must be on for the template to be emitted
    pub feature_gate: Option<FeatureFlag>,
    /// Template body
    pub body: &'static str,
}

impl TemplateDescriptor {
    /// Whether this template applies to `variant`
    pub fn supports(&self, variant: ShellVariant) -> bool {
        self.variants.contains(&variant)
    }
}

static GLOBAL_REGISTRY: Lazy<TemplateRegistry> = Lazy::new(|| {
    let registry = TemplateRegistry::from_descriptors(builtin_catalog());
    debug!(templates = registry.len(), "Template registry initialized");
    registry
});

/// Read-only catalog of templates keyed by artifact kind and shell variant
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    descriptors: Vec<TemplateDescriptor>,
}

impl TemplateRegistry {
    /// The process-wide built-in catalog
    pub fn global() -> &'static TemplateRegistry {
        &GLOBAL_REGISTRY
    }

    /// Build a registry from explicit entries, kept in the given order
    pub fn from_descriptors(descriptors: Vec<TemplateDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Every entry in catalog order
    pub fn all(&self) -> &[TemplateDescriptor] {
        &self.descriptors
    }

    /// Look up an entry by id
    pub fn get(&self, id: &str) -> Option<&TemplateDescriptor> {
        self.descriptors.iter().find(|d| d.id == id)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Templates for the requested kinds under `variant`, in catalog order
    ///
    /// Feature gates are not applied here. Fails if any requested kind has no template
    /// for the variant.
    pub fn templates_for(
        &self,
        kinds: &BTreeSet<ArtifactKind>,
        variant: ShellVariant,
    ) -> Result<Vec<&TemplateDescriptor>, GenerationError> {
        for kind in kinds {
            let available = self
                .descriptors
                .iter()
                .any(|d| d.artifact_kind == *kind && d.supports(variant));
            if !available {
                return Err(GenerationError::UnknownVariant {
                    kind: kind.to_string(),
                    variant: variant.to_string(),
                });
            }
        }

        Ok(self
            .descriptors
            .iter()
            .filter(|d| kinds.contains(&d.artifact_kind) && d.supports(variant))
            .collect())
    }
}

macro_rules! feature_path {
    ($suffix:literal) => {
        concat!("apps/{{app}}/src/app/features/{{kebab}}/", $suffix)
    };
}

fn builtin_catalog() -> Vec<TemplateDescriptor> {
    vec![
        TemplateDescriptor {
            id: "service-types",
            artifact_kind: ArtifactKind::Service,
            variants: ALL_VARIANTS,
            target_path_template: feature_path!("types/{{kebab}}.types.ts"),
            feature_gate: None,
            body: include_str!("../../templates/types.ts.tmpl"),
        },
        TemplateDescriptor {
            id: "service",
            artifact_kind: ArtifactKind::Service,
            variants: ALL_VARIANTS,
            target_path_template: feature_path!("services/{{kebab}}.service.ts"),
            feature_gate: None,
            body: include_str!("../../templates/service.ts.tmpl"),
        },
        TemplateDescriptor {
            id: "shell-config",
            artifact_kind: ArtifactKind::Shell,
            variants: ENTERPRISE_LAYOUTS,
            target_path_template: feature_path!("{{kebab}}.config.ts"),
            feature_gate: None,
            body: include_str!("../../templates/shell.config.ts.tmpl"),
        },
        TemplateDescriptor {
            id: "simple-shell-component",
            artifact_kind: ArtifactKind::Shell,
            variants: SIMPLE_ONLY,
            target_path_template: feature_path!("{{kebab}}-shell.component.ts"),
            feature_gate: None,
            body: include_str!("../../templates/simple-shell.component.ts.tmpl"),
        },
        TemplateDescriptor {
            id: "enterprise-shell-component",
            artifact_kind: ArtifactKind::Shell,
            variants: ENTERPRISE_LAYOUTS,
            target_path_template: feature_path!("{{kebab}}-shell.component.ts"),
            feature_gate: None,
            body: include_str!("../../templates/enterprise-shell.component.ts.tmpl"),
        },
        TemplateDescriptor {
            id: "main-page",
            artifact_kind: ArtifactKind::Page,
            variants: SIMPLE_ONLY,
            target_path_template: feature_path!("pages/main/main.page.ts"),
            feature_gate: None,
            body: include_str!("../../templates/main.page.ts.tmpl"),
        },
        TemplateDescriptor {
            id: "dashboard-page",
            artifact_kind: ArtifactKind::Page,
            variants: ENTERPRISE_LAYOUTS,
            target_path_template: feature_path!("pages/dashboard/dashboard.page.ts"),
            feature_gate: Some(FeatureFlag::Dashboard),
            body: include_str!("../../templates/dashboard.page.ts.tmpl"),
        },
        TemplateDescriptor {
            id: "settings-page",
            artifact_kind: ArtifactKind::Page,
            variants: ENTERPRISE_LAYOUTS,
            target_path_template: feature_path!("pages/settings/settings.page.ts"),
            feature_gate: Some(FeatureFlag::Settings),
            body: include_str!("../../templates/settings.page.ts.tmpl"),
        },
        TemplateDescriptor {
            id: "list-component",
            artifact_kind: ArtifactKind::ListComponent,
            variants: ALL_VARIANTS,
            target_path_template: feature_path!(
                "components/{{kebab}}-list/{{kebab}}-list.component.ts"
            ),
            feature_gate: None,
            body: include_str!("../../templates/list.component.ts.tmpl"),
        },
        TemplateDescriptor {
            id: "detail-component",
            artifact_kind: ArtifactKind::DetailComponent,
            variants: ALL_VARIANTS,
            target_path_template: feature_path!(
                "components/{{kebab}}-detail/{{kebab}}-detail.component.ts"
            ),
            feature_gate: None,
            body: include_str!("../../templates/detail.component.ts.tmpl"),
        },
        TemplateDescriptor {
            id: "simple-routes",
            artifact_kind: ArtifactKind::RoutesFile,
            variants: SIMPLE_ONLY,
            target_path_template: feature_path!("{{kebab}}.routes.ts"),
            feature_gate: None,
            body: include_str!("../../templates/simple.routes.ts.tmpl"),
        },
        TemplateDescriptor {
            id: "enterprise-routes",
            artifact_kind: ArtifactKind::RoutesFile,
            variants: ENTERPRISE_LAYOUTS,
            target_path_template: feature_path!("{{kebab}}.routes.ts"),
            feature_gate: None,
            body: include_str!("../../templates/enterprise.routes.ts.tmpl"),
        },
        TemplateDescriptor {
            id: "route-registration",
            artifact_kind: ArtifactKind::Route,
            variants: ALL_VARIANTS,
            target_path_template: feature_path!("{{kebab}}.route.ts"),
            feature_gate: None,
            body: include_str!("../../templates/route.ts.tmpl"),
        },
        TemplateDescriptor {
            id: "shell-index",
            artifact_kind: ArtifactKind::Shell,
            variants: ALL_VARIANTS,
            target_path_template: feature_path!("index.ts"),
            feature_gate: None,
            body: include_str!("../../templates/index.ts.tmpl"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::TemplateParser;

    const FEATURE_ROOT: &str = "apps/{{app}}/src/app/features/{{kebab}}/";

    fn kinds(kinds: &[ArtifactKind]) -> BTreeSet<ArtifactKind> {
        kinds.iter().copied().collect()
    }

    #[test]
    fn test_every_catalog_template_parses() {
        for descriptor in TemplateRegistry::global().all() {
            TemplateParser::parse(descriptor.body)
                .unwrap_or_else(|e| panic!("{} failed to parse: {}", descriptor.id, e));
            TemplateParser::parse(descriptor.target_path_template)
                .unwrap_or_else(|e| panic!("{} path failed to parse: {}", descriptor.id, e));
            assert!(descriptor.target_path_template.starts_with(FEATURE_ROOT));
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = TemplateRegistry::global();
        let ids: BTreeSet<_> = registry.all().iter().map(|d| d.id).collect();
        assert_eq!(ids.len(), registry.len());
    }

    #[test]
    fn test_simple_shell_has_fewer_templates_than_multi_app() {
        let registry = TemplateRegistry::global();
        let shell = kinds(&[ArtifactKind::Shell]);

        let simple = registry.templates_for(&shell, ShellVariant::Simple).unwrap();
        let multi = registry.templates_for(&shell, ShellVariant::MultiApp).unwrap();

        assert_eq!(simple.len(), 2);
        assert_eq!(multi.len(), 3);
        assert!(simple.iter().all(|d| d.id != "shell-config"));
        assert!(simple.iter().all(|d| d.id != "enterprise-shell-component"));
    }

    #[test]
    fn test_barrel_comes_last_and_types_first() {
        let registry = TemplateRegistry::global();
        let all = kinds(&ArtifactKind::ALL);
        let selected = registry.templates_for(&all, ShellVariant::Enterprise).unwrap();

        assert_eq!(selected.first().map(|d| d.id), Some("service-types"));
        assert_eq!(selected.last().map(|d| d.id), Some("shell-index"));

        let position = |id: &str| selected.iter().position(|d| d.id == id).unwrap();
        assert!(position("dashboard-page") < position("enterprise-routes"));
        assert!(position("service") < position("list-component"));
    }

    #[test]
    fn test_missing_template_for_variant_is_unknown_variant() {
        let registry = TemplateRegistry::from_descriptors(vec![TemplateDescriptor {
            id: "enterprise-only",
            artifact_kind: ArtifactKind::Route,
            variants: ENTERPRISE_LAYOUTS,
            target_path_template: "{{kebab}}.route.ts",
            feature_gate: None,
            body: "{{kebab}}",
        }]);

        let err = registry
            .templates_for(&kinds(&[ArtifactKind::Route]), ShellVariant::Simple)
            .unwrap_err();
        assert!(matches!(err, GenerationError::UnknownVariant { .. }));
        assert!(registry
            .templates_for(&kinds(&[ArtifactKind::Route]), ShellVariant::Enterprise)
            .is_ok());
    }

    #[test]
    fn test_list_and_detail_exist_for_every_variant() {
        let registry = TemplateRegistry::global();
        let components = kinds(&[ArtifactKind::ListComponent, ArtifactKind::DetailComponent]);
        for variant in ShellVariant::ALL {
            assert_eq!(registry.templates_for(&components, variant).unwrap().len(), 2);
        }
    }
}
