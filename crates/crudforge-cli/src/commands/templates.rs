// List the template catalog

use crudforge_generation::{ShellVariant, TemplateDescriptor, TemplateRegistry};

use super::Command;
use crate::error::CliResult;
use crate::output::OutputStyle;

/// Print the registered templates, optionally only those supporting one variant
pub struct TemplatesCommand {
    variant: Option<ShellVariant>,
}

impl TemplatesCommand {
    pub fn new(variant: Option<ShellVariant>) -> Self {
        Self { variant }
    }

    /// Catalog entries matching the variant filter, in catalog order
    pub fn entries(&self) -> Vec<&'static TemplateDescriptor> {
        TemplateRegistry::global()
            .all()
            .iter()
            .filter(|t| self.variant.map_or(true, |v| t.supports(v)))
            .collect()
    }

    fn describe(style: &OutputStyle, template: &TemplateDescriptor) -> String {
        let variants = template
            .variants
            .iter()
            .map(|v| v.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let mut line = format!(
            "  {:<28} {:<18} {}",
            style.code(template.id),
            template.artifact_kind,
            variants
        );
        if let Some(gate) = template.feature_gate {
            line.push_str(&format!(" (requires {})", gate));
        }
        line
    }
}

#[async_trait::async_trait]
impl Command for TemplatesCommand {
    async fn execute(&self) -> CliResult<()> {
        let style = OutputStyle::default();
        let title = match self.variant {
            Some(variant) => format!("Templates for {}", variant),
            None => "Templates".to_string(),
        };
        println!("{}", style.section(&title));
        for template in self.entries() {
            println!("{}", Self::describe(&style, template));
            println!("      -> {}", template.target_path_template);
        }
        Ok(())
    }
}
