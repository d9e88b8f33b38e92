//! Regeneration against a real directory
//!
//! Running the same schema twice must leave the tree untouched under skip-existing and
//! produce byte-identical files under overwrite.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use crudforge_generation::{
    ConflictPolicy, EntitySchema, FieldDescriptor, FieldType, FileAction, GenerationOptions,
    GenerationOrchestrator, LocalFileSystem, RelationDescriptor, RelationKind, ShellVariant,
};
use tempfile::TempDir;

fn schema() -> EntitySchema {
    EntitySchema::new("inventory budget")
        .with_field(FieldDescriptor::new("code", FieldType::String).required())
        .with_field(FieldDescriptor::new("amount", FieldType::Number).required())
        .with_field(FieldDescriptor::new("approved", FieldType::Boolean))
        .with_field(FieldDescriptor::new("fiscal_year", FieldType::Date))
        .with_field(
            FieldDescriptor::new("status", FieldType::Enum)
                .with_values(["draft", "approved", "closed"]),
        )
        .with_field(FieldDescriptor::new("department", FieldType::Reference).referencing("department"))
        .with_relation(RelationDescriptor {
            name: "line items".into(),
            target: "budget line".into(),
            kind: RelationKind::OneToMany,
        })
}

/// Every file under `root`, keyed by relative path
fn snapshot(root: &Path) -> BTreeMap<PathBuf, String> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, String>) {
        for entry in fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                out.insert(relative, fs::read_to_string(&path).unwrap());
            }
        }
    }

    let mut out = BTreeMap::new();
    walk(root, root, &mut out);
    out
}

#[test]
fn test_second_run_skips_everything() {
    for variant in ShellVariant::ALL {
        let dir = TempDir::new().unwrap();
        let fs = LocalFileSystem::new(dir.path());
        let orchestrator = GenerationOrchestrator::new(&fs);
        let options = GenerationOptions::for_variant(variant);

        let first = orchestrator.generate(&schema(), &options).unwrap();
        assert_eq!(first.created, first.total, "variant {}", variant);
        let before = snapshot(dir.path());
        assert_eq!(before.len(), first.total);

        let second = orchestrator.generate(&schema(), &options).unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.skipped, second.total);
        assert_eq!(second.total, first.total);
        assert_eq!(snapshot(dir.path()), before);
    }
}

#[test]
fn test_overwrite_twice_is_byte_identical() {
    let dir = TempDir::new().unwrap();
    let fs = LocalFileSystem::new(dir.path());
    let orchestrator = GenerationOrchestrator::new(&fs);
    let options =
        GenerationOptions::for_variant(ShellVariant::MultiApp).with_policy(ConflictPolicy::Overwrite);

    orchestrator.generate(&schema(), &options).unwrap();
    let first = snapshot(dir.path());

    let report = orchestrator.generate(&schema(), &options).unwrap();
    assert_eq!(report.overwritten, report.total);
    assert_eq!(snapshot(dir.path()), first);
}

#[test]
fn test_outputs_land_under_feature_directory() {
    let dir = TempDir::new().unwrap();
    let fs = LocalFileSystem::new(dir.path());
    let options = GenerationOptions {
        app: "admin".to_string(),
        ..GenerationOptions::for_variant(ShellVariant::Simple)
    };

    let report = GenerationOrchestrator::new(&fs).generate(&schema(), &options).unwrap();
    for result in &report.results {
        assert!(result
            .path
            .starts_with("apps/admin/src/app/features/inventory-budget"));
        assert_eq!(result.action, FileAction::Created);
    }

    let files = snapshot(dir.path());
    for content in files.values() {
        assert!(content.ends_with('\n'));
        assert!(!content.ends_with("\n\n"));
        assert!(content.lines().all(|line| line == line.trim_end()));
    }
}

#[test]
fn test_existing_hand_edits_survive_skip_existing() {
    let dir = TempDir::new().unwrap();
    let fs = LocalFileSystem::new(dir.path());
    let orchestrator = GenerationOrchestrator::new(&fs);
    let options = GenerationOptions::default();

    orchestrator.generate(&schema(), &options).unwrap();
    let edited = dir
        .path()
        .join("apps/web/src/app/features/inventory-budget/inventory-budget.route.ts");
    fs::write(&edited, "// customized\n").unwrap();

    let report = orchestrator.generate(&schema(), &options).unwrap();
    assert_eq!(report.created, 0);
    assert_eq!(fs::read_to_string(&edited).unwrap(), "// customized\n");
}
