//! Integration tests for the projmap scan/update pipeline and storage.

use std::path::{Path, PathBuf};
use tempfile::tempdir;

use projmap_indexer::storage::IndexStore;
use projmap_indexer::{
    Edge, FilterOptions, IndexMaintainer, IndexWarning, IndexerConfig, IndexerError,
    ProjectIndex, UpdateAction,
};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

/// Helper to create a small TypeScript project
fn create_test_project(base: &Path) -> PathBuf {
    let project = base.join("test_project");
    std::fs::create_dir_all(&project).unwrap();

    write(
        &project,
        "src/index.ts",
        r#"import { App } from './app';
import { format } from './util';
import React from 'react';

export function main(argv: string[]): void {
  new App().run(format(argv));
}
"#,
    );
    write(
        &project,
        "src/app.tsx",
        r#"import { Button } from './components';
import type { Config } from '../config';

export class App {
  private config?: Config;
  run(input: string) { return <Button label={input} />; }
}
"#,
    );
    write(
        &project,
        "src/util.ts",
        "export const format = (xs: string[]) => xs.join(' ');\n",
    );
    write(
        &project,
        "src/components/index.tsx",
        "export { Button } from './button';\n",
    );
    write(
        &project,
        "src/components/button.jsx",
        "export const Button = ({ label }) => <button>{label}</button>;\n",
    );
    write(&project, "config.ts", "export interface Config { debug: boolean }\n");
    write(&project, "src/app.test.ts", "import { App } from './app';\n");
    write(&project, "node_modules/react/index.js", "module.exports = {};\n");
    write(&project, "README.md", "# test\n");

    project
}

fn maintainer() -> IndexMaintainer {
    IndexMaintainer::new(IndexerConfig {
        batch_size: 2,
        ..Default::default()
    })
}

fn scan(project: &Path, filters: &FilterOptions) -> ProjectIndex {
    maintainer().scan(project, filters, None).unwrap().index
}

fn assert_consistent(index: &ProjectIndex) {
    let violations = index.check_invariants();
    assert!(violations.is_empty(), "invariants violated: {violations:?}");

    let mut keys: Vec<&String> = index.files.keys().collect();
    keys.sort();
    keys.dedup();
    assert_eq!(index.nodes.iter().collect::<Vec<_>>(), keys);

    for (path, record) in &index.files {
        let targets: Vec<&str> = index
            .edges
            .iter()
            .filter(|e| &e.from == path)
            .map(|e| e.to.as_str())
            .collect();
        assert_eq!(record.dependencies, targets, "dependencies of {path}");
    }
}

/// Test full scan pipeline end-to-end
#[test]
fn test_scan_pipeline_end_to_end() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());

    let index = scan(&project, &FilterOptions::default());

    assert_eq!(
        index.nodes,
        vec![
            "config.ts",
            "src/app.test.ts",
            "src/app.tsx",
            "src/components/button.jsx",
            "src/components/index.tsx",
            "src/index.ts",
            "src/util.ts",
        ]
    );
    assert_eq!(index.files["src/index.ts"].dependencies, vec!["src/app.tsx", "src/util.ts"]);
    assert_eq!(index.files["src/app.tsx"].dependencies, vec!["config.ts", "src/components/index.tsx"]);
    assert_eq!(
        index.files["src/components/index.tsx"].dependencies,
        vec!["src/components/button.jsx"]
    );
    assert_eq!(index.tree.name, "test_project");
    assert_eq!(index.tree.file_count(), index.nodes.len());
    assert_consistent(&index);

    let main = &index.files["src/index.ts"].functions[0];
    assert_eq!(main.name, "main");
    assert!(main.is_exported);
}

/// Scans are deterministic apart from timestamps
#[test]
fn test_repeated_scans_are_identical() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());

    let first = scan(&project, &FilterOptions::default());
    let mut second = IndexMaintainer::new(IndexerConfig {
        threads: 1,
        batch_size: 1,
        ..Default::default()
    })
    .scan(&project, &FilterOptions::default(), None)
    .unwrap()
    .index;

    second.metadata.created_at = first.metadata.created_at;
    second.metadata.updated_at = first.metadata.updated_at;
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

/// Include then exclude: `src/**` minus `src/**/*.test.*`
#[test]
fn test_include_exclude_precedence() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());

    let index = scan(&project, &FilterOptions::new(["src/**"], ["src/**/*.test.*"]));

    assert!(index.files.contains_key("src/index.ts"));
    assert!(!index.files.contains_key("src/app.test.ts"));
    assert!(!index.files.contains_key("config.ts"));
    // config.ts is outside the filter, so the type import no longer resolves
    assert_eq!(index.files["src/app.tsx"].dependencies, vec!["src/components/index.tsx"]);
    assert_consistent(&index);
}

#[test]
fn test_resolution_prefers_file_over_index() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    write(root, "a.ts", "import './b';\n");
    write(root, "b.ts", "");
    write(root, "b/index.ts", "");

    let index = scan(root, &FilterOptions::default());
    assert_eq!(index.edges, vec![Edge::new("a.ts", "b.ts")]);
}

/// Updating an unchanged file changes nothing but the timestamp
#[test]
fn test_idempotent_update() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    let maintainer = maintainer();

    let mut index = maintainer
        .scan(&project, &FilterOptions::default(), None)
        .unwrap()
        .index;
    let before = index.clone();

    let outcome = maintainer
        .update(&mut index, Path::new("src/app.tsx"), None)
        .unwrap();
    assert_eq!(outcome.action, UpdateAction::Replaced);

    index.metadata.updated_at = before.metadata.updated_at;
    assert_eq!(index, before);
}

/// Deleting an imported file keeps the importer's edge until it is updated
#[test]
fn test_deletion_keeps_incoming_edges() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    write(root, "a.ts", "import { b } from './b';\n");
    write(root, "b.ts", "export const b = 1;\n");
    let maintainer = maintainer();

    let mut index = maintainer
        .scan(root, &FilterOptions::default(), None)
        .unwrap()
        .index;
    assert_eq!(index.edges, vec![Edge::new("a.ts", "b.ts")]);

    std::fs::remove_file(root.join("b.ts")).unwrap();
    let outcome = maintainer
        .update(&mut index, &root.join("b.ts"), None)
        .unwrap();

    assert_eq!(outcome.action, UpdateAction::Removed);
    assert_eq!(index.nodes, vec!["a.ts"]);
    assert!(!index.files.contains_key("b.ts"));
    assert_eq!(index.edges, vec![Edge::new("a.ts", "b.ts")]);
    assert_eq!(index.dangling_edges(), vec![&Edge::new("a.ts", "b.ts")]);
    assert_eq!(index.metadata.total_files, 1);
    assert!(index.tree.find("b.ts").is_none());

    let violations = index.check_invariants();
    assert!(violations.iter().all(|v| v.is_dangling()), "{violations:?}");

    // Updating the importer clears the window.
    maintainer
        .update(&mut index, Path::new("a.ts"), None)
        .unwrap();
    assert!(index.edges.is_empty());
    assert!(index.check_invariants().is_empty());
}

/// Updates never re-parse other files
#[test]
fn test_update_leaves_other_records_untouched() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    write(root, "a.ts", "export const a = 1;\n");
    write(root, "b.ts", "export const b = 2;\n");
    let maintainer = maintainer();

    let mut index = maintainer
        .scan(root, &FilterOptions::default(), None)
        .unwrap()
        .index;

    // Change b on disk without updating it.
    write(root, "b.ts", "export function changed() {}\n");
    write(root, "a.ts", "import './b';\nexport const a = 1;\n");
    maintainer
        .update(&mut index, Path::new("a.ts"), None)
        .unwrap();

    assert_eq!(index.files["b.ts"].constants[0].name, "b");
    assert!(index.files["b.ts"].functions.is_empty());
    assert_eq!(index.files["a.ts"].dependencies, vec!["b.ts"]);
    assert_consistent(&index);
}

#[test]
fn test_update_respects_index_filters() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    let maintainer = maintainer();
    let filters = FilterOptions::new(["src/**"], ["src/**/*.test.*"]);

    let mut index = maintainer.scan(&project, &filters, None).unwrap().index;

    write(&project, "src/new.test.ts", "");
    let outcome = maintainer
        .update(&mut index, Path::new("src/new.test.ts"), None)
        .unwrap();
    assert_eq!(outcome.action, UpdateAction::NotIndexed);

    write(&project, "src/new.ts", "import { format } from './util';\n");
    let outcome = maintainer
        .update(&mut index, Path::new("src/new.ts"), None)
        .unwrap();
    assert_eq!(outcome.action, UpdateAction::Added);
    assert_eq!(index.files["src/new.ts"].dependencies, vec!["src/util.ts"]);
    assert!(index.tree.find("src/new.ts").is_some());
    assert_consistent(&index);
}

/// Malformed input degrades to an empty record plus a warning
#[test]
fn test_malformed_file_does_not_abort_scan() {
    let temp_dir = tempdir().unwrap();
    let root = temp_dir.path();
    write(root, "good.ts", "export const ok = true;\n");
    write(root, "bad.ts", "export class {{{ oops\n");

    let outcome = maintainer()
        .scan(root, &FilterOptions::default(), None)
        .unwrap();

    assert_eq!(outcome.index.nodes, vec!["bad.ts", "good.ts"]);
    assert!(outcome.index.files["bad.ts"].is_empty());
    assert_eq!(outcome.index.files["good.ts"].constants.len(), 1);
    assert!(matches!(
        outcome.warnings.as_slice(),
        [IndexWarning::ParseFailed { path, .. }] if path == "bad.ts"
    ));
}

/// Unsafe patterns are rejected before any traversal
#[test]
fn test_pattern_security() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    let maintainer = maintainer();

    for bad in ["../**", "/etc/**", "src/$(whoami)", "a|b", "!(x).ts"] {
        let err = maintainer
            .scan(&project, &FilterOptions::new([bad], Vec::<String>::new()), None)
            .unwrap_err();
        assert!(
            matches!(err, IndexerError::InvalidPattern { .. }),
            "{bad}: {err}"
        );
    }

    let too_many: Vec<String> = (0..65).map(|i| format!("src/f{i}.ts")).collect();
    let err = maintainer
        .scan(&project, &FilterOptions::new(Vec::<String>::new(), too_many), None)
        .unwrap_err();
    assert!(matches!(err, IndexerError::TooManyPatterns { .. }));

    // A rejected set never reaches the cache.
    assert_eq!(maintainer.cache().stats().entries, 0);
}

#[test]
fn test_pattern_cache_shared_across_scans() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    let maintainer = maintainer();

    maintainer
        .scan(&project, &FilterOptions::new(["src/**", "config.ts"], Vec::<String>::new()), None)
        .unwrap();
    maintainer
        .scan(&project, &FilterOptions::new(["config.ts", "src/**"], Vec::<String>::new()), None)
        .unwrap();

    let stats = maintainer.cache().stats();
    assert_eq!(stats.misses, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_gitignore_is_respected() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    write(&project, ".gitignore", "src/components/\n");

    let index = scan(&project, &FilterOptions::default());
    assert!(!index.nodes.iter().any(|n| n.starts_with("src/components/")));
    assert!(!index.nodes.iter().any(|n| n.starts_with("node_modules/")));
    assert_consistent(&index);
}

#[test]
fn test_missing_root_is_configuration_error() {
    let temp_dir = tempdir().unwrap();
    let err = maintainer()
        .scan(&temp_dir.path().join("nope"), &FilterOptions::default(), None)
        .unwrap_err();
    assert!(matches!(err, IndexerError::RootNotFound(_)));
}

/// Scan, persist, reload, update, persist
#[tokio::test]
async fn test_store_round_trip_with_update() {
    let temp_dir = tempdir().unwrap();
    let project = create_test_project(temp_dir.path());
    let store = IndexStore::new(temp_dir.path().join("index.json"));
    let maintainer = maintainer();

    let index = maintainer
        .scan(&project, &FilterOptions::default(), None)
        .unwrap()
        .index;
    store.save(&index).await.unwrap();
    let first = tokio::fs::read(store.path()).await.unwrap();

    let mut loaded = store.load().await.unwrap();
    assert_eq!(loaded, index);
    store.save(&loaded).await.unwrap();
    assert_eq!(tokio::fs::read(store.path()).await.unwrap(), first);

    maintainer
        .update(&mut loaded, Path::new("src/util.ts"), None)
        .unwrap();
    store.save(&loaded).await.unwrap();
    let reloaded = store.load().await.unwrap();
    assert_eq!(reloaded.nodes, index.nodes);
    assert!(reloaded.metadata.updated_at >= index.metadata.updated_at);
}
