//! Dotted module name <-> file path mapping.

use indexmap::IndexMap;
use std::collections::HashSet;

use super::model::FileEntity;

pub const PYTHON_SUFFIX: &str = ".py";
pub const PACKAGE_INIT: &str = "__init__";
pub const DEFAULT_ROOT_NAMESPACE: &str = "app";

/// Primary dotted module name of a project-relative file path.
///
/// `pkg/sub/__init__.py` collapses to `pkg.sub`. A root-level `__init__.py`
/// maps to the empty name.
pub fn module_name_for_path(path: &str) -> String {
    let normalized = path.replace('\\', "/");
    let stem = normalized
        .strip_suffix(PYTHON_SUFFIX)
        .unwrap_or(normalized.as_str());
    let dotted = stem.replace('/', ".");

    if dotted == PACKAGE_INIT {
        return String::new();
    }
    match dotted.strip_suffix(".__init__") {
        Some(package) => package.to_string(),
        None => dotted,
    }
}

/// Lookup table from every plausible dotted module name to its file.
///
/// Each file is registered under its primary name and, unless that name
/// already lives under the root namespace, under `{root_namespace}.{name}`.
/// Primary names take precedence over aliases; among equal kinds the first
/// discovered file wins.
#[derive(Debug, Clone, Default)]
pub struct ModuleMap {
    modules: IndexMap<String, String>,
    paths: HashSet<String>,
    root_namespace: String,
}

impl ModuleMap {
    pub fn build<'a, I>(paths: I, root_namespace: &str) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let paths: Vec<&str> = paths.into_iter().collect();
        let mut modules = IndexMap::with_capacity(paths.len() * 2);

        let primary: Vec<(String, &str)> = paths
            .iter()
            .map(|path| (module_name_for_path(path), *path))
            .collect();

        for (name, path) in &primary {
            if !name.is_empty() {
                modules
                    .entry(name.clone())
                    .or_insert_with(|| path.to_string());
            }
        }

        for (name, path) in &primary {
            if let Some(alias) = namespace_alias(name, root_namespace) {
                modules.entry(alias).or_insert_with(|| path.to_string());
            }
        }

        Self {
            modules,
            paths: paths.iter().map(|path| path.to_string()).collect(),
            root_namespace: root_namespace.to_string(),
        }
    }

    pub fn from_files(files: &IndexMap<String, FileEntity>, root_namespace: &str) -> Self {
        Self::build(files.keys().map(String::as_str), root_namespace)
    }

    /// Exact lookup by dotted name.
    pub fn get(&self, module: &str) -> Option<&str> {
        self.modules.get(module).map(String::as_str)
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.modules
            .iter()
            .map(|(module, path)| (module.as_str(), path.as_str()))
    }

    pub fn root_namespace(&self) -> &str {
        &self.root_namespace
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

fn namespace_alias(name: &str, root_namespace: &str) -> Option<String> {
    if root_namespace.is_empty() {
        return None;
    }
    if name.is_empty() {
        return Some(root_namespace.to_string());
    }
    if name == root_namespace || name.starts_with(&format!("{}.", root_namespace)) {
        return None;
    }
    Some(format!("{}.{}", root_namespace, name))
}
