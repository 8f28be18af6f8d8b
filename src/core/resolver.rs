//! Import statements resolved to the project files they name.

use std::collections::BTreeSet;

use super::model::{ClassReference, ImportKind, ImportRecord, WILDCARD};
use super::module_map::{module_name_for_path, ModuleMap, PYTHON_SUFFIX};

/// Resolves import statements to the project files they denote.
///
/// Every strategy contributes to one result set; nothing short-circuits on
/// the first match, so a package import can fan out to several submodules.
#[derive(Debug, Clone, Copy)]
pub struct ImportResolver<'a> {
    modules: &'a ModuleMap,
}

impl<'a> ImportResolver<'a> {
    pub fn new(modules: &'a ModuleMap) -> Self {
        Self { modules }
    }

    /// Absolute dotted name targeted by `import`, seen from `current_file`.
    ///
    /// Relative imports start from the importing file's own module name
    /// (package initializers already collapsed) and drop one trailing
    /// segment per level before appending the imported module.
    pub fn absolute_name(&self, import: &ImportRecord, current_file: &str) -> Option<String> {
        absolute_module_name(import, current_file)
    }

    /// Files denoted by `import`. An empty set is the normal outcome for
    /// external or unknown modules.
    pub fn resolve(&self, import: &ImportRecord, current_file: &str) -> BTreeSet<String> {
        let mut targets = BTreeSet::new();
        let Some(target_module) = self.absolute_name(import, current_file) else {
            return targets;
        };

        self.resolve_direct(&target_module, &mut targets);

        for name in import.names.iter().filter(|name| name.as_str() != WILDCARD) {
            self.resolve_submodule(&target_module, name, &mut targets);
            self.resolve_nested_submodule(&target_module, name, &mut targets);
            self.resolve_by_path(&target_module, name, &mut targets);
        }

        targets
    }

    /// Resolution of `import` refined by an attribute chain that uses one of
    /// its bound names, e.g. `pkg.sub.func` after `import pkg`.
    pub fn resolve_reference(
        &self,
        import: &ImportRecord,
        reference: &ClassReference,
        current_file: &str,
    ) -> BTreeSet<String> {
        let mut targets = self.resolve(import, current_file);
        targets.extend(self.resolve_chain(import, reference, current_file));
        targets
    }

    /// Modules named by each prefix of the reference chain, rooted at the
    /// module the reference's base name is bound to.
    pub fn resolve_chain(
        &self,
        import: &ImportRecord,
        reference: &ClassReference,
        current_file: &str,
    ) -> BTreeSet<String> {
        let mut targets = BTreeSet::new();
        let Some(mut candidate) = self.binding_module(import, &reference.base_name, current_file)
        else {
            return targets;
        };

        for segment in reference.full_path.split('.').skip(1) {
            candidate.push('.');
            candidate.push_str(segment);
            self.resolve_direct(&candidate, &mut targets);
        }

        targets
    }

    /// Dotted module a bound name stands for inside the importing file.
    fn binding_module(
        &self,
        import: &ImportRecord,
        bound_name: &str,
        current_file: &str,
    ) -> Option<String> {
        if bound_name == WILDCARD || !import.binds(bound_name) {
            return None;
        }

        match import.kind {
            ImportKind::Import => {
                let module = import.module.as_deref()?;
                // `import a.b` binds `a`; `import a.b as x` binds `x` to `a.b`.
                if import.root_name() == Some(bound_name) {
                    Some(bound_name.to_string())
                } else {
                    Some(module.to_string())
                }
            }
            ImportKind::FromImport => {
                let base = self.absolute_name(import, current_file)?;
                Some(format!("{}.{}", base, bound_name))
            }
        }
    }

    fn resolve_direct(&self, module: &str, targets: &mut BTreeSet<String>) {
        if let Some(file) = self.modules.get(module) {
            targets.insert(file.to_string());
        }
    }

    /// `{module}.{name}` as a submodule.
    fn resolve_submodule(&self, module: &str, name: &str, targets: &mut BTreeSet<String>) {
        self.resolve_direct(&format!("{}.{}", module, name), targets);
    }

    /// Any registered `{module}.….{name}`.
    fn resolve_nested_submodule(&self, module: &str, name: &str, targets: &mut BTreeSet<String>) {
        let prefix = format!("{}.", module);
        let suffix = format!(".{}", name);

        for (candidate, file) in self.modules.iter() {
            if candidate.starts_with(&prefix) && candidate.ends_with(&suffix) {
                targets.insert(file.to_string());
            }
        }
    }

    /// `{module as path}/{name}.py` checked against the known file paths.
    fn resolve_by_path(&self, module: &str, name: &str, targets: &mut BTreeSet<String>) {
        let expected = format!("{}/{}{}", module.replace('.', "/"), name, PYTHON_SUFFIX);
        if self.modules.contains_path(&expected) {
            targets.insert(expected);
        }
    }
}

/// See [`ImportResolver::absolute_name`].
pub fn absolute_module_name(import: &ImportRecord, current_file: &str) -> Option<String> {
    if !import.is_relative {
        return import.module.clone().filter(|module| !module.is_empty());
    }

    let current_module = module_name_for_path(current_file);
    let mut parts: Vec<&str> = current_module
        .split('.')
        .filter(|part| !part.is_empty())
        .collect();

    for _ in 0..import.level {
        if parts.pop().is_none() {
            break;
        }
    }

    if let Some(module) = import.module.as_deref() {
        parts.extend(module.split('.').filter(|part| !part.is_empty()));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("."))
    }
}
