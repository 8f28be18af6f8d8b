use tree_sitter::{Language, Node as TSNode};

use super::common::{
    children_by_field, dotted_text, extract_docstring, extract_text, find_child_by_kind,
    first_error_position, line_of, named_children, TreeSitterParser,
};
use super::{LanguageParser, ParseError};
use crate::core::{ClassEntity, ClassReference, FileEntity, FunctionEntity, ImportRecord, WILDCARD};

pub struct PythonParser {
    language: Language,
}

impl PythonParser {
    pub fn new() -> Result<Self, ParseError> {
        let language = tree_sitter_python::language();
        // Fail early on an incompatible grammar instead of on the first file.
        TreeSitterParser::new(language)?;
        Ok(Self { language })
    }
}

impl LanguageParser for PythonParser {
    fn parse_source(&self, relative_path: &str, source: String) -> Result<FileEntity, ParseError> {
        let mut parser = TreeSitterParser::new(self.language)?;
        let tree = parser
            .parse(&source)
            .ok_or_else(|| ParseError::NoTree(relative_path.to_string()))?;
        let root = tree.root_node();

        if root.has_error() {
            let (line, column) = first_error_position(&root).unwrap_or((1, 1));
            return Err(ParseError::Syntax {
                path: relative_path.to_string(),
                line,
                column,
            });
        }

        let mut extractor = FileExtractor::new(relative_path, source.as_bytes());
        extractor.visit(&root, Scope::Module);

        // The grammar still accepts Python 2 statements; Python 3 does not.
        if let Some((line, column)) = extractor.legacy_statement {
            return Err(ParseError::Syntax {
                path: relative_path.to_string(),
                line,
                column,
            });
        }

        let mut file = FileEntity::new(relative_path, String::new());
        file.imports = extractor.imports;
        file.classes = extractor.classes;
        file.functions = extractor.functions;
        file.class_references = extractor.references;
        file.source_text = source;
        Ok(file)
    }

    fn language_name(&self) -> &str {
        "python"
    }
}

/// The node kinds the extractor distinguishes. Everything else is walked
/// through without being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SyntaxKind {
    Import,
    ImportFrom,
    FutureImport,
    Class,
    Function,
    Decorated,
    Attribute,
    LegacyStatement,
    Other,
}

impl SyntaxKind {
    fn of(node: &TSNode) -> Self {
        match node.kind() {
            "import_statement" => Self::Import,
            "import_from_statement" => Self::ImportFrom,
            "future_import_statement" => Self::FutureImport,
            "class_definition" => Self::Class,
            "function_definition" => Self::Function,
            "decorated_definition" => Self::Decorated,
            "attribute" => Self::Attribute,
            "print_statement" | "exec_statement" => Self::LegacyStatement,
            _ => Self::Other,
        }
    }
}

/// Where a definition sits. Only module-level classes and functions are
/// indexed; compound statements (`if`, `try`, `with`) keep the module scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Module,
    Class,
    Function,
}

struct FileExtractor<'s> {
    path: &'s str,
    source: &'s [u8],
    imports: Vec<ImportRecord>,
    classes: Vec<ClassEntity>,
    functions: Vec<FunctionEntity>,
    references: Vec<ClassReference>,
    legacy_statement: Option<(usize, usize)>,
}

impl<'s> FileExtractor<'s> {
    fn new(path: &'s str, source: &'s [u8]) -> Self {
        Self {
            path,
            source,
            imports: Vec::new(),
            classes: Vec::new(),
            functions: Vec::new(),
            references: Vec::new(),
            legacy_statement: None,
        }
    }

    fn text(&self, node: &TSNode) -> &'s str {
        extract_text(node, self.source)
    }

    fn visit(&mut self, node: &TSNode, scope: Scope) {
        match SyntaxKind::of(node) {
            SyntaxKind::Import => self.process_import(node),
            SyntaxKind::ImportFrom => self.process_import_from(node),
            SyntaxKind::FutureImport => self.process_future_import(node),
            SyntaxKind::Class => {
                if scope == Scope::Module {
                    self.process_class(node);
                }
                self.visit_children(node, Scope::Class);
            }
            SyntaxKind::Function => {
                if scope == Scope::Module {
                    self.process_function(node);
                }
                self.visit_children(node, Scope::Function);
            }
            SyntaxKind::Decorated => self.visit_children(node, scope),
            // `a.b.c` records both `a.b.c` and `a.b`.
            SyntaxKind::Attribute => {
                if let Some((base_name, full_path)) = self.attribute_chain(node) {
                    self.references.push(ClassReference {
                        base_name,
                        full_path,
                        line: line_of(node),
                    });
                }
                self.visit_children(node, scope);
            }
            SyntaxKind::LegacyStatement => {
                if self.legacy_statement.is_none() {
                    let point = node.start_position();
                    self.legacy_statement = Some((point.row + 1, point.column + 1));
                }
            }
            SyntaxKind::Other => self.visit_children(node, scope),
        }
    }

    fn visit_children(&mut self, node: &TSNode, scope: Scope) {
        for child in named_children(node) {
            self.visit(&child, scope);
        }
    }

    /// `import a.b, c as d` yields one record per imported module.
    fn process_import(&mut self, node: &TSNode) {
        let line_number = line_of(node);
        for name in children_by_field(node, "name") {
            match name.kind() {
                "dotted_name" => {
                    let module = dotted_text(&name, self.source);
                    let bound = module.split('.').next().unwrap_or(&module).to_string();
                    self.imports
                        .push(ImportRecord::plain(module, bound, line_number));
                }
                "aliased_import" => {
                    let module = name
                        .child_by_field_name("name")
                        .map(|module| dotted_text(&module, self.source));
                    let alias = name
                        .child_by_field_name("alias")
                        .map(|alias| self.text(&alias).to_string());
                    if let (Some(module), Some(alias)) = (module, alias) {
                        self.imports
                            .push(ImportRecord::plain(module, alias, line_number));
                    }
                }
                _ => {}
            }
        }
    }

    fn process_import_from(&mut self, node: &TSNode) {
        let Some(module_node) = node.child_by_field_name("module_name") else {
            return;
        };

        let (module, level) = match module_node.kind() {
            "relative_import" => {
                let level = find_child_by_kind(&module_node, "import_prefix")
                    .map(|prefix| self.text(&prefix).chars().filter(|c| *c == '.').count())
                    .unwrap_or(0) as u32;
                let module = find_child_by_kind(&module_node, "dotted_name")
                    .map(|name| dotted_text(&name, self.source));
                (module, level)
            }
            _ => (Some(dotted_text(&module_node, self.source)), 0),
        };

        let names = if find_child_by_kind(node, "wildcard_import").is_some() {
            vec![WILDCARD.to_string()]
        } else {
            self.imported_names(node)
        };

        self.imports.push(ImportRecord::from_import(
            module,
            names,
            level,
            line_of(node),
        ));
    }

    fn process_future_import(&mut self, node: &TSNode) {
        let names = self.imported_names(node);
        self.imports.push(ImportRecord::from_import(
            Some("__future__".to_string()),
            names,
            0,
            line_of(node),
        ));
    }

    /// Local names bound by `from x import a, b as c`: `["a", "c"]`.
    fn imported_names(&self, node: &TSNode) -> Vec<String> {
        children_by_field(node, "name")
            .iter()
            .filter_map(|name| match name.kind() {
                "aliased_import" => name
                    .child_by_field_name("alias")
                    .map(|alias| self.text(&alias).to_string()),
                _ => Some(dotted_text(name, self.source)),
            })
            .collect()
    }

    fn process_class(&mut self, node: &TSNode) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let mut class = ClassEntity::new(self.text(&name_node), self.path, line_of(node));

        if let Some(superclasses) = node.child_by_field_name("superclasses") {
            for base in named_children(&superclasses) {
                let base_name = match base.kind() {
                    "identifier" => Some(self.text(&base).to_string()),
                    "attribute" => self.attribute_chain(&base).map(|(_, full)| full),
                    _ => None,
                };
                class.base_classes.extend(base_name);
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            class.docstring = extract_docstring(&body, self.source);
            for statement in named_children(&body) {
                match statement.kind() {
                    "function_definition" => class.methods.extend(self.definition_name(&statement)),
                    "decorated_definition" => {
                        if let Some(definition) = statement
                            .child_by_field_name("definition")
                            .filter(|definition| definition.kind() == "function_definition")
                        {
                            class.methods.extend(self.definition_name(&definition));
                        }
                    }
                    "expression_statement" => {
                        for expression in named_children(&statement) {
                            if expression.kind() == "assignment" {
                                self.assignment_targets(&expression, &mut class.attributes);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }

        self.classes.push(class);
    }

    fn process_function(&mut self, node: &TSNode) {
        let Some(name) = self.definition_name(node) else {
            return;
        };
        let parameters = node
            .child_by_field_name("parameters")
            .map(|parameters| self.parameter_names(&parameters))
            .unwrap_or_default();
        let docstring = node
            .child_by_field_name("body")
            .and_then(|body| extract_docstring(&body, self.source));

        self.functions.push(FunctionEntity {
            name,
            file_path: self.path.to_string(),
            line_number: line_of(node),
            parameters,
            docstring,
        });
    }

    fn definition_name(&self, node: &TSNode) -> Option<String> {
        node.child_by_field_name("name")
            .map(|name| self.text(&name).to_string())
    }

    fn parameter_names(&self, parameters: &TSNode) -> Vec<String> {
        named_children(parameters)
            .iter()
            .filter_map(|parameter| match parameter.kind() {
                "identifier" => Some(self.text(parameter).to_string()),
                "typed_parameter" | "list_splat_pattern" | "dictionary_splat_pattern" => {
                    named_children(parameter)
                        .into_iter()
                        .find(|child| child.kind() == "identifier")
                        .map(|name| self.text(&name).to_string())
                }
                "default_parameter" | "typed_default_parameter" => parameter
                    .child_by_field_name("name")
                    .map(|name| self.text(&name).to_string()),
                _ => None,
            })
            .collect()
    }

    /// Names assigned by `x = ...`, `x: T = ...` and chained `x = y = ...`.
    /// Declarations without a value and non-name targets bind nothing.
    fn assignment_targets(&self, assignment: &TSNode, attributes: &mut Vec<String>) {
        let Some(right) = assignment.child_by_field_name("right") else {
            return;
        };
        if let Some(left) = assignment.child_by_field_name("left") {
            if left.kind() == "identifier" {
                attributes.push(self.text(&left).to_string());
            }
        }
        if right.kind() == "assignment" {
            self.assignment_targets(&right, attributes);
        }
    }

    /// `(base_name, full_path)` of an attribute chain rooted at a bare name.
    fn attribute_chain(&self, node: &TSNode) -> Option<(String, String)> {
        match node.kind() {
            "identifier" => {
                let name = self.text(node).to_string();
                Some((name.clone(), name))
            }
            "attribute" => {
                let object = node.child_by_field_name("object")?;
                let attribute = node.child_by_field_name("attribute")?;
                let (base_name, object_path) = self.attribute_chain(&object)?;
                Some((
                    base_name,
                    format!("{}.{}", object_path, self.text(&attribute)),
                ))
            }
            _ => None,
        }
    }
}
