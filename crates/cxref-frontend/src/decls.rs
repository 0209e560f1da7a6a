//! Pass 1: declaration collection.
//!
//! Walks the syntax tree once, recording every named declaration with its
//! qualified name, kind, and structural context. The resulting table is what
//! pass 2 resolves reference spellings against, which is why it is built
//! before any event is emitted: references may precede the declarations they
//! target.

use crate::cursor::EntityKind;
use crate::events::DeclKind;
use crate::tu::TranslationUnit;
use std::collections::HashMap;
use tree_sitter::Node;

/// One named declaration, merged across all its sites in the unit.
#[derive(Debug, Clone)]
pub(crate) struct DeclInfo {
    pub kind: DeclKind,
    pub short_name: String,
    pub qualified_name: String,
    /// 1-based position of the first sighting's name node.
    pub line: u32,
    pub column: u32,
    /// Spelled base-class names, for type declarations.
    pub bases: Vec<String>,
    /// Spelled aliased type, for typedef/using declarations.
    pub underlying: Option<String>,
    /// Qualified name of the declaring type or enclosing function.
    pub container: Option<String>,
    /// Whether any site in this unit is a definition (has a body or an
    /// initializing declarator).
    pub has_definition: bool,
}

/// All declarations of one translation unit, indexed for resolution.
pub(crate) struct DeclTable {
    decls: Vec<DeclInfo>,
    by_qualified: HashMap<String, Vec<usize>>,
    by_name: HashMap<String, Vec<usize>>,
}

impl DeclTable {
    pub fn build(tu: &TranslationUnit) -> Self {
        let mut collect = Collect {
            tu,
            table: DeclTable {
                decls: Vec::new(),
                by_qualified: HashMap::new(),
                by_name: HashMap::new(),
            },
        };
        collect.visit(tu.root(), &Scope::default());
        collect.table
    }

    pub fn get(&self, index: usize) -> &DeclInfo {
        &self.decls[index]
    }

    /// Exact qualified-name lookup, filtered by symbol-table kind.
    pub fn lookup_qualified(&self, qualified: &str, kind: EntityKind) -> Option<usize> {
        self.by_qualified
            .get(qualified)?
            .iter()
            .copied()
            .find(|&i| self.decls[i].kind.entity_kind() == kind)
    }

    /// All declarations sharing a short name, filtered by kind, in source
    /// order.
    pub fn candidates(&self, short_name: &str, kind: EntityKind) -> Vec<usize> {
        self.by_name
            .get(short_name)
            .map(|indices| {
                indices
                    .iter()
                    .copied()
                    .filter(|&i| self.decls[i].kind.entity_kind() == kind)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    fn insert(&mut self, info: DeclInfo) -> usize {
        if let Some(&existing) = self
            .by_qualified
            .get(&info.qualified_name)
            .and_then(|indices| {
                indices
                    .iter()
                    .find(|&&i| self.decls[i].kind.entity_kind() == info.kind.entity_kind())
            })
        {
            let decl = &mut self.decls[existing];
            decl.has_definition |= info.has_definition;
            if decl.underlying.is_none() {
                decl.underlying = info.underlying;
            }
            if decl.container.is_none() {
                decl.container = info.container;
            }
            for base in info.bases {
                if !decl.bases.contains(&base) {
                    decl.bases.push(base);
                }
            }
            return existing;
        }

        let index = self.decls.len();
        self.by_qualified
            .entry(info.qualified_name.clone())
            .or_default()
            .push(index);
        self.by_name
            .entry(info.short_name.clone())
            .or_default()
            .push(index);
        self.decls.push(info);
        index
    }
}

/// Lexical context threaded through the collection walk.
#[derive(Debug, Clone, Default)]
struct Scope {
    /// Namespace and class segments enclosing the current node.
    path: Vec<String>,
    /// Qualified name of the class whose body we are directly inside.
    class: Option<String>,
    /// Qualified name of the enclosing function, for locals.
    func: Option<String>,
}

impl Scope {
    fn entered(&self, segment: &str) -> Scope {
        let mut path = self.path.clone();
        path.push(segment.to_string());
        Scope {
            path,
            class: self.class.clone(),
            func: self.func.clone(),
        }
    }
}

struct Collect<'tu> {
    tu: &'tu TranslationUnit,
    table: DeclTable,
}

impl<'tu> Collect<'tu> {
    fn visit(&mut self, node: Node<'tu>, scope: &Scope) {
        match node.kind() {
            "namespace_definition" => self.visit_namespace(node, scope),
            "class_specifier" => self.visit_record(node, scope, DeclKind::Class),
            "struct_specifier" => self.visit_record(node, scope, DeclKind::Struct),
            "union_specifier" => self.visit_record(node, scope, DeclKind::Union),
            "enum_specifier" => self.visit_enum(node, scope),
            "type_definition" => self.visit_typedef(node, scope),
            "alias_declaration" => self.visit_alias(node, scope),
            "function_definition" => self.visit_function_definition(node, scope),
            "declaration" => self.visit_declaration(node, scope),
            "field_declaration" => self.visit_field_declaration(node, scope),
            _ => {
                for i in 0..node.child_count() {
                    if let Some(child) = node.child(i) {
                        self.visit(child, scope);
                    }
                }
            }
        }
    }

    fn visit_namespace(&mut self, node: Node<'tu>, scope: &Scope) {
        let mut inner = scope.clone();
        if let Some(name_node) = node.child_by_field_name("name") {
            // `namespace a::b` nests two segments at once.
            for segment in self.tu.text(name_node).split("::") {
                if !segment.is_empty() {
                    inner = inner.entered(segment);
                }
            }
        }
        inner.class = None;
        if let Some(body) = node.child_by_field_name("body") {
            for i in 0..body.child_count() {
                if let Some(child) = body.child(i) {
                    self.visit(child, &inner);
                }
            }
        }
    }

    fn visit_record(&mut self, node: Node<'tu>, scope: &Scope, kind: DeclKind) {
        let (Some(name_node), Some(body)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("body"),
        ) else {
            // Forward declaration or bare reference; pass 2 records the
            // usage. Anonymous records are dropped entirely.
            return;
        };

        let name = self.tu.text(name_node).to_string();
        let qualified = join_scope(&scope.path, &name);
        let (line, column) = self.tu.position(name_node);
        self.table.insert(DeclInfo {
            kind,
            short_name: name.clone(),
            qualified_name: qualified.clone(),
            line,
            column,
            bases: collect_base_names(self.tu, node),
            underlying: None,
            container: scope.class.clone(),
            has_definition: true,
        });

        let mut inner = scope.entered(&name);
        inner.class = Some(qualified);
        inner.func = None;
        for i in 0..body.child_count() {
            if let Some(child) = body.child(i) {
                if child.kind() == "access_specifier" {
                    continue;
                }
                self.visit(child, &inner);
            }
        }
    }

    fn visit_enum(&mut self, node: Node<'tu>, scope: &Scope) {
        let (Some(name_node), Some(_body)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("body"),
        ) else {
            return;
        };
        let name = self.tu.text(name_node).to_string();
        let (line, column) = self.tu.position(name_node);
        self.table.insert(DeclInfo {
            kind: DeclKind::Enum,
            short_name: name.clone(),
            qualified_name: join_scope(&scope.path, &name),
            line,
            column,
            bases: Vec::new(),
            underlying: None,
            container: scope.class.clone(),
            has_definition: true,
        });
    }

    fn visit_typedef(&mut self, node: Node<'tu>, scope: &Scope) {
        // `typedef struct S { ... } Alias;` defines S inline.
        if let Some(ty) = node.child_by_field_name("type") {
            self.visit(ty, scope);
        }
        let underlying = node
            .child_by_field_name("type")
            .and_then(|ty| type_spelling(self.tu, ty))
            .map(|(spelled, _)| spelled);
        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            let Some((_, name)) = declarator_path(self.tu, declarator) else {
                continue;
            };
            let (line, column) = self.tu.position(declarator);
            self.table.insert(DeclInfo {
                kind: DeclKind::TypeAlias,
                short_name: name.clone(),
                qualified_name: join_scope(&scope.path, &name),
                line,
                column,
                bases: Vec::new(),
                underlying: underlying.clone(),
                container: scope.class.clone(),
                has_definition: true,
            });
        }
    }

    fn visit_alias(&mut self, node: Node<'tu>, scope: &Scope) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let name = self.tu.text(name_node).to_string();
        let underlying = node
            .child_by_field_name("type")
            .and_then(|ty| type_spelling(self.tu, ty))
            .map(|(spelled, _)| spelled);
        let (line, column) = self.tu.position(name_node);
        self.table.insert(DeclInfo {
            kind: DeclKind::TypeAlias,
            short_name: name.clone(),
            qualified_name: join_scope(&scope.path, &name),
            line,
            column,
            bases: Vec::new(),
            underlying,
            container: scope.class.clone(),
            has_definition: true,
        });
    }

    fn visit_function_definition(&mut self, node: Node<'tu>, scope: &Scope) {
        let Some(declarator) = node.child_by_field_name("declarator") else {
            return;
        };
        let Some((qualified, _)) = self.insert_function(declarator, scope, true) else {
            return;
        };

        // Inside the body, the function's own segments extend the scope, so
        // anything declared locally (including local records) is qualified
        // by the function name.
        let mut inner = scope.clone();
        inner.path = qualified.split("::").map(str::to_string).collect();
        inner.func = Some(qualified);

        // Parameters are locals of the definition.
        if let Some(fn_declarator) = find_function_declarator(declarator) {
            if let Some(params) = fn_declarator.child_by_field_name("parameters") {
                for i in 0..params.child_count() {
                    if let Some(param) = params.child(i) {
                        if param.kind() == "parameter_declaration" {
                            self.insert_parameter(param, &inner);
                        }
                    }
                }
            }
        }

        if let Some(body) = node.child_by_field_name("body") {
            self.visit(body, &inner);
        }
    }

    fn visit_declaration(&mut self, node: Node<'tu>, scope: &Scope) {
        // `struct Foo { ... } instance;` defines Foo inline.
        if let Some(ty) = node.child_by_field_name("type") {
            self.visit(ty, scope);
        }
        let is_extern = has_storage_class(self.tu, node, "extern");
        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            if find_function_declarator(declarator).is_some() {
                self.insert_function(declarator, scope, false);
            } else {
                self.insert_variable(declarator, scope, !is_extern);
            }
        }
    }

    fn visit_field_declaration(&mut self, node: Node<'tu>, scope: &Scope) {
        if let Some(ty) = node.child_by_field_name("type") {
            self.visit(ty, scope);
        }
        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            if find_function_declarator(declarator).is_some() {
                // Method prototype. `has_definition` stays false unless an
                // out-of-line body shows up elsewhere in the unit.
                self.insert_function(declarator, scope, false);
            } else {
                self.insert_variable(declarator, scope, true);
            }
        }
    }

    /// Record a function from its declarator. Returns the qualified name
    /// and table index.
    fn insert_function(
        &mut self,
        declarator: Node<'tu>,
        scope: &Scope,
        is_definition: bool,
    ) -> Option<(String, usize)> {
        let (prefix, name) = declarator_path(self.tu, declarator)?;
        if name.is_empty() {
            return None;
        }
        let (kind, container, qualified) =
            function_identity(&scope.path, scope.class.as_deref(), &prefix, &name);
        let (line, column) = self.tu.position(name_node_of(declarator).unwrap_or(declarator));
        let index = self.table.insert(DeclInfo {
            kind,
            short_name: name.clone(),
            qualified_name: qualified.clone(),
            line,
            column,
            bases: Vec::new(),
            underlying: None,
            container,
            has_definition: is_definition,
        });
        Some((qualified, index))
    }

    fn insert_variable(&mut self, declarator: Node<'tu>, scope: &Scope, is_definition: bool) {
        let Some((prefix, name)) = declarator_path(self.tu, declarator) else {
            return;
        };
        if name.is_empty() {
            return;
        }
        let (kind, container, qualified) = variable_identity(
            &scope.path,
            scope.class.as_deref(),
            scope.func.as_deref(),
            &prefix,
            &name,
        );
        let (line, column) = self.tu.position(name_node_of(declarator).unwrap_or(declarator));
        self.table.insert(DeclInfo {
            kind,
            short_name: name,
            qualified_name: qualified,
            line,
            column,
            bases: Vec::new(),
            underlying: None,
            container,
            has_definition: is_definition,
        });
    }

    fn insert_parameter(&mut self, param: Node<'tu>, scope: &Scope) {
        let Some(declarator) = param.child_by_field_name("declarator") else {
            return;
        };
        self.insert_variable(declarator, scope, true);
    }
}

// ── Declarator and type helpers ─────────────────────────────────────────

/// Peel a declarator down to `(scope prefix, name)`.
///
/// `void ns::Foo::m()` yields `(["ns", "Foo"], "m")`; a plain `x` yields
/// `([], "x")`. Pointer, reference, array, init, and parenthesized wrappers
/// are looked through.
pub(crate) fn declarator_path(
    tu: &TranslationUnit,
    node: Node<'_>,
) -> Option<(Vec<String>, String)> {
    match node.kind() {
        "function_declarator"
        | "pointer_declarator"
        | "reference_declarator"
        | "init_declarator"
        | "array_declarator" => {
            let inner = node.child_by_field_name("declarator")?;
            declarator_path(tu, inner)
        }
        "parenthesized_declarator" => {
            for i in 0..node.child_count() {
                if let Some(child) = node.child(i) {
                    if child.kind() != "(" && child.kind() != ")" {
                        return declarator_path(tu, child);
                    }
                }
            }
            None
        }
        "qualified_identifier" => {
            let mut prefix = Vec::new();
            if let Some(scope) = node.child_by_field_name("scope") {
                prefix.push(tu.text(scope).to_string());
            }
            let name_side = node.child_by_field_name("name")?;
            let (mut inner_prefix, name) = declarator_path(tu, name_side)?;
            prefix.append(&mut inner_prefix);
            Some((prefix, name))
        }
        "identifier" | "field_identifier" | "type_identifier" | "destructor_name"
        | "operator_name" => Some((Vec::new(), tu.text(node).to_string())),
        _ => None,
    }
}

/// The identifier node a declarator bottoms out at, for positions.
pub(crate) fn name_node_of(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "function_declarator"
        | "pointer_declarator"
        | "reference_declarator"
        | "init_declarator"
        | "array_declarator" => name_node_of(node.child_by_field_name("declarator")?),
        "parenthesized_declarator" => {
            for i in 0..node.child_count() {
                if let Some(child) = node.child(i) {
                    if child.kind() != "(" && child.kind() != ")" {
                        return name_node_of(child);
                    }
                }
            }
            None
        }
        "qualified_identifier" => name_node_of(node.child_by_field_name("name")?),
        "identifier" | "field_identifier" | "type_identifier" | "destructor_name"
        | "operator_name" => Some(node),
        _ => None,
    }
}

/// Descend wrappers to the `function_declarator`, if there is one.
pub(crate) fn find_function_declarator(node: Node<'_>) -> Option<Node<'_>> {
    match node.kind() {
        "function_declarator" => Some(node),
        "pointer_declarator" | "reference_declarator" | "init_declarator" => {
            find_function_declarator(node.child_by_field_name("declarator")?)
        }
        _ => None,
    }
}

/// The spelled name of a type node, plus the node carrying its position.
/// Returns `None` for types we do not model (function types, decltype).
pub(crate) fn type_spelling<'t>(
    tu: &TranslationUnit,
    node: Node<'t>,
) -> Option<(String, Node<'t>)> {
    match node.kind() {
        "primitive_type" | "sized_type_specifier" | "type_identifier" | "qualified_identifier" => {
            Some((tu.text(node).to_string(), node))
        }
        "template_type" => {
            let name = node.child_by_field_name("name")?;
            Some((tu.text(name).to_string(), name))
        }
        "struct_specifier" | "class_specifier" | "union_specifier" | "enum_specifier" => {
            let name = node.child_by_field_name("name")?;
            Some((tu.text(name).to_string(), name))
        }
        "type_descriptor" => type_spelling(tu, node.child_by_field_name("type")?),
        _ => None,
    }
}

/// Whether a type node names a builtin (`int`, `unsigned long`, ...).
pub(crate) fn is_builtin_type(node: Node<'_>) -> bool {
    matches!(node.kind(), "primitive_type" | "sized_type_specifier")
}

/// Spelled base names from a record's `base_class_clause`, in source order.
pub(crate) fn collect_base_names(tu: &TranslationUnit, record: Node<'_>) -> Vec<String> {
    base_name_nodes(tu, record)
        .into_iter()
        .map(|(name, _)| name)
        .collect()
}

/// Base names plus the nodes carrying their positions, for usage emission.
pub(crate) fn base_name_nodes<'t>(
    tu: &TranslationUnit,
    record: Node<'t>,
) -> Vec<(String, Node<'t>)> {
    let mut bases = Vec::new();
    if let Some(clause) = named_child_of_kind(record, "base_class_clause") {
        base_name_nodes_in(tu, clause, &mut bases);
    }
    bases
}

fn base_name_nodes_in<'t>(
    tu: &TranslationUnit,
    node: Node<'t>,
    bases: &mut Vec<(String, Node<'t>)>,
) {
    for i in 0..node.child_count() {
        let Some(child) = node.child(i) else { continue };
        match child.kind() {
            "type_identifier" | "qualified_identifier" => {
                bases.push((tu.text(child).to_string(), child));
            }
            "template_type" => {
                if let Some(name) = child.child_by_field_name("name") {
                    bases.push((tu.text(name).to_string(), name));
                }
            }
            // Access-qualified specifiers (`public Base`) nest one level.
            _ => base_name_nodes_in(tu, child, bases),
        }
    }
}

pub(crate) fn named_child_of_kind<'t>(node: Node<'t>, kind: &str) -> Option<Node<'t>> {
    for i in 0..node.named_child_count() {
        if let Some(child) = node.named_child(i) {
            if child.kind() == kind {
                return Some(child);
            }
        }
    }
    None
}

/// Whether a declaration carries the given storage class specifier.
pub(crate) fn has_storage_class(tu: &TranslationUnit, node: Node<'_>, which: &str) -> bool {
    for i in 0..node.child_count() {
        if let Some(child) = node.child(i) {
            if child.kind() == "storage_class_specifier" && tu.text(child) == which {
                return true;
            }
        }
    }
    false
}

/// Classify a function declarator: `(kind, declaring type, qualified name)`.
///
/// A scope prefix on the declarator (`void Foo::m()`) wins over the lexical
/// class; either makes the function a method.
pub(crate) fn function_identity(
    path: &[String],
    class: Option<&str>,
    prefix: &[String],
    name: &str,
) -> (DeclKind, Option<String>, String) {
    let container = if prefix.is_empty() {
        class.map(str::to_string)
    } else {
        Some(join_path(path, prefix))
    };
    match &container {
        Some(class) => (
            DeclKind::Method,
            container.clone(),
            format!("{class}::{name}"),
        ),
        None => (DeclKind::Function, None, join_scope(path, name)),
    }
}

/// Classify a variable declarator: `(kind, container, qualified name)`.
///
/// Locals belong to the enclosing function, members to their class; a scope
/// prefix (`int Foo::x`) names an out-of-line static member.
pub(crate) fn variable_identity(
    path: &[String],
    class: Option<&str>,
    func: Option<&str>,
    prefix: &[String],
    name: &str,
) -> (DeclKind, Option<String>, String) {
    if let Some(func) = func {
        return (
            DeclKind::Var,
            Some(func.to_string()),
            format!("{func}::{name}"),
        );
    }
    if !prefix.is_empty() {
        let class = join_path(path, prefix);
        return (
            DeclKind::Field,
            Some(class.clone()),
            format!("{class}::{name}"),
        );
    }
    if let Some(class) = class {
        return (
            DeclKind::Field,
            Some(class.to_string()),
            format!("{class}::{name}"),
        );
    }
    (DeclKind::Var, None, join_scope(path, name))
}

pub(crate) fn join_scope(path: &[String], name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}::{}", path.join("::"), name)
    }
}

fn join_path(path: &[String], suffix: &[String]) -> String {
    let mut segments: Vec<&str> = path.iter().map(String::as_str).collect();
    segments.extend(suffix.iter().map(String::as_str));
    segments.join("::")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_for(source: &str) -> DeclTable {
        let tu = TranslationUnit::parse("/src/test.cc", source.as_bytes().to_vec(), &[])
            .expect("parse should succeed");
        // The table borrows nothing from the unit, so it can outlive it.
        DeclTable::build(&tu)
    }

    #[test]
    fn collects_classes_methods_and_fields() {
        let table = table_for(
            r#"
struct Widget {
    int width;
    void resize(int w);
};
"#,
        );
        let widget = table
            .lookup_qualified("Widget", EntityKind::Type)
            .expect("Widget should be declared");
        assert_eq!(table.get(widget).kind, DeclKind::Struct);
        assert!(table.get(widget).has_definition);

        let resize = table
            .lookup_qualified("Widget::resize", EntityKind::Func)
            .expect("resize should be declared");
        assert_eq!(table.get(resize).kind, DeclKind::Method);
        assert_eq!(table.get(resize).container.as_deref(), Some("Widget"));
        assert!(!table.get(resize).has_definition);

        let width = table
            .lookup_qualified("Widget::width", EntityKind::Var)
            .expect("width should be declared");
        assert_eq!(table.get(width).kind, DeclKind::Field);
    }

    #[test]
    fn merges_forward_declarations_with_the_definition() {
        let table = table_for("void f();\nvoid f();\nvoid f() {}\n");
        let f = table
            .lookup_qualified("f", EntityKind::Func)
            .expect("f should be declared");
        assert!(table.get(f).has_definition);
        assert_eq!(table.candidates("f", EntityKind::Func).len(), 1);
    }

    #[test]
    fn records_base_class_spellings() {
        let table = table_for("struct A {};\nstruct B : public A {};\n");
        let b = table
            .lookup_qualified("B", EntityKind::Type)
            .expect("B should be declared");
        assert_eq!(table.get(b).bases, vec!["A"]);
    }

    #[test]
    fn records_typedef_underlying_spelling() {
        let table = table_for("typedef int Int;\nusing Handle = Widget;\nstruct Widget {};\n");
        let alias = table
            .lookup_qualified("Int", EntityKind::Type)
            .expect("Int should be declared");
        assert_eq!(table.get(alias).kind, DeclKind::TypeAlias);
        assert_eq!(table.get(alias).underlying.as_deref(), Some("int"));

        let handle = table
            .lookup_qualified("Handle", EntityKind::Type)
            .expect("Handle should be declared");
        assert_eq!(table.get(handle).underlying.as_deref(), Some("Widget"));
    }

    #[test]
    fn namespaces_qualify_their_members() {
        let table = table_for("namespace app { namespace detail { void helper(); } }\n");
        assert!(table
            .lookup_qualified("app::detail::helper", EntityKind::Func)
            .is_some());
    }

    #[test]
    fn out_of_line_methods_attach_to_their_class() {
        let table = table_for("struct Foo { void m(); };\nvoid Foo::m() {}\n");
        let m = table
            .lookup_qualified("Foo::m", EntityKind::Func)
            .expect("Foo::m should be declared");
        assert_eq!(table.get(m).kind, DeclKind::Method);
        assert_eq!(table.get(m).container.as_deref(), Some("Foo"));
        assert!(table.get(m).has_definition);
    }

    #[test]
    fn locals_and_parameters_belong_to_their_function() {
        let table = table_for("void f(int a) { int b = a; }\n");
        let a = table
            .lookup_qualified("f::a", EntityKind::Var)
            .expect("parameter a should be declared");
        assert_eq!(table.get(a).container.as_deref(), Some("f"));
        assert!(table.lookup_qualified("f::b", EntityKind::Var).is_some());
    }

    #[test]
    fn extern_variables_are_declarations_only() {
        let table = table_for("extern int global_count;\nint defined_count = 0;\n");
        let ext = table
            .lookup_qualified("global_count", EntityKind::Var)
            .expect("global_count should be declared");
        assert!(!table.get(ext).has_definition);
        let def = table
            .lookup_qualified("defined_count", EntityKind::Var)
            .expect("defined_count should be declared");
        assert!(table.get(def).has_definition);
    }

    #[test]
    fn anonymous_records_are_dropped() {
        let table = table_for("struct {} unnamed_instance;\nstruct Named {};\n");
        assert!(table.lookup_qualified("Named", EntityKind::Type).is_some());
        // Only Named, the instance var, and nothing anonymous.
        assert!(table.len() <= 3);
    }
}
