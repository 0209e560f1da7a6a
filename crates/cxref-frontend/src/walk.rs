//! Pass 2: event emission.
//!
//! Walks the syntax tree a second time and delivers declaration and
//! reference events in source order. Because resolution runs against the
//! pass-1 table, a reference to an entity declared later in the file is
//! emitted before that entity's declaration event; consumers must tolerate
//! forward references.

use crate::cursor::{Cursor, EntityKind};
use crate::decls::{
    base_name_nodes, declarator_path, find_function_declarator, function_identity, is_builtin_type,
    join_scope, name_node_of, type_spelling, variable_identity, DeclTable,
};
use crate::events::{DeclEvent, DeclKind, IndexCallbacks, RefEvent, RefRole, SpellingLoc};
use crate::resolve::Resolver;
use crate::tu::TranslationUnit;
use tree_sitter::Node;

pub(crate) struct Walker<'tu> {
    tu: &'tu TranslationUnit,
    table: &'tu DeclTable,
    resolver: Resolver<'tu>,
}

/// Lexical context threaded through the emission walk.
///
/// `path` is the resolution scope: namespace and class segments, extended
/// with the function's own segments inside a body so locals resolve first.
#[derive(Clone, Default)]
struct Ctx {
    path: Vec<String>,
    class: Option<Cursor>,
    class_qualified: Option<String>,
    func: Option<Cursor>,
    func_qualified: Option<String>,
}

struct Emit<'a, 'tu> {
    tu: &'tu TranslationUnit,
    table: &'tu DeclTable,
    resolver: &'a Resolver<'tu>,
    callbacks: &'a mut dyn IndexCallbacks,
    stopped: bool,
}

impl<'tu> Walker<'tu> {
    pub fn new(tu: &'tu TranslationUnit, table: &'tu DeclTable) -> Self {
        Self {
            tu,
            table,
            resolver: Resolver::new(tu, table),
        }
    }

    pub fn run(&self, callbacks: &mut dyn IndexCallbacks) {
        let mut emit = Emit {
            tu: self.tu,
            table: self.table,
            resolver: &self.resolver,
            callbacks,
            stopped: false,
        };
        emit.visit(self.tu.root(), &Ctx::default());
    }
}

impl<'a, 'tu> Emit<'a, 'tu> {
    // ── Event delivery ──────────────────────────────────────────────────

    fn decl(&mut self, event: DeclEvent) {
        if self.check_stopped() {
            return;
        }
        self.callbacks.on_decl(&event);
    }

    fn reference(&mut self, event: RefEvent) {
        if self.check_stopped() {
            return;
        }
        self.callbacks.on_reference(&event);
    }

    /// Cancellation is polled at every event boundary.
    fn check_stopped(&mut self) -> bool {
        if !self.stopped && self.callbacks.cancelled() {
            self.stopped = true;
        }
        self.stopped
    }

    fn loc_of(&self, node: Node<'_>) -> SpellingLoc {
        let (line, column) = self.tu.position(node);
        SpellingLoc {
            file: self.tu.path().to_string(),
            line,
            column,
        }
    }

    // ── Dispatch ────────────────────────────────────────────────────────

    fn visit(&mut self, node: Node<'tu>, ctx: &Ctx) {
        if self.stopped {
            return;
        }
        match node.kind() {
            "namespace_definition" => self.visit_namespace(node, ctx),
            "class_specifier" => self.visit_record(node, ctx, DeclKind::Class),
            "struct_specifier" => self.visit_record(node, ctx, DeclKind::Struct),
            "union_specifier" => self.visit_record(node, ctx, DeclKind::Union),
            "enum_specifier" => self.visit_enum(node, ctx),
            "type_definition" => self.visit_typedef(node, ctx),
            "alias_declaration" => self.visit_alias(node, ctx),
            "function_definition" => self.visit_function_definition(node, ctx),
            "declaration" => self.visit_declaration(node, ctx),
            "field_declaration" => self.visit_field_declaration(node, ctx),
            "call_expression" => self.visit_call(node, ctx),
            "assignment_expression" => self.visit_assignment(node, ctx),
            "update_expression" => self.visit_update(node, ctx),
            "new_expression" => self.visit_new(node, ctx),
            "cast_expression" => self.visit_cast(node, ctx),
            "identifier" | "field_identifier" => self.visit_identifier(node, ctx),
            _ => self.visit_children(node, ctx),
        }
    }

    fn visit_children(&mut self, node: Node<'tu>, ctx: &Ctx) {
        for i in 0..node.child_count() {
            if self.stopped {
                return;
            }
            if let Some(child) = node.child(i) {
                self.visit(child, ctx);
            }
        }
    }

    // ── Declarations ────────────────────────────────────────────────────

    fn visit_namespace(&mut self, node: Node<'tu>, ctx: &Ctx) {
        let mut inner = ctx.clone();
        if let Some(name_node) = node.child_by_field_name("name") {
            for segment in self.tu.text(name_node).split("::") {
                if !segment.is_empty() {
                    inner.path.push(segment.to_string());
                }
            }
        }
        inner.class = None;
        inner.class_qualified = None;
        if let Some(body) = node.child_by_field_name("body") {
            self.visit_children(body, &inner);
        }
    }

    fn visit_record(&mut self, node: Node<'tu>, ctx: &Ctx, kind: DeclKind) {
        let name_node = node.child_by_field_name("name");
        let body = node.child_by_field_name("body");

        let (Some(name_node), Some(body)) = (name_node, body) else {
            // A body-less specifier (`struct A;`, `struct A x;`) is just a
            // mention of the type.
            if let Some(name_node) = name_node {
                let spelled = self.tu.text(name_node).to_string();
                let loc = self.loc_of(name_node);
                self.type_use(&spelled, None, loc, ctx);
            }
            return;
        };

        let name = self.tu.text(name_node).to_string();
        let qualified = join_scope(&ctx.path, &name);
        let cursor = self.decl_cursor(&qualified, EntityKind::Type, name_node);

        self.decl(DeclEvent {
            cursor: cursor.clone(),
            kind,
            is_definition: true,
            is_system: self.tu.is_system(),
            container: ctx.class.clone(),
            underlying: None,
        });

        for (spelled, base_node) in base_name_nodes(self.tu, node) {
            let referent = self.resolver.resolve(&spelled, EntityKind::Type, &ctx.path);
            let loc = self.loc_of(base_node);
            self.reference(RefEvent {
                referent,
                container: Some(cursor.clone()),
                loc,
                role: RefRole::BaseClass,
            });
        }

        let mut inner = ctx.clone();
        inner.path.push(name);
        inner.class = Some(cursor);
        inner.class_qualified = Some(qualified);
        inner.func = None;
        inner.func_qualified = None;
        for i in 0..body.child_count() {
            if self.stopped {
                return;
            }
            if let Some(child) = body.child(i) {
                if child.kind() != "access_specifier" {
                    self.visit(child, &inner);
                }
            }
        }
    }

    fn visit_enum(&mut self, node: Node<'tu>, ctx: &Ctx) {
        let (Some(name_node), Some(_)) = (
            node.child_by_field_name("name"),
            node.child_by_field_name("body"),
        ) else {
            if let Some(name_node) = node.child_by_field_name("name") {
                let spelled = self.tu.text(name_node).to_string();
                let loc = self.loc_of(name_node);
                self.type_use(&spelled, None, loc, ctx);
            }
            return;
        };
        let qualified = join_scope(&ctx.path, self.tu.text(name_node));
        let cursor = self.decl_cursor(&qualified, EntityKind::Type, name_node);
        self.decl(DeclEvent {
            cursor,
            kind: DeclKind::Enum,
            is_definition: true,
            is_system: self.tu.is_system(),
            container: ctx.class.clone(),
            underlying: None,
        });
    }

    fn visit_typedef(&mut self, node: Node<'tu>, ctx: &Ctx) {
        let ty = node.child_by_field_name("type");
        if let Some(ty) = ty {
            // Emits the inline definition for `typedef struct S {...} T;`.
            self.visit(ty, ctx);
        }
        let underlying = ty.and_then(|t| self.underlying_cursor(t, ctx));

        let mut cursor = node.walk();
        let declarators: Vec<Node<'tu>> =
            node.children_by_field_name("declarator", &mut cursor).collect();
        for declarator in declarators {
            let Some((_, name)) = declarator_path(self.tu, declarator) else {
                continue;
            };
            let qualified = join_scope(&ctx.path, &name);
            let name_node = name_node_of(declarator).unwrap_or(declarator);
            let alias = self.decl_cursor(&qualified, EntityKind::Type, name_node);
            self.decl(DeclEvent {
                cursor: alias,
                kind: DeclKind::TypeAlias,
                is_definition: true,
                is_system: self.tu.is_system(),
                container: ctx.class.clone(),
                underlying: underlying.clone(),
            });
        }
    }

    fn visit_alias(&mut self, node: Node<'tu>, ctx: &Ctx) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let underlying = node
            .child_by_field_name("type")
            .and_then(|t| self.underlying_cursor(t, ctx));
        let qualified = join_scope(&ctx.path, self.tu.text(name_node));
        let alias = self.decl_cursor(&qualified, EntityKind::Type, name_node);
        self.decl(DeclEvent {
            cursor: alias,
            kind: DeclKind::TypeAlias,
            is_definition: true,
            is_system: self.tu.is_system(),
            container: ctx.class.clone(),
            underlying,
        });
    }

    /// The aliased type of a typedef/using. Builtins are interned too: an
    /// alias needs its target even when the target is `int`.
    fn underlying_cursor(&self, ty: Node<'tu>, ctx: &Ctx) -> Option<Cursor> {
        let (spelled, _) = type_spelling(self.tu, ty)?;
        if is_builtin_type(ty) {
            return Some(Cursor::synthetic(EntityKind::Type, &spelled));
        }
        Some(self.resolver.resolve(&spelled, EntityKind::Type, &ctx.path))
    }

    fn visit_function_definition(&mut self, node: Node<'tu>, ctx: &Ctx) {
        let Some(declarator) = node.child_by_field_name("declarator") else {
            return;
        };
        let Some((prefix, name)) = declarator_path(self.tu, declarator) else {
            return;
        };
        let (kind, container_qualified, qualified) =
            function_identity(&ctx.path, ctx.class_qualified.as_deref(), &prefix, &name);
        let name_node = name_node_of(declarator).unwrap_or(declarator);
        let cursor = self.decl_cursor(&qualified, EntityKind::Func, name_node);
        let container = self.container_type_cursor(container_qualified.as_deref(), ctx);

        self.decl(DeclEvent {
            cursor: cursor.clone(),
            kind,
            is_definition: true,
            is_system: self.tu.is_system(),
            container,
            underlying: None,
        });

        self.emit_override(container_qualified.as_deref(), &name, &cursor, name_node);

        if let Some(return_type) = node.child_by_field_name("type") {
            self.type_ref(return_type, None, ctx);
        }

        let mut inner = ctx.clone();
        inner.path = qualified.split("::").map(str::to_string).collect();
        inner.func = Some(cursor);
        inner.func_qualified = Some(qualified);

        if let Some(fn_declarator) = find_function_declarator(declarator) {
            self.visit_parameters(fn_declarator, &inner);
        }
        if let Some(body) = node.child_by_field_name("body") {
            self.visit(body, &inner);
        }
    }

    fn visit_parameters(&mut self, fn_declarator: Node<'tu>, inner: &Ctx) {
        let Some(params) = fn_declarator.child_by_field_name("parameters") else {
            return;
        };
        for i in 0..params.child_count() {
            if self.stopped {
                return;
            }
            let Some(param) = params.child(i) else { continue };
            if param.kind() != "parameter_declaration" {
                continue;
            }
            let declared = param
                .child_by_field_name("declarator")
                .and_then(|d| self.declare_variable(d, param, inner, true));
            if declared.is_none() {
                // Unnamed parameter: the type mention still counts.
                if let Some(ty) = param.child_by_field_name("type") {
                    self.type_ref(ty, None, inner);
                }
            }
        }
    }

    /// Emit the declaration of one variable declarator plus the type
    /// reference carried with it. Returns the variable's cursor when one
    /// was produced.
    fn declare_variable(
        &mut self,
        declarator: Node<'tu>,
        decl_node: Node<'tu>,
        ctx: &Ctx,
        is_definition: bool,
    ) -> Option<Cursor> {
        let (prefix, name) = declarator_path(self.tu, declarator)?;
        if name.is_empty() {
            return None;
        }
        let (kind, container_qualified, qualified) = variable_identity(
            &ctx.path,
            ctx.class_qualified.as_deref(),
            ctx.func_qualified.as_deref(),
            &prefix,
            &name,
        );
        let name_node = name_node_of(declarator).unwrap_or(declarator);
        let cursor = self.decl_cursor(&qualified, EntityKind::Var, name_node);

        let container = if ctx.func.is_some() && kind == DeclKind::Var {
            ctx.func.clone()
        } else {
            self.container_type_cursor(container_qualified.as_deref(), ctx)
        };

        self.decl(DeclEvent {
            cursor: cursor.clone(),
            kind,
            is_definition,
            is_system: self.tu.is_system(),
            container,
            underlying: None,
        });

        if let Some(ty) = decl_node.child_by_field_name("type") {
            self.type_ref(ty, Some(cursor.clone()), ctx);
        }
        Some(cursor)
    }

    fn visit_declaration(&mut self, node: Node<'tu>, ctx: &Ctx) {
        if let Some(ty) = node.child_by_field_name("type") {
            // Inline record definitions and bare specifier mentions.
            match ty.kind() {
                "class_specifier" | "struct_specifier" | "union_specifier" | "enum_specifier" => {
                    self.visit(ty, ctx);
                }
                _ => {}
            }
        }
        let is_extern = crate::decls::has_storage_class(self.tu, node, "extern");

        let mut cursor = node.walk();
        let declarators: Vec<Node<'tu>> =
            node.children_by_field_name("declarator", &mut cursor).collect();
        for declarator in declarators {
            if self.stopped {
                return;
            }
            if find_function_declarator(declarator).is_some() {
                self.declare_function_prototype(declarator, node, ctx);
            } else {
                self.declare_variable(declarator, node, ctx, !is_extern);
                // Initializers are ordinary expressions.
                if declarator.kind() == "init_declarator" {
                    if let Some(value) = declarator.child_by_field_name("value") {
                        self.visit(value, ctx);
                    }
                }
            }
        }
    }

    fn declare_function_prototype(&mut self, declarator: Node<'tu>, decl_node: Node<'tu>, ctx: &Ctx) {
        let Some((prefix, name)) = declarator_path(self.tu, declarator) else {
            return;
        };
        let (kind, container_qualified, qualified) =
            function_identity(&ctx.path, ctx.class_qualified.as_deref(), &prefix, &name);
        let name_node = name_node_of(declarator).unwrap_or(declarator);
        let cursor = self.decl_cursor(&qualified, EntityKind::Func, name_node);
        let container = self.container_type_cursor(container_qualified.as_deref(), ctx);

        // In-class prototypes count as the definition when no out-of-line
        // body exists in this unit; free-function prototypes never do.
        let is_definition = if ctx.class_qualified.is_some() && prefix.is_empty() {
            self.table
                .lookup_qualified(&qualified, EntityKind::Func)
                .map(|i| !self.table.get(i).has_definition)
                .unwrap_or(false)
        } else {
            false
        };

        self.decl(DeclEvent {
            cursor: cursor.clone(),
            kind,
            is_definition,
            is_system: self.tu.is_system(),
            container,
            underlying: None,
        });

        if let Some(class) = container_qualified.as_deref() {
            self.emit_override(Some(class), &name, &cursor, name_node);
        }

        if let Some(return_type) = decl_node.child_by_field_name("type") {
            self.type_ref(return_type, None, ctx);
        }
        if let Some(fn_declarator) = find_function_declarator(declarator) {
            self.prototype_parameter_types(fn_declarator, ctx);
        }
    }

    fn prototype_parameter_types(&mut self, fn_declarator: Node<'tu>, ctx: &Ctx) {
        let Some(params) = fn_declarator.child_by_field_name("parameters") else {
            return;
        };
        for i in 0..params.child_count() {
            let Some(param) = params.child(i) else { continue };
            if param.kind() == "parameter_declaration" {
                if let Some(ty) = param.child_by_field_name("type") {
                    self.type_ref(ty, None, ctx);
                }
            }
        }
    }

    fn visit_field_declaration(&mut self, node: Node<'tu>, ctx: &Ctx) {
        if let Some(ty) = node.child_by_field_name("type") {
            match ty.kind() {
                "class_specifier" | "struct_specifier" | "union_specifier" | "enum_specifier" => {
                    self.visit(ty, ctx);
                }
                _ => {}
            }
        }
        let mut cursor = node.walk();
        let declarators: Vec<Node<'tu>> =
            node.children_by_field_name("declarator", &mut cursor).collect();
        for declarator in declarators {
            if self.stopped {
                return;
            }
            if find_function_declarator(declarator).is_some() {
                self.declare_function_prototype(declarator, node, ctx);
            } else {
                self.declare_variable(declarator, node, ctx, true);
            }
        }
        if let Some(default_value) = node.child_by_field_name("default_value") {
            self.visit(default_value, ctx);
        }
    }

    fn emit_override(
        &mut self,
        class_qualified: Option<&str>,
        method_short: &str,
        overrider: &Cursor,
        name_node: Node<'_>,
    ) {
        let Some(class) = class_qualified else { return };
        let Some(base_index) = self.resolver.find_override_base(class, method_short) else {
            return;
        };
        let loc = self.loc_of(name_node);
        self.reference(RefEvent {
            referent: self.resolver.cursor_for(base_index),
            container: Some(overrider.clone()),
            loc,
            role: RefRole::Override,
        });
    }

    // ── Expressions ─────────────────────────────────────────────────────

    fn visit_call(&mut self, node: Node<'tu>, ctx: &Ctx) {
        let Some(function) = node.child_by_field_name("function") else {
            self.visit_children(node, ctx);
            return;
        };

        let callee: Option<(String, Node<'tu>)> = match function.kind() {
            "identifier" | "qualified_identifier" => {
                Some((self.tu.text(function).to_string(), function))
            }
            "field_expression" => {
                // The object expression is ordinary reads.
                if let Some(argument) = function.child_by_field_name("argument") {
                    self.visit(argument, ctx);
                }
                function
                    .child_by_field_name("field")
                    .map(|f| (self.tu.text(f).to_string(), f))
            }
            "template_function" => function
                .child_by_field_name("name")
                .map(|n| (self.tu.text(n).to_string(), n)),
            _ => {
                self.visit(function, ctx);
                None
            }
        };

        if let Some((spelled, name_node)) = callee {
            let referent = self.resolver.resolve(&spelled, EntityKind::Func, &ctx.path);
            let loc = self.loc_of(name_node);
            self.reference(RefEvent {
                referent,
                container: ctx.func.clone(),
                loc,
                role: RefRole::Call,
            });
        }

        if let Some(arguments) = node.child_by_field_name("arguments") {
            self.visit_children(arguments, ctx);
        }
    }

    fn visit_assignment(&mut self, node: Node<'tu>, ctx: &Ctx) {
        if let Some(left) = node.child_by_field_name("left") {
            if matches!(left.kind(), "identifier" | "field_identifier") {
                self.var_use(left, RefRole::Write, ctx);
            } else {
                self.visit(left, ctx);
            }
        }
        if let Some(right) = node.child_by_field_name("right") {
            self.visit(right, ctx);
        }
    }

    fn visit_update(&mut self, node: Node<'tu>, ctx: &Ctx) {
        if let Some(argument) = node.child_by_field_name("argument") {
            if matches!(argument.kind(), "identifier" | "field_identifier") {
                self.var_use(argument, RefRole::Write, ctx);
            } else {
                self.visit(argument, ctx);
            }
        }
    }

    fn visit_new(&mut self, node: Node<'tu>, ctx: &Ctx) {
        if let Some(ty) = node.child_by_field_name("type") {
            // An explicit expression-level type use.
            self.type_ref(ty, ctx.func.clone(), ctx);
        }
        if let Some(arguments) = node.child_by_field_name("arguments") {
            self.visit_children(arguments, ctx);
        }
    }

    fn visit_cast(&mut self, node: Node<'tu>, ctx: &Ctx) {
        if let Some(ty) = node.child_by_field_name("type") {
            self.type_ref(ty, ctx.func.clone(), ctx);
        }
        if let Some(value) = node.child_by_field_name("value") {
            self.visit(value, ctx);
        }
    }

    fn visit_identifier(&mut self, node: Node<'tu>, ctx: &Ctx) {
        self.var_use(node, RefRole::Read, ctx);
    }

    /// Reads and writes are emitted only for names that resolve to a known
    /// variable declaration; anything else in expression position is far
    /// more likely an unmodeled construct than a cross-unit variable.
    fn var_use(&mut self, name_node: Node<'tu>, role: RefRole, ctx: &Ctx) {
        let spelled = self.tu.text(name_node).to_string();
        let Some(cursor) = self
            .resolver
            .resolve_strict(&spelled, EntityKind::Var, &ctx.path)
        else {
            return;
        };
        let loc = self.loc_of(name_node);
        self.reference(RefEvent {
            referent: cursor,
            container: ctx.func.clone(),
            loc,
            role,
        });
    }

    // ── Type references ─────────────────────────────────────────────────

    /// Emit a type reference for a type node, unless it names a builtin.
    /// `container` follows the event contract: the declared variable for
    /// declaration-site mentions, the enclosing function for expression
    /// uses, `None` otherwise.
    fn type_ref(&mut self, ty: Node<'tu>, container: Option<Cursor>, ctx: &Ctx) {
        if is_builtin_type(ty) {
            return;
        }
        let Some((spelled, name_node)) = type_spelling(self.tu, ty) else {
            return;
        };
        let loc = self.loc_of(name_node);
        self.type_use(&spelled, container, loc, ctx);
    }

    fn type_use(&mut self, spelled: &str, container: Option<Cursor>, loc: SpellingLoc, ctx: &Ctx) {
        let referent = self.resolver.resolve(spelled, EntityKind::Type, &ctx.path);
        self.reference(RefEvent {
            referent,
            container,
            loc,
            role: RefRole::TypeRef,
        });
    }

    // ── Cursor helpers ──────────────────────────────────────────────────

    /// Cursor for a declaration site: table-backed when pass 1 saw it,
    /// synthesized otherwise (malformed code still emits best-effort).
    fn decl_cursor(&self, qualified: &str, kind: EntityKind, name_node: Node<'_>) -> Cursor {
        let (line, column) = self.tu.position(name_node);
        match self.table.lookup_qualified(qualified, kind) {
            Some(index) => self.resolver.cursor_at(self.table.get(index), line, column),
            None => Cursor::synthetic(kind, qualified),
        }
    }

    fn container_type_cursor(&self, qualified: Option<&str>, ctx: &Ctx) -> Option<Cursor> {
        let qualified = qualified?;
        if let Some(class) = &ctx.class {
            if ctx.class_qualified.as_deref() == Some(qualified) {
                return Some(class.clone());
            }
        }
        Some(self.resolver.resolve(qualified, EntityKind::Type, &[]))
    }
}
