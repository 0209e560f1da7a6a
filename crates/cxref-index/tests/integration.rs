//! End-to-end scenarios: real C/C++ snippets through the real frontend.

use cxref_core::{CancelToken, FileId, IndexConfig, IndexedFile, IndexedFileDiff};
use cxref_index::parse_source;

fn index(source: &str) -> IndexedFile {
    parse_source(
        "/test/unit.cc",
        source.as_bytes().to_vec(),
        &[],
        &IndexConfig::default(),
        CancelToken::new(),
    )
    .expect("indexing should succeed")
}

#[test]
fn empty_translation_unit() {
    let file = index("   \n\n\t\n");
    assert_eq!(file.types().len(), 0);
    assert_eq!(file.funcs().len(), 0);
    assert_eq!(file.vars().len(), 0);
    assert_eq!(
        file.files().path_of(FileId::from_raw(1)),
        Some("/test/unit.cc"),
        "the input path is registered even when nothing is declared"
    );
}

#[test]
fn single_free_function_with_one_call() {
    let file = index("void g();\nvoid f() { g(); }\n");

    let f = file.func_by_usr("f:f").expect("f should be interned");
    let g = file.func_by_usr("f:g").expect("g should be interned");

    let f_record = file.resolve_func(f);
    let g_record = file.resolve_func(g);

    assert!(f_record.def.definition.is_some());
    assert!(g_record.def.definition.is_none());
    assert_eq!(g_record.declarations.len(), 1);
    assert_eq!(g_record.declarations[0].line(), 1);

    assert_eq!(f_record.def.callees.len(), 1);
    assert_eq!(g_record.callers.len(), 1);
    assert_eq!(f_record.def.callees[0].id, g);
    assert_eq!(g_record.callers[0].id, f);
    assert_eq!(
        f_record.def.callees[0].loc, g_record.callers[0].loc,
        "both sides of the call edge carry the same location"
    );

    assert_eq!(g_record.uses.len(), 1);
    assert!(g_record.uses[0].interesting());
    assert_eq!(g_record.uses[0].line(), 2);
}

#[test]
fn class_inheritance_diamond() {
    let file = index("struct A {};\nstruct B : A {};\nstruct C : A {};\nstruct D : B, C {};\n");

    let a = file.type_by_usr("t:A").expect("A interned");
    let b = file.type_by_usr("t:B").expect("B interned");
    let c = file.type_by_usr("t:C").expect("C interned");
    let d = file.type_by_usr("t:D").expect("D interned");

    assert!(file.resolve_type(a).def.parents.is_empty());
    assert_eq!(file.resolve_type(a).derived, vec![b, c]);
    assert_eq!(file.resolve_type(d).def.parents, vec![b, c]);

    // Edge symmetry holds on every pair.
    for ty in file.types() {
        for &parent in &ty.def.parents {
            assert!(
                file.resolve_type(parent).derived.contains(&ty.def.id),
                "parent {parent} should list {} as derived",
                ty.def.id
            );
        }
        for &child in &ty.derived {
            assert!(
                file.resolve_type(child).def.parents.contains(&ty.def.id),
                "derived {child} should list {} as parent",
                ty.def.id
            );
        }
    }
}

#[test]
fn diamond_base_repeated_in_one_clause_appears_once() {
    let file = index("struct A {};\nstruct D : A, A {};\n");
    let a = file.type_by_usr("t:A").expect("A interned");
    let d = file.type_by_usr("t:D").expect("D interned");
    assert_eq!(file.resolve_type(d).def.parents, vec![a]);
    assert_eq!(file.resolve_type(a).derived, vec![d]);
}

#[test]
fn virtual_override_chain() {
    let file = index(
        "struct A { virtual void m(); };\nstruct B : A { void m() override; };\n",
    );

    let base = file.func_by_usr("f:A::m").expect("A::m interned");
    let derived = file.func_by_usr("f:B::m").expect("B::m interned");

    assert_eq!(file.resolve_func(derived).def.base, Some(base));
    assert!(file.resolve_func(base).derived.contains(&derived));

    let base_def = file.resolve_func(base).def.definition.expect("A::m defined");
    let derived_def = file
        .resolve_func(derived)
        .def
        .definition
        .expect("B::m defined");
    assert!(
        !base_def.same_position(derived_def),
        "override and base have distinct definition locations"
    );
}

#[test]
fn typedef_alias() {
    let file = index("typedef int Int;\nInt x;\n");

    let alias = file.type_by_usr("t:Int").expect("Int interned");
    let underlying = file.type_by_usr("t:int").expect("int interned as a stub");
    assert_eq!(file.resolve_type(alias).def.alias_of, Some(underlying));

    let x = file.var_by_usr("v:x").expect("x interned");
    assert_eq!(file.resolve_var(x).def.variable_type, Some(alias));
}

#[test]
fn repeated_forward_declarations() {
    let file = index("void f();\nvoid f();\nvoid f() {}\n");

    assert_eq!(file.funcs().len(), 1, "one entity across all declarations");
    let f = file.func_by_usr("f:f").expect("f interned");
    let record = file.resolve_func(f);
    assert_eq!(record.declarations.len(), 2);
    assert_eq!(
        record.def.definition.map(|l| l.line()),
        Some(3),
        "the definition points at the body"
    );
}

#[test]
fn members_attach_to_their_class() {
    let file = index(
        r#"
struct Widget {
    int width;
    void resize(int w);
};
void Widget::resize(int w) { width = w; }
"#,
    );

    let widget = file.type_by_usr("t:Widget").expect("Widget interned");
    let resize = file.func_by_usr("f:Widget::resize").expect("resize interned");
    let width = file.var_by_usr("v:Widget::width").expect("width interned");

    let widget_record = file.resolve_type(widget);
    assert_eq!(widget_record.def.funcs, vec![resize], "deduped on id");
    assert_eq!(widget_record.def.vars, vec![width]);

    let resize_record = file.resolve_func(resize);
    assert_eq!(resize_record.def.declaring_type, Some(widget));
    assert_eq!(
        resize_record.def.definition.map(|l| l.line()),
        Some(6),
        "the out-of-line body is the definition"
    );
    assert_eq!(resize_record.declarations.len(), 1);

    let param = file.var_by_usr("v:Widget::resize::w").expect("param interned");
    assert!(resize_record.def.locals.contains(&param));

    let width_record = file.resolve_var(width);
    assert!(
        width_record.uses.iter().any(|u| u.interesting() && u.line() == 6),
        "the member write in the body is an interesting use"
    );
}

#[test]
fn forward_reference_then_definition() {
    let file = index("void f() { g(); }\nvoid g() {}\n");

    let g = file.func_by_usr("f:g").expect("g interned");
    let record = file.resolve_func(g);
    assert!(record.def.definition.is_some(), "later definition filled in");
    assert_eq!(record.uses.len(), 1);
    assert_eq!(record.uses[0].line(), 1);
}

#[test]
fn dense_ids_per_kind() {
    let file = index(
        r#"
struct A {};
struct B : A {};
typedef A Alias;
void f();
void g() { f(); }
int x;
int y = 2;
"#,
    );

    for (i, ty) in file.types().iter().enumerate() {
        assert_eq!(ty.def.id.index(), i);
    }
    for (i, func) in file.funcs().iter().enumerate() {
        assert_eq!(func.def.id.index(), i);
    }
    for (i, var) in file.vars().iter().enumerate() {
        assert_eq!(var.def.id.index(), i);
    }
}

#[test]
fn usage_lists_have_no_position_duplicates() {
    let file = index(
        r#"
struct Counter {};
void touch(Counter c);
void f(Counter a, Counter b) { touch(a); touch(b); }
"#,
    );

    for ty in file.types() {
        for (i, a) in ty.uses.iter().enumerate() {
            for b in &ty.uses[i + 1..] {
                assert!(!a.same_position(*b), "duplicate usage position in {}", ty.def.usr);
            }
        }
    }
}

#[test]
fn duplicate_type_definitions_keep_the_first() {
    // Invalid C++, but indexing is best-effort over malformed code.
    let file = index("struct A {};\nstruct A {};\n");
    let a = file.type_by_usr("t:A").expect("A interned");
    assert_eq!(file.resolve_type(a).def.definition.map(|l| l.line()), Some(1));
    assert_eq!(file.stats().duplicate_definitions, 1);
}

#[test]
fn textual_dump_is_stable_across_runs() {
    let source = r#"
struct Base { virtual void run(); };
struct Derived : Base { void run() override; };
typedef Derived Handle;
void caller() { Handle* h = 0; }
"#;
    let first = index(source).to_text();
    let second = index(source).to_text();
    assert_eq!(first, second, "bitwise stable for identical input");
    assert!(first.contains("types:"));
}

#[test]
fn cancelled_parse_returns_an_incomplete_snapshot() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let file = parse_source(
        "/test/unit.cc",
        b"void a();\nvoid b();\n".to_vec(),
        &[],
        &IndexConfig::default(),
        cancel,
    )
    .expect("cancelled parse still returns a snapshot");
    assert!(file.incomplete());
    assert_eq!(file.funcs().len(), 0, "cancelled before the first event");
}

#[test]
fn snapshot_diff_reports_usr_level_changes() {
    let before = index("void f();\nvoid old_fn();\n");
    let after = index("void f();\nvoid new_fn();\nvoid f() {}\n");

    let diff = IndexedFileDiff::between(&before, &after);
    assert_eq!(diff.added_funcs, vec!["f:new_fn"]);
    assert_eq!(diff.removed_funcs, vec!["f:old_fn"]);
    assert_eq!(diff.changed_funcs, vec!["f:f"], "f gained a definition");
}

#[test]
fn stub_records_round_trip_through_serialization() {
    // printf is never declared here, so it lives as a stub: a USR with no
    // names and no definition.
    let file = index("void f() { printf(\"hi\"); }\n");
    let stub = file.func_by_usr("f:printf").expect("printf interned as stub");
    assert!(file.resolve_func(stub).def.short_name.is_empty());
    assert!(file.resolve_func(stub).def.definition.is_none());
    assert_eq!(file.stats().unresolved_refs, 1);

    let json = serde_json::to_string(&file).expect("snapshot should serialize");
    let restored: IndexedFile = serde_json::from_str(&json).expect("snapshot should parse");
    assert_eq!(restored.to_text(), file.to_text());
    assert_eq!(restored.func_by_usr("f:printf"), Some(stub));
}

#[test]
fn system_header_classification_follows_isystem() {
    let args = vec!["-isystem".to_string(), "/sys/include".to_string()];
    let file = parse_source(
        "/sys/include/lib.hpp",
        b"struct Sys {};\n".to_vec(),
        &args,
        &IndexConfig::default(),
        CancelToken::new(),
    )
    .expect("indexing should succeed");
    let sys = file.type_by_usr("t:Sys").expect("Sys interned");
    assert!(file.resolve_type(sys).is_system_def);

    let config = IndexConfig {
        skip_system_symbols: true,
        ..Default::default()
    };
    let skipped = parse_source(
        "/sys/include/lib.hpp",
        b"struct Sys {};\n".to_vec(),
        &args,
        &config,
        CancelToken::new(),
    )
    .expect("indexing should succeed");
    assert!(skipped.type_by_usr("t:Sys").is_none());
}
