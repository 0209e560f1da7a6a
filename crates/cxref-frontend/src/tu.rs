//! Translation units: one parsed source file plus its compile arguments.

use crate::decls::DeclTable;
use crate::events::IndexCallbacks;
use crate::walk::Walker;
use cxref_core::IndexError;
use tree_sitter::{Node, Parser, Tree};

/// A parsed C/C++ translation unit.
///
/// The tree-sitter-cpp grammar is a superset covering both C and C++, so one
/// grammar serves every C-family file. Compile arguments are consulted for
/// `-isystem` directories, which drive system-header classification.
pub struct TranslationUnit {
    path: String,
    source: Vec<u8>,
    tree: Tree,
    system_dirs: Vec<String>,
}

impl TranslationUnit {
    /// Parse a source buffer. Fails only when the grammar cannot be loaded
    /// or the parser produces no syntax tree; malformed code still yields a
    /// tree with error nodes and is indexed best-effort.
    pub fn parse(path: &str, source: Vec<u8>, args: &[String]) -> Result<Self, IndexError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_cpp::LANGUAGE.into())
            .map_err(|e| IndexError::Grammar(e.to_string()))?;
        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| IndexError::Parse(format!("no syntax tree for {path}")))?;
        Ok(Self {
            path: path.to_string(),
            source,
            tree,
            system_dirs: system_dirs_from_args(args),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub(crate) fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub(crate) fn text(&self, node: Node<'_>) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }

    /// 1-based `(line, column)` of a node's start.
    pub(crate) fn position(&self, node: Node<'_>) -> (u32, u32) {
        let point = node.start_position();
        (point.row as u32 + 1, point.column as u32 + 1)
    }

    /// Whether this unit's file sits under one of the `-isystem` roots.
    pub fn is_system(&self) -> bool {
        self.system_dirs.iter().any(|dir| self.path.starts_with(dir))
    }

    /// Walk the unit, delivering declaration and reference events to
    /// `callbacks` in source order. Returns early at the next event
    /// boundary once `callbacks.cancelled()` reports true.
    pub fn index(&self, callbacks: &mut dyn IndexCallbacks) {
        let table = DeclTable::build(self);
        tracing::debug!("{}: {} declarations collected", self.path, table.len());
        Walker::new(self, &table).run(callbacks);
    }
}

fn system_dirs_from_args(args: &[String]) -> Vec<String> {
    let mut dirs = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "-isystem" {
            if let Some(dir) = iter.next() {
                dirs.push(dir.clone());
            }
        } else if let Some(dir) = arg.strip_prefix("-isystem") {
            dirs.push(dir.to_string());
        }
    }
    dirs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_builds_a_tree() {
        let tu = TranslationUnit::parse("/src/a.cc", b"int x;".to_vec(), &[])
            .expect("parse should succeed");
        assert_eq!(tu.path(), "/src/a.cc");
        assert_eq!(tu.root().kind(), "translation_unit");
    }

    #[test]
    fn system_dirs_come_from_isystem_args() {
        let args = vec![
            "-O2".to_string(),
            "-isystem".to_string(),
            "/usr/include".to_string(),
            "-isystem/opt/sdk".to_string(),
        ];
        let tu = TranslationUnit::parse("/usr/include/cstdio", b"".to_vec(), &args)
            .expect("parse should succeed");
        assert!(tu.is_system());

        let tu = TranslationUnit::parse("/src/a.cc", b"".to_vec(), &args)
            .expect("parse should succeed");
        assert!(!tu.is_system());
    }

    #[test]
    fn positions_are_one_based() {
        let tu = TranslationUnit::parse("/src/a.cc", b"int x;\nint y;".to_vec(), &[])
            .expect("parse should succeed");
        let first = tu.root().child(0).expect("first declaration");
        assert_eq!(tu.position(first), (1, 1));
        let second = tu.root().child(1).expect("second declaration");
        assert_eq!(tu.position(second), (2, 1));
    }
}
