use scenario::registry::Registry;
use scenario::statement::Statement;
use scenario::tree::ScenarioNode;

use crate::error::Unresolved;
use crate::resolver::{Resolution, resolve_statement};

/// Renders resolved statements and conditional blocks as indented lines.
pub struct Emitter<'r> {
    registry: &'r Registry,
    indent: usize,
    output: String,
    unresolved: Vec<Unresolved>,
}

impl<'r> Emitter<'r> {
    pub fn new(registry: &'r Registry, indent: usize) -> Self {
        Emitter {
            registry,
            indent,
            output: String::new(),
            unresolved: Vec::new(),
        }
    }

    /// Write one line at `depth`. Empty lines carry no indentation.
    pub fn line(&mut self, depth: usize, text: &str) {
        if !text.is_empty() {
            self.output.push_str(&" ".repeat(depth * self.indent));
            self.output.push_str(text);
        }
        self.output.push('\n');
    }

    pub fn blank_line(&mut self) {
        self.output.push('\n');
    }

    fn resolve(&mut self, statement: &Statement) -> String {
        let Resolution { text, unresolved } = resolve_statement(self.registry, statement);
        self.unresolved.extend(unresolved);
        text
    }

    /// Resolve a single statement and write it as one line.
    pub fn statement(&mut self, depth: usize, statement: &Statement) {
        let text = self.resolve(statement);
        self.line(depth, &text);
    }

    /// Emit a forest depth-first, in input order.
    pub fn forest(&mut self, depth: usize, forest: &[ScenarioNode]) {
        for node in forest {
            self.node(depth, node);
        }
    }

    fn node(&mut self, depth: usize, node: &ScenarioNode) {
        if node.children.is_empty() {
            self.statement(depth, &node.statement);
            return;
        }

        let guard = self.resolve(&node.statement);
        self.line(depth, &format!("if ({}) {{", guard));
        self.forest(depth + 1, &node.children);
        self.line(depth, "}");
    }

    /// The emitted text and every placeholder left unresolved along the way.
    pub fn finish(self) -> Resolution {
        Resolution {
            text: self.output,
            unresolved: self.unresolved,
        }
    }
}

/// Emit a forest at depth 0 with the given indent width.
pub fn emit_forest(registry: &Registry, forest: &[ScenarioNode], indent: usize) -> Resolution {
    let mut emitter = Emitter::new(registry, indent);
    emitter.forest(0, forest);
    emitter.finish()
}
