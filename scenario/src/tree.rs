use crate::statement::Statement;

/// A statement plus the statements it guards.
///
/// Only conditional-opening statements (`<if_...>`) ever own children, and
/// children are always leaves: the builder keeps at most one open scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioNode {
    pub statement: Statement,
    pub children: Vec<ScenarioNode>,
}

impl ScenarioNode {
    pub fn leaf(statement: Statement) -> Self {
        ScenarioNode {
            statement,
            children: Vec::new(),
        }
    }

    pub fn is_conditional(&self) -> bool {
        self.statement.is_conditional()
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ScenarioNode::node_count).sum::<usize>()
    }
}

/// Total node count of a forest.
pub fn forest_size(forest: &[ScenarioNode]) -> usize {
    forest.iter().map(ScenarioNode::node_count).sum()
}

/// Group a flat statement list into a forest of guarded blocks.
///
/// - `<if_end>` closes the open scope and produces no node.
/// - `<if_...>` becomes a new root and the open scope. An already open scope is
///   replaced, not nested.
/// - Anything else joins the open scope, or becomes a root when none is open.
pub fn build_forest(statements: &[Statement]) -> Vec<ScenarioNode> {
    let mut forest: Vec<ScenarioNode> = Vec::new();
    // Index into `forest` of the open conditional, if any.
    let mut open: Option<usize> = None;

    for statement in statements {
        if statement.is_closing_marker() {
            open = None;
        } else if statement.is_conditional() {
            if open.is_some() {
                tracing::debug!(
                    statement = statement.as_str(),
                    "conditional opened while another is open; replacing scope"
                );
            }
            forest.push(ScenarioNode::leaf(statement.clone()));
            open = Some(forest.len() - 1);
        } else {
            let node = ScenarioNode::leaf(statement.clone());
            match open {
                Some(index) => forest[index].children.push(node),
                None => forest.push(node),
            }
        }
    }

    forest
}
