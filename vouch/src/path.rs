use std::fmt;

use serde::{Serialize, Serializer};

/// One step from the validated root to the offending value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathNode {
    Property(String),
    Index(usize),
    Key(String),
    /// Element of an unordered container; rendered as `[]`.
    Iterable,
    Constructor(String),
    Parameter { index: usize, name: String },
}

/// Dotted path such as `address.city`, `tags[1]` or `new.name`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyPath {
    nodes: Vec<PathNode>,
}

impl PropertyPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_nodes(nodes: impl IntoIterator<Item = PathNode>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
        }
    }

    pub fn nodes(&self) -> &[PathNode] {
        &self.nodes
    }

    pub fn is_root(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push(&mut self, node: PathNode) {
        self.nodes.push(node);
    }

    pub fn pop(&mut self) -> Option<PathNode> {
        self.nodes.pop()
    }

    /// Name of the last named node, if any.
    pub fn leaf_name(&self) -> Option<&str> {
        self.nodes.iter().rev().find_map(|node| match node {
            PathNode::Property(name) | PathNode::Constructor(name) => Some(name.as_str()),
            PathNode::Parameter { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, node) in self.nodes.iter().enumerate() {
            match node {
                PathNode::Index(index) => write!(f, "[{index}]")?,
                PathNode::Key(key) => write!(f, "[{key}]")?,
                PathNode::Iterable => f.write_str("[]")?,
                PathNode::Property(name) | PathNode::Constructor(name) | PathNode::Parameter { name, .. } => {
                    if position > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
            }
        }
        Ok(())
    }
}

impl Serialize for PropertyPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
