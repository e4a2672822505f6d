use core::cmp::Ordering;
use core::fmt;

use crate::command::{Command, CommandIndex};

/// Label of a node in the command graph: path segments paired with the positions used to sort
/// them.
///
/// Only top-level commands are labelled; replay-internal sub-steps get no labels of their own.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GraphLabel {
    pub segments: Vec<String>,
    pub positions: Vec<CommandIndex>,
}

impl Ord for GraphLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.positions
            .cmp(&other.positions)
            .then_with(|| self.segments.cmp(&other.segments))
    }
}

impl PartialOrd for GraphLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GraphLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join("/"))
    }
}

pub fn label_for_command(cmd: &Command, position: CommandIndex) -> GraphLabel {
    GraphLabel {
        segments: vec![format!("{}_{}", cmd.name(), position)],
        positions: vec![position],
    }
}
