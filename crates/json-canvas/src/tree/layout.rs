//! Automatic spatial layout.
//!
//! Recomputes node positions from tree depth and sibling order. The walk is
//! a pure function of topology and expansion state: running it twice with
//! no structural change in between yields identical positions.

use std::collections::HashSet;
use std::f64::consts::TAU;

use crate::node::{NodeCollection, NodeId, Position};

use super::MutationError;

/// Fixed anchor the root is placed at.
pub const LAYOUT_ANCHOR: Position = Position::new(400.0, 50.0);

const VERTICAL_CHILD_SPACING: f64 = 150.0;
const VERTICAL_LEVEL_SPACING: f64 = 120.0;
const HORIZONTAL_CHILD_SPACING: f64 = 120.0;
const HORIZONTAL_LEVEL_SPACING: f64 = 200.0;
const RADIAL_DEPTH_STEP: f64 = 20.0;

/// Axis the tree grows along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutDirection {
    /// Children spread horizontally below their parent.
    #[default]
    Vertical,
    /// Children spread vertically to the right of their parent.
    Horizontal,
    /// Children sit on a circle around their parent, radius growing with
    /// depth.
    Radial,
}

impl LayoutDirection {
    pub fn label(self) -> &'static str {
        match self {
            LayoutDirection::Vertical => "vertical",
            LayoutDirection::Horizontal => "horizontal",
            LayoutDirection::Radial => "radial",
        }
    }
}

/// Recomputes `position` for the root and every node reachable through
/// expanded containers. Collapsed subtrees keep their prior positions —
/// they are hidden anyway, and skipping them avoids churn when the user
/// expands them again.
pub fn auto_layout(
    col: &NodeCollection,
    direction: LayoutDirection,
) -> Result<NodeCollection, MutationError> {
    let root = col.root_id().ok_or(MutationError::MissingRoot)?;
    let mut next = col.clone();
    let mut placed = HashSet::new();
    place(&mut next, root, LAYOUT_ANCHOR, 0, direction, &mut placed);
    Ok(next)
}

fn place(
    col: &mut NodeCollection,
    id: NodeId,
    position: Position,
    level: usize,
    direction: LayoutDirection,
    placed: &mut HashSet<NodeId>,
) {
    // Guard against corrupt link cycles; each node is placed once.
    if !placed.insert(id) {
        return;
    }
    let children = {
        let Some(node) = col.get_mut(id) else {
            return;
        };
        node.position = position;
        if !node.expanded || node.children.is_empty() {
            return;
        }
        node.children.clone()
    };

    let (child_spacing, level_spacing) = match direction {
        LayoutDirection::Horizontal => (HORIZONTAL_CHILD_SPACING, HORIZONTAL_LEVEL_SPACING),
        _ => (VERTICAL_CHILD_SPACING, VERTICAL_LEVEL_SPACING),
    };
    let count = children.len() as f64;

    for (index, child) in children.into_iter().enumerate() {
        let i = index as f64;
        let child_position = match direction {
            LayoutDirection::Horizontal => Position::new(
                position.x + level_spacing,
                position.y + (i - count / 2.0) * child_spacing,
            ),
            LayoutDirection::Vertical => Position::new(
                position.x + (i - count / 2.0) * child_spacing,
                position.y + level_spacing,
            ),
            LayoutDirection::Radial => {
                let angle = i / count * TAU;
                let radius = level_spacing + level as f64 * RADIAL_DEPTH_STEP;
                Position::new(
                    position.x + angle.cos() * radius,
                    position.y + angle.sin() * radius,
                )
            }
        };
        place(col, child, child_position, level + 1, direction, placed);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
