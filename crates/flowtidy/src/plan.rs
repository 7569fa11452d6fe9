//! Planned native positions for one process group.

use flowtidy_core::{geometry::Point, identity::ComponentIdentity};

use crate::{graph::FlowGraph, layout::Placement};

/// The native top-left position planned for one component.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedPosition {
    identity: ComponentIdentity,
    position: Point,
}

impl PlannedPosition {
    pub fn new(identity: ComponentIdentity, position: Point) -> Self {
        Self { identity, position }
    }

    pub fn identity(&self) -> &ComponentIdentity {
        &self.identity
    }

    /// Returns the position in native canvas units.
    pub fn position(&self) -> Point {
        self.position
    }
}

/// Positions to write back to the service, ordered by identity.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPlan {
    group_id: String,
    positions: Vec<PlannedPosition>,
}

impl LayoutPlan {
    /// Convert a checked placement to native top-left positions.
    ///
    /// Nodes without an entry in `placement` are left out; [`crate::layout::invoke`]
    /// guarantees there are none.
    pub fn from_placement(graph: &FlowGraph, placement: &Placement) -> Self {
        let scale = graph.scale();
        let positions = graph
            .nodes()
            .filter_map(|node| {
                placement.get(node.identity()).map(|&centre| {
                    PlannedPosition::new(
                        node.identity().clone(),
                        scale.to_native_position(centre, node.native_size()),
                    )
                })
            })
            .collect();

        Self {
            group_id: graph.group_id().to_string(),
            positions,
        }
    }

    /// Build a plan from positions that are already in native units.
    pub fn from_positions(
        group_id: impl Into<String>,
        positions: impl IntoIterator<Item = PlannedPosition>,
    ) -> Self {
        let mut positions: Vec<_> = positions.into_iter().collect();
        positions.sort_by(|l, r| l.identity.cmp(&r.identity));
        Self {
            group_id: group_id.into(),
            positions,
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlannedPosition> {
        self.positions.iter()
    }

    /// Returns the planned position of one component.
    pub fn position(&self, identity: &ComponentIdentity) -> Option<Point> {
        self.positions
            .binary_search_by(|planned| planned.identity.cmp(identity))
            .ok()
            .map(|index| self.positions[index].position)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl<'a> IntoIterator for &'a LayoutPlan {
    type Item = &'a PlannedPosition;
    type IntoIter = std::slice::Iter<'a, PlannedPosition>;

    fn into_iter(self) -> Self::IntoIter {
        self.positions.iter()
    }
}
