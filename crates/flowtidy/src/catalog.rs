//! Component catalog: the node set of one process group snapshot.
//!
//! Every component drawn on the group canvas becomes one entry keyed by its
//! [`ComponentIdentity`], together with its size in native canvas units.

use indexmap::IndexMap;
use log::{debug, warn};
use thiserror::Error;

use flowtidy_core::{
    geometry::Size,
    identity::{ComponentIdentity, ComponentKind},
    snapshot::{ComponentEntry, FlowSnapshot},
};

/// Size given to a label that reports no dimensions of its own.
pub const LABEL_FALLBACK_SIZE: Size = Size::new(150.0, 150.0);

/// Errors raised while building a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("label `{id}` reports invalid dimensions {width} x {height}")]
    LabelSize { id: String, width: f64, height: f64 },
}

/// Canvas size of a component kind, in native units.
///
/// Labels are sized from the instance's own dimensions, every other kind has
/// the fixed size the canvas draws it with.
///
/// # Errors
///
/// Returns [`CatalogError::LabelSize`] when a label reports a non-positive
/// dimension.
pub fn component_size(
    kind: ComponentKind,
    id: &str,
    reported: Option<Size>,
) -> Result<Size, CatalogError> {
    let size = match kind {
        ComponentKind::ProcessGroup => Size::new(380.0, 175.0),
        ComponentKind::RemoteProcessGroup => Size::new(380.0, 160.0),
        ComponentKind::Processor => Size::new(370.0, 130.0),
        ComponentKind::InputPort | ComponentKind::OutputPort => Size::new(240.0, 50.0),
        ComponentKind::Funnel => Size::new(50.0, 50.0),
        ComponentKind::Label => {
            let size = reported.unwrap_or(LABEL_FALLBACK_SIZE);
            if !size.is_positive() {
                return Err(CatalogError::LabelSize {
                    id: id.to_string(),
                    width: size.width(),
                    height: size.height(),
                });
            }
            size
        }
    };
    Ok(size)
}

/// The set of components drawn on one group canvas.
#[derive(Debug, Clone)]
pub struct Catalog {
    group_id: String,
    entries: IndexMap<ComponentIdentity, Size>,
}

impl Catalog {
    /// Build the catalog of a snapshot.
    ///
    /// Entries are kept sorted by identity so later stages see the same order
    /// regardless of how the service listed the components.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] when a component cannot be sized.
    pub fn from_snapshot(snapshot: &FlowSnapshot) -> Result<Self, CatalogError> {
        let flow = snapshot.flow();
        let mut catalog = Self {
            group_id: snapshot.group_id().to_string(),
            entries: IndexMap::new(),
        };

        let fixed: [(ComponentKind, &[ComponentEntry]); 6] = [
            (ComponentKind::ProcessGroup, flow.process_groups()),
            (ComponentKind::RemoteProcessGroup, flow.remote_process_groups()),
            (ComponentKind::Processor, flow.processors()),
            (ComponentKind::InputPort, flow.input_ports()),
            (ComponentKind::OutputPort, flow.output_ports()),
            (ComponentKind::Funnel, flow.funnels()),
        ];
        for (kind, entries) in fixed {
            for entry in entries {
                catalog.insert(entry.id(), kind, None)?;
            }
        }
        for label in flow.labels() {
            catalog.insert(label.id(), ComponentKind::Label, label.dimensions())?;
        }

        catalog.entries.sort_keys();
        debug!(
            group_id = catalog.group_id.as_str(),
            components = catalog.entries.len();
            "Catalog built"
        );
        Ok(catalog)
    }

    fn insert(
        &mut self,
        id: &str,
        kind: ComponentKind,
        reported: Option<Size>,
    ) -> Result<(), CatalogError> {
        let size = component_size(kind, id, reported)?;
        let identity = ComponentIdentity::new(id, kind);
        if self.entries.insert(identity, size).is_some() {
            warn!(id, kind = kind.as_str(); "Component listed twice in snapshot");
        }
        Ok(())
    }

    /// Returns the id of the group the catalog was built for.
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Returns the native size of a component, if it is in the catalog.
    pub fn size(&self, identity: &ComponentIdentity) -> Option<Size> {
        self.entries.get(identity).copied()
    }

    pub fn contains(&self, identity: &ComponentIdentity) -> bool {
        self.entries.contains_key(identity)
    }

    /// Iterate over entries in identity order.
    pub fn iter(&self) -> impl Iterator<Item = (&ComponentIdentity, Size)> {
        self.entries.iter().map(|(identity, size)| (identity, *size))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_size() {
        for kind in ComponentKind::ALL {
            let size = component_size(kind, "x", None).unwrap();
            assert!(size.is_positive(), "{kind} has no positive size");
        }
    }

    #[test]
    fn test_label_uses_reported_dimensions() {
        let size = component_size(ComponentKind::Label, "l1", Some(Size::new(300.0, 200.0)));
        assert_eq!(size, Ok(Size::new(300.0, 200.0)));

        let fallback = component_size(ComponentKind::Label, "l2", None);
        assert_eq!(fallback, Ok(LABEL_FALLBACK_SIZE));
    }

    #[test]
    fn test_label_with_degenerate_dimensions_is_rejected() {
        let err =
            component_size(ComponentKind::Label, "l1", Some(Size::new(0.0, 200.0))).unwrap_err();
        assert_eq!(
            err,
            CatalogError::LabelSize {
                id: "l1".to_string(),
                width: 0.0,
                height: 200.0,
            }
        );
    }

    #[test]
    fn test_fixed_sizes_ignore_reported_dimensions() {
        let size = component_size(ComponentKind::Funnel, "f", Some(Size::new(999.0, 999.0)));
        assert_eq!(size, Ok(Size::new(50.0, 50.0)));
    }

    #[test]
    fn test_catalog_from_snapshot() {
        let snapshot = FlowSnapshot::builder("root")
            .process_group("pg1")
            .remote_process_group("rpg1")
            .processor("proc1")
            .input_port("in1")
            .output_port("out1")
            .label("note", Some(Size::new(300.0, 200.0)))
            .funnel("f1")
            .build();

        let catalog = Catalog::from_snapshot(&snapshot).unwrap();

        assert_eq!(catalog.group_id(), "root");
        assert_eq!(catalog.len(), 7);
        assert_eq!(
            catalog.size(&ComponentIdentity::new("note", ComponentKind::Label)),
            Some(Size::new(300.0, 200.0))
        );
        assert!(catalog.contains(&ComponentIdentity::new("rpg1", ComponentKind::RemoteProcessGroup)));
        assert!(!catalog.contains(&ComponentIdentity::new("rpg1", ComponentKind::ProcessGroup)));
    }

    #[test]
    fn test_catalog_order_is_independent_of_listing_order() {
        let forward = FlowSnapshot::builder("root")
            .processor("a")
            .processor("b")
            .funnel("c")
            .build();
        let backward = FlowSnapshot::builder("root")
            .funnel("c")
            .processor("b")
            .processor("a")
            .build();

        let forward: Vec<_> = Catalog::from_snapshot(&forward)
            .unwrap()
            .iter()
            .map(|(identity, _)| identity.clone())
            .collect();
        let backward: Vec<_> = Catalog::from_snapshot(&backward)
            .unwrap()
            .iter()
            .map(|(identity, _)| identity.clone())
            .collect();

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_duplicate_listing_collapses() {
        let snapshot = FlowSnapshot::builder("root")
            .processor("p")
            .processor("p")
            .build();

        assert_eq!(Catalog::from_snapshot(&snapshot).unwrap().len(), 1);
    }
}
