//! Component kinds and composite identities.
//!
//! A canvas component is identified by its id *and* its kind. The pair is kept
//! as a structured key ([`ComponentIdentity`]) with structural equality and
//! hashing, so it can be used directly as a graph node key.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when a kind string reported by the remote service is not
/// part of the closed kind sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KindError {
    #[error("unrecognized component kind `{0}`")]
    UnknownComponent(String),

    #[error("unrecognized connection endpoint kind `{0}`")]
    UnknownEndpoint(String),
}

/// The closed set of component kinds drawn on a process group canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComponentKind {
    ProcessGroup,
    RemoteProcessGroup,
    Processor,
    InputPort,
    OutputPort,
    Label,
    Funnel,
}

impl ComponentKind {
    /// Every component kind, in canvas drawing order.
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::ProcessGroup,
        ComponentKind::RemoteProcessGroup,
        ComponentKind::Processor,
        ComponentKind::InputPort,
        ComponentKind::OutputPort,
        ComponentKind::Label,
        ComponentKind::Funnel,
    ];

    /// Returns the name the remote service uses for this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::ProcessGroup => "PROCESS_GROUP",
            ComponentKind::RemoteProcessGroup => "REMOTE_PROCESS_GROUP",
            ComponentKind::Processor => "PROCESSOR",
            ComponentKind::InputPort => "INPUT_PORT",
            ComponentKind::OutputPort => "OUTPUT_PORT",
            ComponentKind::Label => "LABEL",
            ComponentKind::Funnel => "FUNNEL",
        }
    }
}

impl FromStr for ComponentKind {
    type Err = KindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| KindError::UnknownComponent(s.to_string()))
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of a connection endpoint, as reported by the remote service.
///
/// Endpoints are a different set than [`ComponentKind`]: remote ports are
/// connectable but never drawn on their own, they live inside a remote
/// process group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Processor,
    InputPort,
    OutputPort,
    RemoteInputPort,
    RemoteOutputPort,
    Funnel,
}

impl EndpointKind {
    const ALL: [EndpointKind; 6] = [
        EndpointKind::Processor,
        EndpointKind::InputPort,
        EndpointKind::OutputPort,
        EndpointKind::RemoteInputPort,
        EndpointKind::RemoteOutputPort,
        EndpointKind::Funnel,
    ];

    /// Returns the name the remote service uses for this endpoint kind.
    pub fn as_str(self) -> &'static str {
        match self {
            EndpointKind::Processor => "PROCESSOR",
            EndpointKind::InputPort => "INPUT_PORT",
            EndpointKind::OutputPort => "OUTPUT_PORT",
            EndpointKind::RemoteInputPort => "REMOTE_INPUT_PORT",
            EndpointKind::RemoteOutputPort => "REMOTE_OUTPUT_PORT",
            EndpointKind::Funnel => "FUNNEL",
        }
    }

    /// Returns `true` for ports that belong to a remote process group.
    pub fn is_remote_port(self) -> bool {
        matches!(
            self,
            EndpointKind::RemoteInputPort | EndpointKind::RemoteOutputPort
        )
    }

    /// Returns the component kind drawn for this endpoint when it sits
    /// directly on the canvas, or `None` for remote ports.
    pub fn component_kind(self) -> Option<ComponentKind> {
        match self {
            EndpointKind::Processor => Some(ComponentKind::Processor),
            EndpointKind::InputPort => Some(ComponentKind::InputPort),
            EndpointKind::OutputPort => Some(ComponentKind::OutputPort),
            EndpointKind::Funnel => Some(ComponentKind::Funnel),
            EndpointKind::RemoteInputPort | EndpointKind::RemoteOutputPort => None,
        }
    }
}

impl FromStr for EndpointKind {
    type Err = KindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| KindError::UnknownEndpoint(s.to_string()))
    }
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Composite key of a canvas component: its id plus its kind.
///
/// Two identities are equal iff both fields match. Ordering is by id first,
/// then kind, which gives a stable traversal order independent of the order
/// the remote service listed components in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentIdentity {
    id: String,
    kind: ComponentKind,
}

impl ComponentIdentity {
    pub fn new(id: impl Into<String>, kind: ComponentKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// Returns the component id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the component kind.
    pub fn kind(&self) -> ComponentKind {
        self.kind
    }
}

impl fmt::Display for ComponentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.id)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_component_kind_round_trips_through_wire_name() {
        for kind in ComponentKind::ALL {
            assert_eq!(kind.as_str().parse::<ComponentKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_component_kind_is_rejected() {
        let err = "CONTROLLER_SERVICE".parse::<ComponentKind>().unwrap_err();
        assert_eq!(
            err,
            KindError::UnknownComponent("CONTROLLER_SERVICE".to_string())
        );
        assert_eq!(
            err.to_string(),
            "unrecognized component kind `CONTROLLER_SERVICE`"
        );
    }

    #[test]
    fn test_component_kind_serde_uses_wire_names() {
        let json = serde_json::to_string(&ComponentKind::RemoteProcessGroup).unwrap();
        assert_eq!(json, "\"REMOTE_PROCESS_GROUP\"");

        let kind: ComponentKind = serde_json::from_str("\"FUNNEL\"").unwrap();
        assert_eq!(kind, ComponentKind::Funnel);
    }

    #[test]
    fn test_endpoint_kinds() {
        assert_eq!(
            "REMOTE_INPUT_PORT".parse::<EndpointKind>(),
            Ok(EndpointKind::RemoteInputPort)
        );
        assert!(EndpointKind::RemoteOutputPort.is_remote_port());
        assert!(!EndpointKind::OutputPort.is_remote_port());
        assert_eq!(EndpointKind::RemoteInputPort.component_kind(), None);
        assert_eq!(
            EndpointKind::Funnel.component_kind(),
            Some(ComponentKind::Funnel)
        );
        assert!(matches!(
            "LABEL".parse::<EndpointKind>(),
            Err(KindError::UnknownEndpoint(_))
        ));
    }

    #[test]
    fn test_identity_equality_needs_both_fields() {
        let processor = ComponentIdentity::new("abc", ComponentKind::Processor);
        let funnel = ComponentIdentity::new("abc", ComponentKind::Funnel);

        assert_ne!(processor, funnel);
        assert_eq!(
            processor,
            ComponentIdentity::new("abc".to_string(), ComponentKind::Processor)
        );

        let set: HashSet<_> = [processor.clone(), funnel, processor].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_identity_display() {
        let identity = ComponentIdentity::new("p-1", ComponentKind::InputPort);
        assert_eq!(identity.to_string(), "INPUT_PORT p-1");
    }
}

#[cfg(test)]
mod proptest_tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    // ===================
    // Strategies
    // ===================

    fn component_kind_strategy() -> impl Strategy<Value = ComponentKind> {
        prop::sample::select(ComponentKind::ALL.to_vec())
    }

    fn endpoint_kind_strategy() -> impl Strategy<Value = EndpointKind> {
        prop::sample::select(EndpointKind::ALL.to_vec())
    }

    /// Short ids from a small alphabet so equal ids come up often.
    fn identity_strategy() -> impl Strategy<Value = ComponentIdentity> {
        ("[ab]{1,2}", component_kind_strategy())
            .prop_map(|(id, kind)| ComponentIdentity::new(id, kind))
    }

    // ===================
    // Proptest Wrappers
    // ===================

    proptest! {
        #[test]
        fn component_kind_wire_name_round_trip(kind in component_kind_strategy()) {
            check_component_kind_wire_name(kind)?;
        }

        #[test]
        fn endpoint_kind_wire_name_round_trip(kind in endpoint_kind_strategy()) {
            check_endpoint_kind_wire_name(kind)?;
        }

        #[test]
        fn unknown_wire_names_are_rejected(name in "[A-Z_]{1,24}") {
            check_unknown_wire_name(&name)?;
        }

        #[test]
        fn identity_equality_needs_id_and_kind(
            left in identity_strategy(),
            right in identity_strategy(),
        ) {
            check_identity_equality(&left, &right)?;
        }
    }

    // ===================
    // Property Test Functions
    // ===================

    fn check_component_kind_wire_name(kind: ComponentKind) -> Result<(), TestCaseError> {
        prop_assert_eq!(kind.as_str().parse::<ComponentKind>(), Ok(kind));
        prop_assert_eq!(kind.to_string(), kind.as_str());

        let json = serde_json::to_string(&kind).unwrap();
        prop_assert_eq!(json, format!("\"{}\"", kind.as_str()));
        Ok(())
    }

    fn check_endpoint_kind_wire_name(kind: EndpointKind) -> Result<(), TestCaseError> {
        prop_assert_eq!(kind.as_str().parse::<EndpointKind>(), Ok(kind));
        prop_assert_eq!(kind.component_kind().is_none(), kind.is_remote_port());
        Ok(())
    }

    /// Any string outside the wire-name sets fails to parse.
    fn check_unknown_wire_name(name: &str) -> Result<(), TestCaseError> {
        let known_component = ComponentKind::ALL.iter().any(|kind| kind.as_str() == name);
        let known_endpoint = EndpointKind::ALL.iter().any(|kind| kind.as_str() == name);

        prop_assert_eq!(name.parse::<ComponentKind>().is_ok(), known_component);
        prop_assert_eq!(name.parse::<EndpointKind>().is_ok(), known_endpoint);
        Ok(())
    }

    /// Identities are equal, and hash alike, iff both fields match.
    fn check_identity_equality(
        left: &ComponentIdentity,
        right: &ComponentIdentity,
    ) -> Result<(), TestCaseError> {
        let same = left.id() == right.id() && left.kind() == right.kind();
        prop_assert_eq!(left == right, same);

        let set: HashSet<_> = [left.clone(), right.clone()].into_iter().collect();
        prop_assert_eq!(set.len(), if same { 1 } else { 2 });
        Ok(())
    }
}
