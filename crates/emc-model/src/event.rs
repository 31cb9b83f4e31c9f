//! Change-feed event types.
//!
//! Events are delivered at-least-once, unordered across keys and ordered per key
//! by [`ResourceVersion`].
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    Labels, ObjectKey, PlacementSpec, ResourceVersion,
    error::{ModelError, ModelResult},
};

/// Kind of resource an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Placement,
    Location,
    Endpoint,
}

impl ResourceKind {
    /// Return label value for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Placement => "placement",
            Self::Location => "location",
            Self::Endpoint => "endpoint",
        }
    }

    /// Candidate kind for locations and endpoints; `None` for placements.
    pub fn candidate(&self) -> Option<CandidateKind> {
        match self {
            Self::Placement => None,
            Self::Location => Some(CandidateKind::Location),
            Self::Endpoint => Some(CandidateKind::Endpoint),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "placement" => Ok(Self::Placement),
            "location" => Ok(Self::Location),
            "endpoint" => Ok(Self::Endpoint),
            other => Err(ModelError::UnknownKind(other.to_string())),
        }
    }
}

/// What a selector selects over: locations or endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CandidateKind {
    Location,
    Endpoint,
}

impl CandidateKind {
    pub const ALL: [CandidateKind; 2] = [CandidateKind::Location, CandidateKind::Endpoint];

    /// Return label value for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Endpoint => "endpoint",
        }
    }
}

impl From<CandidateKind> for ResourceKind {
    fn from(k: CandidateKind) -> Self {
        match k {
            CandidateKind::Location => ResourceKind::Location,
            CandidateKind::Endpoint => ResourceKind::Endpoint,
        }
    }
}

impl fmt::Display for CandidateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation carried by an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventOp {
    Add,
    Update,
    Delete,
}

impl EventOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Object body carried by Add / Update events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Payload {
    /// Selector pair of a placement.
    Placement(PlacementSpec),
    /// Labels of a location or endpoint.
    Labels(Labels),
}

/// Typed change notification for one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeEvent {
    pub kind: ResourceKind,
    pub op: EventOp,
    pub key: ObjectKey,
    /// Always present on the wire; a missing version is a decode error.
    pub version: ResourceVersion,
    /// Required for `Add` / `Update`, ignored for `Delete`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl ChangeEvent {
    /// Add or update a placement.
    pub fn placement(
        op: EventOp,
        key: ObjectKey,
        version: impl Into<ResourceVersion>,
        spec: PlacementSpec,
    ) -> Self {
        Self {
            kind: ResourceKind::Placement,
            op,
            key,
            version: version.into(),
            payload: Some(Payload::Placement(spec)),
        }
    }

    /// Add or update a location.
    pub fn location(
        op: EventOp,
        key: ObjectKey,
        version: impl Into<ResourceVersion>,
        labels: Labels,
    ) -> Self {
        Self::candidate(ResourceKind::Location, op, key, version.into(), labels)
    }

    /// Add or update an endpoint.
    pub fn endpoint(
        op: EventOp,
        key: ObjectKey,
        version: impl Into<ResourceVersion>,
        labels: Labels,
    ) -> Self {
        Self::candidate(ResourceKind::Endpoint, op, key, version.into(), labels)
    }

    /// Delete notification for any kind.
    pub fn delete(kind: ResourceKind, key: ObjectKey, version: impl Into<ResourceVersion>) -> Self {
        Self {
            kind,
            op: EventOp::Delete,
            key,
            version: version.into(),
            payload: None,
        }
    }

    fn candidate(
        kind: ResourceKind,
        op: EventOp,
        key: ObjectKey,
        version: ResourceVersion,
        labels: Labels,
    ) -> Self {
        Self {
            kind,
            op,
            key,
            version,
            payload: Some(Payload::Labels(labels)),
        }
    }

    /// Check that the payload fits the kind and operation.
    ///
    /// Rules:
    /// - `Delete` never requires a payload;
    /// - placements carry [`Payload::Placement`];
    /// - locations and endpoints carry [`Payload::Labels`].
    pub fn validate(&self) -> ModelResult<()> {
        if self.op == EventOp::Delete {
            return Ok(());
        }
        let mismatch = |reason: &str| ModelError::PayloadMismatch {
            kind: self.kind.as_str(),
            reason: reason.to_string(),
        };
        match (&self.kind, &self.payload) {
            (_, None) => Err(mismatch("missing payload")),
            (ResourceKind::Placement, Some(Payload::Placement(_))) => Ok(()),
            (ResourceKind::Placement, Some(Payload::Labels(_))) => {
                Err(mismatch("expected selectors, got labels"))
            }
            (_, Some(Payload::Labels(_))) => Ok(()),
            (_, Some(Payload::Placement(_))) => Err(mismatch("expected labels, got selectors")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SelectorSpec;

    fn key(name: &str) -> ObjectKey {
        ObjectKey::new("root", name).unwrap()
    }

    #[test]
    fn constructors_produce_valid_events() {
        let labels: Labels = [("env", "dev")].into_iter().collect();
        let events = [
            ChangeEvent::location(EventOp::Add, key("l"), 1, labels.clone()),
            ChangeEvent::endpoint(EventOp::Update, key("e"), 2, labels),
            ChangeEvent::placement(EventOp::Add, key("p"), 3, PlacementSpec::default()),
            ChangeEvent::delete(ResourceKind::Endpoint, key("e"), 4),
        ];
        for ev in events {
            assert!(ev.validate().is_ok(), "{ev:?} should validate");
        }
    }

    #[test]
    fn validate_rejects_mismatched_payloads() {
        let mut ev = ChangeEvent::location(EventOp::Add, key("l"), 1, Labels::new());
        ev.payload = Some(Payload::Placement(PlacementSpec::default()));
        assert!(matches!(
            ev.validate(),
            Err(ModelError::PayloadMismatch { kind: "location", .. })
        ));

        ev.payload = None;
        assert!(ev.validate().is_err());

        let mut ev = ChangeEvent::placement(EventOp::Update, key("p"), 1, PlacementSpec::default());
        ev.payload = Some(Payload::Labels(Labels::new()));
        assert!(ev.validate().is_err());
    }

    #[test]
    fn decodes_feed_line() {
        let line = r#"{
            "kind": "placement",
            "op": "add",
            "key": "root|p1",
            "version": 7,
            "payload": {"placement": {
                "locationSelector": {"matchLabels": {"env": "dev"}},
                "endpointSelector": {"matchLabels": {"tier": "edge"}}
            }}
        }"#;
        let ev: ChangeEvent = serde_json::from_str(line).unwrap();

        assert_eq!(ev.kind, ResourceKind::Placement);
        assert_eq!(ev.op, EventOp::Add);
        assert_eq!(ev.version, ResourceVersion(7));
        let Some(Payload::Placement(spec)) = ev.payload else {
            panic!("expected placement payload");
        };
        assert_eq!(spec.location_selector, SelectorSpec::everything().with_label("env", "dev"));
    }

    #[test]
    fn feed_line_without_version_is_rejected() {
        let line = r#"{"kind":"location","op":"add","key":"root|l","payload":{"labels":{}}}"#;
        let err = serde_json::from_str::<ChangeEvent>(line).unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn resource_kind_parses_and_maps_to_candidates() {
        assert_eq!("Location".parse::<ResourceKind>().unwrap(), ResourceKind::Location);
        assert!("pod".parse::<ResourceKind>().is_err());
        assert_eq!(ResourceKind::Placement.candidate(), None);
        assert_eq!(ResourceKind::Endpoint.candidate(), Some(CandidateKind::Endpoint));
        assert_eq!(ResourceKind::from(CandidateKind::Location), ResourceKind::Location);
    }
}
