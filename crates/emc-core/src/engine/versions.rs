//! Last-seen resource versions per object, including tombstones for deleted keys.
use std::collections::HashMap;

use emc_model::{EventOp, ObjectKey, ResourceKind, ResourceVersion};

#[derive(Debug, Clone, Copy)]
struct Entry {
    version: ResourceVersion,
    live: bool,
}

#[derive(Debug, Default)]
pub(super) struct VersionTable {
    placements: HashMap<ObjectKey, Entry>,
    locations: HashMap<ObjectKey, Entry>,
    endpoints: HashMap<ObjectKey, Entry>,
}

impl VersionTable {
    fn table(&self, kind: ResourceKind) -> &HashMap<ObjectKey, Entry> {
        match kind {
            ResourceKind::Placement => &self.placements,
            ResourceKind::Location => &self.locations,
            ResourceKind::Endpoint => &self.endpoints,
        }
    }

    fn table_mut(&mut self, kind: ResourceKind) -> &mut HashMap<ObjectKey, Entry> {
        match kind {
            ResourceKind::Placement => &mut self.placements,
            ResourceKind::Location => &mut self.locations,
            ResourceKind::Endpoint => &mut self.endpoints,
        }
    }

    /// Stored version if the event is superseded by it.
    ///
    /// Adds and updates must be strictly newer; a delete may carry the same
    /// version as the last update it follows.
    pub(super) fn stale(
        &self,
        kind: ResourceKind,
        key: &ObjectKey,
        op: EventOp,
        version: ResourceVersion,
    ) -> Option<ResourceVersion> {
        let entry = self.table(kind).get(key)?;
        let stale = match op {
            EventOp::Delete => version < entry.version,
            EventOp::Add | EventOp::Update => version <= entry.version,
        };
        stale.then_some(entry.version)
    }

    pub(super) fn is_live(&self, kind: ResourceKind, key: &ObjectKey) -> bool {
        self.table(kind).get(key).is_some_and(|e| e.live)
    }

    pub(super) fn record(&mut self, kind: ResourceKind, key: ObjectKey, version: ResourceVersion, live: bool) {
        self.table_mut(kind).insert(key, Entry { version, live });
    }

    /// Number of tracked keys, tombstones included.
    pub(super) fn len(&self) -> usize {
        self.placements.len() + self.locations.len() + self.endpoints.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tombstone_blocks_older_add_but_not_newer() {
        let key = ObjectKey::new("root", "l").unwrap();
        let mut table = VersionTable::default();
        table.record(ResourceKind::Location, key.clone(), ResourceVersion(5), false);

        assert_eq!(
            table.stale(ResourceKind::Location, &key, EventOp::Add, ResourceVersion(5)),
            Some(ResourceVersion(5))
        );
        assert_eq!(table.stale(ResourceKind::Location, &key, EventOp::Add, ResourceVersion(6)), None);
        assert!(!table.is_live(ResourceKind::Location, &key));
        assert!(table.stale(ResourceKind::Endpoint, &key, EventOp::Add, ResourceVersion(1)).is_none());
    }

    #[test]
    fn delete_may_repeat_last_version() {
        let key = ObjectKey::new("root", "e").unwrap();
        let mut table = VersionTable::default();
        table.record(ResourceKind::Endpoint, key.clone(), ResourceVersion(3), true);

        assert_eq!(table.stale(ResourceKind::Endpoint, &key, EventOp::Delete, ResourceVersion(3)), None);
        assert!(table.stale(ResourceKind::Endpoint, &key, EventOp::Delete, ResourceVersion(2)).is_some());
        assert_eq!(table.len(), 1);
    }
}
