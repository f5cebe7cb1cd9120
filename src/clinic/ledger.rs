//! Pending heals - the list of treatments waiting to be paid for

use serde::{Deserialize, Serialize};

use crate::clinic::affliction::NetAffliction;
use crate::core::types::CrewId;

/// One crew member's afflictions queued for treatment
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NetCrewMember {
    pub crew_id: CrewId,
    pub afflictions: Vec<NetAffliction>,
}

impl NetCrewMember {
    pub fn new(crew_id: CrewId, afflictions: Vec<NetAffliction>) -> Self {
        Self { crew_id, afflictions }
    }

    pub fn character_equals(&self, other: &NetCrewMember) -> bool {
        self.crew_id == other.crew_id
    }
}

/// Ordered pending heals. A crew member appears at most once and never
/// with an empty affliction list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingHeals {
    entries: Vec<NetCrewMember>,
}

impl PendingHeals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[NetCrewMember] {
        &self.entries
    }

    pub fn get(&self, crew_id: CrewId) -> Option<&NetCrewMember> {
        self.entries.iter().find(|e| e.crew_id == crew_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the member's entry with this one, moving it to the end
    pub fn insert(&mut self, member: NetCrewMember) {
        self.entries.retain(|e| !e.character_equals(&member));
        if member.afflictions.is_empty() {
            return;
        }
        self.entries.push(member);
    }

    /// Drop one affliction type from a member's entry. The entry goes away
    /// with its last affliction; unknown members are ignored.
    pub fn remove_affliction(&mut self, crew_id: CrewId, identifier: &str) {
        let Some(index) = self.entries.iter().position(|e| e.crew_id == crew_id) else {
            return;
        };
        let entry = &mut self.entries[index];
        entry.afflictions.retain(|a| !a.matches(identifier));
        if entry.afflictions.is_empty() {
            self.entries.remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace everything, e.g. from a server snapshot. Later duplicates win.
    pub fn replace_all(&mut self, members: Vec<NetCrewMember>) {
        self.entries.clear();
        for member in members {
            self.insert(member);
        }
    }

    pub fn total_cost(&self) -> u32 {
        self.entries
            .iter()
            .flat_map(|e| e.afflictions.iter())
            .map(|a| a.price as u32)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(id: i32, afflictions: &[(&str, u16, u16)]) -> NetCrewMember {
        NetCrewMember::new(
            CrewId(id),
            afflictions
                .iter()
                .map(|(name, strength, price)| NetAffliction::new(name, *strength, *price))
                .collect(),
        )
    }

    #[test]
    fn test_insert_replaces_existing_member() {
        let mut pending = PendingHeals::new();
        pending.insert(member(1, &[("burn", 10, 10)]));
        pending.insert(member(2, &[("lacerations", 20, 10)]));
        pending.insert(member(1, &[("blunttrauma", 50, 40)]));

        assert_eq!(pending.len(), 2);
        // Replaced entry moves to the back
        assert_eq!(pending.entries()[1].crew_id, CrewId(1));
        assert_eq!(pending.get(CrewId(1)).unwrap().afflictions[0].identifier, "blunttrauma");
        assert_eq!(pending.total_cost(), 50);
    }

    #[test]
    fn test_insert_empty_member_removes_entry() {
        let mut pending = PendingHeals::new();
        pending.insert(member(1, &[("burn", 10, 10)]));
        pending.insert(member(1, &[]));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_remove_last_affliction_drops_member() {
        let mut pending = PendingHeals::new();
        pending.insert(member(1, &[("burn", 10, 10), ("lacerations", 5, 10)]));

        pending.remove_affliction(CrewId(1), "BURN");
        assert_eq!(pending.get(CrewId(1)).unwrap().afflictions.len(), 1);

        pending.remove_affliction(CrewId(1), "lacerations");
        assert!(pending.get(CrewId(1)).is_none());
        assert!(pending.is_empty());
    }

    #[test]
    fn test_remove_from_unknown_member_is_noop() {
        let mut pending = PendingHeals::new();
        pending.insert(member(1, &[("burn", 10, 10)]));
        pending.remove_affliction(CrewId(9), "burn");
        assert_eq!(pending.total_cost(), 10);
    }

    #[test]
    fn test_total_cost_sums_every_affliction() {
        let mut pending = PendingHeals::new();
        pending.insert(member(1, &[("burn", 10, 10)]));
        pending.insert(member(2, &[("lacerations", 20, 10), ("blunttrauma", 50, u16::MAX)]));
        assert_eq!(pending.total_cost(), 20 + u16::MAX as u32);

        pending.clear();
        assert_eq!(pending.total_cost(), 0);
    }
}
