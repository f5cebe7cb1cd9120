//! Medical clinic - prices crew afflictions and sells treatment
//!
//! The clinic owns the pending-heal list. Money, the crew roster and the
//! combat state all come from a [`ClinicHost`], queried fresh each call.
//! Paying for heals is all-or-nothing: a refused or unaffordable request
//! leaves both the list and the wallet untouched.

use std::sync::Arc;

use crate::clinic::affliction::{clamp_price, is_healable, NetAffliction};
use crate::clinic::host::ClinicHost;
use crate::clinic::ledger::{NetCrewMember, PendingHeals};
use crate::clinic::net::{
    ClinicEnvelope, ClinicPayload, ClinicRequest, HealRequestResult, NetHealRequest, NetPendingCrew,
    NetworkHeader, Outbound,
};
use crate::core::error::Result;
use crate::core::types::CrewId;
use crate::health::AfflictionRegistry;

pub struct MedicalClinic {
    registry: Arc<AfflictionRegistry>,
    pending: PendingHeals,
}

impl MedicalClinic {
    pub fn new(registry: Arc<AfflictionRegistry>) -> Self {
        Self { registry, pending: PendingHeals::new() }
    }

    pub fn registry(&self) -> &AfflictionRegistry {
        &self.registry
    }

    pub fn pending(&self) -> &PendingHeals {
        &self.pending
    }

    /// Apply the current location's price adjustment. Without an outpost
    /// there is nobody to pay, so the price is unpayable.
    pub fn adjusted_price(host: &impl ClinicHost, price: i32) -> i32 {
        host.current_location()
            .filter(|location| location.has_outpost)
            .map(|location| location.adjusted_heal_cost(price))
            .unwrap_or(i32::MAX)
    }

    /// Priced list of a crew member's treatable afflictions.
    ///
    /// Several instances of one affliction type are merged into a single
    /// record with summed strength and price.
    pub fn crew_afflictions(&self, host: &impl ClinicHost, crew_id: CrewId) -> Vec<NetAffliction> {
        let Some(health) = host.crew_health(crew_id) else {
            return Vec::new();
        };
        let adjust = |price: i32| Self::adjusted_price(host, price);

        let mut records: Vec<NetAffliction> = Vec::new();
        for affliction in health.afflictions().iter().filter(|a| is_healable(a)) {
            match records.iter().position(|r| r.matches(affliction.identifier())) {
                Some(index) => {
                    let mut found = records.remove(index);
                    let price = adjust(affliction.prefab.heal_price(affliction.strength()));
                    found.strength = found.strength.saturating_add(affliction.strength() as u16);
                    found.price = found.price.saturating_add(clamp_price(price));
                    records.push(found);
                }
                None => records.push(NetAffliction::from_affliction(affliction, adjust)),
            }
        }
        records
    }

    pub fn insert_pending(&mut self, member: NetCrewMember) {
        self.pending.insert(member);
    }

    pub fn remove_pending(&mut self, crew_id: CrewId, identifier: &str) {
        self.pending.remove_affliction(crew_id, identifier);
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
    }

    pub fn total_cost(&self) -> u32 {
        self.pending.total_cost()
    }

    /// Pay for and apply every pending heal.
    ///
    /// `force` skips the funds and combat checks; use it only for requests
    /// that were already validated elsewhere.
    pub fn heal_all(&mut self, host: &mut impl ClinicHost, force: bool) -> HealRequestResult {
        let total_cost = self.pending.total_cost();

        if !force {
            if (host.money() as i64) < total_cost as i64 {
                tracing::warn!(money = host.money(), total_cost, "heal refused: insufficient funds");
                return HealRequestResult::InsufficientFunds;
            }
            if host.is_outpost_in_combat() {
                tracing::warn!("heal refused: outpost is in combat with the crew");
                return HealRequestResult::Refused;
            }
        }

        for member in self.pending.entries() {
            let Some(health) = host.crew_health_mut(member.crew_id) else {
                tracing::debug!(crew_id = ?member.crew_id, "pending heal for absent crew member skipped");
                continue;
            };
            for affliction in &member.afflictions {
                let amount = match affliction.prefab(&self.registry) {
                    Some(prefab) => prefab.max_strength,
                    None => {
                        tracing::warn!(identifier = %affliction.identifier, "no definition for affliction");
                        affliction.strength as f32
                    }
                };
                health.reduce_affliction(&affliction.identifier, amount);
            }
        }

        host.deduct_money(i32::try_from(total_cost).unwrap_or(i32::MAX));
        self.pending.clear();

        tracing::info!(total_cost, money = host.money(), "pending heals applied");
        HealRequestResult::Success
    }

    /// Server side: apply a client's request and produce the replies.
    ///
    /// Changes to the pending list are answered to the requester and
    /// announced to everyone else so all clients see the same list.
    pub fn handle_request(&mut self, host: &mut impl ClinicHost, request: ClinicRequest) -> Result<Vec<Outbound>> {
        let header = request.header();
        tracing::debug!(?header, "clinic request");

        let outbound = match request {
            ClinicRequest::RequestAfflictions(crew_id) => {
                let member = NetCrewMember::new(crew_id, self.crew_afflictions(host, crew_id));
                vec![Outbound::response(header, ClinicPayload::CrewMember(member))]
            }
            ClinicRequest::RequestPending => {
                let snapshot = NetPendingCrew::new(self.pending.entries().to_vec())?;
                vec![Outbound::response(header, ClinicPayload::PendingCrew(snapshot))]
            }
            ClinicRequest::AddPending(member) => {
                self.insert_pending(member.clone());
                let payload = ClinicPayload::CrewMember(member);
                vec![Outbound::response(header, payload.clone()), Outbound::announce(header, payload)]
            }
            ClinicRequest::RemovePending(removed) => {
                self.remove_pending(removed.crew_member.crew_id, &removed.affliction.identifier);
                let payload = ClinicPayload::RemovedAffliction(removed);
                vec![Outbound::response(header, payload.clone()), Outbound::announce(header, payload)]
            }
            ClinicRequest::ClearPending => {
                self.clear_pending();
                vec![
                    Outbound::response(header, ClinicPayload::Empty),
                    Outbound::announce(header, ClinicPayload::Empty),
                ]
            }
            ClinicRequest::HealPending => {
                let result = self.heal_all(host, false);
                let payload = ClinicPayload::HealRequest(NetHealRequest { result });
                let mut outbound = vec![Outbound::response(header, payload.clone())];
                if result == HealRequestResult::Success {
                    outbound.push(Outbound::announce(header, payload));
                }
                outbound
            }
        };
        Ok(outbound)
    }

    /// Client side: mirror a server message onto the local pending list
    pub fn apply_announcement(&mut self, envelope: &ClinicEnvelope) {
        match (envelope.header, &envelope.payload) {
            (NetworkHeader::AddPending, ClinicPayload::CrewMember(member)) => {
                self.pending.insert(member.clone());
            }
            (NetworkHeader::RemovePending, ClinicPayload::RemovedAffliction(removed)) => {
                self.pending
                    .remove_affliction(removed.crew_member.crew_id, &removed.affliction.identifier);
            }
            (NetworkHeader::ClearPending, _) => self.pending.clear(),
            (NetworkHeader::HealPending, ClinicPayload::HealRequest(request))
                if request.result == HealRequestResult::Success =>
            {
                self.pending.clear();
            }
            (NetworkHeader::RequestPending, ClinicPayload::PendingCrew(snapshot)) => {
                self.pending.replace_all(snapshot.crew_members().to_vec());
            }
            (header, _) => {
                tracing::debug!(?header, flag = ?envelope.flag, "clinic message leaves pending list unchanged");
            }
        }
    }
}
