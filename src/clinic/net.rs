//! Clinic messages exchanged between server and clients
//!
//! Only message contents live here. Framing and delivery belong to the
//! transport layer.

use serde::{Deserialize, Serialize};

use crate::clinic::affliction::NetAffliction;
use crate::clinic::ledger::NetCrewMember;
use crate::core::config::config;
use crate::core::error::{CrewError, Result};
use crate::core::types::CrewId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NetworkHeader {
    RequestAfflictions,
    RequestPending,
    AddPending,
    RemovePending,
    ClearPending,
    HealPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageFlag {
    /// Reply to the client that asked
    Response,
    /// Someone else changed the clinic state
    Announce,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealRequestResult {
    /// Uninitialized; never an intended outcome
    #[default]
    Unknown,
    Success,
    InsufficientFunds,
    /// The outpost refuses service while fighting the crew
    Refused,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetHealRequest {
    pub result: HealRequestResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetRemovedAffliction {
    pub crew_member: NetCrewMember,
    pub affliction: NetAffliction,
}

/// Pending list snapshot, never longer than the maximum crew size
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NetPendingCrew {
    crew_members: Vec<NetCrewMember>,
}

impl NetPendingCrew {
    pub fn new(crew_members: Vec<NetCrewMember>) -> Result<Self> {
        let max = config().max_crew_size;
        if crew_members.len() > max {
            return Err(CrewError::CrewLimitExceeded { count: crew_members.len(), max });
        }
        Ok(Self { crew_members })
    }

    pub fn crew_members(&self) -> &[NetCrewMember] {
        &self.crew_members
    }
}

/// What a client asks the clinic to do
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClinicRequest {
    RequestAfflictions(CrewId),
    RequestPending,
    AddPending(NetCrewMember),
    RemovePending(NetRemovedAffliction),
    ClearPending,
    HealPending,
}

impl ClinicRequest {
    pub fn header(&self) -> NetworkHeader {
        match self {
            ClinicRequest::RequestAfflictions(_) => NetworkHeader::RequestAfflictions,
            ClinicRequest::RequestPending => NetworkHeader::RequestPending,
            ClinicRequest::AddPending(_) => NetworkHeader::AddPending,
            ClinicRequest::RemovePending(_) => NetworkHeader::RemovePending,
            ClinicRequest::ClearPending => NetworkHeader::ClearPending,
            ClinicRequest::HealPending => NetworkHeader::HealPending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClinicPayload {
    Empty,
    CrewMember(NetCrewMember),
    PendingCrew(NetPendingCrew),
    RemovedAffliction(NetRemovedAffliction),
    HealRequest(NetHealRequest),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicEnvelope {
    pub header: NetworkHeader,
    pub flag: MessageFlag,
    pub payload: ClinicPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Requester,
    /// Every connected client except the requester
    Others,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outbound {
    pub recipient: Recipient,
    pub envelope: ClinicEnvelope,
}

impl Outbound {
    pub fn response(header: NetworkHeader, payload: ClinicPayload) -> Self {
        Self {
            recipient: Recipient::Requester,
            envelope: ClinicEnvelope { header, flag: MessageFlag::Response, payload },
        }
    }

    pub fn announce(header: NetworkHeader, payload: ClinicPayload) -> Self {
        Self {
            recipient: Recipient::Others,
            envelope: ClinicEnvelope { header, flag: MessageFlag::Announce, payload },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_crew_is_bounded() {
        let max = config().max_crew_size;
        let members: Vec<_> = (0..=max as i32).map(|i| NetCrewMember::new(CrewId(i), Vec::new())).collect();
        assert!(matches!(
            NetPendingCrew::new(members),
            Err(CrewError::CrewLimitExceeded { .. })
        ));
        assert!(NetPendingCrew::new(Vec::new()).is_ok());
    }

    #[test]
    fn test_heal_result_defaults_to_unknown() {
        assert_eq!(NetHealRequest::default().result, HealRequestResult::Unknown);
    }

    #[test]
    fn test_envelope_serializes_to_json() {
        let envelope = ClinicEnvelope {
            header: NetworkHeader::AddPending,
            flag: MessageFlag::Announce,
            payload: ClinicPayload::CrewMember(NetCrewMember::new(
                CrewId(3),
                vec![NetAffliction::new("burn", 10, 25)],
            )),
        };
        let json = serde_json::to_string(&envelope).unwrap();
        let back: ClinicEnvelope = serde_json::from_str(&json).unwrap();
        assert_eq!(back, envelope);
        assert!(json.contains("\"burn\""));
    }
}
