//! Medical clinic: affliction pricing, pending heals and the heal transaction

pub mod affliction;
pub mod engine;
pub mod host;
pub mod ledger;
pub mod net;

pub use affliction::{is_healable, AfflictionSeverity, NetAffliction};
pub use engine::MedicalClinic;
pub use host::ClinicHost;
pub use ledger::{NetCrewMember, PendingHeals};
pub use net::{
    ClinicEnvelope, ClinicPayload, ClinicRequest, HealRequestResult, MessageFlag, NetHealRequest,
    NetPendingCrew, NetRemovedAffliction, NetworkHeader, Outbound, Recipient,
};
