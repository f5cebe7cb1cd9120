//! Integration tests for the medical clinic: server requests, client mirrors
//! and the heal transaction against a live world

use std::sync::Arc;

use abyss_crew::clinic::{
    ClinicHost, ClinicPayload, ClinicRequest, HealRequestResult, MedicalClinic, MessageFlag, NetAffliction,
    NetCrewMember, NetRemovedAffliction, NetworkHeader, Recipient,
};
use abyss_crew::core::types::{CrewId, LevelType, Team};
use abyss_crew::ecs::World;
use abyss_crew::health::AfflictionRegistry;
use abyss_crew::world::{Campaign, Character, Location};

fn registry() -> Arc<AfflictionRegistry> {
    Arc::new(AfflictionRegistry::builtin().unwrap())
}

fn outpost(money: i32, multiplier: f32) -> World {
    World::new(LevelType::Outpost, Campaign::new(money, Some(Location::outpost("Hub", multiplier))))
}

fn add_crew(world: &mut World, registry: &AfflictionRegistry, id: i32, afflictions: &[(&str, f32)]) {
    let mut character = Character::new(&format!("Crew {id}"), Team::Crew).with_crew_id(CrewId(id));
    for (identifier, strength) in afflictions {
        character.health.apply(registry.require(identifier).unwrap().clone(), *strength);
    }
    world.spawn_character(character);
}

#[test]
fn test_scan_queue_and_pay_for_the_whole_crew() {
    let registry = registry();
    let mut world = outpost(1000, 1.0);
    add_crew(&mut world, &registry, 1, &[("burn", 20.0), ("oxygenlow", 50.0)]);
    add_crew(&mut world, &registry, 2, &[("lacerations", 30.0)]);

    let mut server = MedicalClinic::new(registry.clone());
    let scan = server.crew_afflictions(&world, CrewId(1));
    // Oxygen deprivation can't be treated at the clinic
    assert_eq!(scan.len(), 1);
    assert_eq!(scan[0].identifier, "burn");
    // 15 base + 20 * 1.0
    assert_eq!(scan[0].price, 35);

    for id in world.crew_ids() {
        let afflictions = server.crew_afflictions(&world, id);
        server.insert_pending(NetCrewMember::new(id, afflictions));
    }
    // burn 35 + lacerations 10 + 30 * 0.8
    assert_eq!(server.total_cost(), 35 + 34);

    assert_eq!(server.heal_all(&mut world, false), HealRequestResult::Success);
    assert_eq!(world.money(), 1000 - 69);
    assert_eq!(world.crew_health(CrewId(1)).unwrap().strength_of("burn"), 0.0);
    assert_eq!(world.crew_health(CrewId(1)).unwrap().strength_of("oxygenlow"), 50.0);
    assert_eq!(world.crew_health(CrewId(2)).unwrap().strength_of("lacerations"), 0.0);
}

#[test]
fn test_clients_converge_through_announcements() {
    let registry = registry();
    let mut world = outpost(500, 1.0);
    add_crew(&mut world, &registry, 1, &[("burn", 10.0)]);
    add_crew(&mut world, &registry, 2, &[("bloodloss", 40.0), ("blunttrauma", 5.0)]);

    let mut server = MedicalClinic::new(registry.clone());
    let mut observer = MedicalClinic::new(registry.clone());

    let mut requests = Vec::new();
    for id in [CrewId(1), CrewId(2)] {
        requests.push(ClinicRequest::AddPending(NetCrewMember::new(id, server.crew_afflictions(&world, id))));
    }
    let blunt = server
        .crew_afflictions(&world, CrewId(2))
        .into_iter()
        .find(|a| a.identifier == "blunttrauma")
        .unwrap();
    requests.push(ClinicRequest::RemovePending(NetRemovedAffliction {
        crew_member: NetCrewMember::new(CrewId(2), Vec::new()),
        affliction: blunt,
    }));

    for request in requests {
        let replies = server.handle_request(&mut world, request).unwrap();
        assert_eq!(replies.len(), 2);
        assert_eq!(replies[0].recipient, Recipient::Requester);
        assert_eq!(replies[0].envelope.flag, MessageFlag::Response);
        for reply in replies.iter().filter(|r| r.recipient == Recipient::Others) {
            observer.apply_announcement(&reply.envelope);
        }
    }

    assert_eq!(observer.pending(), server.pending());
    assert_eq!(server.pending().get(CrewId(2)).unwrap().afflictions.len(), 1);

    // A client that joins late asks for the full list
    let mut late = MedicalClinic::new(registry);
    let snapshot = server.handle_request(&mut world, ClinicRequest::RequestPending).unwrap();
    assert_eq!(snapshot.len(), 1);
    late.apply_announcement(&snapshot[0].envelope);
    assert_eq!(late.pending(), server.pending());

    let replies = server.handle_request(&mut world, ClinicRequest::HealPending).unwrap();
    assert_eq!(replies.len(), 2);
    for reply in &replies {
        observer.apply_announcement(&reply.envelope);
    }
    assert!(server.pending().is_empty());
    assert!(observer.pending().is_empty());
}

#[test]
fn test_failed_heal_is_only_answered_to_the_requester() {
    let registry = registry();
    let mut world = outpost(0, 1.0);
    add_crew(&mut world, &registry, 1, &[("burn", 10.0)]);

    let mut server = MedicalClinic::new(registry);
    let afflictions = server.crew_afflictions(&world, CrewId(1));
    server
        .handle_request(&mut world, ClinicRequest::AddPending(NetCrewMember::new(CrewId(1), afflictions)))
        .unwrap();

    let replies = server.handle_request(&mut world, ClinicRequest::HealPending).unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].envelope.header, NetworkHeader::HealPending);
    assert!(matches!(
        &replies[0].envelope.payload,
        ClinicPayload::HealRequest(r) if r.result == HealRequestResult::InsufficientFunds
    ));
    assert_eq!(server.pending().len(), 1);
    assert_eq!(world.money(), 0);
}

#[test]
fn test_location_multiplier_applies_to_every_record() {
    let registry = registry();
    let mut world = outpost(0, 2.0);
    add_crew(&mut world, &registry, 7, &[("internaldamage", 40.0)]);

    let clinic = MedicalClinic::new(registry);
    let scan = clinic.crew_afflictions(&world, CrewId(7));
    // (10 + 40) * 2
    assert_eq!(scan, vec![NetAffliction::new("internaldamage", 40, 100)]);
}

#[test]
fn test_envelopes_survive_json() {
    let registry = registry();
    let mut world = outpost(100, 1.0);
    add_crew(&mut world, &registry, 1, &[("burn", 10.0)]);

    let mut server = MedicalClinic::new(registry.clone());
    let request = ClinicRequest::AddPending(NetCrewMember::new(CrewId(1), server.crew_afflictions(&world, CrewId(1))));
    let wire = serde_json::to_string(&request).unwrap();
    let request = serde_json::from_str(&wire).unwrap();

    let replies = server.handle_request(&mut world, request).unwrap();
    let wire = serde_json::to_string(&replies[1].envelope).unwrap();

    let mut client = MedicalClinic::new(registry);
    client.apply_announcement(&serde_json::from_str(&wire).unwrap());
    assert_eq!(client.pending(), server.pending());
}
