//! Fan-in of per-port replies through `ActorManager::connect`.

mod common;

use common::{args, catalog, manager, Events, ScriptedPortManager};
use moonpool_dataflow::actor::{ActorId, LifecycleFlag};
use moonpool_dataflow::connection::{ConnectionDescriptor, ReplyStatus};
use moonpool_dataflow::manager::{ActorManager, ManagerConfig};
use serde_json::json;
use std::rc::Rc;
use std::time::Duration;

async fn identity(manager: &ActorManager) -> (ActorId, Vec<ConnectionDescriptor>) {
    let id = manager.create("std.Identity", args(json!({}))).await.unwrap();
    let state = manager.snapshot(&id).unwrap();
    let node = manager.node_id().clone();
    let descriptors = vec![
        ConnectionDescriptor::new(
            node.clone(),
            state.ports.inports["token"].id.clone(),
            "peer".into(),
            "pp1".into(),
        ),
        ConnectionDescriptor::new(
            node,
            state.ports.outports["token"].id.clone(),
            "peer".into(),
            "pp2".into(),
        ),
    ];
    (id, descriptors)
}

#[tokio::test]
async fn test_ack_then_nack_fires_once_with_nack() {
    for order in [["pp1", "pp2"], ["pp2", "pp1"]] {
        let events = Events::default();
        let ports = ScriptedPortManager::new();
        let (manager, _) = manager("n", &events, ports.clone());
        let (id, descriptors) = identity(&manager).await;

        let (completion, ()) = tokio::join!(manager.connect(&id, descriptors), async {
            tokio::task::yield_now().await;
            for peer_port in order {
                let reply = ports.take_reply(peer_port).unwrap();
                if peer_port == "pp1" {
                    reply.ack();
                } else {
                    reply.nack();
                }
            }
        });

        let completion = completion.unwrap();
        assert_eq!(completion.status, ReplyStatus::Nack, "order {order:?}");
        assert_eq!(completion.actor_id, Some(id.clone()));
        assert_eq!(manager.lifecycle(&id).unwrap(), LifecycleFlag::Pending);
        assert_eq!(ports.held_replies(), 0);
    }
}

#[tokio::test]
async fn test_out_of_order_acks_enable_actor() {
    let events = Events::default();
    let ports = ScriptedPortManager::new();
    let (manager, _) = manager("n", &events, ports.clone());
    let (id, descriptors) = identity(&manager).await;

    let (completion, ()) = tokio::join!(manager.connect(&id, descriptors.clone()), async {
        tokio::task::yield_now().await;
        ports.take_reply("pp2").unwrap().ack();
        tokio::task::yield_now().await;
        ports.take_reply("pp1").unwrap().ack();
    });

    assert!(completion.unwrap().is_ack());
    assert_eq!(manager.lifecycle(&id).unwrap(), LifecycleFlag::Enabled);
    assert_eq!(ports.requests().len(), 2);

    let mut recorded = manager
        .connections(&id)
        .unwrap()
        .to_descriptors(manager.node_id());
    let mut expected = descriptors;
    recorded.sort();
    expected.sort();
    assert_eq!(recorded, expected);
}

#[tokio::test]
async fn test_late_replies_after_nack_are_ignored() {
    let events = Events::default();
    let ports = ScriptedPortManager::new();
    let (manager, _) = manager("n", &events, ports.clone());
    let (id, descriptors) = identity(&manager).await;

    let (completion, ()) = tokio::join!(manager.connect(&id, descriptors), async {
        tokio::task::yield_now().await;
        ports.take_reply("pp1").unwrap().nack();
    });
    assert_eq!(completion.unwrap().status, ReplyStatus::Nack);

    // The second reply arrives after the terminal signal.
    ports.take_reply("pp2").unwrap().ack();
    assert_eq!(manager.lifecycle(&id).unwrap(), LifecycleFlag::Pending);
}

#[tokio::test]
async fn test_unanswered_replies_resolve_as_nack() {
    let events = Events::default();
    let ports = ScriptedPortManager::new();
    let (manager, _) = manager("n", &events, ports.clone());
    let (id, descriptors) = identity(&manager).await;

    let (completion, ()) = tokio::join!(manager.connect(&id, descriptors), async {
        tokio::task::yield_now().await;
        ports.take_reply("pp1").unwrap().ack();
        ports.drop_replies();
    });

    assert_eq!(completion.unwrap().status, ReplyStatus::Nack);
    assert_eq!(manager.connections(&id).unwrap().len(), 1);
}

#[tokio::test]
async fn test_connect_timeout() {
    let events = Events::default();
    let ports = ScriptedPortManager::new();
    let config = ManagerConfig::builder()
        .node_id("n")
        .connect_timeout(Duration::from_millis(20))
        .build();
    let manager = ActorManager::builder(config)
        .catalog(catalog(&events))
        .ports(ports.clone())
        .build();
    let (id, descriptors) = identity(&manager).await;

    let completion = manager.connect(&id, descriptors).await.unwrap();
    assert_eq!(completion.status, ReplyStatus::Nack);
    assert_eq!(ports.held_replies(), 2);
}

#[tokio::test]
async fn test_actor_destroyed_while_connecting() {
    let events = Events::default();
    let ports = ScriptedPortManager::new();
    let (manager, _) = manager("n", &events, ports.clone());
    let (id, descriptors) = identity(&manager).await;
    let destroyer = Rc::clone(&manager);

    let (completion, ()) = tokio::join!(manager.connect(&id, descriptors), async {
        tokio::task::yield_now().await;
        destroyer.destroy(&id).await.unwrap();
        ports.take_reply("pp1").unwrap().ack();
        ports.take_reply("pp2").unwrap().ack();
    });

    assert_eq!(completion.unwrap().status, ReplyStatus::Nack);
    assert!(!manager.is_resident(&id));
}

#[tokio::test]
async fn test_duplicate_peer_port_needs_every_reply() {
    let events = Events::default();
    let ports = ScriptedPortManager::new();
    let (manager, _) = manager("n", &events, ports.clone());
    let (id, mut descriptors) = identity(&manager).await;
    descriptors[1].peer_port = "pp1".into();

    let (completion, ()) = tokio::join!(manager.connect(&id, descriptors), async {
        tokio::task::yield_now().await;
        ports.take_reply("pp1").unwrap().ack();
        assert_eq!(ports.held_replies(), 1);
        ports.take_reply("pp1").unwrap().ack();
    });

    assert!(completion.unwrap().is_ack());
    assert_eq!(manager.connections(&id).unwrap().len(), 2);
}
