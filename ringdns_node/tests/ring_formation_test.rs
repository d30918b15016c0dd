use ringdns_node::constants::{FINGER_TABLE_SIZE, RING_SIZE};
use ringdns_node::Pointer;

mod common;
use common::{responsible, run_maintenance, start_plain_node};

#[tokio::test]
async fn single_node_ring_is_stable() {
    let (node, _handle) = start_plain_node().await;
    node.join("").await.unwrap();

    {
        let state = node.state.read().await;
        assert_eq!(state.successor, Pointer::new(node.id, node.addr.clone()));
        assert!(state.predecessor.is_none());
    }

    // A full maintenance round over the live server changes nothing.
    run_maintenance(&[node.clone()], 1).await;

    let state = node.state.read().await;
    assert_eq!(state.successor, Pointer::new(node.id, node.addr.clone()));
    assert!(state.predecessor.is_none());
    for finger in &state.finger_table {
        assert_eq!(finger.id, node.id);
    }
}

#[tokio::test]
async fn two_nodes_adopt_each_other() {
    let (a, _ha) = start_plain_node().await;
    let (b, _hb) = start_plain_node().await;

    a.join("").await.unwrap();
    b.join(&a.addr).await.unwrap();
    assert_eq!(b.state.read().await.successor.id, a.id);

    let nodes = vec![a.clone(), b.clone()];
    run_maintenance(&nodes, 3).await;

    let a_state = a.state.read().await;
    let b_state = b.state.read().await;
    assert_eq!(a_state.successor, Pointer::new(b.id, b.addr.clone()));
    assert_eq!(b_state.successor, Pointer::new(a.id, a.addr.clone()));
    assert_eq!(
        a_state.predecessor,
        Some(Pointer::new(b.id, b.addr.clone()))
    );
    assert_eq!(
        b_state.predecessor,
        Some(Pointer::new(a.id, a.addr.clone()))
    );
}

#[tokio::test]
async fn three_nodes_route_every_finger_target() {
    let (a, _ha) = start_plain_node().await;
    let (b, _hb) = start_plain_node().await;
    let (c, _hc) = start_plain_node().await;

    a.join("").await.unwrap();
    b.join(&a.addr).await.unwrap();
    c.join(&a.addr).await.unwrap();

    let nodes = vec![a.clone(), b.clone(), c.clone()];
    run_maintenance(&nodes, 10).await;

    // The successors must cycle through all three nodes.
    let ids: Vec<u64> = nodes.iter().map(|n| n.id).collect();
    let mut seen = std::collections::HashSet::new();
    let mut current = a.clone();
    for _ in 0..3 {
        seen.insert(current.id);
        let succ = current.state.read().await.successor.clone();
        current = nodes
            .iter()
            .find(|n| n.id == succ.id)
            .expect("successor points outside the ring")
            .clone();
    }
    assert_eq!(current.id, a.id, "successors do not form a cycle");
    assert_eq!(seen.len(), 3);

    // Quiescence: every successor points back at us.
    for node in &nodes {
        let succ_id = node.state.read().await.successor.id;
        let succ = nodes.iter().find(|n| n.id == succ_id).unwrap();
        let pred = succ.state.read().await.predecessor.clone().unwrap();
        assert_eq!(pred.id, node.id, "successor of {} does not point back", node.id);
    }

    // Every node agrees on the responsible node for every finger target.
    for node in &nodes {
        for i in 0..FINGER_TABLE_SIZE {
            let target = (node.id + (1u64 << i)) % RING_SIZE;
            let found = node.find_successor(target).await;
            assert_eq!(
                found.id,
                responsible(&ids, target),
                "node {} misroutes target {}",
                node.id,
                target
            );
        }
    }
}
