//! End-to-end chain scenarios
//!
//! Builds chains the way a producing node does, then checks how validation
//! and acceptance react to tampering, broken sequencing, and bad proposals.

use chain_core::{
    actor::spawn_node_actor, check_chain, config::AssemblyConfig, make_block, Allocation,
    BlockAssembler, BlockHash, BlockOutcome, Chain, Config, Error, Metrics, Node, State,
    Transaction, TransactionGenerator,
};

/// Chain built from the default demo settings: 30 generated transfers,
/// five per block, on top of Alice 50 / Bob 50
fn demo_chain() -> (Chain, State) {
    let config = Config::default();
    let mut node = Node::from_genesis(config.genesis_allocation()).unwrap();
    let mut generator = TransactionGenerator::new(
        config.generator.seed,
        config.generator_accounts(),
        config.generator.max_value,
    )
    .unwrap();

    let mut assembler = BlockAssembler::new(config.assembly.max_txns_per_block);
    for txn in generator.batch(config.generator.count) {
        assembler.submit(txn);
    }
    node.drain(&mut assembler).unwrap();

    (node.chain().clone(), node.state().clone())
}

#[test]
fn test_demo_chain_is_valid() {
    let (chain, state) = demo_chain();
    assert!(chain.len() >= 2);
    assert_eq!(check_chain(&chain).unwrap(), state);
    assert_eq!(state.total_supply(), 100);
}

#[test]
fn test_serialized_chain_matches_structured() {
    let (chain, state) = demo_chain();
    let json = chain.to_json().unwrap();

    assert_eq!(check_chain(&json).unwrap(), state);
    assert_eq!(check_chain(json.as_str()).unwrap(), check_chain(&chain).unwrap());

    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(check_chain(value).unwrap(), state);
}

#[test]
fn test_tampered_transactions_detected() {
    let (mut chain, _) = demo_chain();
    let target = chain.blocks.len() / 2;
    let block_number = chain.blocks[target].contents.block_number;

    // Shift value between the parties without resealing the block
    chain.blocks[target].contents.txns[0] = Transaction::from([("Alice", -7), ("Bob", 7)]);

    match check_chain(&chain) {
        Err(Error::HashMismatch {
            block_number: failed,
            ..
        }) => assert_eq!(failed, block_number),
        other => panic!("expected hash mismatch, got {:?}", other),
    }

    // Same result after a trip through JSON
    assert!(matches!(
        check_chain(&chain.to_json().unwrap()),
        Err(Error::HashMismatch { .. })
    ));
}

#[test]
fn test_sequence_break_detected() {
    let (mut chain, _) = demo_chain();
    assert!(chain.blocks.len() >= 3);
    let target = chain.blocks.len() / 2;

    // Skip a number and reseal so only the sequence is wrong
    let block = &mut chain.blocks[target];
    block.contents.block_number += 2;
    block.hash = block.compute_hash().unwrap();

    assert!(matches!(
        check_chain(&chain),
        Err(Error::SequenceError { .. })
    ));
}

#[test]
fn test_broken_link_detected() {
    let (mut chain, _) = demo_chain();
    let block = &mut chain.blocks[0];
    block.contents.parent_hash = Some(BlockHash::from_hex("ab".repeat(32)));
    block.hash = block.compute_hash().unwrap();

    assert!(matches!(
        check_chain(&chain),
        Err(Error::LinkageError { block_number: 1, .. })
    ));
}

#[test]
fn test_malformed_serialized_chain() {
    for input in ["", "{", "42", "[]", r#"[{"hash": "x"}]"#, r#"{"chain": []}"#] {
        assert!(
            matches!(check_chain(input), Err(Error::MalformedChain(_))),
            "accepted {:?}",
            input
        );
    }
}

#[test]
fn test_acceptance_scenario() {
    let (chain, state) = demo_chain();
    let mut node = Node::from_chain(chain.clone()).unwrap();
    let height = node.height();

    // Invalid proposal: overdraft against the current state
    let alice = state.balance(&"Alice".into());
    let overdraft = make_block(
        vec![Transaction::from([("Alice", -(alice + 1)), ("Bob", alice + 1)])],
        chain.tip(),
    )
    .unwrap();
    let outcome = node.receive_block(overdraft).unwrap();
    assert!(matches!(
        outcome,
        BlockOutcome::Rejected {
            reason: Error::InvalidTransaction { .. }
        }
    ));
    assert_eq!(node.height(), height);
    assert_eq!(node.state(), &state);

    // Valid proposal
    let valid = make_block(
        vec![Transaction::from([("Alice", -alice), ("Bob", alice)])],
        chain.tip(),
    )
    .unwrap();
    assert!(node.receive_block(valid).unwrap().is_accepted());
    assert_eq!(node.height(), height + 1);
    assert_eq!(node.state().balance(&"Alice".into()), 0);
    assert_eq!(check_chain(node.chain()).unwrap(), *node.state());
}

#[test]
fn test_fork_from_stale_parent_rejected() {
    let mut node = Node::from_genesis(Allocation::from([("Alice", 50), ("Bob", 50)])).unwrap();
    let genesis_tip = node.chain().clone();

    let first = make_block(vec![Transaction::from([("Alice", -5), ("Bob", 5)])], genesis_tip.tip())
        .unwrap();
    let competing = make_block(vec![Transaction::from([("Bob", -5), ("Alice", 5)])], genesis_tip.tip())
        .unwrap();

    assert!(node.receive_block(first).unwrap().is_accepted());
    let outcome = node.receive_block(competing).unwrap();
    assert!(!outcome.is_accepted());
    assert_eq!(node.height(), 2);
}

#[tokio::test]
async fn test_actor_concurrent_producers() {
    let node = Node::from_genesis(Allocation::from([("Alice", 1000), ("Bob", 1000)])).unwrap();
    let metrics = Metrics::new().unwrap();
    let handle = spawn_node_actor(
        node,
        &AssemblyConfig {
            max_txns_per_block: 4,
            seal_interval_ms: 5,
            auto_seal: true,
        },
        metrics.clone(),
    );

    let mut tasks = Vec::new();
    for seed in 0..4u64 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move {
            let mut generator = TransactionGenerator::new(
                seed,
                vec!["Alice".into(), "Bob".into()],
                3,
            )
            .unwrap();
            for txn in generator.batch(10) {
                handle.submit_transaction(txn).await.unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }
    while handle.seal_block().await.unwrap().is_some() {}

    let chain = handle.get_chain().await.unwrap();
    let state = handle.get_state().await.unwrap();
    assert_eq!(check_chain(&chain).unwrap(), state);
    assert_eq!(state.total_supply(), 2000);
    assert_eq!(metrics.txns_applied.get(), 40);
    assert_eq!(metrics.chain_height.get() as usize, chain.len());

    handle.shutdown().await.unwrap();
}
