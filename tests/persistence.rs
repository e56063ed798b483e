// tests/persistence.rs

mod common;
use crate::common::builders::diamond;
use crate::common::{GraphBuilder, edge_pairs, init_tracing, reasons_of, set, t0};

use std::path::Path;

use mindchain::errors::MindChainError;
use mindchain::fs::FileSystem;
use mindchain::fs::mock::MockFileSystem;
use mindchain::graph::{Edge, PriorityDefaults};
use mindchain::store::record::SNAPSHOT_VERSION;
use mindchain::store::{JsonFileStore, NodeRecord, Snapshot, SnapshotStore};
use mindchain::types::Reason::*;
use mindchain::types::{Status, ROOT_ID};

const STORE_PATH: &str = "/data/chain.json";

fn record(id: u64, name: &str, parents: &[u64]) -> NodeRecord {
    NodeRecord {
        id,
        name: name.to_string(),
        context: None,
        level: 0,
        priority: None,
        status: Status::Executable,
        reasons: Default::default(),
        blocked_reason: None,
        blocked_until: None,
        parent_ids: parents.to_vec(),
    }
}

fn snapshot_of(records: Vec<NodeRecord>) -> Snapshot {
    Snapshot {
        version: SNAPSHOT_VERSION,
        name: "hand written".to_string(),
        nodes: records,
        edges: Vec::new(),
        archive: Default::default(),
    }
}

#[test]
fn snapshot_lists_every_task_but_not_the_root() {
    let graph = diamond().build();

    let snapshot = Snapshot::capture(&graph, &Default::default());

    assert_eq!(snapshot.name, "diamond");
    let ids: Vec<u64> = snapshot.nodes.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    let merge = &snapshot.nodes[3];
    assert_eq!(merge.parent_ids, vec![2, 3]);
    assert_eq!(merge.level, 2);
    assert_eq!(merge.reasons, set(&[ConvergenceBelow]));
}

#[test]
fn chain_round_trips_through_a_json_file() {
    init_tracing();
    let fs = MockFileSystem::new();
    let store = JsonFileStore::with_fs(fs.clone(), STORE_PATH);

    let mut chain = diamond().event_block(3, "review").context(2, "docs/").build_chain();
    chain.finish(2, t0()).unwrap();
    let snapshot = Snapshot::of_chain(&chain);

    store.write_snapshot(&snapshot).unwrap();

    assert!(store.exists());
    assert!(!fs.exists(Path::new("/data/chain.json.tmp")));
    let text = fs.contents(STORE_PATH).unwrap();
    assert!(text.contains("\"event_blocked\""));
    assert!(text.contains("\"review\""));

    let loaded = store.read_snapshot().unwrap().expect("snapshot present");
    assert_eq!(loaded, snapshot);

    let restored = loaded.restore(PriorityDefaults::default(), t0()).unwrap();
    assert_eq!(restored.graph(), chain.graph());
    assert_eq!(restored.archive(), chain.archive());
    assert_eq!(restored.next_id(), chain.next_id());
}

#[test]
fn reload_keeps_edge_order_and_sibling_offsets() {
    let fs = MockFileSystem::new();
    let store = JsonFileStore::with_fs(fs, STORE_PATH);
    let chain = GraphBuilder::new("slots")
        .edge(0, 1)
        .edge(1, 3)
        .edge(1, 2)
        .priority(2, 500)
        .build_chain();

    store.write_snapshot(&Snapshot::of_chain(&chain)).unwrap();
    let restored = store
        .read_snapshot()
        .unwrap()
        .expect("snapshot present")
        .restore(PriorityDefaults::default(), t0())
        .unwrap();

    assert_eq!(edge_pairs(restored.graph()), vec![(0, 1), (1, 3), (1, 2)]);
    for id in [2, 3] {
        assert_eq!(
            restored.graph().node(id).unwrap().offset,
            chain.graph().node(id).unwrap().offset,
            "offset of node {id}"
        );
    }
    assert_eq!(restored.graph(), chain.graph());
}

#[test]
fn stored_edges_must_reference_known_nodes() {
    let mut snapshot = snapshot_of(vec![record(1, "A", &[])]);
    snapshot.edges = vec![Edge::new(ROOT_ID, 1), Edge::new(1, 6)];

    assert!(matches!(
        snapshot.to_graph(),
        Err(MindChainError::InvalidReference(6))
    ));
}

#[test]
fn missing_file_loads_as_nothing() {
    let store = JsonFileStore::with_fs(MockFileSystem::new(), STORE_PATH);

    assert!(!store.exists());
    assert!(store.read_snapshot().unwrap().is_none());
}

#[test]
fn corrupt_file_is_a_json_error() {
    let fs = MockFileSystem::new();
    fs.add_file(STORE_PATH, "{ not json");
    let store = JsonFileStore::with_fs(fs, STORE_PATH);

    assert!(matches!(store.read_snapshot(), Err(MindChainError::JsonError(_))));
}

#[test]
fn derived_fields_are_recomputed_on_load() {
    let mut tampered = record(2, "B", &[1]);
    tampered.level = 7;
    tampered.status = Status::Blocked;
    tampered.reasons = set(&[ParentBlocked]);
    let snapshot = snapshot_of(vec![record(1, "A", &[]), tampered]);

    let chain = snapshot.restore(PriorityDefaults::default(), t0()).unwrap();

    let graph = chain.graph();
    assert_eq!(graph.node(2).unwrap().level, 1);
    assert_eq!(reasons_of(graph, 2), set(&[ConvergenceBelow]));
    assert_eq!(reasons_of(graph, 1), set(&[SelfExecutable]));
}

#[test]
fn records_without_parents_hang_off_the_root() {
    let snapshot = snapshot_of(vec![record(3, "A", &[]), record(8, "B", &[])]);

    let graph = snapshot.to_graph().unwrap();

    assert!(graph.has_edge(ROOT_ID, 3));
    assert!(graph.has_edge(ROOT_ID, 8));
    assert_eq!(graph.name(), "hand written");
}

#[test]
fn unknown_parent_is_rejected() {
    let snapshot = snapshot_of(vec![record(1, "A", &[]), record(2, "B", &[5])]);

    assert!(matches!(
        snapshot.to_graph(),
        Err(MindChainError::InvalidReference(5))
    ));
}

#[test]
fn duplicate_or_reserved_ids_are_rejected() {
    let duplicate = snapshot_of(vec![record(1, "A", &[]), record(1, "B", &[])]);
    assert!(duplicate.to_graph().is_err());

    let reserved = snapshot_of(vec![record(ROOT_ID, "root", &[])]);
    assert!(reserved.to_graph().is_err());
}

#[test]
fn cyclic_records_fail_validation() {
    let snapshot = snapshot_of(vec![
        record(1, "A", &[]),
        record(2, "B", &[1, 3]),
        record(3, "C", &[2]),
    ]);

    let err = snapshot
        .restore(PriorityDefaults::default(), t0())
        .unwrap_err();

    assert!(matches!(err, MindChainError::GraphCycle(_)));
}

#[test]
fn older_files_without_optional_fields_still_load() {
    let json = r#"{
        "name": "legacy",
        "nodes": [
            { "id": 1, "name": "Only task" }
        ]
    }"#;
    let fs = MockFileSystem::new();
    fs.add_file(STORE_PATH, json);
    let store = JsonFileStore::with_fs(fs, STORE_PATH);

    let snapshot = store.read_snapshot().unwrap().unwrap();

    assert_eq!(snapshot.version, SNAPSHOT_VERSION);
    assert!(snapshot.archive.is_empty());
    let chain = snapshot.restore(PriorityDefaults::default(), t0()).unwrap();
    assert_eq!(reasons_of(chain.graph(), 1), set(&[SelfExecutable]));
}

#[tokio::test]
async fn real_file_store_saves_and_loads_through_the_trait() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("chain.json");
    let mut store = JsonFileStore::open(&path);

    assert!(store.load().await.unwrap().is_none());

    let snapshot = Snapshot::of_chain(&diamond().build_chain());
    store.save(snapshot.clone()).await.unwrap();

    assert!(path.is_file());
    assert!(!dir.path().join("nested").join("chain.json.tmp").exists());
    assert_eq!(store.load().await.unwrap(), Some(snapshot));
}
