use guard_graph::config::EditorConfig;
use guard_graph::editor::{GraphCoordinator, GraphEdit, NodePatch, ReloadOutcome, SyncState};
use guard_graph::engine_core::errors::GraphError;
use guard_graph::engine_core::graph::{GraphNode, NodeId, NodeKind, Position};
use guard_graph::engine_core::models::{
    FilterAction, FilterLogic, GuardProfile, InterceptorKind, LogLevel, MessageInterceptorConfig,
    MessageType,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

// --- Helpers ---

type Seen = Arc<Mutex<Vec<GuardProfile>>>;

fn coordinator() -> (GraphCoordinator, Seen) {
    let mut coordinator = GraphCoordinator::new(&EditorConfig::default());
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    coordinator.subscribe(move |p: &GuardProfile| sink.lock().unwrap().push(p.clone()));
    (coordinator, seen)
}

fn approval() -> GuardProfile {
    GuardProfile::new(MessageInterceptorConfig::ManualApproval)
}

fn two_chain() -> GuardProfile {
    GuardProfile::new(MessageInterceptorConfig::Chain {
        chain: vec![
            MessageInterceptorConfig::MessageLog {
                log_level: LogLevel::Info,
            },
            MessageInterceptorConfig::ManualApproval,
        ],
    })
}

fn assert_sentinels(coordinator: &GraphCoordinator) {
    assert_eq!(coordinator.graph().count_kind(NodeKind::Input), 1);
    assert_eq!(coordinator.graph().count_kind(NodeKind::Output), 1);
}

fn move_to(id: &str, y: f64, dragging: bool) -> GraphEdit {
    GraphEdit::MoveNode {
        id: NodeId::new(id),
        position: Position::new(250.0, y),
        dragging,
    }
}

// --- Loading ---

#[test]
fn test_load_never_notifies() {
    let (mut coordinator, seen) = coordinator();

    assert_eq!(coordinator.load_profile("p", approval()), ReloadOutcome::Rebuilt);
    assert_eq!(coordinator.graph().nodes.len(), 3);
    assert_eq!(coordinator.profile(), &approval());
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn test_reload_outcomes_and_expanded_flags() {
    let (mut coordinator, _) = coordinator();
    let now = Instant::now();

    coordinator.load_profile("p", two_chain());
    coordinator
        .apply(GraphEdit::ToggleExpanded(NodeId::new("node-0")), now)
        .unwrap();
    assert!(coordinator.is_expanded(&NodeId::new("node-0")));

    // Echo of the same value
    assert_eq!(coordinator.load_profile("p", two_chain()), ReloadOutcome::Unchanged);
    assert!(coordinator.is_expanded(&NodeId::new("node-0")));

    // Same identity (key + Chain tag), new content
    let longer = GuardProfile::new(MessageInterceptorConfig::Chain {
        chain: vec![
            MessageInterceptorConfig::ManualApproval,
            MessageInterceptorConfig::ManualApproval,
            MessageInterceptorConfig::ManualApproval,
        ],
    });
    assert_eq!(coordinator.load_profile("p", longer), ReloadOutcome::Refreshed);
    assert!(coordinator.is_expanded(&NodeId::new("node-0")));
    assert_eq!(coordinator.graph().nodes.len(), 6);

    // Different key
    assert_eq!(coordinator.load_profile("q", two_chain()), ReloadOutcome::Rebuilt);
    assert!(!coordinator.is_expanded(&NodeId::new("node-0")));
}

#[test]
fn test_expanded_flags_follow_identity() {
    let (mut coordinator, _) = coordinator();
    let now = Instant::now();
    let primary = NodeId::new("primary");

    coordinator.load_profile("a", approval());
    coordinator
        .apply(GraphEdit::ToggleExpanded(primary.clone()), now)
        .unwrap();
    assert!(coordinator.is_expanded(&primary));

    assert_eq!(coordinator.load_profile("b", approval()), ReloadOutcome::Rebuilt);
    assert!(!coordinator.is_expanded(&primary));

    assert_eq!(coordinator.load_profile("a", approval()), ReloadOutcome::Rebuilt);
    assert!(coordinator.is_expanded(&primary));
}

#[test]
fn test_load_json_bad_text_leaves_graph() {
    let (mut coordinator, _) = coordinator();
    coordinator.load_profile("p", approval());
    let before = coordinator.graph().clone();

    let result = coordinator.load_json("p", "{ not json");
    assert!(matches!(result, Err(GraphError::ProfileParse(_))));
    assert_eq!(coordinator.graph(), &before);

    let outcome = coordinator
        .load_json(
            "p",
            r#"{"primary_message_interceptor": {"type": "Chain", "chain": [{"type": "Bogus"}]}}"#,
        )
        .unwrap();
    assert_eq!(outcome, ReloadOutcome::Rebuilt);
    assert_eq!(
        coordinator.profile().primary(),
        &MessageInterceptorConfig::Chain {
            chain: vec![MessageInterceptorConfig::MessageLog {
                log_level: LogLevel::Info
            }]
        }
    );
}

// --- Structural edits ---

#[test]
fn test_delete_only_interceptor() {
    let (mut coordinator, seen) = coordinator();
    coordinator.load_profile("p", approval());

    coordinator
        .apply(
            GraphEdit::RemoveNodes(vec![NodeId::new("primary")]),
            Instant::now(),
        )
        .unwrap();

    assert!(coordinator.graph().edges.is_empty());
    assert_eq!(coordinator.profile(), &GuardProfile::default());
    assert_eq!(seen.lock().unwrap().as_slice(), &[GuardProfile::default()]);
}

#[test]
fn test_sentinels_cannot_be_removed() {
    let (mut coordinator, _) = coordinator();
    coordinator.load_profile("p", two_chain());
    let now = Instant::now();

    coordinator
        .apply(
            GraphEdit::RemoveNodes(vec![NodeId::input(), NodeId::output(), NodeId::new("node-1")]),
            now,
        )
        .unwrap();
    assert_sentinels(&coordinator);

    coordinator
        .apply(
            GraphEdit::Select {
                nodes: vec![NodeId::input(), NodeId::output(), NodeId::new("chain")],
                edges: vec![],
            },
            now,
        )
        .unwrap();
    coordinator.apply(GraphEdit::DeleteSelection, now).unwrap();
    assert_sentinels(&coordinator);
    assert_eq!(coordinator.graph().nodes.len(), 3);
    assert!(coordinator.selection().is_empty());

    let result = coordinator.apply(
        GraphEdit::AddNodes(vec![GraphNode::input(Position::default())]),
        now,
    );
    assert!(matches!(result, Err(GraphError::SentinelViolation(_))));
    assert_sentinels(&coordinator);
}

#[test]
fn test_connect_builds_chain() {
    let (mut coordinator, seen) = coordinator();
    let now = Instant::now();

    coordinator
        .apply(
            GraphEdit::AddNodes(vec![
                GraphNode::interceptor(
                    NodeId::new("c"),
                    Position::default(),
                    MessageInterceptorConfig::Chain { chain: vec![] },
                ),
                GraphNode::interceptor(
                    NodeId::new("m"),
                    Position::default(),
                    MessageInterceptorConfig::ManualApproval,
                ),
            ]),
            now,
        )
        .unwrap();
    for (source, target) in [("input", "c"), ("c", "m"), ("m", "output")] {
        coordinator
            .apply(
                GraphEdit::AddEdge {
                    source: NodeId::new(source),
                    target: NodeId::new(target),
                },
                now,
            )
            .unwrap();
    }

    let expected = GuardProfile::new(MessageInterceptorConfig::Chain {
        chain: vec![MessageInterceptorConfig::ManualApproval],
    });
    assert_eq!(coordinator.profile(), &expected);
    assert_eq!(seen.lock().unwrap().last(), Some(&expected));

    // Container data mirrors the walk
    assert_eq!(
        coordinator.graph().node(&NodeId::new("c")).unwrap().data,
        Some(expected.primary().clone())
    );
}

#[test]
fn test_invalid_edges_rejected() {
    let (mut coordinator, _) = coordinator();
    coordinator.load_profile("p", approval());
    let now = Instant::now();
    let before = coordinator.graph().clone();

    let cases = [
        ("output", "primary"),
        ("primary", "input"),
        ("primary", "primary"),
        ("primary", "ghost"),
    ];
    for (source, target) in cases {
        let result = coordinator.apply(
            GraphEdit::AddEdge {
                source: NodeId::new(source),
                target: NodeId::new(target),
            },
            now,
        );
        assert!(result.is_err(), "{} -> {} should be rejected", source, target);
    }
    assert_eq!(coordinator.graph(), &before);

    // Duplicate is a no-op
    coordinator
        .apply(
            GraphEdit::AddEdge {
                source: NodeId::input(),
                target: NodeId::new("primary"),
            },
            now,
        )
        .unwrap();
    assert_eq!(coordinator.graph().edges.len(), 2);
}

#[test]
fn test_node_edit_patch() {
    let (mut coordinator, seen) = coordinator();
    coordinator.load_profile("p", two_chain());
    let now = Instant::now();

    coordinator
        .apply(
            GraphEdit::NodeEdited {
                id: NodeId::new("node-0"),
                patch: NodePatch::LogLevel(LogLevel::Error),
            },
            now,
        )
        .unwrap();

    let expected = GuardProfile::new(MessageInterceptorConfig::Chain {
        chain: vec![
            MessageInterceptorConfig::MessageLog {
                log_level: LogLevel::Error,
            },
            MessageInterceptorConfig::ManualApproval,
        ],
    });
    assert_eq!(coordinator.profile(), &expected);
    assert_eq!(seen.lock().unwrap().len(), 1);

    let rejected = coordinator.apply(
        GraphEdit::NodeEdited {
            id: NodeId::new("node-1"),
            patch: NodePatch::MatchAction(FilterAction::Drop),
        },
        now,
    );
    assert!(matches!(rejected, Err(GraphError::InvalidPatch { .. })));

    let sentinel = coordinator.apply(
        GraphEdit::NodeEdited {
            id: NodeId::input(),
            patch: NodePatch::LogLevel(LogLevel::Debug),
        },
        now,
    );
    assert!(matches!(sentinel, Err(GraphError::SentinelViolation(_))));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_palette_add_starts_fresh_profile() {
    let (mut coordinator, _) = coordinator();
    coordinator.load_profile("p", two_chain());

    coordinator
        .apply(
            GraphEdit::PaletteAdd {
                kind: InterceptorKind::Filter,
                position: Position::new(10.0, 20.0),
            },
            Instant::now(),
        )
        .unwrap();

    let graph = coordinator.graph();
    assert_eq!(graph.nodes.len(), 3);
    assert_eq!(graph.edges.len(), 2);
    let added = graph.interceptor_nodes().next().unwrap();
    assert!(added.id.as_str().starts_with("filter-"));
    assert_eq!(added.position, Position::new(10.0, 20.0));
    assert_eq!(
        coordinator.profile().primary(),
        &MessageInterceptorConfig::Filter {
            filter_logic: FilterLogic::MessageType(MessageType::Request),
            match_action: FilterAction::Send,
            non_match_action: FilterAction::Send,
        }
    );
}

#[test]
fn test_cycle_keeps_previous_profile() {
    let (mut coordinator, seen) = coordinator();
    coordinator.load_profile("p", two_chain());
    let now = Instant::now();

    coordinator
        .apply(
            GraphEdit::AddEdge {
                source: NodeId::new("node-1"),
                target: NodeId::new("node-0"),
            },
            now,
        )
        .unwrap();

    // node-1 -> output is still the first edge, so no cycle yet
    assert!(coordinator.last_error().is_none());
    let output_edge = coordinator
        .graph()
        .edges
        .iter()
        .find(|e| e.source == NodeId::new("node-1") && e.target == NodeId::output())
        .map(|e| e.id.clone())
        .unwrap();
    let notified = seen.lock().unwrap().len();

    coordinator
        .apply(GraphEdit::RemoveEdges(vec![output_edge]), now)
        .unwrap();

    assert!(matches!(
        coordinator.last_error(),
        Some(GraphError::CycleDetected { .. })
    ));
    assert_eq!(coordinator.profile(), &two_chain());
    assert_eq!(seen.lock().unwrap().len(), notified);
}

// --- Positional edits ---

#[test]
fn test_drag_is_coalesced() {
    let (mut coordinator, seen) = coordinator();
    coordinator.load_profile("p", approval());
    let start = Instant::now();
    let window = Duration::from_millis(300);

    coordinator.apply(move_to("primary", 160.0, true), start).unwrap();
    coordinator.apply(move_to("primary", 170.0, true), start).unwrap();
    assert_eq!(coordinator.sync_state(), SyncState::Dirty);
    assert!(!coordinator.poll(start + window * 5));

    coordinator
        .apply(move_to("primary", 180.0, false), start + Duration::from_millis(50))
        .unwrap();
    coordinator
        .apply(move_to("primary", 190.0, false), start + Duration::from_millis(200))
        .unwrap();
    assert_eq!(
        coordinator.next_deadline(),
        Some(start + Duration::from_millis(500))
    );

    assert!(!coordinator.poll(start + Duration::from_millis(499)));
    assert!(seen.lock().unwrap().is_empty());

    assert!(coordinator.poll(start + Duration::from_millis(500)));
    assert!(!coordinator.poll(start + Duration::from_millis(900)));
    assert_eq!(seen.lock().unwrap().as_slice(), &[approval()]);
    assert_eq!(coordinator.sync_state(), SyncState::Applied);
    assert_eq!(
        coordinator.graph().node(&NodeId::new("primary")).unwrap().position.y,
        190.0
    );
}

#[test]
fn test_structural_edit_settles_pending_drag() {
    let (mut coordinator, seen) = coordinator();
    coordinator.load_profile("p", two_chain());
    let start = Instant::now();

    coordinator.apply(move_to("node-0", 400.0, false), start).unwrap();
    coordinator
        .apply(GraphEdit::RemoveNodes(vec![NodeId::new("node-1")]), start)
        .unwrap();

    assert_eq!(coordinator.sync_state(), SyncState::Applied);
    assert!(!coordinator.poll(start + Duration::from_secs(1)));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_flush_runs_pending_pass() {
    let (mut coordinator, seen) = coordinator();
    coordinator.load_profile("p", approval());

    assert!(!coordinator.flush());
    coordinator
        .apply(move_to("primary", 10.0, true), Instant::now())
        .unwrap();
    assert!(coordinator.flush());
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn test_toggle_expanded_is_cosmetic() {
    let (mut coordinator, seen) = coordinator();
    coordinator.load_profile("p", approval());
    let now = Instant::now();

    coordinator
        .apply(GraphEdit::ToggleExpanded(NodeId::new("primary")), now)
        .unwrap();
    assert!(coordinator.is_expanded(&NodeId::new("primary")));
    coordinator
        .apply(GraphEdit::ToggleExpanded(NodeId::new("primary")), now)
        .unwrap();
    assert!(!coordinator.is_expanded(&NodeId::new("primary")));

    assert!(seen.lock().unwrap().is_empty());
    assert_eq!(coordinator.sync_state(), SyncState::Idle);
}
