use guard_graph::engine::{decode_profile, forward_convert, reverse_convert};
use guard_graph::engine_core::graph::NodeKind;
use guard_graph::engine_core::models::{
    FilterAction, FilterLogic, GuardProfile, LogLevel, MessageDirection, MessageInterceptorConfig,
    MessageType,
};
use proptest::prelude::*;

fn log_level() -> impl Strategy<Value = LogLevel> {
    prop_oneof![
        Just(LogLevel::Error),
        Just(LogLevel::Warn),
        Just(LogLevel::Info),
        Just(LogLevel::Debug),
        Just(LogLevel::Trace),
    ]
}

fn filter_logic() -> impl Strategy<Value = FilterLogic> {
    let leaf = prop_oneof![
        prop_oneof![Just(MessageDirection::Inbound), Just(MessageDirection::Outbound)]
            .prop_map(FilterLogic::Direction),
        prop_oneof![
            Just(MessageType::Request),
            Just(MessageType::Response),
            Just(MessageType::Notification),
        ]
        .prop_map(FilterLogic::MessageType),
        "[a-z]{1,8}/[a-z]{1,8}".prop_map(FilterLogic::RequestMethod),
    ];
    leaf.prop_recursive(3, 12, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..3).prop_map(FilterLogic::And),
            prop::collection::vec(inner.clone(), 1..3).prop_map(FilterLogic::Or),
            inner.prop_map(|l| FilterLogic::Not(Box::new(l))),
        ]
    })
}

fn filter_action() -> impl Strategy<Value = FilterAction> {
    prop_oneof![
        Just(FilterAction::Send),
        Just(FilterAction::Drop),
        Just(FilterAction::Intercept(Box::new(
            MessageInterceptorConfig::ManualApproval
        ))),
    ]
}

/// Any interceptor except a chain
fn leaf() -> impl Strategy<Value = MessageInterceptorConfig> {
    prop_oneof![
        Just(MessageInterceptorConfig::ManualApproval),
        log_level().prop_map(|log_level| MessageInterceptorConfig::MessageLog { log_level }),
        (filter_logic(), filter_action(), filter_action()).prop_map(
            |(filter_logic, match_action, non_match_action)| MessageInterceptorConfig::Filter {
                filter_logic,
                match_action,
                non_match_action,
            }
        ),
    ]
}

/// Any interceptor, with chains nested up to two levels deep
fn interceptor() -> impl Strategy<Value = MessageInterceptorConfig> {
    leaf().prop_recursive(2, 16, 4, |inner| {
        prop::collection::vec(inner, 0..4)
            .prop_map(|chain| MessageInterceptorConfig::Chain { chain })
    })
}

proptest! {
    #[test]
    fn test_single_interceptor_round_trip(primary in leaf()) {
        let profile = GuardProfile::new(primary);
        let graph = forward_convert(&profile);
        prop_assert_eq!(graph.nodes.len(), 3);
        prop_assert_eq!(reverse_convert(&graph).unwrap(), profile);
    }

    #[test]
    fn test_chain_round_trip(chain in prop::collection::vec(interceptor(), 0..12)) {
        let len = chain.len();
        let profile = GuardProfile::new(MessageInterceptorConfig::Chain { chain });
        let graph = forward_convert(&profile);

        prop_assert_eq!(graph.nodes.len(), len + 3);
        prop_assert_eq!(graph.edges.len(), len + 2);
        prop_assert_eq!(graph.count_kind(NodeKind::Input), 1);
        prop_assert_eq!(graph.count_kind(NodeKind::Output), 1);
        prop_assert_eq!(reverse_convert(&graph).unwrap(), profile);
    }

    #[test]
    fn test_forward_idempotent(chain in prop::collection::vec(interceptor(), 0..8)) {
        let profile = GuardProfile::new(MessageInterceptorConfig::Chain { chain });
        let first = forward_convert(&profile);
        let second = forward_convert(&reverse_convert(&first).unwrap());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn test_decode_accepts_serialized_profiles(
        chain in prop::collection::vec(interceptor(), 0..6)
    ) {
        let profile = GuardProfile::new(MessageInterceptorConfig::Chain { chain });
        let value = serde_json::to_value(&profile).unwrap();
        let decoded = decode_profile(&value);
        prop_assert!(decoded.is_clean());
        prop_assert_eq!(decoded.profile, profile);
    }

    #[test]
    fn test_decode_unknown_tag_never_fails(tag in "[A-Z][a-zA-Z]{0,12}") {
        prop_assume!(!["ManualApproval", "MessageLog", "Filter", "Chain"].contains(&tag.as_str()));
        let value = serde_json::json!({
            "primary_message_interceptor": {
                "type": "Chain",
                "chain": [{"type": "ManualApproval"}, {"type": tag}]
            }
        });

        let decoded = decode_profile(&value);
        prop_assert_eq!(decoded.issues.len(), 1);
        prop_assert_eq!(
            decoded.profile.primary(),
            &MessageInterceptorConfig::Chain {
                chain: vec![
                    MessageInterceptorConfig::ManualApproval,
                    MessageInterceptorConfig::default(),
                ]
            }
        );
    }
}
