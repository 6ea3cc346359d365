//! Property tests for the action compatibility shim

use proptest::prelude::*;

use macropad_protocol::WireAction;
use macropad_protocol::compat::canonicalize_action;

fn key_name() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["KeyA", "KeyB", "Enter", "Space", "F13", "VolumeUp"])
        .prop_map(str::to_string)
}

fn leaf_action() -> impl Strategy<Value = WireAction> {
    prop_oneof![
        (prop::collection::vec(key_name(), 1..4), prop::option::of(key_name()))
            .prop_map(|(keys, modifier)| WireAction::KeyPress { keys, modifier }),
        Just(WireAction::KeyRelease),
        any::<u8>().prop_map(|button| WireAction::MousePress { button }),
        Just(WireAction::MouseRelease),
        (any::<i8>(), any::<i8>()).prop_map(|(dx, dy)| WireAction::MouseMove { dx, dy }),
        any::<i8>().prop_map(|amount| WireAction::MouseWheel { amount }),
        any::<u16>().prop_map(|usage_id| WireAction::ConsumerPress { usage_id }),
        Just(WireAction::ConsumerRelease),
        (0u64..60_000).prop_map(|ms| WireAction::Delay { ms }),
        (prop::collection::vec(key_name(), 0..6), prop::collection::vec(key_name(), 0..2))
            .prop_map(|(keys, modifiers)| WireAction::SendString { keys, modifiers }),
    ]
}

fn action() -> impl Strategy<Value = WireAction> {
    leaf_action().prop_recursive(3, 24, 6, |inner| {
        prop::collection::vec(inner, 0..6).prop_map(WireAction::Sequence)
    })
}

proptest! {
    #[test]
    fn prop_canonical_values_are_fixed_points(action in action()) {
        let value = serde_json::to_value(&action).expect("serialize should succeed");
        let canonical = canonicalize_action(value.clone()).expect("canonical input accepted");
        prop_assert_eq!(canonical, value);
    }

    #[test]
    fn prop_from_wire_value_inverts_serialize(action in action()) {
        let value = serde_json::to_value(&action).expect("serialize should succeed");
        let parsed = WireAction::from_wire_value(value).expect("parse should succeed");
        prop_assert_eq!(parsed, action);
    }

    #[test]
    fn prop_type_tagged_form_matches_wire_form(ms in 0u64..100_000, button in any::<u8>()) {
        let delay = canonicalize_action(serde_json::json!({"type": "Delay", "ms": ms}))
            .expect("type-tagged delay accepted");
        prop_assert_eq!(delay, serde_json::json!({"Delay": {"ms": ms}}));

        let press = canonicalize_action(serde_json::json!({"type": "MousePress", "button": button}))
            .expect("type-tagged press accepted");
        prop_assert_eq!(press, serde_json::json!({"MousePress": {"button": button}}));
    }
}
