//! Property-based tests for the workflow graph invariants.

use proptest::prelude::*;

use fleetcrm_api::workflow::{StatusDef, TransitionDef, Workflow};

fn status(key: String, position: u32) -> StatusDef {
    StatusDef {
        label: key.to_uppercase(),
        key,
        position,
        color: None,
        actions: vec![],
        is_terminal: false,
    }
}

prop_compose! {
    /// A set of unique keys a1..aN with unique positions.
    fn arb_statuses()(n in 2usize..8) -> Vec<StatusDef> {
        (0..n).map(|i| status(format!("s{}", i), i as u32)).collect()
    }
}

proptest! {
    #[test]
    fn valid_graphs_always_parse_back((statuses, edges) in arb_statuses().prop_flat_map(|statuses| {
        let n = statuses.len();
        let edge = (0..n, 0..n);
        (Just(statuses), proptest::collection::vec(edge, 0..12))
    })) {
        let mut wf = Workflow::new(statuses.clone(), vec![]).unwrap();
        for (from, to) in edges {
            // Ignore rejected edges; only well-formed ones accumulate
            let _ = wf.add_transition(&format!("s{}", from), &format!("s{}", to));
        }

        let (statuses_json, transitions_json) = wf.to_json();
        let parsed = Workflow::from_json(&statuses_json, &transitions_json).unwrap();
        prop_assert_eq!(&parsed, &wf);

        // Every surviving transition connects existing statuses and none
        // duplicates another
        let mut seen = std::collections::HashSet::new();
        for TransitionDef { from, to } in parsed.transitions() {
            prop_assert!(parsed.contains(from));
            prop_assert!(parsed.contains(to));
            prop_assert!(from != to);
            prop_assert!(seen.insert((from.clone(), to.clone())));
        }
    }

    #[test]
    fn reorder_of_any_permutation_keeps_the_set(statuses in arb_statuses(), seed in any::<u64>()) {
        let mut wf = Workflow::new(statuses.clone(), vec![]).unwrap();

        // Derive a permutation from the seed
        let mut keys: Vec<String> = statuses.iter().map(|s| s.key.clone()).collect();
        let n = keys.len();
        let mut state = seed;
        for i in (1..n).rev() {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            let j = (state % (i as u64 + 1)) as usize;
            keys.swap(i, j);
        }

        wf.reorder(&keys).unwrap();

        // Positions are contiguous 0..n in the order given
        for (idx, key) in keys.iter().enumerate() {
            prop_assert_eq!(wf.status(key).unwrap().position, idx as u32);
        }
        prop_assert_eq!(wf.initial_status().key.clone(), keys[0].clone());
    }

    #[test]
    fn removing_any_status_leaves_a_valid_graph(statuses in arb_statuses(), victim in 0usize..8) {
        let n = statuses.len();
        let mut wf = Workflow::new(statuses, vec![]).unwrap();
        // Chain edges s0 -> s1 -> ... -> sN
        for i in 0..n - 1 {
            wf.add_transition(&format!("s{}", i), &format!("s{}", i + 1)).unwrap();
        }

        let victim_key = format!("s{}", victim % n);
        wf.remove_status(&victim_key).unwrap();

        prop_assert!(wf.validate().is_ok());
        prop_assert!(!wf.contains(&victim_key));
        for t in wf.transitions() {
            prop_assert!(t.from != victim_key && t.to != victim_key);
        }
    }
}
