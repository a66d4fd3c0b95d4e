//! Concurrent submissions never mix up operands or results.

mod common;

use std::sync::Arc;

use common::FakeActions;
use proptest::prelude::*;
use wand::config::{DispatchConfig, DispatchOrdering};
use wand::history::MemoryHistoryStore;
use wand::{Command, CommandCoordinator, Intent, WandContext};

fn run_pair(
    first: (String, u64),
    second: (String, u64),
    ordering: DispatchOrdering,
) -> (Vec<(String, String)>, usize) {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    rt.block_on(async move {
        let store = Arc::new(MemoryHistoryStore::new(16));
        let config = DispatchConfig {
            ordering,
            ..DispatchConfig::default()
        };
        let ctx = WandContext::new(Arc::new(FakeActions::default())).with_history(store.clone());
        let coord = CommandCoordinator::new(ctx, &config).unwrap();

        let a = coord
            .submit(Command::new(format!("open {}@{}", first.0, first.1)))
            .unwrap();
        let b = coord
            .submit(Command::new(format!("search for {}@{}", second.0, second.1)))
            .unwrap();
        let (a, b) = tokio::join!(a, b);
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a.result.intent, Intent::LaunchApp);
        assert_eq!(b.result.intent, Intent::WebSearch);

        coord.shutdown().await;
        (
            vec![(a.command, a.result.response), (b.command, b.result.response)],
            store.len(),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn concurrent_results_match_their_commands(
        app in "[a-z]{3,10}",
        query in "q[a-z]{2,9}",
        delay_a in 0u64..30,
        delay_b in 0u64..30,
    ) {
        let (results, recorded) =
            run_pair((app.clone(), delay_a), (query.clone(), delay_b), DispatchOrdering::Concurrent);
        prop_assert_eq!(&results[0].0, &format!("open {app}@{delay_a}"));
        prop_assert_eq!(&results[0].1, &format!("✅ Opened {app}"));
        prop_assert_eq!(&results[1].0, &format!("search for {query}@{delay_b}"));
        prop_assert_eq!(&results[1].1, &format!("🔍 Searched for: {query}"));
        prop_assert_eq!(recorded, 2);
    }

    #[test]
    fn serial_results_match_their_commands(
        app in "[a-z]{3,10}",
        query in "q[a-z]{2,9}",
        delay_a in 0u64..10,
        delay_b in 0u64..10,
    ) {
        let (results, recorded) =
            run_pair((app.clone(), delay_a), (query.clone(), delay_b), DispatchOrdering::Serial);
        prop_assert_eq!(&results[0].1, &format!("✅ Opened {app}"));
        prop_assert_eq!(&results[1].1, &format!("🔍 Searched for: {query}"));
        prop_assert_eq!(recorded, 2);
    }
}
