// Property: counter accumulation and reset semantics.
//
// Each counter serializes its additions through an atomic fetch-and-add,
// so a sequence of deltas always sums exactly, reset returns the prior
// simulated total, and the real counter is durably reloadable.

use carbon_relay::{CounterPersistence, CounterStore};
use proptest::prelude::*;
use tempfile::tempdir;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_deltas_sum_exactly(deltas in prop::collection::vec(0u64..10_000, 1..20)) {
        let dir = tempdir().unwrap();
        let store = CounterStore::new(CounterPersistence::new(dir.path().join("carbon-data.txt")));

        let mut expected_real = 0u64;
        let mut expected_simulated = 0u64;
        for (i, delta) in deltas.iter().enumerate() {
            if i % 2 == 0 {
                expected_real += delta;
                prop_assert_eq!(store.add_real(*delta), expected_real);
            } else {
                expected_simulated += delta;
                prop_assert_eq!(store.add_simulated(*delta), expected_simulated);
            }
        }

        let snapshot = store.snapshot();
        prop_assert_eq!(snapshot.real, expected_real);
        prop_assert_eq!(snapshot.simulated, expected_simulated);
        prop_assert_eq!(snapshot.combined(), expected_real + expected_simulated);
    }

    #[test]
    fn prop_real_counter_survives_restart(deltas in prop::collection::vec(1u64..10_000, 1..10)) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("carbon-data.txt");

        let total = {
            let store = CounterStore::new(CounterPersistence::new(&path));
            let mut total = 0;
            for delta in &deltas {
                total = store.add_real(*delta);
            }
            total
        };

        // A fresh store seeded from the same file resumes at the total
        let reloaded = CounterStore::new(CounterPersistence::new(&path));
        prop_assert_eq!(reloaded.snapshot().real, total);
        prop_assert_eq!(reloaded.snapshot().simulated, 0);
    }

    #[test]
    fn prop_reset_returns_prior_and_zeroes(deltas in prop::collection::vec(0u64..10_000, 0..10)) {
        let dir = tempdir().unwrap();
        let store = CounterStore::new(CounterPersistence::new(dir.path().join("carbon-data.txt")));

        let mut expected = 0u64;
        for delta in &deltas {
            expected += delta;
            store.add_simulated(*delta);
        }

        prop_assert_eq!(store.reset_simulated(), expected);
        prop_assert_eq!(store.snapshot().simulated, 0);

        // Accumulation restarts from zero
        prop_assert_eq!(store.add_simulated(5), 5);
    }
}
