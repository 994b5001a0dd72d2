//! Property-based tests for multiprobe components.
//!
//! These verify invariants that should hold regardless of input:
//! - Hashing is deterministic, dimension-checked, and scale-invariant
//! - Reduced codes stay below their modulus
//! - The MIPS transform preserves norms and inner products
//! - The perturbation sequence is exact-first, complete, and cost-ordered
//! - Probe results respect thresholds, k bounds, and the exact oracle
//!
//! Inputs are drawn from coarse grids (hundredths, sixteenths, powers of
//! two) so every assertion is exact float arithmetic rather than a
//! tolerance judgement.

use proptest::prelude::*;

mod hash_props {
    use super::*;
    use multiprobe::hash::{bit_agreement, HashFamily};

    prop_compose! {
        fn arb_grid_vector(dim: usize)(comps in prop::collection::vec(-1000i32..=1000, dim)) -> Vec<f32> {
            comps.into_iter().map(|i| i as f32 / 100.0).collect()
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn hashing_is_deterministic(
            v in arb_grid_vector(8),
            seed in 0u64..1000,
        ) {
            let f = HashFamily::<f32>::new(16, 8, seed).unwrap();
            prop_assert_eq!(f.hash(&v).unwrap(), f.hash(&v).unwrap());
        }

        #[test]
        fn power_of_two_scaling_preserves_codes(
            v in arb_grid_vector(8),
            scale_pow in -3i32..8,
        ) {
            // Scaling by 2^k is exact in floats, so every projection keeps
            // its sign and the code cannot move.
            let f = HashFamily::<f32>::new(32, 8, 7).unwrap();
            let scale = 2.0f32.powi(scale_pow);
            let scaled: Vec<f32> = v.iter().map(|x| x * scale).collect();
            prop_assert_eq!(f.hash(&v).unwrap(), f.hash(&scaled).unwrap());
        }

        #[test]
        fn reduced_codes_stay_below_any_modulus(
            v in arb_grid_vector(6),
            max_code in 1u64..100_000,
        ) {
            let f = HashFamily::<f32>::new(96, 6, 11).unwrap();
            prop_assert!(f.hash_max(&v, max_code).unwrap() < max_code);
        }

        #[test]
        fn agreement_is_symmetric_and_bounded(
            a in arb_grid_vector(8),
            b in arb_grid_vector(8),
        ) {
            let f = HashFamily::<f32>::new(48, 8, 3).unwrap();
            let ha = f.hash(&a).unwrap();
            let hb = f.hash(&b).unwrap();
            let ab = bit_agreement(&ha, &hb, 48);
            prop_assert_eq!(ab, bit_agreement(&hb, &ha, 48));
            prop_assert!(ab <= 48);
            prop_assert_eq!(bit_agreement(&ha, &ha, 48), 48);
        }

        #[test]
        fn wrong_dimension_is_always_rejected(
            v in arb_grid_vector(8),
            short in 1usize..8,
        ) {
            let f = HashFamily::<f32>::new(16, 8, 5).unwrap();
            prop_assert!(f.hash(&v[..short]).is_err());
            prop_assert!(f.hash_scored(&v[..short]).is_err());
        }
    }
}

mod transform_props {
    use super::*;
    use multiprobe::hash::MipsTransform;
    use multiprobe::vector;

    prop_compose! {
        fn arb_item(dim: usize)(comps in prop::collection::vec(-100i32..=100, dim)) -> Vec<f64> {
            comps.into_iter().map(|i| f64::from(i) / 100.0).collect()
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn items_pad_to_the_shared_norm(v in arb_item(5)) {
            // Components are at most 1.0, so norms stay below sqrt(5) < 3.
            let t = MipsTransform::<f64>::new(5, 3.0).unwrap();
            let out = t.transform_item(&v).unwrap();
            prop_assert_eq!(out.len(), 6);
            prop_assert!((vector::norm(&out) - 3.0).abs() < 1e-9);
        }

        #[test]
        fn queries_become_unit_with_a_zero_pad(v in arb_item(5)) {
            prop_assume!(v.iter().any(|x| *x != 0.0));
            let t = MipsTransform::<f64>::new(5, 3.0).unwrap();
            let out = t.transform_query(&v).unwrap();
            prop_assert_eq!(out.len(), 6);
            prop_assert_eq!(out[5], 0.0);
            prop_assert!((vector::norm(&out) - 1.0).abs() < 1e-12);
        }

        #[test]
        fn padding_preserves_inner_products(
            q in arb_item(5),
            x in arb_item(5),
        ) {
            prop_assume!(q.iter().any(|c| *c != 0.0));
            let t = MipsTransform::<f64>::new(5, 3.0).unwrap();
            let qt = t.transform_query(&q).unwrap();
            let xt = t.transform_item(&x).unwrap();
            // The query pad is exactly zero, so the pads contribute nothing.
            let direct = vector::dot(&vector::normalized(&q).unwrap(), &x);
            prop_assert!((vector::dot(&qt, &xt) - direct).abs() < 1e-12);
        }

        #[test]
        fn oversized_items_are_always_rejected(v in arb_item(5)) {
            prop_assume!(v.iter().any(|c| *c != 0.0));
            let t = MipsTransform::<f64>::new(5, 3.0).unwrap();
            let oversized: Vec<f64> = vector::normalized(&v)
                .unwrap()
                .iter()
                .map(|c| c * 4.5)
                .collect();
            prop_assert!(t.transform_item(&oversized).is_err());
        }
    }
}

mod sequence_props {
    use super::*;
    use multiprobe::hash::HashCode;
    use multiprobe::probe::MultiProbeSequence;

    prop_compose! {
        // Sixteenths are dyadic, so margin sums are exact in f64 and the
        // cost-order assertions need no tolerance.
        fn arb_projections()(raw in prop::collection::vec(-64i32..=64, 2..=8)) -> Vec<f64> {
            raw.into_iter().map(|i| f64::from(i) / 16.0).collect()
        }
    }

    /// Flip count and recomputed margin cost of `code` relative to `base`.
    fn flips_and_cost(base: &HashCode, code: &HashCode, projections: &[f64]) -> (usize, f64) {
        let width = base.width();
        let mut flips = 0;
        let mut cost = 0.0;
        for plane in 0..width {
            let position = width - 1 - plane;
            if base.bit(position) != code.bit(position) {
                flips += 1;
                cost += projections[plane].abs();
            }
        }
        (flips, cost)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn exact_code_is_yielded_first(projections in arb_projections()) {
            let base = HashCode::zero(projections.len());
            let mut seq = MultiProbeSequence::new(base.clone(), &projections);
            prop_assert_eq!(seq.next(), Some(base));
        }

        #[test]
        fn sequence_enumerates_every_code_exactly_once(
            projections in arb_projections(),
        ) {
            let bits = projections.len();
            let base = HashCode::zero(bits);
            let codes: Vec<HashCode> =
                MultiProbeSequence::new(base, &projections).collect();
            prop_assert_eq!(codes.len(), 1 << bits);
            let distinct: std::collections::HashSet<HashCode> =
                codes.into_iter().collect();
            prop_assert_eq!(distinct.len(), 1 << bits);
        }

        #[test]
        fn flip_counts_never_decrease(projections in arb_projections()) {
            let bits = projections.len();
            let base = HashCode::zero(bits);
            let counts: Vec<usize> = MultiProbeSequence::new(base.clone(), &projections)
                .map(|code| flips_and_cost(&base, &code, &projections).0)
                .collect();
            prop_assert_eq!(counts[0], 0);
            for pair in counts.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }

        #[test]
        fn costs_never_decrease_within_a_flip_level(
            projections in arb_projections(),
        ) {
            let bits = projections.len();
            let base = HashCode::zero(bits);
            let ranked: Vec<(usize, f64)> =
                MultiProbeSequence::new(base.clone(), &projections)
                    .map(|code| flips_and_cost(&base, &code, &projections))
                    .collect();
            for pair in ranked.windows(2) {
                if pair[0].0 == pair[1].0 {
                    prop_assert!(
                        pair[0].1 <= pair[1].1,
                        "cost regressed within a level: {:?} then {:?}",
                        pair[0], pair[1]
                    );
                }
            }
        }

        #[test]
        fn single_flips_cover_every_plane(projections in arb_projections()) {
            let bits = projections.len();
            let base = HashCode::zero(bits);
            let mut seq = MultiProbeSequence::new(base.clone(), &projections);
            seq.next();
            let mut seen = std::collections::HashSet::new();
            for _ in 0..bits {
                let code = seq.next().unwrap();
                let (flips, _) = flips_and_cost(&base, &code, &projections);
                prop_assert_eq!(flips, 1);
                for plane in 0..bits {
                    let position = bits - 1 - plane;
                    if base.bit(position) != code.bit(position) {
                        seen.insert(plane);
                    }
                }
            }
            prop_assert_eq!(seen.len(), bits);
        }

        #[test]
        fn generation_is_deterministic(projections in arb_projections()) {
            let base = HashCode::zero(projections.len());
            let a: Vec<HashCode> =
                MultiProbeSequence::new(base.clone(), &projections).collect();
            let b: Vec<HashCode> =
                MultiProbeSequence::new(base, &projections).collect();
            prop_assert_eq!(a, b);
        }
    }
}

mod probe_props {
    use super::*;
    use multiprobe::Index;

    const FULL: usize = 256; // 2^bits below

    prop_compose! {
        fn arb_item()(comps in prop::collection::vec(-30i32..=30, 4)) -> Vec<f32> {
            // Norms stay at or below 0.6, inside the default bound.
            comps.into_iter().map(|i| i as f32 / 100.0).collect()
        }
    }

    prop_compose! {
        fn arb_query()(comps in prop::collection::vec(-100i32..=100, 4)) -> Vec<f32> {
            comps.into_iter().map(|i| i as f32 / 100.0).collect()
        }
    }

    fn index_over(items: Vec<Vec<f32>>) -> Index<f32> {
        let mut index = Index::with_dims(2, 1, 8, 4, 16).unwrap();
        index.fill(items, false).unwrap();
        index
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(40))]

        #[test]
        fn full_budget_probe_score_equals_the_oracle_score(
            items in prop::collection::vec(arb_item(), 1..25),
            query in arb_query(),
        ) {
            prop_assume!(query.iter().any(|c| *c != 0.0));
            let index = index_over(items);
            let (probed, _) = index.probe(&query, FULL).unwrap();
            let (oracle, _) = index.find_max_inner(&query).unwrap();
            let probed = probed.unwrap();
            let oracle = oracle.unwrap();
            prop_assert_eq!(probed.score, oracle.score);
        }

        #[test]
        fn no_probe_hit_ever_beats_the_oracle(
            items in prop::collection::vec(arb_item(), 1..25),
            query in arb_query(),
            adj in 1usize..=16,
        ) {
            prop_assume!(query.iter().any(|c| *c != 0.0));
            let index = index_over(items);
            let (oracle, _) = index.find_max_inner(&query).unwrap();
            let top = oracle.unwrap().score;
            if let (Some(hit), _) = index.probe(&query, adj).unwrap() {
                prop_assert!(hit.score <= top);
            }
        }

        #[test]
        fn k_probe_is_bounded_sorted_and_duplicate_free(
            items in prop::collection::vec(arb_item(), 1..25),
            query in arb_query(),
            k in 1usize..=8,
        ) {
            prop_assume!(query.iter().any(|c| *c != 0.0));
            let index = index_over(items);
            let (matches, _) = index.k_probe(k, &query, FULL).unwrap();
            let matches = matches.unwrap();
            prop_assert!(matches.len() <= k);
            for pair in matches.windows(2) {
                prop_assert!(pair[0].score >= pair[1].score);
            }
            let ids: std::collections::HashSet<u64> =
                matches.iter().map(|m| m.id).collect();
            prop_assert_eq!(ids.len(), matches.len());
        }

        #[test]
        fn approximate_hits_meet_the_threshold(
            items in prop::collection::vec(arb_item(), 1..25),
            query in arb_query(),
            c_grid in -100i32..=100,
        ) {
            prop_assume!(query.iter().any(|c| *c != 0.0));
            let index = index_over(items);
            let c = c_grid as f32 / 100.0;
            if let (Some(hit), _) = index.probe_approx(&query, c, FULL).unwrap() {
                prop_assert!(hit.score >= c);
            }
            if let (Some(hits), _) = index.k_probe_approx(4, &query, c, FULL).unwrap() {
                for hit in hits {
                    prop_assert!(hit.score >= c);
                }
            }
        }
    }
}
