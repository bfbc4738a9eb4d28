//! Property tests for the decay curve and environmental adjustment
//!
//! The engine's safety argument leans on a few universally quantified
//! statements; proptest hunts for counterexamples across the whole input
//! space instead of a handful of hand-picked points.

use proptest::prelude::*;

use calibguard_core::{adjusted_rate, config::DecayConfig, DecayModel, EnvSnapshot, EnvWeights};

fn optional_reading(range: std::ops::Range<f32>) -> impl Strategy<Value = Option<f32>> {
    prop_oneof![Just(None), range.prop_map(Some)]
}

fn arb_snapshot() -> impl Strategy<Value = EnvSnapshot> {
    (
        optional_reading(-20.0..120.0),
        optional_reading(0.0..100.0),
        optional_reading(0.0..80.0),
        optional_reading(0.0..1.0),
    )
        .prop_map(|(temperature_f, humidity_pct, wind_mph, rig_vibration_idx)| EnvSnapshot {
            temperature_f,
            humidity_pct,
            wind_mph,
            rig_vibration_idx,
        })
}

proptest! {
    #[test]
    fn confidence_never_below_floor(minutes in -1_000.0f32..100_000.0) {
        let model = DecayModel::with_defaults();
        let confidence = model.confidence_at(minutes);
        prop_assert!(confidence >= 0.5);
        prop_assert!(confidence <= 0.95);
    }

    #[test]
    fn unstressed_decay_is_strictly_decreasing(
        earlier in 0.0f32..500.0,
        gap in 0.1f32..100.0,
    ) {
        // Floor disabled so the raw curve is observable
        let model = DecayModel::new(DecayConfig::default().min_confidence(0.0)).unwrap();
        let before = model.confidence_at(earlier);
        let after = model.confidence_at(earlier + gap);
        prop_assert!(after < before);
    }

    #[test]
    fn half_life_halves(half_life in 1.0f32..500.0) {
        let config = DecayConfig::default()
            .half_life_minutes(half_life)
            .min_confidence(0.0);
        let model = DecayModel::new(config).unwrap();
        let at_half_life = model.confidence_at(half_life);
        prop_assert!((at_half_life - 0.475).abs() < 1e-3);
    }

    #[test]
    fn adjustment_never_decelerates(
        newest in arb_snapshot(),
        prior in arb_snapshot(),
        base_rate in 1e-4f32..1.0,
    ) {
        let delta = newest.delta_from(Some(&prior));
        let rate = adjusted_rate(base_rate, &delta, &EnvWeights::default());
        prop_assert!(rate >= base_rate);
    }

    #[test]
    fn adjustment_is_bounded_by_saturated_weights(
        newest in arb_snapshot(),
        prior in arb_snapshot(),
    ) {
        // 2.0 × 1.5 × 1.3 × 1.2 with every factor saturated
        let max_multiplier = 2.0 * 1.5 * 1.3 * 1.2;
        let base_rate = 0.0154f32;
        let delta = newest.delta_from(Some(&prior));
        let rate = adjusted_rate(base_rate, &delta, &EnvWeights::default());
        prop_assert!(rate <= base_rate * max_multiplier * 1.0001);
    }

    #[test]
    fn stress_never_raises_confidence(
        newest in arb_snapshot(),
        minutes in 0.0f32..200.0,
    ) {
        let model = DecayModel::with_defaults();
        let delta = newest.delta_from(None);
        let stressed_rate = adjusted_rate(model.decay_rate(), &delta, &EnvWeights::default());

        let calm = model.confidence_at(minutes);
        let stressed = model.confidence_from(0.95, stressed_rate, minutes);
        prop_assert!(stressed <= calm);
    }
}
