use lander_shared::*;

use crate::vehicle::normalize_angle;

/// Thresholds the classifier compares against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandingLimits {
    pub safe_velocity: f32,
    pub safe_angle: f32,
}

impl LandingLimits {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            safe_velocity: config.safe_landing_velocity,
            safe_angle: config.safe_landing_angle,
        }
    }
}

impl Default for LandingLimits {
    fn default() -> Self {
        Self {
            safe_velocity: SAFE_LANDING_VELOCITY,
            safe_angle: SAFE_LANDING_ANGLE,
        }
    }
}

/// Classify a touchdown from impact speed, orientation and gear state.
///
/// Rules are checked in order: gear, angle, hard overspeed, then the two
/// survivable speed bands. Anything else (including NaN input) is a crash.
pub fn classify_landing(speed: f32, angle: f32, gear_extended: bool, limits: &LandingLimits) -> LandingOutcome {
    if !gear_extended {
        return LandingOutcome::Crash(DeathCause::GearNotDeployed);
    }

    let angle = normalize_angle(angle);
    if angle.is_nan() || angle.abs() > limits.safe_angle {
        return LandingOutcome::Crash(DeathCause::BadAngle);
    }

    if speed > 1.5 * limits.safe_velocity {
        return LandingOutcome::Crash(DeathCause::TooFast);
    }
    if speed <= 0.5 * limits.safe_velocity {
        return LandingOutcome::Perfect;
    }
    if speed <= limits.safe_velocity {
        return LandingOutcome::Good;
    }
    LandingOutcome::Crash(DeathCause::TooFast)
}

/// Fuel granted for a resolved landing.
pub fn landing_fuel_bonus(quality: LandingQuality) -> f32 {
    match quality {
        LandingQuality::Perfect => PERFECT_LANDING_FUEL_BONUS,
        LandingQuality::Good => GOOD_LANDING_FUEL_BONUS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LIMITS: LandingLimits = LandingLimits {
        safe_velocity: SAFE_LANDING_VELOCITY,
        safe_angle: SAFE_LANDING_ANGLE,
    };

    #[test]
    fn test_slow_upright_landing_is_perfect() {
        let outcome = classify_landing(0.4 * SAFE_LANDING_VELOCITY, 0.0, true, &LIMITS);
        assert_eq!(outcome, LandingOutcome::Perfect);
    }

    #[test]
    fn test_double_safe_speed_is_too_fast() {
        let outcome = classify_landing(2.0 * SAFE_LANDING_VELOCITY, 0.0, true, &LIMITS);
        assert_eq!(outcome.reason().as_deref(), Some("Too fast!"));
    }

    #[test]
    fn test_gear_retracted_always_crashes() {
        let outcome = classify_landing(0.0, 0.0, false, &LIMITS);
        assert_eq!(outcome, LandingOutcome::Crash(DeathCause::GearNotDeployed));
        assert_eq!(outcome.reason().as_deref(), Some("Landing gear not deployed!"));
    }

    #[test]
    fn test_bad_angle_checked_before_speed() {
        let outcome = classify_landing(10.0, 1.0, true, &LIMITS);
        assert_eq!(outcome, LandingOutcome::Crash(DeathCause::BadAngle));
    }

    #[test]
    fn test_angle_is_wrapped() {
        let upright_after_full_turn = std::f32::consts::TAU + 0.1;
        let outcome = classify_landing(0.0, upright_after_full_turn, true, &LIMITS);
        assert_eq!(outcome, LandingOutcome::Perfect);
    }

    #[test]
    fn test_band_edges() {
        let v = SAFE_LANDING_VELOCITY;
        assert_eq!(classify_landing(0.5 * v, 0.0, true, &LIMITS), LandingOutcome::Perfect);
        assert_eq!(classify_landing(0.75 * v, 0.0, true, &LIMITS), LandingOutcome::Good);
        assert_eq!(classify_landing(v, 0.0, true, &LIMITS), LandingOutcome::Good);
        assert_eq!(
            classify_landing(1.25 * v, 0.0, true, &LIMITS),
            LandingOutcome::Crash(DeathCause::TooFast)
        );
    }

    #[test]
    fn test_nan_input_crashes() {
        assert!(matches!(
            classify_landing(f32::NAN, 0.0, true, &LIMITS),
            LandingOutcome::Crash(_)
        ));
        assert!(matches!(
            classify_landing(0.0, f32::NAN, true, &LIMITS),
            LandingOutcome::Crash(_)
        ));
    }

    #[test]
    fn test_fuel_bonus_ordering() {
        assert!(landing_fuel_bonus(LandingQuality::Perfect) > landing_fuel_bonus(LandingQuality::Good));
    }

    proptest! {
        #[test]
        fn prop_classifier_is_total_and_consistent(
            speed in prop::num::f32::ANY,
            angle in prop::num::f32::ANY,
            gear in any::<bool>(),
        ) {
            let outcome = classify_landing(speed, angle, gear, &LIMITS);
            match outcome {
                LandingOutcome::Perfect | LandingOutcome::Good => {
                    prop_assert!(gear);
                    prop_assert!(speed <= SAFE_LANDING_VELOCITY);
                    prop_assert!(normalize_angle(angle).abs() <= SAFE_LANDING_ANGLE);
                }
                LandingOutcome::Crash(cause) => {
                    prop_assert!(matches!(
                        cause,
                        DeathCause::GearNotDeployed | DeathCause::BadAngle | DeathCause::TooFast
                    ));
                }
            }
            // Pure: same input, same answer
            prop_assert_eq!(outcome, classify_landing(speed, angle, gear, &LIMITS));
        }
    }
}
