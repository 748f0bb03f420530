//! Wilson score confidence intervals for binomial drop rates
//!
//! Farming sample sizes are small (tens of kills, not thousands), so the
//! normal approximation misbehaves: it can report negative lower bounds and
//! zero-width intervals at 0/n or n/n. The Wilson score interval stays inside
//! [0, 1] and keeps sensible width at the extremes, which is why community
//! drop trackers use it.

/// Default z-score, the 95% confidence level.
pub const DEFAULT_Z: f64 = 1.96;

/// A binomial proportion estimate with its Wilson score interval.
///
/// `point` is the raw observed proportion `successes / trials`, not the
/// recentred Wilson midpoint. `moe` is the distance from `point` up to the
/// interval's upper bound (`moe == upper - point`), so the interval around
/// `point` is asymmetric; displays that print `point ± moe` overstate the
/// downward reach slightly, which is the conservative direction for a
/// drop-rate readout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimate {
    /// Raw proportion, `successes / trials` (0.0 when trials is 0).
    pub point: f64,
    /// Wilson lower bound, clamped to [0, 1].
    pub lower: f64,
    /// Wilson upper bound, clamped to [0, 1].
    pub upper: f64,
    /// Upper half-width, `upper - point`, as a fraction in [0, 1].
    pub moe: f64,
}

impl Estimate {
    /// The all-zero estimate returned for zero trials.
    pub const ZERO: Estimate = Estimate {
        point: 0.0,
        lower: 0.0,
        upper: 0.0,
        moe: 0.0,
    };

    /// Point estimate as a percentage with one decimal, e.g. `20.0`.
    pub fn percent(&self) -> f64 {
        round1(self.point * 100.0)
    }

    /// Margin of error as a percentage with one decimal.
    pub fn moe_percent(&self) -> f64 {
        round1(self.moe * 100.0)
    }
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Wilson score estimate at the default 95% confidence level.
pub fn wilson(successes: u64, trials: u64) -> Estimate {
    wilson_with_z(successes, trials, DEFAULT_Z)
}

/// Wilson score estimate for an arbitrary z-score.
///
/// Zero trials yields [`Estimate::ZERO`] rather than NaN. `successes` is
/// not required to be <= `trials`; callers aggregating untrusted counts
/// validate shape before reaching this point, and a nonsense ratio simply
/// produces a nonsense (but finite, clamped) interval.
pub fn wilson_with_z(successes: u64, trials: u64, z: f64) -> Estimate {
    if trials == 0 {
        return Estimate::ZERO;
    }

    let n = trials as f64;
    let phat = successes as f64 / n;
    let z2 = z * z;

    let center = (phat + z2 / (2.0 * n)) / (1.0 + z2 / n);
    let radius = (z / (1.0 + z2 / n)) * (phat * (1.0 - phat) / n + z2 / (4.0 * n * n)).sqrt();

    let lower = (center - radius).clamp(0.0, 1.0);
    let upper = (center + radius).clamp(0.0, 1.0);

    Estimate {
        point: phat,
        lower,
        upper,
        moe: upper - phat,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_zero_trials_is_all_zero() {
        let est = wilson(0, 0);
        assert_eq!(est, Estimate::ZERO);
        assert!(est.point.is_finite());
    }

    #[test]
    fn test_point_is_raw_proportion() {
        let est = wilson(3, 15);
        assert!((est.point - 0.2).abs() < EPS);
        assert!((est.moe - (est.upper - est.point)).abs() < EPS);
    }

    #[test]
    fn test_bounds_ordered_and_clamped() {
        for (x, n) in [(0u64, 10u64), (1, 10), (5, 10), (10, 10), (1, 1), (0, 1)] {
            let est = wilson(x, n);
            assert!(est.lower >= 0.0, "lower < 0 for {x}/{n}");
            assert!(est.upper <= 1.0, "upper > 1 for {x}/{n}");
            assert!(est.lower <= est.upper, "bounds inverted for {x}/{n}");
        }
    }

    #[test]
    fn test_zero_successes_keeps_uncertainty() {
        let est = wilson(0, 20);
        assert_eq!(est.point, 0.0);
        assert_eq!(est.lower, 0.0);
        assert!(est.upper > 0.0);
        assert!(est.moe > 0.0);
    }

    #[test]
    fn test_all_successes_keeps_uncertainty() {
        let est = wilson(20, 20);
        assert_eq!(est.point, 1.0);
        assert!(est.lower < 1.0);
        assert_eq!(est.upper, 1.0);
        // moe is the upper half-width, which is zero at the ceiling
        assert!(est.moe.abs() < EPS);
    }

    #[test]
    fn test_moe_shrinks_with_more_trials() {
        let small = wilson(3, 15);
        let medium = wilson(30, 150);
        let large = wilson(300, 1500);
        assert!(small.moe > medium.moe);
        assert!(medium.moe > large.moe);
    }

    #[test]
    fn test_known_value_half() {
        // x=5, n=10, z=1.96: center = (0.5 + 0.19208) / 1.38416,
        // radius = (1.96 / 1.38416) * sqrt(0.025 + 0.009604)
        let est = wilson(5, 10);
        assert!((est.point - 0.5).abs() < EPS);
        assert!((est.lower - 0.236_5).abs() < 5e-4, "lower = {}", est.lower);
        assert!((est.upper - 0.763_5).abs() < 5e-4, "upper = {}", est.upper);
    }

    #[test]
    fn test_custom_z_widens_interval() {
        let z95 = wilson_with_z(5, 20, 1.96);
        let z99 = wilson_with_z(5, 20, 2.576);
        assert!(z99.upper - z99.lower > z95.upper - z95.lower);
    }

    #[test]
    fn test_percent_rounding() {
        let est = wilson(3, 15);
        assert!((est.percent() - 20.0).abs() < EPS);
        // one decimal place, so thirds round
        let est = wilson(1, 3);
        assert!((est.percent() - 33.3).abs() < EPS);
    }
}
