//! Single-period Glicko-2 update on the internal scale.
//!
//! See Mark E. Glickman, *Example of the Glicko-2 system*
//! (http://www.glicko.net/glicko/glicko2.pdf).

use std::f64::consts::PI;

use tracing::{debug, trace};

use crate::{EngineConfig, Glicko, Score};

/// Bound on the iterations of each phase of the volatility solver. Real
/// rating magnitudes converge within a few dozen.
const MAX_SOLVER_ITERATIONS: u32 = 10_000;

/// Discount applied to the influence of an opponent with deviation `phi`.
#[inline]
pub fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
}

#[inline]
fn expectation(mu: f64, opponent_mu: f64, opponent_phi: f64) -> f64 {
    1.0 / (1.0 + (-g(opponent_phi) * (mu - opponent_mu)).exp())
}

/// Expected score of `player` against `opponent`.
pub fn expected_score(player: &Glicko, opponent: &Glicko) -> f64 {
    expectation(player.mu, opponent.mu, opponent.phi)
}

/// Rates `player` after a period with the given results. Falls back to
/// [`rate_inactive()`] if there are none.
pub fn rate(player: Glicko, results: &[(Glicko, Score)], config: &EngineConfig) -> Glicko {
    if results.is_empty() {
        rate_inactive(player, config)
    } else {
        rate_active(player, results, config)
    }
}

/// Rates `player` after a period with at least one result, given as pairs of
/// opponent state (at the start of the period) and score.
///
/// # Panics
///
/// Panics if `results` is empty, or if the volatility solver does not
/// converge.
pub fn rate_active(player: Glicko, results: &[(Glicko, Score)], config: &EngineConfig) -> Glicko {
    assert!(!results.is_empty());

    let mut inverse_variance = 0.0;
    let mut improvement = 0.0;
    for (opponent, score) in results {
        let g = g(opponent.phi);
        let expected = expectation(player.mu, opponent.mu, opponent.phi);
        inverse_variance += g * g * expected * (1.0 - expected);
        improvement += g * (score.value() - expected);
    }

    let v = 1.0 / inverse_variance;
    let delta = v * improvement;

    let solved = solve_volatility(
        player.phi,
        player.sigma,
        v,
        delta,
        config.tau(),
        config.epsilon(),
    );
    let sigma = solved.clamp(config.min_sigma(), config.max_sigma());
    if sigma != solved {
        debug!(solved, sigma, "clamped volatility");
    }

    let phi_star = (player.phi * player.phi + sigma * sigma).sqrt();
    let phi = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();

    Glicko {
        mu: player.mu + phi * phi * improvement,
        phi,
        sigma,
    }
}

/// Rates `player` after a period without results. The deviation grows by
/// the volatility. With monotonic decay, the rating drops by
/// `monotonic_decay_velocity` times the growth of the deviation.
pub fn rate_inactive(player: Glicko, config: &EngineConfig) -> Glicko {
    let phi = (player.phi * player.phi + player.sigma * player.sigma).sqrt();
    let mu = if config.decay_monotonically() {
        player.mu + config.monotonic_decay_velocity() * (player.phi - phi)
    } else {
        player.mu
    };
    Glicko { mu, phi, ..player }
}

/// Finds the new volatility with the Illinois variant of regula falsi.
///
/// # Panics
///
/// Panics if no bracket or no root is found within a bounded number of
/// iterations.
pub fn solve_volatility(phi: f64, sigma: f64, v: f64, delta: f64, tau: f64, epsilon: f64) -> f64 {
    let a = (sigma * sigma).ln();
    let phi_sq = phi * phi;
    let delta_sq = delta * delta;
    let tau_sq = tau * tau;

    let f = |x: f64| {
        let ex = x.exp();
        let denominator = phi_sq + v + ex;
        ex * (delta_sq - phi_sq - v - ex) / (2.0 * denominator * denominator) - (x - a) / tau_sq
    };

    let mut lower = a;
    let mut upper = if delta_sq > phi_sq + v {
        (delta_sq - phi_sq - v).ln()
    } else {
        let mut k = 1;
        while f(a - f64::from(k) * tau) < 0.0 {
            k += 1;
            assert!(
                k <= MAX_SOLVER_ITERATIONS,
                "no volatility bracket for phi = {phi}, sigma = {sigma}, v = {v}, delta = {delta}"
            );
        }
        a - f64::from(k) * tau
    };

    let mut f_lower = f(lower);
    let mut f_upper = f(upper);

    let mut iterations = 0;
    while (upper - lower).abs() > epsilon {
        iterations += 1;
        assert!(
            iterations <= MAX_SOLVER_ITERATIONS,
            "volatility solver did not converge for \
             phi = {phi}, sigma = {sigma}, v = {v}, delta = {delta}"
        );

        let c = lower + (lower - upper) * f_lower / (f_upper - f_lower);
        let f_c = f(c);
        if f_c == 0.0 {
            lower = c;
            break;
        }

        if f_c * f_upper < 0.0 {
            lower = upper;
            f_lower = f_upper;
        } else {
            f_lower /= 2.0;
        }

        upper = c;
        f_upper = f_c;
    }

    trace!(iterations, "solved volatility");

    (lower / 2.0).exp()
}
