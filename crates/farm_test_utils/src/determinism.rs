//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! The farm simulation must be reproducible so scripted runs and bug
//! reports replay exactly. Sources of non-determinism include:
//!
//! - **Floating-point math**: positions use [`farm_core::math::Fixed`]
//!   throughout; floats only appear at data-file boundaries.
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   We always iterate in sorted entity ID order.
//!
//! - **System randomness**: wander decisions draw from per-entity streams
//!   seeded from the config.
//!
//! - **Wall clock**: every operation takes an injected `now`.

use std::thread;

use farm_core::math::Millis;
use farm_core::simulation::Simulation;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of steps simulated per run.
    pub steps: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Steps: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.steps,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `steps` - Number of steps per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance the simulation by one step; receives the
///   step index so callers can inject timestamps and commands
/// * `hash` - Function to compute state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    steps: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S, u64),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for i in 0..steps {
            step(&mut state, i);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        steps,
    }
}

/// Advance a freshly built simulation to `until` in `stride` increments,
/// twice, and compare the final hashes.
pub fn verify_simulation_determinism<F>(setup: F, until: Millis, stride: Millis) -> DeterminismResult
where
    F: Fn() -> Simulation,
{
    let stride = stride.max(1);
    verify_determinism(
        2,
        until / stride,
        setup,
        |sim, i| {
            sim.advance_to((i + 1) * stride);
        },
        Simulation::state_hash,
    )
}

/// Run `num_sims` simulations on separate threads and collect their final
/// hashes.
///
/// # Panics
///
/// Panics if a simulation thread panics.
pub fn run_parallel_simulations<F>(num_sims: usize, until: Millis, setup: F) -> DeterminismResult
where
    F: Fn() -> Simulation + Send + Sync + Copy + 'static,
{
    let handles: Vec<_> = (0..num_sims)
        .map(|_| {
            thread::spawn(move || {
                let mut sim = setup();
                sim.advance_to(until);
                sim.state_hash()
            })
        })
        .collect();

    let hashes: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);
    tracing::debug!(num_sims, until, "Parallel simulations finished");

    DeterminismResult {
        is_deterministic,
        hashes,
        steps: 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_simulation;

    #[test]
    fn test_trivial_state_is_deterministic() {
        let result = verify_determinism(3, 10, || 0u64, |n, i| *n += i, |n| *n);
        result.assert_deterministic();
        assert_eq!(result.hashes, vec![45, 45, 45]);
    }

    #[test]
    #[should_panic(expected = "non-deterministic")]
    fn test_divergence_is_reported() {
        use std::sync::atomic::{AtomicU64, Ordering};
        let counter = AtomicU64::new(0);
        let result = verify_determinism(
            2,
            1,
            || counter.fetch_add(1, Ordering::SeqCst),
            |_, _| {},
            |n| *n,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_sample_farm_is_deterministic() {
        verify_simulation_determinism(|| sample_simulation(7), 60_000, 250).assert_deterministic();
    }

    #[test]
    fn test_parallel_runs_match() {
        run_parallel_simulations(4, 30_000, || sample_simulation(3)).assert_deterministic();
    }
}
