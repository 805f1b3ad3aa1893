//! Sample Generation
//!
//! Produces successive chunks of samples for a single streaming session.
//! Each session owns one [`SampleGenerator`]; nothing here performs I/O.
//!
//! # Policies
//!
//! - `Random`: uniform samples in `[0, 1)`, chunk length drawn from
//!   `[min_len, max_len]`
//! - `FixedSine`: a sine wave at a constant frequency
//! - `SweepingSine`: a sine wave whose frequency ping-pongs between two
//!   bounds, one step per chunk
//!
//! The sine policies keep a phase accumulator that is range-reduced into
//! `[0, 2π)` after every sample, so phase stays continuous across chunk
//! boundaries and never grows without bound.

use std::f64::consts::TAU;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// =============================================================================
// Types
// =============================================================================

/// One batch of samples, pushed to the client as a single message.
pub type Chunk = Vec<f64>;

/// Tolerance used when deciding whether a sweep bound is a whole number of
/// steps away from the start frequency.
const STEP_EPSILON: f64 = 1e-9;

/// Sample generation policy, selected once per session.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationPolicy {
    /// Uniform random samples in `[0, 1)` with a random chunk length.
    Random {
        /// Shortest chunk (inclusive).
        min_len: usize,
        /// Longest chunk (inclusive).
        max_len: usize,
    },
    /// Constant-frequency sine wave.
    FixedSine {
        /// Waveform frequency in Hz.
        frequency_hz: f64,
        /// Samples per second.
        sample_rate_hz: u32,
        /// Samples per chunk.
        chunk_size: usize,
    },
    /// Sine wave whose frequency walks between `min_hz` and `max_hz`.
    SweepingSine {
        /// Frequency of the first chunk.
        start_hz: f64,
        /// Frequency change applied after every chunk.
        step_hz: f64,
        /// Lower sweep bound.
        min_hz: f64,
        /// Upper sweep bound.
        max_hz: f64,
        /// Samples per second.
        sample_rate_hz: u32,
        /// Samples per chunk.
        chunk_size: usize,
    },
}

impl GenerationPolicy {
    /// Short name of the policy, used in logs and the health endpoint.
    #[must_use]
    pub const fn mode_name(&self) -> &'static str {
        match self {
            Self::Random { .. } => "random",
            Self::FixedSine { .. } => "sine",
            Self::SweepingSine { .. } => "sweep",
        }
    }

    /// Time covered by one chunk at the policy's sample rate.
    ///
    /// Returns `None` for the random policy, which has no sample rate.
    #[must_use]
    pub fn realtime_interval(&self) -> Option<Duration> {
        match self {
            Self::Random { .. } => None,
            Self::FixedSine {
                sample_rate_hz,
                chunk_size,
                ..
            }
            | Self::SweepingSine {
                sample_rate_hz,
                chunk_size,
                ..
            } => {
                if *sample_rate_hz == 0 {
                    return None;
                }
                #[allow(clippy::cast_precision_loss)]
                let secs = *chunk_size as f64 / f64::from(*sample_rate_hz);
                Some(Duration::from_secs_f64(secs))
            }
        }
    }

    /// Check the policy parameters.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError` describing the first invalid parameter.
    pub fn validate(&self) -> Result<(), GeneratorError> {
        match *self {
            Self::Random { min_len, max_len } => {
                if min_len == 0 || min_len > max_len {
                    return Err(GeneratorError::InvalidLengthRange { min_len, max_len });
                }
                Ok(())
            }
            Self::FixedSine {
                frequency_hz,
                sample_rate_hz,
                chunk_size,
            } => {
                validate_sampling(sample_rate_hz, chunk_size)?;
                validate_frequency(frequency_hz)?;
                validate_phase_step(frequency_hz, sample_rate_hz)
            }
            Self::SweepingSine {
                start_hz,
                step_hz,
                min_hz,
                max_hz,
                sample_rate_hz,
                chunk_size,
            } => {
                validate_sampling(sample_rate_hz, chunk_size)?;
                validate_frequency(start_hz)?;
                validate_frequency(min_hz)?;
                validate_frequency(max_hz)?;
                if !step_hz.is_finite() || step_hz <= 0.0 {
                    return Err(GeneratorError::NonPositiveStep(step_hz));
                }
                if min_hz >= max_hz {
                    return Err(GeneratorError::InvalidSweepBounds { min_hz, max_hz });
                }
                if start_hz < min_hz || start_hz > max_hz {
                    return Err(GeneratorError::StartOutOfBounds {
                        start_hz,
                        min_hz,
                        max_hz,
                    });
                }
                validate_phase_step(max_hz, sample_rate_hz)
            }
        }
    }
}

const fn validate_sampling(sample_rate_hz: u32, chunk_size: usize) -> Result<(), GeneratorError> {
    if sample_rate_hz == 0 {
        return Err(GeneratorError::NonPositiveSampleRate);
    }
    if chunk_size == 0 {
        return Err(GeneratorError::EmptyChunk);
    }
    Ok(())
}

fn validate_frequency(frequency_hz: f64) -> Result<(), GeneratorError> {
    if frequency_hz.is_finite() && frequency_hz >= 0.0 {
        Ok(())
    } else {
        Err(GeneratorError::InvalidFrequency(frequency_hz))
    }
}

fn validate_phase_step(frequency_hz: f64, sample_rate_hz: u32) -> Result<(), GeneratorError> {
    if phase_step(frequency_hz, sample_rate_hz).is_finite() {
        Ok(())
    } else {
        Err(GeneratorError::PhaseStepOverflow {
            frequency_hz,
            sample_rate_hz,
        })
    }
}

/// Phase advance per sample, reduced into `[0, 2π)`.
fn phase_step(frequency_hz: f64, sample_rate_hz: u32) -> f64 {
    (TAU * frequency_hz / f64::from(sample_rate_hz)).rem_euclid(TAU)
}

// =============================================================================
// Oscillator State
// =============================================================================

/// Phase accumulator for the sine policies.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorState {
    phase: f64,
    frequency_hz: f64,
    sample_rate_hz: u32,
    chunk_size: usize,
}

impl GeneratorState {
    /// Create a state starting at phase zero.
    #[must_use]
    pub const fn new(frequency_hz: f64, sample_rate_hz: u32, chunk_size: usize) -> Self {
        Self {
            phase: 0.0,
            frequency_hz,
            sample_rate_hz,
            chunk_size,
        }
    }

    /// Current phase in radians, always within `[0, 2π)`.
    #[must_use]
    pub const fn phase(&self) -> f64 {
        self.phase
    }

    /// Current frequency in Hz.
    #[must_use]
    pub const fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    /// Samples per chunk.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Produce the next chunk and advance the phase past it.
    pub fn next_chunk(&mut self) -> Chunk {
        let delta = phase_step(self.frequency_hz, self.sample_rate_hz);
        let mut chunk = Vec::with_capacity(self.chunk_size);
        for _ in 0..self.chunk_size {
            chunk.push(self.phase.sin());
            self.phase = wrap_phase(self.phase + delta);
        }
        chunk
    }

    const fn set_frequency(&mut self, frequency_hz: f64) {
        self.frequency_hz = frequency_hz;
    }
}

fn wrap_phase(phase: f64) -> f64 {
    if phase >= TAU {
        phase.rem_euclid(TAU)
    } else {
        phase
    }
}

// =============================================================================
// Frequency Sweep
// =============================================================================

/// Direction the sweep is currently moving in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepDirection {
    /// Frequency increasing toward the upper bound.
    Up,
    /// Frequency decreasing toward the lower bound.
    Down,
}

/// Ping-pong frequency walk.
///
/// The frequency is derived from an integer step index relative to the start
/// frequency instead of being accumulated, so bounds are hit exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySweep {
    start_hz: f64,
    step_hz: f64,
    min_hz: f64,
    max_hz: f64,
    lowest_step: i64,
    highest_step: i64,
    position: i64,
    direction: SweepDirection,
}

impl FrequencySweep {
    /// Create a sweep from already-validated parameters.
    #[must_use]
    pub fn new(start_hz: f64, step_hz: f64, min_hz: f64, max_hz: f64) -> Self {
        let lowest_step = steps_toward(min_hz - start_hz, step_hz);
        let highest_step = steps_toward(max_hz - start_hz, step_hz);
        let direction = if highest_step == 0 {
            SweepDirection::Down
        } else {
            SweepDirection::Up
        };

        Self {
            start_hz,
            step_hz,
            min_hz,
            max_hz,
            lowest_step,
            highest_step,
            position: 0,
            direction,
        }
    }

    /// Current frequency in Hz.
    #[must_use]
    pub fn frequency_hz(&self) -> f64 {
        if self.position == self.highest_step {
            return self.max_hz;
        }
        if self.position == self.lowest_step {
            return self.min_hz;
        }
        #[allow(clippy::cast_precision_loss)]
        let offset = self.step_hz * self.position as f64;
        (self.start_hz + offset).clamp(self.min_hz, self.max_hz)
    }

    /// Current direction.
    #[must_use]
    pub const fn direction(&self) -> SweepDirection {
        self.direction
    }

    /// Move one step, reversing at either bound, and return the new frequency.
    pub fn advance(&mut self) -> f64 {
        match self.direction {
            SweepDirection::Up => {
                self.position += 1;
                if self.position >= self.highest_step {
                    self.position = self.highest_step;
                    self.direction = SweepDirection::Down;
                }
            }
            SweepDirection::Down => {
                self.position -= 1;
                if self.position <= self.lowest_step {
                    self.position = self.lowest_step;
                    self.direction = SweepDirection::Up;
                }
            }
        }
        self.frequency_hz()
    }
}

/// Number of whole steps needed to cover `distance`, rounding away from zero
/// unless the distance is already (almost) a whole number of steps.
#[allow(clippy::cast_possible_truncation)]
fn steps_toward(distance: f64, step: f64) -> i64 {
    let raw = distance / step;
    let nearest = raw.round();
    let steps = if (raw - nearest).abs() < STEP_EPSILON {
        nearest
    } else if raw > 0.0 {
        raw.ceil()
    } else {
        raw.floor()
    };
    steps as i64
}

// =============================================================================
// Sample Generator
// =============================================================================

/// Per-session sample source.
#[derive(Debug)]
pub struct SampleGenerator {
    kind: GeneratorKind,
}

#[derive(Debug)]
enum GeneratorKind {
    Random {
        min_len: usize,
        max_len: usize,
        rng: StdRng,
    },
    Sine {
        state: GeneratorState,
        sweep: Option<FrequencySweep>,
    },
}

impl SampleGenerator {
    /// Create a generator for `policy`, seeding the random policy from the OS.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError` if the policy is invalid.
    pub fn new(policy: &GenerationPolicy) -> Result<Self, GeneratorError> {
        Self::build(policy, StdRng::from_os_rng())
    }

    /// Create a generator with a fixed random seed.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError` if the policy is invalid.
    pub fn with_seed(policy: &GenerationPolicy, seed: u64) -> Result<Self, GeneratorError> {
        Self::build(policy, StdRng::seed_from_u64(seed))
    }

    fn build(policy: &GenerationPolicy, rng: StdRng) -> Result<Self, GeneratorError> {
        policy.validate()?;

        let kind = match *policy {
            GenerationPolicy::Random { min_len, max_len } => GeneratorKind::Random {
                min_len,
                max_len,
                rng,
            },
            GenerationPolicy::FixedSine {
                frequency_hz,
                sample_rate_hz,
                chunk_size,
            } => GeneratorKind::Sine {
                state: GeneratorState::new(frequency_hz, sample_rate_hz, chunk_size),
                sweep: None,
            },
            GenerationPolicy::SweepingSine {
                start_hz,
                step_hz,
                min_hz,
                max_hz,
                sample_rate_hz,
                chunk_size,
            } => GeneratorKind::Sine {
                state: GeneratorState::new(start_hz, sample_rate_hz, chunk_size),
                sweep: Some(FrequencySweep::new(start_hz, step_hz, min_hz, max_hz)),
            },
        };

        Ok(Self { kind })
    }

    /// Produce the next chunk.
    ///
    /// For the sweeping policy the frequency step is applied after the chunk
    /// is produced, so the first chunk always uses the start frequency.
    pub fn next_chunk(&mut self) -> Chunk {
        match &mut self.kind {
            GeneratorKind::Random {
                min_len,
                max_len,
                rng,
            } => {
                let len = rng.random_range(*min_len..=*max_len);
                (0..len).map(|_| rng.random::<f64>()).collect()
            }
            GeneratorKind::Sine { state, sweep } => {
                let chunk = state.next_chunk();
                if let Some(sweep) = sweep {
                    state.set_frequency(sweep.advance());
                }
                chunk
            }
        }
    }

    /// Oscillator state, if this is a sine generator.
    #[must_use]
    pub const fn state(&self) -> Option<&GeneratorState> {
        match &self.kind {
            GeneratorKind::Sine { state, .. } => Some(state),
            GeneratorKind::Random { .. } => None,
        }
    }

    /// Sweep state, if this is a sweeping generator.
    #[must_use]
    pub const fn sweep(&self) -> Option<&FrequencySweep> {
        match &self.kind {
            GeneratorKind::Sine { sweep, .. } => sweep.as_ref(),
            GeneratorKind::Random { .. } => None,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Invalid generator configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeneratorError {
    /// Sample rate must be positive.
    #[error("sample rate must be greater than zero")]
    NonPositiveSampleRate,

    /// Chunk size must be positive.
    #[error("chunk size must be greater than zero")]
    EmptyChunk,

    /// Frequency must be finite and non-negative.
    #[error("invalid frequency: {0} Hz")]
    InvalidFrequency(f64),

    /// Sweep step must be finite and positive.
    #[error("sweep step must be positive, got {0} Hz")]
    NonPositiveStep(f64),

    /// Sweep lower bound must be below the upper bound.
    #[error("invalid sweep bounds: min {min_hz} Hz must be below max {max_hz} Hz")]
    InvalidSweepBounds {
        /// Lower bound.
        min_hz: f64,
        /// Upper bound.
        max_hz: f64,
    },

    /// Sweep start frequency lies outside the bounds.
    #[error("sweep start {start_hz} Hz outside [{min_hz}, {max_hz}] Hz")]
    StartOutOfBounds {
        /// Start frequency.
        start_hz: f64,
        /// Lower bound.
        min_hz: f64,
        /// Upper bound.
        max_hz: f64,
    },

    /// Phase step per sample overflows `f64`.
    #[error("frequency {frequency_hz} Hz is too high for sample rate {sample_rate_hz} Hz")]
    PhaseStepOverflow {
        /// Highest frequency the policy reaches.
        frequency_hz: f64,
        /// Samples per second.
        sample_rate_hz: u32,
    },

    /// Random chunk length range is empty or starts at zero.
    #[error("invalid chunk length range [{min_len}, {max_len}]")]
    InvalidLengthRange {
        /// Shortest chunk.
        min_len: usize,
        /// Longest chunk.
        max_len: usize,
    },
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    fn sine(frequency_hz: f64, sample_rate_hz: u32, chunk_size: usize) -> GenerationPolicy {
        GenerationPolicy::FixedSine {
            frequency_hz,
            sample_rate_hz,
            chunk_size,
        }
    }

    fn sweep(start_hz: f64, step_hz: f64, min_hz: f64, max_hz: f64) -> GenerationPolicy {
        GenerationPolicy::SweepingSine {
            start_hz,
            step_hz,
            min_hz,
            max_hz,
            sample_rate_hz: 40,
            chunk_size: 8,
        }
    }

    #[test]
    fn first_chunk_starts_at_zero_phase() {
        let mut generator = SampleGenerator::new(&sine(1.0, 40, 8)).unwrap();
        let chunk = generator.next_chunk();

        assert_eq!(chunk.len(), 8);
        assert!(chunk[0].abs() < 1e-12);
        assert!((chunk[1] - (TAU / 40.0).sin()).abs() < 1e-12);
        assert!((chunk[1] - 0.1564).abs() < 1e-4);
    }

    #[test]
    fn phase_is_continuous_across_chunks() {
        let mut generator = SampleGenerator::new(&sine(3.0, 100, 10)).unwrap();
        let first = generator.next_chunk();
        let second = generator.next_chunk();

        let mut reference = GeneratorState::new(3.0, 100, 20);
        let joined = reference.next_chunk();

        for (i, sample) in first.iter().chain(second.iter()).enumerate() {
            assert!((sample - joined[i]).abs() < 1e-12, "sample {i} diverged");
        }
    }

    #[test]
    fn phase_stays_bounded_over_many_chunks() {
        let mut generator = SampleGenerator::new(&sine(7.3, 44, 16)).unwrap();
        for _ in 0..10_000 {
            generator.next_chunk();
            let phase = generator.state().unwrap().phase();
            assert!((0.0..TAU).contains(&phase), "phase {phase} escaped range");
        }
    }

    #[test]
    fn frequency_above_sample_rate_still_wraps() {
        let mut state = GeneratorState::new(250.0, 40, 8);
        state.next_chunk();
        assert!((0.0..TAU).contains(&state.phase()));
    }

    #[test]
    fn huge_finite_frequency_keeps_samples_bounded() {
        let mut generator = SampleGenerator::new(&sine(1e300, 1, 3)).unwrap();
        for _ in 0..4 {
            let chunk = generator.next_chunk();
            assert!(chunk.iter().all(|s| (-1.0..=1.0).contains(s)), "{chunk:?}");
            let phase = generator.state().unwrap().phase();
            assert!((0.0..TAU).contains(&phase), "phase {phase} escaped range");
        }
    }

    #[test]
    fn sweep_reaches_upper_bound_after_ninety_chunks() {
        let mut generator = SampleGenerator::new(&sweep(1.0, 0.1, 1.0, 10.0)).unwrap();

        for _ in 0..90 {
            generator.next_chunk();
        }
        let state = generator.sweep().unwrap();
        assert_eq!(state.frequency_hz(), 10.0);
        assert_eq!(state.direction(), SweepDirection::Down);
        assert_eq!(generator.state().unwrap().frequency_hz(), 10.0);

        for _ in 0..90 {
            generator.next_chunk();
        }
        let state = generator.sweep().unwrap();
        assert_eq!(state.frequency_hz(), 1.0);
        assert_eq!(state.direction(), SweepDirection::Up);
    }

    #[test]
    fn sweep_first_chunk_uses_start_frequency() {
        let mut generator = SampleGenerator::new(&sweep(2.0, 0.5, 1.0, 10.0)).unwrap();
        let chunk = generator.next_chunk();

        let mut reference = GeneratorState::new(2.0, 40, 8);
        assert_eq!(chunk, reference.next_chunk());
        assert_eq!(generator.state().unwrap().frequency_hz(), 2.5);
    }

    #[test]
    fn sweep_starting_at_upper_bound_heads_down() {
        let mut sweep = FrequencySweep::new(10.0, 1.0, 1.0, 10.0);
        assert_eq!(sweep.direction(), SweepDirection::Down);
        assert_eq!(sweep.advance(), 9.0);
    }

    #[test]
    fn sweep_clamps_uneven_step_to_bound() {
        let mut sweep = FrequencySweep::new(1.0, 0.4, 1.0, 10.0);
        let mut last = 0.0;
        for _ in 0..23 {
            last = sweep.advance();
        }
        assert_eq!(last, 10.0);
        assert_eq!(sweep.direction(), SweepDirection::Down);
    }

    #[test]
    fn random_chunks_respect_length_and_range() {
        let policy = GenerationPolicy::Random {
            min_len: 5,
            max_len: 15,
        };
        let mut generator = SampleGenerator::with_seed(&policy, 42).unwrap();

        for _ in 0..500 {
            let chunk = generator.next_chunk();
            assert!((5..=15).contains(&chunk.len()));
            assert!(chunk.iter().all(|s| (0.0..1.0).contains(s)));
        }
        assert!(generator.state().is_none());
    }

    #[test]
    fn random_generator_is_reproducible_with_seed() {
        let policy = GenerationPolicy::Random {
            min_len: 1,
            max_len: 4,
        };
        let mut a = SampleGenerator::with_seed(&policy, 7).unwrap();
        let mut b = SampleGenerator::with_seed(&policy, 7).unwrap();
        assert_eq!(a.next_chunk(), b.next_chunk());
    }

    #[test]
    fn realtime_interval_matches_chunk_duration() {
        assert_eq!(
            sine(1.0, 40, 8).realtime_interval(),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            GenerationPolicy::Random {
                min_len: 5,
                max_len: 15
            }
            .realtime_interval(),
            None
        );
    }

    #[test_case(sine(1.0, 0, 8), GeneratorError::NonPositiveSampleRate ; "zero sample rate")]
    #[test_case(sine(1.0, 40, 0), GeneratorError::EmptyChunk ; "empty chunk")]
    #[test_case(sine(f64::NAN, 40, 8), GeneratorError::InvalidFrequency(f64::NAN) ; "nan frequency")]
    #[test_case(
        sine(1e308, 1, 3),
        GeneratorError::PhaseStepOverflow { frequency_hz: 1e308, sample_rate_hz: 1 } ;
        "phase step overflows"
    )]
    #[test_case(
        GenerationPolicy::SweepingSine {
            start_hz: 1.0,
            step_hz: 1.0,
            min_hz: 1.0,
            max_hz: 1e308,
            sample_rate_hz: 1,
            chunk_size: 3,
        },
        GeneratorError::PhaseStepOverflow { frequency_hz: 1e308, sample_rate_hz: 1 } ;
        "sweep upper bound overflows"
    )]
    #[test_case(sweep(1.0, 0.0, 1.0, 10.0), GeneratorError::NonPositiveStep(0.0) ; "zero step")]
    #[test_case(
        sweep(5.0, 0.1, 10.0, 1.0),
        GeneratorError::InvalidSweepBounds { min_hz: 10.0, max_hz: 1.0 } ;
        "inverted bounds"
    )]
    #[test_case(
        sweep(12.0, 0.1, 1.0, 10.0),
        GeneratorError::StartOutOfBounds { start_hz: 12.0, min_hz: 1.0, max_hz: 10.0 } ;
        "start above bounds"
    )]
    #[test_case(
        GenerationPolicy::Random { min_len: 0, max_len: 3 },
        GeneratorError::InvalidLengthRange { min_len: 0, max_len: 3 } ;
        "zero min length"
    )]
    #[test_case(
        GenerationPolicy::Random { min_len: 9, max_len: 3 },
        GeneratorError::InvalidLengthRange { min_len: 9, max_len: 3 } ;
        "inverted lengths"
    )]
    fn invalid_policies_are_rejected(policy: GenerationPolicy, expected: GeneratorError) {
        let err = SampleGenerator::new(&policy).unwrap_err();
        // NaN never compares equal, so match on the variant name.
        assert_eq!(
            std::mem::discriminant(&err),
            std::mem::discriminant(&expected)
        );
    }

    proptest! {
        #[test]
        fn sine_samples_stay_in_unit_range(
            frequency_hz in 0.0f64..500.0,
            sample_rate_hz in 1u32..48_000,
            chunk_size in 1usize..256,
        ) {
            let mut generator =
                SampleGenerator::new(&sine(frequency_hz, sample_rate_hz, chunk_size)).unwrap();
            for _ in 0..4 {
                let chunk = generator.next_chunk();
                prop_assert_eq!(chunk.len(), chunk_size);
                prop_assert!(chunk.iter().all(|s| (-1.0..=1.0).contains(s)));
                let phase = generator.state().unwrap().phase();
                prop_assert!((0.0..TAU).contains(&phase));
            }
        }

        #[test]
        fn sweep_never_leaves_bounds(
            min_hz in 0.0f64..50.0,
            span in 0.5f64..50.0,
            step_hz in 0.01f64..5.0,
            chunks in 1usize..400,
        ) {
            let max_hz = min_hz + span;
            let mut sweep = FrequencySweep::new(min_hz, step_hz, min_hz, max_hz);
            for _ in 0..chunks {
                let frequency = sweep.advance();
                prop_assert!(frequency >= min_hz && frequency <= max_hz);
            }
        }
    }
}
