//! The orchestrating random-test loop.
//!
//! One [`Driver`] owns the registry, the emit buffer, and the watchdog.
//! Each step moves FRAMEWORK → REFERENCE → SUT → FRAMEWORK, deferring the
//! watchdog before every transition so the deadline measures per-phase
//! liveness. Sequences restart (with cleared registries) whenever they
//! outgrow the current size cap, which keeps counterexamples short without
//! explicit shrinking; the size cap doubles across attempts up to the
//! configured ceiling.
//!
//! The driver is strictly single-threaded: reference and SUT executions
//! alternate, never overlap. Only the watchdog runs in parallel, and the
//! two communicate solely through the emit buffer behind one mutex.

use crate::config::{HangPolicy, RunConfig};
use crate::emit::EmitConfig;
use crate::error::Result;
use crate::report::{HangSide, RunReport, Verdict};
use chrono::Utc;
use crosscheck_oracle::{Command, Registry, Side, TestClass, TimeoutExecutor};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Framework,
    Reference,
    Sut,
}

/// State shared with the watchdog: what is running and what has been
/// recorded, so a firing watchdog can finish the test on its own.
struct EmitState {
    phase: Phase,
    pending_code: Option<String>,
    lines: Vec<String>,
    hang: Option<HangSide>,
}

enum StepEnd {
    Matched,
    Diverged,
    TimedOut,
}

enum AttemptEnd {
    BudgetExhausted,
    Divergence,
    Hang,
}

/// The differential random-test driver.
pub struct Driver {
    config: RunConfig,
    emit: EmitConfig,
    registry: Registry,
    shared: Arc<Mutex<EmitState>>,
    rng: StdRng,
    seed: u64,
    commands_run: usize,
}

impl Driver {
    /// Create a driver for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        Ok(Self {
            config,
            emit: EmitConfig::default(),
            registry: Registry::new(),
            shared: Arc::new(Mutex::new(EmitState {
                phase: Phase::Framework,
                pending_code: None,
                lines: Vec::new(),
                hang: None,
            })),
            rng: StdRng::seed_from_u64(seed),
            seed,
            commands_run: 0,
        })
    }

    /// Replace the emit configuration (imports, helpers, test name).
    #[must_use]
    pub fn with_emit(mut self, emit: EmitConfig) -> Self {
        self.emit = emit;
        self
    }

    /// Register a logical type; see [`Registry::register_class`].
    pub fn register_class<R: 'static, S: 'static>(
        &mut self,
        type_name: impl Into<String>,
        prefix: impl Into<String>,
    ) -> TestClass<R, S> {
        self.registry.register_class(type_name, prefix)
    }

    /// The driver's registry (command generators read instance counts).
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The seed driving command generation.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Run until divergence, hang, or exhaustion of the command budget at
    /// every sequence length up to the ceiling.
    pub fn run(
        &mut self,
        mut generate: impl FnMut(&mut StdRng, &Registry) -> Command,
    ) -> RunReport {
        let started_at = Utc::now();
        let t0 = Instant::now();
        self.commands_run = 0;
        let step = Duration::from_millis(self.config.step_timeout_ms);
        info!(seed = self.seed, "starting differential run");

        // Startup can be slow; the first deadline gets extra slack.
        let timer = TimeoutExecutor::new(
            watchdog_action(
                Arc::clone(&self.shared),
                self.emit.clone(),
                self.config.hang_policy,
            ),
            step * 5,
        );

        let mut size = self.config.initial_sequence_len;
        let verdict = loop {
            match self.attempt(size, &mut generate, &timer, step) {
                AttemptEnd::Hang => {
                    let side = self
                        .shared
                        .lock()
                        .hang
                        .unwrap_or(HangSide::Framework);
                    break Verdict::Hung(side);
                }
                AttemptEnd::Divergence => {
                    info!(commands = self.commands_run, "divergence found");
                    break Verdict::Diverged;
                }
                AttemptEnd::BudgetExhausted => {
                    if size >= self.config.max_sequence_len {
                        info!(commands = self.commands_run, "no divergence found");
                        break Verdict::Passed;
                    }
                    size = (size * 2).min(self.config.max_sequence_len);
                }
            }
        };
        timer.cancel();

        let state = self.shared.lock();
        let statements = state.lines.clone();
        drop(state);
        let test_source = if verdict.is_pass() {
            self.emit.render_passing()
        } else {
            self.emit.render(&statements)
        };
        RunReport {
            verdict,
            commands_run: self.commands_run,
            statements,
            test_source,
            seed: self.seed,
            started_at,
            duration_ms: t0.elapsed().as_millis() as u64,
        }
    }

    /// Run up to the command budget at one sequence length.
    fn attempt(
        &mut self,
        size: usize,
        generate: &mut impl FnMut(&mut StdRng, &Registry) -> Command,
        timer: &TimeoutExecutor,
        step: Duration,
    ) -> AttemptEnd {
        self.clear();
        debug!(sequence_len = size, "testing sequences");
        let mut count = 0;
        while count < self.config.command_budget {
            self.set_phase(Phase::Framework, None);
            if !timer.defer(step) {
                return AttemptEnd::Hang;
            }
            count += 1;
            self.commands_run += 1;
            if count % 100_000 == 0 {
                debug!(count, "commands checked");
            }
            if self.shared.lock().lines.len() > size {
                self.clear();
            }
            let command = generate(&mut self.rng, &self.registry);
            match self.step(&command, timer, step) {
                StepEnd::Matched => {}
                StepEnd::Diverged => return AttemptEnd::Divergence,
                StepEnd::TimedOut => return AttemptEnd::Hang,
            }
        }
        self.clear();
        AttemptEnd::BudgetExhausted
    }

    /// Execute one command on both sides and record its assertion.
    fn step(&mut self, command: &Command, timer: &TimeoutExecutor, step: Duration) -> StepEnd {
        let code = command.code(&self.registry);

        if !timer.defer(step) {
            return StepEnd::TimedOut;
        }
        self.set_phase(Phase::Reference, Some(code.clone()));
        let mut expected = command.execute(Side::Reference, &self.registry);

        if !timer.defer(step) {
            return StepEnd::TimedOut;
        }
        self.set_phase(Phase::Sut, Some(code.clone()));
        let actual = command.execute(Side::Sut, &self.registry);

        if !timer.defer(step) {
            return StepEnd::TimedOut;
        }
        self.set_phase(Phase::Framework, None);

        let matched = expected.includes(&actual, &mut self.registry);
        let line = expected.gen_assert(&self.registry, &code);
        self.shared.lock().lines.push(line);
        if matched {
            StepEnd::Matched
        } else {
            StepEnd::Diverged
        }
    }

    fn set_phase(&self, phase: Phase, pending_code: Option<String>) {
        let mut state = self.shared.lock();
        state.phase = phase;
        state.pending_code = pending_code;
    }

    /// Start a fresh sequence with all new objects.
    fn clear(&mut self) {
        self.registry.clear();
        let mut state = self.shared.lock();
        state.lines.clear();
        state.pending_code = None;
    }
}

/// The action the watchdog runs when a deadline passes without progress.
///
/// It appends the hang marker (and the reference-side diagnostic when the
/// reference, not the SUT, was in flight) to the recorded statements, then
/// applies the hang policy. The driver thread is still stuck inside the
/// offending call; under `ExitProcess` the emitted test is printed here
/// because nobody else will get the chance.
fn watchdog_action(
    shared: Arc<Mutex<EmitState>>,
    emit: EmitConfig,
    policy: HangPolicy,
) -> impl FnOnce() + Send + 'static {
    move || {
        let mut state = shared.lock();
        let side = match state.phase {
            Phase::Framework => {
                error!("watchdog fired while the driver was between phases");
                state.hang = Some(HangSide::Framework);
                return;
            }
            Phase::Reference => HangSide::Reference,
            Phase::Sut => HangSide::Sut,
        };
        if side == HangSide::Reference {
            error!("timeout in the reference implementation; fix the harness, not the candidate");
            state
                .lines
                .push("// timeout in the reference implementation (harness problem)".to_string());
        } else {
            error!("timeout in the implementation under test");
        }
        if let Some(code) = state.pending_code.take() {
            state.lines.push(format!("{code}; // timeout"));
        }
        state.hang = Some(side);
        match policy {
            HangPolicy::Record => {}
            HangPolicy::ExitProcess => {
                let text = emit.render(&state.lines);
                println!("{text}");
                std::process::exit(1);
            }
        }
    }
}
