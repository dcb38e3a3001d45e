//! Hybrid engine
//!
//! Gantree: L7_Integration → HybridEngine
//!
//! Drives shots of a loaded program. Each shot pulls op buffers from the
//! classical interpreter, packs them into ticks and runs every tick through
//! the error model and the backend, folding measurement outcomes back into
//! the shot environment before the interpreter continues.

use crate::config::{EngineConfig, FailurePolicy};
use crate::result::{CircuitResult, RegisterOutput, RunResults, ShotFailure, ShotResult, TickOutcome};
use crate::seed::ShotSeeds;
use hyqe_backend::{Backend, QuantumState};
use hyqe_classical::{ClassicalInterpreter, MeasurementResults, ShotEnvironment};
use hyqe_core::{HyqeError, HyqeResult, Outcomes};
use hyqe_ir::{Export, ForeignObject, LoadedProgram};
use hyqe_noise::ErrorModel;
use hyqe_schedule::{QuantumCircuit, Tick, TickScheduler};
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Per-shot collaborators for the parallel path
struct ShotJob {
    index: usize,
    seeds: ShotSeeds,
    error_model: Box<dyn ErrorModel>,
    foreign: Option<Box<dyn ForeignObject>>,
}

/// Hybrid classical/quantum execution engine
/// Gantree: HybridEngine // 샷 구동기
#[derive(Debug, Clone, Default)]
pub struct HybridEngine {
    config: EngineConfig,
}

impl HybridEngine {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create with a validated configuration
    pub fn new(config: EngineConfig) -> HyqeResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ========================================================================
    // Program Runs
    // ========================================================================

    /// Run `config.shots` shots of a program
    /// Gantree: run(program,backend,error_model,foreign) -> RunResults // 배치 실행
    ///
    /// Per-shot failures follow the configured [`FailurePolicy`]; invariant
    /// violations always propagate.
    pub fn run(
        &self,
        program: &LoadedProgram,
        backend: &dyn Backend,
        error_model: &mut dyn ErrorModel,
        foreign: Option<Box<dyn ForeignObject>>,
    ) -> HyqeResult<RunResults> {
        self.check_capacity(program.num_qubits(), backend)?;
        let run_seed = self.run_seed();

        log::info!(
            "run start: {} shots, seed {}, backend {}, error model {}",
            self.config.shots,
            run_seed,
            backend.name(),
            error_model.name()
        );

        let results = match self.config.workers {
            Some(workers) if workers > 1 => {
                self.run_parallel(program, backend, &*error_model, foreign, run_seed, workers)?
            }
            _ => self.run_sequential(program, backend, error_model, foreign, run_seed)?,
        };

        log::info!(
            "run done: {} succeeded, {} failed",
            results.num_successful(),
            results.num_failed()
        );
        Ok(results)
    }

    /// Replay one shot from its reported seed
    ///
    /// Errors are returned unmodified regardless of the failure policy.
    pub fn run_shot_with_seed(
        &self,
        program: &LoadedProgram,
        backend: &dyn Backend,
        error_model: &mut dyn ErrorModel,
        foreign: Option<Box<dyn ForeignObject>>,
        shot_index: usize,
        seed: u64,
    ) -> HyqeResult<ShotResult> {
        self.check_capacity(program.num_qubits(), backend)?;
        let mut interp = self.interpreter(program, foreign)?;
        error_model.start(program.num_qubits())?;
        let mut scheduler = self.scheduler();
        self.run_shot(
            program,
            backend,
            error_model,
            &mut interp,
            &mut scheduler,
            shot_index,
            ShotSeeds::from_shot_seed(seed),
        )
    }

    fn run_sequential(
        &self,
        program: &LoadedProgram,
        backend: &dyn Backend,
        error_model: &mut dyn ErrorModel,
        foreign: Option<Box<dyn ForeignObject>>,
        run_seed: u64,
    ) -> HyqeResult<RunResults> {
        let mut interp = self.interpreter(program, foreign)?;
        error_model.start(program.num_qubits())?;
        let mut scheduler = self.scheduler();
        let mut results = RunResults::new(self.config.shots, run_seed);

        for index in 0..self.config.shots {
            let seeds = ShotSeeds::derive(run_seed, index);
            let outcome = self.run_shot(
                program,
                backend,
                error_model,
                &mut interp,
                &mut scheduler,
                index,
                seeds,
            );
            self.record(&mut results, index, seeds.shot, outcome)?;
        }
        Ok(results)
    }

    fn run_parallel(
        &self,
        program: &LoadedProgram,
        backend: &dyn Backend,
        error_model: &dyn ErrorModel,
        foreign: Option<Box<dyn ForeignObject>>,
        run_seed: u64,
        workers: usize,
    ) -> HyqeResult<RunResults> {
        let mut jobs = Vec::with_capacity(self.config.shots);
        for index in 0..self.config.shots {
            let mut model = error_model.reset();
            model.start(program.num_qubits())?;
            let instance = match &foreign {
                Some(f) => {
                    let mut instance = f.new_instance();
                    instance.init()?;
                    Some(instance)
                }
                None => None,
            };
            jobs.push(ShotJob {
                index,
                seeds: ShotSeeds::derive(run_seed, index),
                error_model: model,
                foreign: instance,
            });
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| HyqeError::InternalError(format!("thread pool: {}", e)))?;
        log::debug!("running {} shots on {} workers", jobs.len(), workers);

        let outcomes: Vec<(usize, u64, HyqeResult<ShotResult>)> = pool.install(|| {
            jobs.into_par_iter()
                .map(|job| {
                    let ShotJob {
                        index,
                        seeds,
                        mut error_model,
                        foreign,
                    } = job;
                    let outcome = self.interpreter_for_shot(program, foreign).and_then(|mut interp| {
                        let mut scheduler = self.scheduler();
                        self.run_shot(
                            program,
                            backend,
                            error_model.as_mut(),
                            &mut interp,
                            &mut scheduler,
                            index,
                            seeds,
                        )
                    });
                    (index, seeds.shot, outcome)
                })
                .collect()
        });

        let mut results = RunResults::new(self.config.shots, run_seed);
        for (index, seed, outcome) in outcomes {
            self.record(&mut results, index, seed, outcome)?;
        }
        Ok(results)
    }

    // ========================================================================
    // Shot Loop
    // ========================================================================

    #[allow(clippy::too_many_arguments)]
    fn run_shot(
        &self,
        program: &LoadedProgram,
        backend: &dyn Backend,
        error_model: &mut dyn ErrorModel,
        interp: &mut ClassicalInterpreter,
        scheduler: &mut TickScheduler,
        index: usize,
        seeds: ShotSeeds,
    ) -> HyqeResult<ShotResult> {
        interp.reset();
        if let Some(foreign) = interp.foreign_mut() {
            foreign.shot_reinit()?;
        }
        error_model.shot_reinit(seeds.noise);
        scheduler.reset();
        let mut state = backend.create_state(program.num_qubits(), seeds.backend)?;

        log::debug!("shot {} start (seed {})", index, seeds.shot);

        let mut execution = interp.execute(program.ops());
        while let Some(buffer) = execution.next() {
            let buffer = buffer?;
            for tick in scheduler.schedule(&buffer)? {
                let outcomes = run_tick(
                    &tick,
                    state.as_mut(),
                    error_model,
                    execution.interpreter().env(),
                )?;
                execution.receive_results(&fold_outcomes(&tick, &outcomes))?;
            }
        }
        drop(execution);

        Ok(ShotResult {
            shot_index: index,
            seed: seeds.shot,
            registers: self.report(program, interp.env())?,
        })
    }

    /// Reported registers: static exports overridden by `Result` ops, or
    /// every register when the program exports none
    fn report(
        &self,
        program: &LoadedProgram,
        env: &ShotEnvironment,
    ) -> HyqeResult<BTreeMap<String, RegisterOutput>> {
        let snapshot = env.snapshot();
        let format = self.config.output_format;

        let mut exports: Vec<Export> = program.exports().to_vec();
        for export in env.exports() {
            exports.retain(|e| e.name != export.name);
            exports.push(export.clone());
        }

        if exports.is_empty() {
            return Ok(snapshot
                .iter()
                .map(|(name, value)| (name.clone(), RegisterOutput::format(value, format)))
                .collect());
        }
        exports
            .iter()
            .map(|e| {
                snapshot
                    .get(&e.source)
                    .map(|value| (e.name.clone(), RegisterOutput::format(value, format)))
                    .ok_or_else(|| HyqeError::UnknownRegister(e.source.clone()))
            })
            .collect()
    }

    fn record(
        &self,
        results: &mut RunResults,
        index: usize,
        seed: u64,
        outcome: HyqeResult<ShotResult>,
    ) -> HyqeResult<()> {
        match outcome {
            Ok(shot) => {
                results.push_shot(shot);
                Ok(())
            }
            Err(err)
                if err.is_invariant_violation()
                    || self.config.failure_policy == FailurePolicy::Abort =>
            {
                Err(err)
            }
            Err(err) => {
                log::warn!("shot {} (seed {}) failed: {}", index, seed, err);
                results.push_failure(ShotFailure::new(index, seed, &err));
                Ok(())
            }
        }
    }

    // ========================================================================
    // Circuit Runs
    // ========================================================================

    /// Run a hand-built circuit through the per-tick error loop
    /// Gantree: run_circuit(circuit,backend,error_model) -> CircuitResult // 직접 틱 실행
    ///
    /// There is no classical state; the error model sees an empty
    /// environment. Any shot error aborts the run.
    pub fn run_circuit(
        &self,
        circuit: &QuantumCircuit,
        backend: &dyn Backend,
        error_model: &mut dyn ErrorModel,
    ) -> HyqeResult<CircuitResult> {
        if self.config.check_durations {
            circuit
                .clone()
                .with_durations(self.config.durations.clone())?;
        }
        let num_qubits = circuit.num_qubits();
        self.check_capacity(num_qubits, backend)?;

        let run_seed = self.run_seed();
        let env = ShotEnvironment::new(&[])?;
        error_model.start(num_qubits)?;
        log::info!(
            "circuit run: {} ticks, {} shots, seed {}",
            circuit.depth(),
            self.config.shots,
            run_seed
        );

        let mut result = CircuitResult {
            seed: run_seed,
            shots: Vec::with_capacity(self.config.shots),
        };
        for index in 0..self.config.shots {
            let seeds = ShotSeeds::derive(run_seed, index);
            error_model.shot_reinit(seeds.noise);
            let mut state = backend.create_state(num_qubits, seeds.backend)?;

            let mut shot = Vec::new();
            for tick in circuit.ticks() {
                let targets = tick.return_targets();
                let outcomes = run_tick(tick, state.as_mut(), error_model, &env)?;
                shot.extend(outcomes.into_iter().map(|(location, outcome)| TickOutcome {
                    tick: tick.index(),
                    target: targets.get(&location).cloned(),
                    location,
                    outcome,
                }));
            }
            result.shots.push(shot);
        }
        Ok(result)
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn run_seed(&self) -> u64 {
        match self.config.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                log::info!("drew run seed {}", seed);
                seed
            }
        }
    }

    fn scheduler(&self) -> TickScheduler {
        if self.config.check_durations {
            TickScheduler::new().with_durations(self.config.durations.clone())
        } else {
            TickScheduler::new()
        }
    }

    /// Interpreter with the foreign object initialised once
    fn interpreter(
        &self,
        program: &LoadedProgram,
        foreign: Option<Box<dyn ForeignObject>>,
    ) -> HyqeResult<ClassicalInterpreter> {
        let foreign = match foreign {
            Some(mut f) => {
                f.init()?;
                Some(f)
            }
            None => None,
        };
        self.interpreter_for_shot(program, foreign)
    }

    fn interpreter_for_shot(
        &self,
        program: &LoadedProgram,
        foreign: Option<Box<dyn ForeignObject>>,
    ) -> HyqeResult<ClassicalInterpreter> {
        let interp = ClassicalInterpreter::new(program)?
            .with_expression_type(self.config.expression_type);
        Ok(match foreign {
            Some(f) => interp.with_foreign(f),
            None => interp,
        })
    }

    fn check_capacity(&self, num_qubits: usize, backend: &dyn Backend) -> HyqeResult<()> {
        if num_qubits > backend.max_qubits() {
            return Err(HyqeError::BackendError(format!(
                "{} qubits needed, backend {} supports {}",
                num_qubits,
                backend.name(),
                backend.max_qubits()
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tick Execution
// ============================================================================

/// Run one tick: faults before, the ideal tick minus replaced locations,
/// faults after
/// Gantree: run_tick(tick,state,error_model,env) -> Outcomes // 틱 실행
///
/// Error-free ticks never reach the error model. Outcomes of fault ticks
/// are discarded; forced outcomes stand in for replaced measurements.
pub fn run_tick(
    tick: &Tick,
    state: &mut dyn QuantumState,
    error_model: &mut dyn ErrorModel,
    env: &ShotEnvironment,
) -> HyqeResult<Outcomes> {
    if tick.is_error_free() {
        log::debug!("tick {} error-free, {} gates", tick.index(), tick.num_gates());
        return dispatch(state, tick);
    }

    let errors = error_model.generate_tick_errors(tick, tick.index(), env)?;
    if !errors.is_empty() {
        log::debug!(
            "tick {}: {} before, {} after, {} replaced",
            tick.index(),
            errors.before.num_gates(),
            errors.after.num_gates(),
            errors.replaced.len()
        );
    }

    dispatch(state, &errors.before)?;
    let mut outcomes = dispatch(state, &tick.without_locations(&errors.replaced))?;
    outcomes.extend(errors.forced_outcomes);
    dispatch(state, &errors.after)?;
    Ok(outcomes)
}

fn dispatch(state: &mut dyn QuantumState, tick: &Tick) -> HyqeResult<Outcomes> {
    let mut outcomes = Outcomes::new();
    for group in tick.dispatch_groups() {
        outcomes.extend(state.run_gate(group.symbol, &group.locations, &group.angles)?);
    }
    Ok(outcomes)
}

/// Measured outcomes keyed by their classical targets
fn fold_outcomes(tick: &Tick, outcomes: &Outcomes) -> MeasurementResults {
    tick.return_targets()
        .into_iter()
        .filter_map(|(location, target)| outcomes.get(&location).map(|&v| (target, v)))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
