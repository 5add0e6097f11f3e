//! Run bookkeeping: state machine, per-stage results and the final outcome.

use core::fmt;
use core::time::Duration;

use heapless::Vec;

use crate::axis::Axis;
use crate::error::Error;
use crate::profile::ActuatorProfile;

/// Validation stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    /// Operating-mode programming and read-back.
    Configuration,
    /// Self-test force output change check.
    SelfTest,
    /// Actuator motion and axis threshold check.
    ProfileValidation,
}

impl Stage {
    /// Short stage name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::SelfTest => "self-test",
            Self::ProfileValidation => "profile validation",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageResult {
    /// Stage that produced this result.
    pub stage: Stage,
    /// Whether the stage passed.
    pub passed: bool,
    /// Axis implicated by a failure, if any.
    pub failing_axis: Option<Axis>,
    /// Time spent in the stage.
    pub elapsed: Duration,
}

impl StageResult {
    /// Passing result.
    pub const fn pass(stage: Stage, elapsed: Duration) -> Self {
        Self {
            stage,
            passed: true,
            failing_axis: None,
            elapsed,
        }
    }

    /// Failing result.
    pub const fn fail(stage: Stage, failing_axis: Option<Axis>, elapsed: Duration) -> Self {
        Self {
            stage,
            passed: false,
            failing_axis,
            elapsed,
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for StageResult {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "StageResult {{ stage: {}, passed: {}, failing_axis: {}, elapsed_us: {} }}",
            self.stage,
            self.passed,
            self.failing_axis,
            self.elapsed.as_micros() as u64
        );
    }
}

/// Position of a run in the validation state machine.
///
/// Transitions only move forward; `Passed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunState {
    /// Created, nothing executed yet.
    NotStarted,
    /// Configuration stage in progress.
    Configuring,
    /// Self-test stage in progress.
    SelfTesting,
    /// Profile validation stage in progress.
    ValidatingProfile,
    /// Every stage passed.
    Passed,
    /// A stage failed.
    Failed,
}

impl RunState {
    /// Returns `true` for `Passed` and `Failed`.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }

    /// Returns `true` when moving from `self` to `next` is allowed.
    pub fn can_advance_to(self, next: RunState) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            Self::NotStarted => false,
            Self::Failed => self != Self::NotStarted,
            _ => next > self,
        }
    }
}

/// Terminal outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome<E, A> {
    /// All stages passed.
    Passed {
        /// Time from run start to the last stage finishing.
        elapsed: Duration,
    },
    /// A stage failed and the run stopped.
    Failed {
        /// Time from run start to the failure.
        elapsed: Duration,
        /// Stage that failed.
        stage: Stage,
        /// What went wrong.
        error: Error<E, A>,
    },
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format, A: defmt::Format> defmt::Format for Outcome<E, A> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Passed { elapsed } => {
                defmt::write!(f, "Passed {{ elapsed_us: {} }}", elapsed.as_micros() as u64)
            }
            Self::Failed {
                elapsed,
                stage,
                error,
            } => defmt::write!(
                f,
                "Failed {{ elapsed_us: {}, stage: {}, error: {} }}",
                elapsed.as_micros() as u64,
                stage,
                error
            ),
        }
    }
}

/// One validation run against one DUT and one profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRun<E, A> {
    profile: ActuatorProfile,
    started_us: u64,
    state: RunState,
    stages: Vec<StageResult, 3>,
    outcome: Option<Outcome<E, A>>,
}

impl<E, A> TestRun<E, A> {
    pub(crate) fn new(profile: ActuatorProfile, started_us: u64) -> Self {
        Self {
            profile,
            started_us,
            state: RunState::NotStarted,
            stages: Vec::new(),
            outcome: None,
        }
    }

    pub(crate) fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal run transition"
        );
        log_debug!("run state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    pub(crate) fn record(&mut self, result: StageResult) {
        debug_assert!(self.outcome.is_none());
        if self.stages.push(result).is_err() {
            log_warn!("stage result dropped; run already holds every stage");
        }
    }

    pub(crate) fn finish_passed(&mut self, elapsed: Duration) {
        self.advance(RunState::Passed);
        self.outcome = Some(Outcome::Passed { elapsed });
    }

    pub(crate) fn finish_failed(&mut self, elapsed: Duration, stage: Stage, error: Error<E, A>) {
        self.advance(RunState::Failed);
        self.outcome = Some(Outcome::Failed {
            elapsed,
            stage,
            error,
        });
    }

    /// Profile exercised by this run.
    pub fn profile(&self) -> ActuatorProfile {
        self.profile
    }

    /// Clock value captured when the run started, in microseconds.
    pub fn started_us(&self) -> u64 {
        self.started_us
    }

    /// Current state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Stage results recorded so far, in execution order.
    pub fn stages(&self) -> &[StageResult] {
        &self.stages
    }

    /// Terminal outcome, once the run has finished.
    pub fn outcome(&self) -> Option<&Outcome<E, A>> {
        self.outcome.as_ref()
    }

    /// Returns `true` when every stage passed.
    pub fn passed(&self) -> bool {
        matches!(self.outcome, Some(Outcome::Passed { .. }))
    }

    /// Total elapsed time, once the run has finished.
    pub fn elapsed(&self) -> Option<Duration> {
        match self.outcome {
            Some(Outcome::Passed { elapsed }) | Some(Outcome::Failed { elapsed, .. }) => {
                Some(elapsed)
            }
            None => None,
        }
    }

    /// Error that ended the run, if it failed.
    pub fn error(&self) -> Option<&Error<E, A>> {
        match &self.outcome {
            Some(Outcome::Failed { error, .. }) => Some(error),
            _ => None,
        }
    }

    /// Process exit code for a command-line wrapper: 0 on pass, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.passed() { 0 } else { 1 }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format, A: defmt::Format> defmt::Format for TestRun<E, A> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "TestRun {{ profile: {}, state: {}, stages: {}, outcome: {} }}",
            self.profile,
            self.state,
            self.stages.as_slice(),
            self.outcome
        );
    }
}

/// Seconds rounded to two decimals.
struct Seconds(Duration);

impl fmt::Display for Seconds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let centis = (self.0.as_micros() + 5_000) / 10_000;
        write!(f, "{}.{:02}", centis / 100, centis % 100)
    }
}

/// Renders the one-line fixture report.
impl<E, A> fmt::Display for TestRun<E, A>
where
    E: fmt::Debug,
    A: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Some(Outcome::Passed { elapsed }) => {
                write!(f, "TEST PASSED in {} sec", Seconds(*elapsed))
            }
            Some(Outcome::Failed {
                elapsed,
                stage,
                error,
            }) => write!(
                f,
                "TEST FAILED in {} sec due to {} stage: {}",
                Seconds(*elapsed),
                stage,
                error
            ),
            None => write!(f, "TEST {} ({:?})", self.profile, self.state),
        }
    }
}
