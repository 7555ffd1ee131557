//! Background calculation.
//!
//! A [`Calculator`] owns a shared document and runs each calculation on a
//! worker thread. Starting a calculation cancels the previous one, so at
//! most one worker does useful work at a time; a superseded worker stops
//! at its next cancellation checkpoint and reports
//! [`CalculationOutcome::Aborted`].

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use parking_lot::Mutex;
use termcalc_core::{Document, Equation, EquationId, TermHandle};
use termcalc_numerical::CalculationStatus;
use termcalc_value::{NumericValue, ValueError};
use tracing::{debug, error, info};

use crate::context::CancelToken;
use crate::error::Cancelled;
use crate::evaluator::Evaluator;
use crate::validate::{validate, ValidationReport};

/// Which equations a calculation evaluates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Targets {
    /// Every constant and parameterless array.
    #[default]
    All,
    /// These equations, reported in document order.
    Only(Vec<EquationId>),
}

impl Targets {
    fn includes(&self, equation: &Equation) -> bool {
        match self {
            Self::All => equation.arity() == 0 && !equation.is_interval(),
            Self::Only(ids) => ids.contains(&equation.id),
        }
    }
}

/// Result of one equation.
#[derive(Debug, Clone)]
pub struct CalculationResult {
    /// The evaluated equation.
    pub equation: EquationId,
    /// Its value; `TermNotReady` if the equation has content issues.
    pub value: NumericValue,
    /// Outcomes of the loop algorithms run for it.
    pub statuses: Vec<(TermHandle, CalculationStatus)>,
}

/// How a calculation ended.
#[derive(Debug, Clone)]
pub enum CalculationOutcome {
    /// Every target was evaluated.
    Completed(Vec<CalculationResult>),
    /// The calculation was cancelled or superseded.
    Aborted,
    /// The worker failed unexpectedly.
    Failed(String),
}

impl CalculationOutcome {
    /// Returns the results of a completed calculation.
    #[must_use]
    pub fn results(&self) -> Option<&[CalculationResult]> {
        match self {
            Self::Completed(results) => Some(results),
            Self::Aborted | Self::Failed(_) => None,
        }
    }

    /// Returns the value computed for `equation`.
    #[must_use]
    pub fn value_of(&self, equation: EquationId) -> Option<NumericValue> {
        self.results()?
            .iter()
            .find(|r| r.equation == equation)
            .map(|r| r.value)
    }
}

/// A running background calculation.
#[derive(Debug)]
pub struct CalculationHandle {
    token: CancelToken,
    worker: JoinHandle<CalculationOutcome>,
}

impl CalculationHandle {
    /// Requests cancellation.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once the worker has finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Waits for the worker.
    #[must_use]
    pub fn join(self) -> CalculationOutcome {
        self.worker
            .join()
            .unwrap_or_else(|payload| CalculationOutcome::Failed(panic_message(payload.as_ref())))
    }
}

type ReportCache = Arc<Mutex<Option<Arc<ValidationReport>>>>;

/// Runs calculations of one document.
#[derive(Debug)]
pub struct Calculator {
    document: Arc<Document>,
    report: ReportCache,
    current: Mutex<Option<CancelToken>>,
}

impl Calculator {
    /// Creates a calculator for `document`.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document: Arc::new(document),
            report: Arc::default(),
            current: Mutex::new(None),
        }
    }

    /// The document being calculated.
    #[must_use]
    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    /// Replaces the document, cancelling any running calculation.
    pub fn set_document(&mut self, document: Document) {
        self.cancel();
        self.document = Arc::new(document);
        *self.report.lock() = None;
    }

    /// The validation report of the current document.
    #[must_use]
    pub fn report(&self) -> Arc<ValidationReport> {
        cached_report(&self.document, &self.report)
    }

    /// Cancels the running calculation, if any.
    pub fn cancel(&self) {
        if let Some(token) = self.current.lock().take() {
            token.cancel();
        }
    }

    /// Starts a calculation on a worker thread, superseding the previous one.
    #[must_use]
    pub fn start(&self, targets: Targets) -> CalculationHandle {
        let token = self.supersede();
        let document = Arc::clone(&self.document);
        let cache = Arc::clone(&self.report);
        let worker_token = token.clone();
        let worker = thread::spawn(move || run(&document, &cache, worker_token, &targets));
        CalculationHandle { token, worker }
    }

    /// Runs a calculation on the calling thread, superseding any running one.
    #[must_use]
    pub fn calculate_now(&self, targets: Targets) -> CalculationOutcome {
        let token = self.supersede();
        run(&self.document, &self.report, token, &targets)
    }

    fn supersede(&self) -> CancelToken {
        let token = CancelToken::new();
        if let Some(previous) = self.current.lock().replace(token.clone()) {
            if !previous.is_cancelled() {
                debug!("superseding running calculation");
            }
            previous.cancel();
        }
        token
    }
}

fn cached_report(document: &Document, cache: &Mutex<Option<Arc<ValidationReport>>>) -> Arc<ValidationReport> {
    let mut cached = cache.lock();
    match cached.as_ref() {
        Some(report) if report.version() == document.version() => Arc::clone(report),
        _ => {
            let report = Arc::new(validate(document));
            *cached = Some(Arc::clone(&report));
            report
        }
    }
}

fn run(
    document: &Document,
    cache: &Mutex<Option<Arc<ValidationReport>>>,
    token: CancelToken,
    targets: &Targets,
) -> CalculationOutcome {
    let pass = panic::catch_unwind(AssertUnwindSafe(|| {
        let report = cached_report(document, cache);
        run_pass(document, &report, token, targets)
    }));
    pass.unwrap_or_else(|payload| {
        let message = panic_message(payload.as_ref());
        error!(%message, "calculation failed");
        CalculationOutcome::Failed(message)
    })
}

fn run_pass(
    document: &Document,
    report: &ValidationReport,
    token: CancelToken,
    targets: &Targets,
) -> CalculationOutcome {
    let started = Instant::now();
    info!(version = document.version(), issues = report.issues().len(), "calculation started");

    let mut evaluator = Evaluator::new(document, report, token);
    let mut results = Vec::new();
    for equation in document.equations().iter().filter(|e| targets.includes(e)) {
        let value = if report.issues_for(equation.id).next().is_some() {
            NumericValue::invalid(ValueError::TermNotReady)
        } else {
            match evaluator.evaluate_equation(equation.id) {
                Ok(value) => value,
                Err(Cancelled) => {
                    info!(completed = results.len(), "calculation aborted");
                    return CalculationOutcome::Aborted;
                }
            }
        };
        debug!(equation = document.equation_name(equation.id), %value, "equation calculated");
        results.push(CalculationResult {
            equation: equation.id,
            value,
            statuses: evaluator.context_mut().take_statuses(),
        });
    }

    info!(
        results = results.len(),
        elapsed = ?started.elapsed(),
        "calculation finished"
    );
    CalculationOutcome::Completed(results)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "calculation worker panicked".to_owned()
    }
}
