//! Trace session: one translation unit, one site counter, one sink

use crate::classify::{Classification, StatementClassifier};
use crate::config::TraceOptions;
use crate::emitter::Emitter;
use crate::event::{Event, EventKind};
use crate::ir::{Function, Statement, TranslationUnit};
use crate::sink::Sink;

/// Counters collected over a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Statements passed to the session
    pub statements: usize,
    /// Statements dropped by the provenance filter
    pub skipped: usize,
    /// Store events emitted
    pub stores: usize,
    /// Allocation events emitted
    pub allocs: usize,
    /// Free events emitted
    pub frees: usize,
    /// Site id of the last emitted event
    pub last_site: Option<u64>,
}

impl SessionSummary {
    /// Total events emitted
    pub fn events(&self) -> usize {
        self.stores + self.allocs + self.frees
    }

    fn record(&mut self, event: &Event) {
        match event.kind() {
            EventKind::Store => self.stores += 1,
            EventKind::Alloc => self.allocs += 1,
            EventKind::Free => self.frees += 1,
        }
        self.last_site = Some(event.site);
    }
}

/// Processes statements of one translation unit in host order.
///
/// Owns the site counter and the sink, so two units traced in parallel need
/// two sessions (and, in practice, two output files).
///
/// ```
/// use memlog::ir::{Location, Statement, Tree};
/// use memlog::{Sink, TraceOptions, TraceSession};
///
/// let mut session = TraceSession::with_sink(&TraceOptions::default(), Sink::memory());
/// session.enter_function(Some("main"));
/// let site = session.process_statement(&Statement::assign(
///     Location::new("main.c", 3, 9),
///     Tree::var("x"),
///     Tree::int(6),
/// ));
/// assert_eq!(site, Some(1));
///
/// let text = String::from_utf8(session.captured().unwrap().to_vec()).unwrap();
/// assert!(text.starts_with(r#"{"v":1,"site":1,"kind":"store""#));
/// ```
#[derive(Debug)]
pub struct TraceSession {
    classifier: StatementClassifier,
    emitter: Emitter,
    current_function: Option<String>,
    summary: SessionSummary,
}

impl TraceSession {
    /// Opens a session writing to the configured output (or stderr)
    pub fn new(options: &TraceOptions) -> Self {
        Self::with_sink(options, Sink::open(options.output.as_deref()))
    }

    /// Opens a session writing to an already-resolved sink
    pub fn with_sink(options: &TraceOptions, sink: Sink) -> Self {
        Self {
            classifier: StatementClassifier::new(options.filter()),
            emitter: Emitter::new(sink),
            current_function: None,
            summary: SessionSummary::default(),
        }
    }

    /// Sets the routine whose statements follow; `None` when the host has no name
    pub fn enter_function(&mut self, name: Option<&str>) {
        self.current_function = name.map(str::to_string);
    }

    /// Clears the current routine
    pub fn leave_function(&mut self) {
        self.current_function = None;
    }

    /// Name of the current routine
    pub fn current_function(&self) -> Option<&str> {
        self.current_function.as_deref()
    }

    /// Classifies one statement and emits its event, if any.
    /// Returns the site id of the emitted event.
    pub fn process_statement(&mut self, stmt: &Statement) -> Option<u64> {
        self.summary.statements += 1;
        let payload = match self.classifier.classify(stmt) {
            Classification::NotUserCode => {
                self.summary.skipped += 1;
                return None;
            }
            Classification::Ignored => return None,
            Classification::Event(payload) => payload,
        };

        let event = self
            .emitter
            .emit(&stmt.location, self.current_function.as_deref(), payload)?;
        self.summary.record(&event);
        Some(event.site)
    }

    /// Processes every statement of `function`, block by block.
    /// Returns the number of events emitted.
    pub fn process_function(&mut self, function: &Function) -> usize {
        let before = self.summary.events();
        self.enter_function(function.name.as_deref());
        for block in &function.blocks {
            for stmt in &block.statements {
                self.process_statement(stmt);
            }
        }
        self.leave_function();

        let emitted = self.summary.events() - before;
        tracing::debug!(
            function = function.name.as_deref().unwrap_or("<unknown>"),
            statements = function.statement_count(),
            emitted,
            "function traced"
        );
        emitted
    }

    /// Processes every function of `unit` in order.
    /// Returns the number of events emitted.
    pub fn process_unit(&mut self, unit: &TranslationUnit) -> usize {
        unit.functions
            .iter()
            .map(|function| self.process_function(function))
            .sum()
    }

    /// Counters so far
    pub fn summary(&self) -> &SessionSummary {
        &self.summary
    }

    /// Bytes written so far, for sessions with an in-memory sink
    pub fn captured(&self) -> Option<&[u8]> {
        self.emitter.sink().captured()
    }

    /// Ends the session and closes the sink (a file only if one was opened)
    pub fn finish(self) -> SessionSummary {
        let TraceSession {
            emitter, summary, ..
        } = self;
        emitter.into_sink().close();
        tracing::debug!(
            statements = summary.statements,
            skipped = summary.skipped,
            events = summary.events(),
            "trace session finished"
        );
        summary
    }
}
