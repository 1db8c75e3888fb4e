use log::*;
use serde::Serialize;
use std::borrow::Cow;
use std::cell::RefCell;

pub type StrCow = Cow<'static, str>;

pub type Clock = Box<dyn Fn() -> u64>;

/// A single timed region of a trace. Times are in whatever unit the trace clock reports.
#[derive(Clone, Debug, Serialize)]
pub struct Span {
    pub name: StrCow,
    pub depth: u32,
    pub start: u64,
    pub duration: u64,
}

/// Completed trace returned by `stop_trace`, ordered by span start.
#[derive(Clone, Debug, Default, Serialize)]
pub struct Trace {
    pub total: u64,
    pub spans: Vec<Span>,
}

struct TraceState {
    clock: Clock,
    origin: u64,
    open: Vec<usize>,
    spans: Vec<Span>,
}

thread_local! {
    static TRACE: RefCell<Option<TraceState>> = const { RefCell::new(None) };
}

/// Begin collecting spans on this thread. Any trace already running is discarded.
pub fn start_trace(clock: Clock) {
    let origin = clock();

    TRACE.with(|trace| {
        *trace.borrow_mut() = Some(TraceState {
            clock,
            origin,
            open: Vec::new(),
            spans: Vec::new(),
        });
    });
}

/// Finish the running trace. Spans that are still open are closed at the stop time.
pub fn stop_trace() -> Option<Trace> {
    TRACE.with(|trace| {
        let mut state = trace.borrow_mut().take()?;
        let now = (state.clock)();

        while let Some(index) = state.open.pop() {
            let span = &mut state.spans[index];
            span.duration = now.saturating_sub(state.origin + span.start);
        }

        Some(Trace {
            total: now.saturating_sub(state.origin),
            spans: state.spans,
        })
    })
}

pub fn is_tracing() -> bool {
    TRACE.with(|trace| trace.borrow().is_some())
}

#[must_use = "The guard is immediately dropped after instantiation. This is probably not
what you want! Consider using a `let` binding to increase its lifetime."]
pub struct SpanGuard {
    index: Option<usize>,
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        if let Some(index) = self.index {
            end(index);
        }
    }
}

pub fn start_guard<S: Into<StrCow>>(name: S) -> SpanGuard {
    SpanGuard { index: start(name) }
}

fn start<S: Into<StrCow>>(name: S) -> Option<usize> {
    TRACE.with(|trace| {
        let mut trace = trace.borrow_mut();
        let state = trace.as_mut()?;
        let name = name.into();
        let start = (state.clock)().saturating_sub(state.origin);

        trace!("Enter: {:?} - {}", name, start);

        let index = state.spans.len();
        state.spans.push(Span {
            name,
            depth: state.open.len() as u32,
            start,
            duration: 0,
        });
        state.open.push(index);

        Some(index)
    })
}

fn end(index: usize) {
    TRACE.with(|trace| {
        let mut trace = trace.borrow_mut();

        if let Some(state) = trace.as_mut() {
            let now = (state.clock)().saturating_sub(state.origin);

            //
            // NOTE: Guards drop in reverse order so the span being closed is always the innermost open one.
            //
            if let Some(position) = state.open.iter().rposition(|open| *open == index) {
                state.open.truncate(position);
            }

            if let Some(span) = state.spans.get_mut(index) {
                span.duration = now.saturating_sub(span.start);

                trace!("Exit: {:?} - {}", span.name, span.duration);
            }
        }
    });
}
