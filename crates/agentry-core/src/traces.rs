// In-process trace collection
//
// A TraceProcessor keeps completed traces in memory. Work is wrapped in an
// ActiveTrace; named spans are opened on it and close (recording their
// duration) when the guard is dropped. Finishing the trace hands it to the
// processor.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

/// Completed traces kept before the oldest are evicted
pub const DEFAULT_MAX_TRACES: usize = 100;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[derive(Debug, Clone, Serialize)]
pub struct Span {
    pub span_id: String,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: f64,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Trace {
    pub trace_id: String,
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_ms: f64,
    pub spans: Vec<Span>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TraceSummary {
    pub count: usize,
    pub total_duration_ms: f64,
    pub avg_duration_ms: f64,
    pub trace_ids: Vec<String>,
}

// ============================================================================
// TraceProcessor
// ============================================================================

#[derive(Debug)]
struct ProcessorInner {
    traces: Mutex<VecDeque<Trace>>,
    max_traces: usize,
}

/// Shared, cloneable store of completed traces
#[derive(Debug, Clone)]
pub struct TraceProcessor {
    inner: Arc<ProcessorInner>,
}

impl TraceProcessor {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_TRACES)
    }

    pub fn with_capacity(max_traces: usize) -> Self {
        Self {
            inner: Arc::new(ProcessorInner {
                traces: Mutex::new(VecDeque::new()),
                max_traces: max_traces.max(1),
            }),
        }
    }

    /// Begin a new trace that is submitted here when finished
    pub fn start_trace(&self, name: impl Into<String>) -> ActiveTrace {
        ActiveTrace::new(name.into(), self.clone())
    }

    fn submit(&self, trace: Trace) {
        info!(
            trace_id = %trace.trace_id,
            name = %trace.name,
            duration_ms = trace.duration_ms,
            spans = trace.spans.len(),
            "Trace completed"
        );
        let mut traces = lock(&self.inner.traces);
        traces.push_back(trace);
        while traces.len() > self.inner.max_traces {
            traces.pop_front();
        }
    }

    pub fn get_all_traces(&self) -> Vec<Trace> {
        lock(&self.inner.traces).iter().cloned().collect()
    }

    pub fn get_trace(&self, trace_id: &str) -> Option<Trace> {
        lock(&self.inner.traces)
            .iter()
            .find(|t| t.trace_id == trace_id)
            .cloned()
    }

    pub fn get_trace_summary(&self) -> TraceSummary {
        let traces = lock(&self.inner.traces);
        let count = traces.len();
        let total_duration_ms: f64 = traces.iter().map(|t| t.duration_ms).sum();
        TraceSummary {
            count,
            total_duration_ms,
            avg_duration_ms: if count == 0 {
                0.0
            } else {
                total_duration_ms / count as f64
            },
            trace_ids: traces.iter().map(|t| t.trace_id.clone()).collect(),
        }
    }

    pub fn clear_traces(&self) {
        lock(&self.inner.traces).clear();
    }
}

impl Default for TraceProcessor {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ActiveTrace / SpanGuard
// ============================================================================

#[derive(Debug)]
struct TraceState {
    trace: Trace,
    started: Instant,
    finished: bool,
}

/// A trace being recorded. Clones share the same underlying trace.
#[derive(Debug, Clone)]
pub struct ActiveTrace {
    state: Arc<Mutex<TraceState>>,
    processor: TraceProcessor,
}

impl ActiveTrace {
    fn new(name: String, processor: TraceProcessor) -> Self {
        let trace = Trace {
            trace_id: format!("trace_{}", Uuid::new_v4().simple()),
            name,
            started_at: Utc::now(),
            ended_at: None,
            duration_ms: 0.0,
            spans: Vec::new(),
            metadata: Map::new(),
        };
        Self {
            state: Arc::new(Mutex::new(TraceState {
                trace,
                started: Instant::now(),
                finished: false,
            })),
            processor,
        }
    }

    pub fn trace_id(&self) -> String {
        lock(&self.state).trace.trace_id.clone()
    }

    pub fn set_metadata(&self, key: impl Into<String>, value: impl Into<Value>) {
        lock(&self.state)
            .trace
            .metadata
            .insert(key.into(), value.into());
    }

    /// Open a span; it is recorded when the guard is dropped or ended
    pub fn span(&self, name: impl Into<String>) -> SpanGuard {
        SpanGuard {
            trace: self.clone(),
            name: name.into(),
            started_at: Utc::now(),
            started: Instant::now(),
            metadata: Map::new(),
            closed: false,
        }
    }

    fn record_span(&self, span: Span) {
        debug!(span = %span.name, duration_ms = span.duration_ms, "Span closed");
        lock(&self.state).trace.spans.push(span);
    }

    /// Close the trace and submit it; later calls are no-ops
    pub fn finish(&self) -> Trace {
        let mut state = lock(&self.state);
        if state.finished {
            return state.trace.clone();
        }
        state.finished = true;
        state.trace.duration_ms = elapsed_ms(state.started);
        state.trace.ended_at = Some(Utc::now());
        let trace = state.trace.clone();
        drop(state);

        self.processor.submit(trace.clone());
        trace
    }
}

/// Open span; records itself on drop
#[derive(Debug)]
pub struct SpanGuard {
    trace: ActiveTrace,
    name: String,
    started_at: DateTime<Utc>,
    started: Instant,
    metadata: Map<String, Value>,
    closed: bool,
}

impl SpanGuard {
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Close the span now
    pub fn end(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.trace.record_span(Span {
            span_id: format!("span_{}", Uuid::new_v4().simple()),
            name: std::mem::take(&mut self.name),
            started_at: self.started_at,
            duration_ms: elapsed_ms(self.started),
            metadata: std::mem::take(&mut self.metadata),
        });
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        self.close();
    }
}

/// Human-readable rendering of a trace and its spans
pub fn format_trace_for_display(trace: &Trace) -> String {
    let mut out = String::new();
    out.push_str(&format!("Trace ID: {}\n", trace.trace_id));
    out.push_str(&format!("Name: {}\n", trace.name));
    out.push_str(&format!("Started: {}\n", trace.started_at.to_rfc3339()));
    out.push_str(&format!("Duration: {:.2} ms\n", trace.duration_ms));
    out.push_str(&format!("Spans ({}):\n", trace.spans.len()));
    for span in &trace.spans {
        out.push_str(&format!("  - {} ({:.2} ms)", span.name, span.duration_ms));
        if !span.metadata.is_empty() {
            out.push_str(&format!(" {}", Value::Object(span.metadata.clone())));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spans_recorded_and_trace_submitted() {
        let processor = TraceProcessor::new();
        assert!(processor.get_all_traces().is_empty());

        let trace = processor.start_trace("Handoff");
        {
            let _span = trace.span("determine_agent_type");
        }
        let mut span = trace.span("process_with_specialized_agent");
        span.set_metadata("agent_type", "billing");
        span.end();

        // nothing visible until finished
        assert!(processor.get_all_traces().is_empty());
        let finished = trace.finish();

        let traces = processor.get_all_traces();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0].trace_id, finished.trace_id);
        let names: Vec<&str> = traces[0].spans.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["determine_agent_type", "process_with_specialized_agent"]);
        assert_eq!(traces[0].spans[1].metadata["agent_type"], "billing");
    }

    #[test]
    fn test_finish_is_idempotent() {
        let processor = TraceProcessor::new();
        let trace = processor.start_trace("t");
        trace.finish();
        trace.finish();
        assert_eq!(processor.get_all_traces().len(), 1);
    }

    #[test]
    fn test_summary_lookup_and_clear() {
        let processor = TraceProcessor::new();
        let a = processor.start_trace("a").finish();
        let b = processor.start_trace("b").finish();

        let summary = processor.get_trace_summary();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.trace_ids, vec![a.trace_id.clone(), b.trace_id.clone()]);
        assert!(summary.avg_duration_ms <= summary.total_duration_ms);

        assert_eq!(processor.get_trace(&b.trace_id).unwrap().name, "b");
        assert!(processor.get_trace("trace_missing").is_none());

        processor.clear_traces();
        assert_eq!(processor.get_trace_summary().count, 0);
        assert_eq!(processor.get_trace_summary().avg_duration_ms, 0.0);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let processor = TraceProcessor::with_capacity(2);
        let first = processor.start_trace("1").finish();
        processor.start_trace("2").finish();
        processor.start_trace("3").finish();

        assert_eq!(processor.get_all_traces().len(), 2);
        assert!(processor.get_trace(&first.trace_id).is_none());
    }

    #[test]
    fn test_format_trace_for_display() {
        let processor = TraceProcessor::new();
        let trace = processor.start_trace("Guardrails");
        trace.span("validate_empty_input").end();
        let text = format_trace_for_display(&trace.finish());

        assert!(text.contains("Trace ID: trace_"));
        assert!(text.contains("Duration:"));
        assert!(text.contains("validate_empty_input"));
    }
}
