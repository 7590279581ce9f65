// Shared instrumentation: event trace and session counters.
pub mod metrics;
