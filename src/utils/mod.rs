mod dump;
mod fail;
mod global_tracer;
mod reporter;

pub use self::dump::dump_span;
pub use self::fail::FailSpan;
pub use self::global_tracer::GlobalTracer;
pub use self::reporter::ReporterThread;
