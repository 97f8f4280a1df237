use std::io;
use std::result;


/// Errors raised by the tracing runtime.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A global tracer is already installed.
    #[error("a global tracer is already installed")]
    GlobalTracerInstalled,

    /// Writing a finished span to an output stream failed.
    #[error("failed to write trace output: {0}")]
    Io(#[from] io::Error),

    /// A sink lock was poisoned by a panicking thread.
    #[error("sink lock poisoned by a panicking thread")]
    SinkPoisoned,
}


/// Result of fallible tracing operations.
pub type Result<T> = self::result::Result<T, Error>;
