use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::RwLock;

use crate::errors::Error;
use crate::errors::Result;
use crate::tracer::Tracer;
use crate::tracer::TracerOptions;


static GLOBAL_TRACER: RwLock<Option<Arc<Tracer>>> = RwLock::new(None);
static DISCARD_TRACER: OnceLock<Arc<Tracer>> = OnceLock::new();


/// Utility singleton to store the process's `Tracer`.
///
/// Every thread in the process, may it be application or library, should use
/// the same `Tracer` instance for the entire lifetime of the process.
///
/// The `GlobalTracer` stores an atomic reference counted `Tracer`.
/// This can then be requested by each thread with `GlobalTracer::get`.
///
/// Once initialised, the `GlobalTracer` cannot be changed or dropped.
/// Be aware that the `GlobalTracer` is backed by a static global variable
/// so tracers implementing the `Drop` trait WILL NOT be dropped.
///
/// ```
/// use tracelet::Tracer;
/// use tracelet::TracerOptions;
/// use tracelet::utils::GlobalTracer;
///
/// let (tracer, _receiver) = Tracer::new(TracerOptions::default());
/// let tracer = GlobalTracer::init(tracer).unwrap();
/// ```
pub struct GlobalTracer {}

impl GlobalTracer {
    /// Access the singleton `Tracer` instance.
    ///
    /// Returns an `Arc` reference to the stored `Tracer`.
    ///
    /// If no tracer was installed this returns a shared fallback tracer
    /// that discards every span started through it, so instrumented code
    /// can run before the process configures tracing.
    pub fn get() -> Arc<Tracer> {
        let global = GLOBAL_TRACER.read().unwrap_or_else(|err| err.into_inner());
        match global.as_ref() {
            Some(tracer) => Arc::clone(tracer),
            None => Arc::clone(DISCARD_TRACER.get_or_init(|| {
                let (tracer, _receiver) = Tracer::new(TracerOptions::default());
                Arc::new(tracer)
            })),
        }
    }

    /// Initialises the `GlobalTracer` to store the given `Tracer` instance.
    ///
    /// Returns an `Arc` reference to the stored `Tracer`.
    ///
    /// # Errors
    ///
    /// Fails with `Error::GlobalTracerInstalled` if the `GlobalTracer` is
    /// already initialised with a `Tracer`.
    pub fn init(tracer: Tracer) -> Result<Arc<Tracer>> {
        let mut global = GLOBAL_TRACER.write().unwrap_or_else(|err| err.into_inner());
        if global.is_some() {
            return Err(Error::GlobalTracerInstalled);
        }
        let tracer = Arc::new(tracer);
        *global = Some(Arc::clone(&tracer));
        Ok(tracer)
    }

    #[cfg(test)]
    fn reset() {
        let mut global = GLOBAL_TRACER.write().unwrap_or_else(|err| err.into_inner());
        *global = None;
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;
    use std::thread;

    use crate::errors::Error;
    use crate::span::SpanOptions;
    use crate::tracer::Tracer;
    use crate::tracer::TracerOptions;

    use super::GlobalTracer;


    // *** SEQUENTIAL TESTS ***
    // The following tests cannot run in parallel as they manipulate the
    // GLOBAL_TRACER singleton, so each one holds this lock while it runs.
    static TEST_GUARD: Mutex<()> = Mutex::new(());

    fn make_tracer() -> Tracer {
        let (tracer, _receiver) = Tracer::new(TracerOptions::default());
        tracer
    }

    #[test]
    fn tracer_cannot_be_set_twice() {
        let _guard = TEST_GUARD.lock().unwrap_or_else(|err| err.into_inner());
        GlobalTracer::reset();
        GlobalTracer::init(make_tracer()).unwrap();
        match GlobalTracer::init(make_tracer()) {
            Err(Error::GlobalTracerInstalled) => (),
            Err(error) => panic!("Unexpected error: {:?}", error),
            Ok(_) => panic!("Second init should have failed"),
        }
    }

    #[test]
    fn tracer_falls_back_to_discarding_spans() {
        let _guard = TEST_GUARD.lock().unwrap_or_else(|err| err.into_inner());
        GlobalTracer::reset();
        let first = GlobalTracer::get();
        let second = GlobalTracer::get();
        assert!(Arc::ptr_eq(&first, &second));
        let span = first.span("test", SpanOptions::default());
        assert!(span.is_local());
        span.finish();
    }

    #[test]
    fn tracer_is_returned() {
        let _guard = TEST_GUARD.lock().unwrap_or_else(|err| err.into_inner());
        GlobalTracer::reset();
        let installed = GlobalTracer::init(make_tracer()).unwrap();
        let fetched = GlobalTracer::get();
        assert!(Arc::ptr_eq(&installed, &fetched));
    }

    #[test]
    fn tracer_is_returned_to_many_threads() {
        let _guard = TEST_GUARD.lock().unwrap_or_else(|err| err.into_inner());
        GlobalTracer::reset();
        GlobalTracer::init(make_tracer()).unwrap();
        let t1 = thread::spawn(|| {
            let _tracer = GlobalTracer::get();
        });
        let t2 = thread::spawn(|| {
            let _tracer = GlobalTracer::get();
        });
        t1.join().unwrap();
        t2.join().unwrap();
    }
}
