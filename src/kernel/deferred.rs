/// An argument that is either already computed or produced on demand.
///
/// Recorders that are switched off never call the producer, so callers can
/// hand over a clock read or a heap walk without paying for it when GC
/// statistics are disabled.
pub enum Deferred<'a, T> {
    Value(T),
    Producer(Box<dyn FnOnce() -> T + 'a>),
}

impl<'a, T> Deferred<'a, T> {
    pub fn lazy<F>(producer: F) -> Self
    where
        F: FnOnce() -> T + 'a,
    {
        Deferred::Producer(Box::new(producer))
    }

    pub fn resolve(self) -> T {
        match self {
            Deferred::Value(v) => v,
            Deferred::Producer(f) => f(),
        }
    }
}

impl<T> From<T> for Deferred<'_, T> {
    fn from(value: T) -> Self {
        Deferred::Value(value)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Deferred<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Deferred::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Deferred::Producer(_) => f.write_str("Producer(..)"),
        }
    }
}
