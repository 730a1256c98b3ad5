use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::collab::Address;
use super::config::WellKnownSymbols;
use super::context::ExecutionContext;
use super::error::EntryError;
use super::scheduler::{Completion, ThreadKind};

/// A function exported by the compiled program, callable from the host.
pub type EntryFn = Arc<dyn Fn(&[Address]) -> Address + Send + Sync>;

/// Exported program functions, by symbol name. Frozen once built.
#[derive(Clone, Default)]
pub struct EntrySymbols {
    functions: HashMap<String, EntryFn>,
}

impl EntrySymbols {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&[Address]) -> Address + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(f));
        self
    }

    pub fn get(&self, name: &str) -> Option<&EntryFn> {
        self.functions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl FromIterator<(String, EntryFn)> for EntrySymbols {
    fn from_iter<I: IntoIterator<Item = (String, EntryFn)>>(iter: I) -> Self {
        Self { functions: iter.into_iter().collect() }
    }
}

impl std::fmt::Debug for EntrySymbols {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.names().collect();
        names.sort_unstable();
        f.debug_struct("EntrySymbols").field("functions", &names).finish()
    }
}

/// The host-facing surface of a runtime instance: evaluates compiled
/// closures on the scheduler.
///
/// Two phases: [`ExecutionEntryPoint::new`] assembles the entry point and
/// [`ExecutionEntryPoint::launch`] activates the scheduler's run loop.
/// [`ExecutionEntryPoint::start`] does both. A context launches at most once.
#[derive(Debug)]
pub struct ExecutionEntryPoint {
    context: Arc<ExecutionContext>,
    symbols: EntrySymbols,
    well_known: WellKnownSymbols,
}

impl ExecutionEntryPoint {
    pub fn new(context: Arc<ExecutionContext>, symbols: EntrySymbols, well_known: WellKnownSymbols) -> Arc<Self> {
        Arc::new(Self { context, symbols, well_known })
    }

    /// Build and launch in one go.
    pub fn start(
        context: Arc<ExecutionContext>,
        symbols: EntrySymbols,
        well_known: WellKnownSymbols,
    ) -> Result<Arc<Self>, EntryError> {
        let entry = Self::new(context, symbols, well_known);
        entry.launch()?;
        Ok(entry)
    }

    /// Hand control to the scheduler's run loop. Fails without touching the
    /// scheduler if this context was already launched.
    pub fn launch(self: &Arc<Self>) -> Result<(), EntryError> {
        if !self.context.claim_launch() {
            return Err(EntryError::AlreadyLaunched);
        }
        info!(exports = self.symbols.len(), "Launching scheduler run loop");
        self.context.scheduler().run(self);
        Ok(())
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn symbols(&self) -> &EntrySymbols {
        &self.symbols
    }

    /// Call an exported program function by name.
    pub fn call(&self, name: &str, args: &[Address]) -> Result<Address, EntryError> {
        let f = self
            .symbols
            .get(name)
            .ok_or_else(|| EntryError::MissingSymbol(name.to_string()))?;
        Ok((**f)(args))
    }

    pub fn eval_lazy(&self, closure: Address) -> Completion {
        self.submit(ThreadKind::Generic, closure)
    }

    pub fn eval_strict_io(&self, closure: Address) -> Completion {
        self.submit(ThreadKind::StrictIo, closure)
    }

    pub fn eval_lazy_io(&self, closure: Address) -> Completion {
        self.submit(ThreadKind::LazyIo, closure)
    }

    fn submit(&self, kind: ThreadKind, closure: Address) -> Completion {
        debug!(%kind, closure, "Submitting thread");
        self.context.scheduler().submit_create_thread(kind, closure)
    }

    /// Run the program: apply the top-level handler to `main` and evaluate
    /// the result as a lazy IO action.
    pub fn main(&self) -> Result<Completion, EntryError> {
        let handler = self.resolve(&self.well_known.top_handler)?;
        let main = self.resolve(&self.well_known.main)?;
        let app = self.call(&self.well_known.apply, &[handler, main])?;
        Ok(self.eval_lazy_io(app))
    }

    fn resolve(&self, name: &str) -> Result<Address, EntryError> {
        self.context
            .symbol_table()
            .address_of(name)
            .ok_or_else(|| EntryError::MissingSymbol(name.to_string()))
    }
}
