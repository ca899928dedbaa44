use std::fmt;

/// The three store operations that fire lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Save,
    Load,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Operation::Save => "save",
            Operation::Load => "load",
            Operation::Delete => "delete",
        })
    }
}

/// Lifecycle notification fired synchronously by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    /// Fired before any I/O is attempted.
    Before(Operation),
    /// Fired exactly once per call, after all I/O has completed.
    After { operation: Operation, success: bool },
}

impl StoreEvent {
    pub fn operation(&self) -> Operation {
        match self {
            StoreEvent::Before(operation) => *operation,
            StoreEvent::After { operation, .. } => *operation,
        }
    }
}

type Observer = Box<dyn FnMut(&StoreEvent) + Send>;

/// Ordered list of observers. Observers run in registration order on the
/// caller's thread and must not re-enter the store that fired them.
#[derive(Default)]
pub struct Hooks {
    observers: Vec<Observer>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe every event.
    pub fn subscribe(&mut self, observer: impl FnMut(&StoreEvent) + Send + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Observe the `Before` event of one operation.
    pub fn on_before(&mut self, operation: Operation, mut observer: impl FnMut() + Send + 'static) {
        self.subscribe(move |event| {
            if *event == StoreEvent::Before(operation) {
                observer();
            }
        });
    }

    /// Observe the `After` event of one operation; receives the success flag.
    pub fn on_after(
        &mut self,
        operation: Operation,
        mut observer: impl FnMut(bool) + Send + 'static,
    ) {
        self.subscribe(move |event| {
            if let StoreEvent::After {
                operation: op,
                success,
            } = *event
            {
                if op == operation {
                    observer(success);
                }
            }
        });
    }

    pub fn emit(&mut self, event: &StoreEvent) {
        for observer in &mut self.observers {
            observer(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("observers", &self.observers.len())
            .finish()
    }
}
