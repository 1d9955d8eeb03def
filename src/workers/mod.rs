//! Background workers
//!
//! Threads that feed the control loop from outside: the operator console.

pub mod console;

pub use console::OperatorConsole;

/// Trait for workers that need graceful shutdown.
pub trait WorkerClose {
    /// Close and clean up worker resources.
    fn close(&mut self);
}
