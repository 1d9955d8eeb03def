//! Scan events and operator commands, and the dispatcher that acts on them

pub mod dispatcher;
pub mod operator;

pub use dispatcher::EventDispatcher;
pub use operator::OperatorCommand;
