pub mod coerce;
pub mod context;
pub mod definition;
pub mod delegate;
pub mod interpreter;
pub mod value;
