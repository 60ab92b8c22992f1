pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod state_machine;
pub mod timer;

pub use config::MeetConfig;
pub use error::{EngineError, Result};
pub use state_machine::{AttemptStateMachine, Availability};
pub use timer::{AttemptTimer, Clock, ManualClock, SystemClock, TimerRegistry};
