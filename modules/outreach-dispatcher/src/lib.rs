pub mod dispatcher;
pub mod inputs;
pub mod pacing;
pub mod replies;
pub mod session;
pub mod state;
pub mod stats;
pub mod template;

pub use dispatcher::Dispatcher;
pub use state::DispatcherState;
pub use stats::DispatchStats;
