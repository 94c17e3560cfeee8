pub mod ids;
pub mod services;
pub mod time;
pub mod timer;

pub use ids::{IdGenerator, SequentialIds, TimeRandomIds};
pub use time::{Clock, ManualClock, SystemClock};
pub use timer::CancellableTimer;
