pub mod recurrence;
pub mod settings;
pub mod task;

pub use recurrence::*;
pub use settings::*;
pub use task::*;
