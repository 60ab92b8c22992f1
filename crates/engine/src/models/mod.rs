pub mod attempt;
pub mod entry;
pub mod lift;
pub mod plate;

pub use attempt::{AttemptResult, AttemptSlot, AttemptStatus, SlotKey};
pub use entry::{Entry, EntryId, Equipment, SessionKey, Sex};
pub use lift::{Event, EventFamily, Lift};
pub use plate::{BarConfig, KG_TO_LBS, Plate, WeightUnit};
