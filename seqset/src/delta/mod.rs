mod set_delta;
mod wire_delta;

pub use set_delta::{AddRange, RemoveRange, SetDelta};
pub use wire_delta::{WireAddRange, WireDelta};
