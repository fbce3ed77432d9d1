pub mod change;
pub mod item_record;
pub mod item_store;
pub mod lock;
pub mod range_summary;
