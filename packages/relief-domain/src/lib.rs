pub mod delivery;
pub mod reserved;
pub mod timestamp;
