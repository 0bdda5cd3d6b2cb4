pub mod classify;
pub mod events;
pub mod pack;
pub mod week;
