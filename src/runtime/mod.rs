/// Journal change events.
pub mod events;
/// Single-writer journal task and its async handle.
pub mod handle;
