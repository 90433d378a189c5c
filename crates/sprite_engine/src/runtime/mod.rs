//! Game loop runtime
//!
//! Loops own a [`World`](crate::scene::World) and drive it one tick at a
//! time. The [`ExecutionLoopStack`] lets a loop run another loop "inside"
//! itself and get control back when that loop finishes.

mod game_loop;
mod loop_stack;

pub use game_loop::{GameLoop, LoopControl, LoopError, TickContext};
pub use loop_stack::ExecutionLoopStack;
