//! State Module - Runtime window state
//!
//! - **Window stack** - Overlapped container, current window, modal trap,
//!   next/previous cycling, closed-notification routing

mod window_stack;

pub use window_stack::*;
