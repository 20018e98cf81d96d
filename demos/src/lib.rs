pub mod defaults;

pub use defaults::{cancel_on_ctrl_c, init_tracing, relay_interrupts};
