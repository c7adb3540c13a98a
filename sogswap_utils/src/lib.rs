mod logging;
mod swap_args;

pub use swap_args::{FailurePolicyArg, SwapArgs};

pub use tracing;
