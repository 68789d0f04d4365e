//! Inbound command path: packet codec, the pipe that queues packets for
//! the command-processing context, and the function-code router.

pub mod codec;
pub mod pipe;
pub mod router;
