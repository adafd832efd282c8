pub mod transport;

pub use transport::{MessageReader, MessageWriter, connect};
