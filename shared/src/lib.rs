pub mod chunk;
pub mod endpoints;
pub mod events;
pub mod wait;

pub use chunk::*;
pub use endpoints::SubmitRequest;
pub use events::*;
pub use wait::*;
