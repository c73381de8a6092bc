pub mod actors;
pub mod aggregate;
pub mod controller;
pub mod events;
pub mod map_data;
pub mod ports;
pub mod projections;
pub mod shortcuts;
pub mod state;

pub use actors::*;
pub use aggregate::*;
pub use controller::*;
pub use events::*;
pub use map_data::*;
pub use ports::*;
pub use projections::*;
pub use shortcuts::*;
pub use state::*;
