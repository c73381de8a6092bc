pub mod editor;
pub mod greenhouse;
pub mod logger;
pub mod path_curve;
pub mod simulation;
pub mod zone_drawing;

pub use editor::*;
pub use greenhouse::*;
pub use logger::*;
pub use path_curve::*;
pub use simulation::*;
pub use zone_drawing::*;
