pub mod costmatrix;
pub mod distance;
pub mod pathfinder;

pub use self::costmatrix::*;
pub use self::distance::*;
pub use self::pathfinder::*;
