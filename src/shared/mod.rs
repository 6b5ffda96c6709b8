pub mod macros;
pub mod pacer;
pub mod structs;

pub use pacer::Pacer;
pub use structs::CallDirection;
pub use structs::Car;
pub use structs::CarId;
pub use structs::CarStatus;
pub use structs::Direction;
pub use structs::Request;
pub use structs::StatusChange;
