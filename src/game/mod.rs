pub mod body;
pub mod constants;
pub mod forces;
pub mod portal;
pub mod presenter;
pub mod schedule;
pub mod sensor;
pub mod session;
pub mod shape;
pub mod state;
pub mod world;
pub mod zone;
