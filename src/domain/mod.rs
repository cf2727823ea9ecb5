pub mod address;
pub mod camera;
pub mod lot;
pub mod template;
