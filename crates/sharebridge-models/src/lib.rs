pub mod media;
pub mod wire;
