pub mod games;
pub mod market;
pub mod system;
