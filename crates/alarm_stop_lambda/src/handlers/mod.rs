pub mod batch;
pub mod lifecycle;
