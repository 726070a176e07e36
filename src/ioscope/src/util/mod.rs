pub mod any;
pub mod display;
