pub mod rdar;
pub mod wem;
