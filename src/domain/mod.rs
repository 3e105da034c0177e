pub mod alert;
pub mod diff;
pub mod normalize;
pub mod record;
