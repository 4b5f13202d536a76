pub mod accept;
pub mod overlay;
pub mod smart_complete;
pub mod textarea;
