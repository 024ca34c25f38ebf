pub mod estimate;
pub mod version;
