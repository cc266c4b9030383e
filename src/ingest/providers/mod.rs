pub mod sample_json;
pub mod youtube;

pub use sample_json::StaticSampleAdapter;
pub use youtube::VideoSearchAdapter;
