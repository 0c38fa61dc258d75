pub mod keyword;
pub mod stub;

#[cfg(feature = "backend-tract")]
pub mod tract;

pub use keyword::KeywordBackend;
pub use stub::StubBackend;

#[cfg(feature = "backend-tract")]
pub use tract::TractBackend;
