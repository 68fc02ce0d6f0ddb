pub mod http;
pub mod session_file;

pub use http::HttpBackend;
pub use session_file::FileSessionStore;
