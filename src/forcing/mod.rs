pub mod assemble;
pub mod date_chunks;
pub mod error;
pub mod fetcher;
pub mod request;
pub mod response;
