//! Request options and materialized responses

pub mod request;
pub mod response;

pub use request::RequestOptions;
pub use response::HttpResponse;
