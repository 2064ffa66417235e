pub mod client;
pub mod concepts;
pub mod config;
pub mod encoder;
pub mod errors;
pub mod grouper;
pub mod khash;
pub mod request;
pub mod response;
pub mod schema;
pub mod transport;
pub mod types;
pub mod validator;
