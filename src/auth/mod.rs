pub mod error;
pub mod jwt;

pub use jwt::{decode_jwt, encode_jwt};
