//! Registration, sign-in and bearer-token authentication.

mod log_in;
mod register;
mod token;

pub use log_in::{Credentials, log_in_endpoint};
pub use register::{RegisterRequest, register_endpoint};
pub use token::{AuthError, Claims, encode_jwt};
