pub use cancel_token::*;

mod cancel_token;
pub mod logger;
pub mod params_io;
