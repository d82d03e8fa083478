pub mod crypto_service;
pub mod key_service;
pub mod projection;
pub mod resolver;
