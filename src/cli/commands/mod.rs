pub mod decrypt;
pub mod encrypt;
pub mod keys;
pub mod sign;
pub mod version;
