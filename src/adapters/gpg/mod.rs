pub mod colons;
pub mod gpg_engine;
pub mod status;
