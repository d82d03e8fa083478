pub mod engine_io;
pub mod key_record;
pub mod lifecycle;
pub mod verification;
