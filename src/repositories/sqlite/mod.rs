// src/repositories/sqlite/mod.rs

pub mod account;
pub mod observation;

pub use self::account::SqliteAccountRepository;
pub use self::observation::SqliteObservationRepository;
