//! SQLite backend for the order engine.
//!
//! [`SqliteDatabase`] implements every storage trait in [`crate::traits`]. The row-level queries live in [`db`] as free
//! functions over a `SqliteConnection`, so that they can be composed inside transactions.
mod errors;
mod sqlite_impl;

pub mod db;
pub use errors::SqliteDatabaseError;
pub use sqlite_impl::SqliteDatabase;
