// SQLite backend for the loader's driver seam.
//
// - config: connection options and builder
// - connection: `DbConnection` implementation over `rusqlite`
// - params: conversion from `RowValues` to SQLite values
// - query: result-set extraction

pub mod config;
pub mod connection;
pub mod params;
pub mod query;

pub use config::{SqliteOptions, SqliteOptionsBuilder};
pub use connection::SqliteConnection;
pub use query::build_result_set;
