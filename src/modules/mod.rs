//! Infrastructure adapters that sit outside the database
//!
//! Currently only object storage for uploaded file payloads.

pub mod storage;
