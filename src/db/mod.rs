pub mod connection;
pub mod runs;
pub mod snapshots;
