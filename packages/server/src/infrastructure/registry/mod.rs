//! 参加者レジストリの実装
//!
//! - `inmemory`: プロセス内メモリを使った実装

pub mod inmemory;

pub use inmemory::InMemoryParticipantRegistry;
