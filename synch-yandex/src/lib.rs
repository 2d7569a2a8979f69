//! Yandex Disk REST client implementing [`synch_sync::RemoteStore`].
//!
//! Every call goes through a single `ureq` agent and returns
//! `Result<_, RemoteError>`; HTTP and transport failures are normalised in
//! [`error`].

mod api;
pub mod client;
pub mod error;

pub use client::YandexDisk;
