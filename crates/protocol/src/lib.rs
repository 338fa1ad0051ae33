//! Wire types shared between ClipVault clients and the media backend.
//!
//! The backend is append-only and accepts writes through a narrow
//! record/chunk API. Every type here serializes to the JSON shape the
//! backend gateway expects (camelCase fields, optional values as
//! zero-or-one element arrays).

pub mod constants;
pub mod envelope;
pub mod messages;
pub mod types;

// Re-export primary types for convenience.
pub use constants::Method;
pub use envelope::{Message, RpcError};
pub use types::{
    Album, AlbumInfo, ChunkPayload, GeoData, RecordId, RecordInfo, RecordInit,
};
