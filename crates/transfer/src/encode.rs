use clipvault_protocol::ChunkPayload;

/// Converts a raw byte slice into the backend-native chunk encoding.
///
/// The backend takes chunk bodies as a sequence of byte-valued naturals;
/// the numeric expansion happens at serialization time.
pub fn encode_chunk(slice: &[u8]) -> ChunkPayload {
    ChunkPayload::new(slice.to_vec())
}
