//! GLB container helpers

/// GLB magic ("glTF")
pub const GLB_MAGIC: &[u8; 4] = b"glTF";
/// GLB container version
pub const GLB_VERSION: u32 = 2;
/// Chunk type "JSON"
pub const CHUNK_JSON: u32 = 0x4E4F534A;
/// Chunk type "BIN\0"
pub const CHUNK_BIN: u32 = 0x004E4942;

/// Align buffer to 4-byte boundary
pub fn align_buffer(buffer: &mut Vec<u8>) {
    while buffer.len() % 4 != 0 {
        buffer.push(0);
    }
}

/// Assemble GLB binary from serialized JSON and buffer data
///
/// An empty `buffer_data` produces a JSON-only container.
pub fn assemble_glb(json_bytes: &[u8], buffer_data: &[u8]) -> Vec<u8> {
    // Pad JSON to 4-byte alignment
    let json_padding = (4 - (json_bytes.len() % 4)) % 4;
    let json_chunk_length = json_bytes.len() + json_padding;

    // Pad buffer to 4-byte alignment
    let buffer_padding = (4 - (buffer_data.len() % 4)) % 4;
    let buffer_chunk_length = buffer_data.len() + buffer_padding;

    let bin_chunk_total = if buffer_data.is_empty() {
        0
    } else {
        8 + buffer_chunk_length
    };
    let total_length = 12 + 8 + json_chunk_length + bin_chunk_total;

    let mut glb = Vec::with_capacity(total_length);

    // GLB header
    glb.extend_from_slice(GLB_MAGIC);
    glb.extend_from_slice(&GLB_VERSION.to_le_bytes());
    glb.extend_from_slice(&(total_length as u32).to_le_bytes());

    // JSON chunk
    glb.extend_from_slice(&(json_chunk_length as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(json_bytes);
    glb.resize(glb.len() + json_padding, b' ');

    // Binary chunk
    if !buffer_data.is_empty() {
        glb.extend_from_slice(&(buffer_chunk_length as u32).to_le_bytes());
        glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        glb.extend_from_slice(buffer_data);
        glb.resize(glb.len() + buffer_padding, 0);
    }

    glb
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    #[test]
    fn test_align_buffer() {
        let mut buffer = vec![1, 2, 3];
        align_buffer(&mut buffer);
        assert_eq!(buffer.len(), 4);
        assert_eq!(buffer, vec![1, 2, 3, 0]);

        let mut buffer2 = vec![1, 2, 3, 4];
        align_buffer(&mut buffer2);
        assert_eq!(buffer2.len(), 4); // Already aligned
    }

    #[test]
    fn test_assemble_glb_layout() {
        let json = br#"{"a":1}"#; // 7 bytes -> 1 byte padding
        let bin = [1u8, 2, 3, 4, 5]; // 5 bytes -> 3 bytes padding
        let glb = assemble_glb(json, &bin);

        assert_eq!(&glb[0..4], b"glTF");
        assert_eq!(read_u32(&glb, 4), 2);
        assert_eq!(read_u32(&glb, 8) as usize, glb.len());
        assert_eq!(glb.len(), 12 + 8 + 8 + 8 + 8);

        assert_eq!(read_u32(&glb, 12), 8);
        assert_eq!(read_u32(&glb, 16), CHUNK_JSON);
        assert_eq!(&glb[20..27], json);
        assert_eq!(glb[27], b' ');

        assert_eq!(read_u32(&glb, 28), 8);
        assert_eq!(read_u32(&glb, 32), CHUNK_BIN);
        assert_eq!(&glb[36..41], &bin);
        assert_eq!(&glb[41..44], &[0, 0, 0]);
    }

    #[test]
    fn test_assemble_glb_without_bin() {
        let glb = assemble_glb(b"{}  ", &[]);
        assert_eq!(glb.len(), 24);
        assert_eq!(read_u32(&glb, 8), 24);
    }
}
