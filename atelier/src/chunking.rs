//! Artboard splitting for chunked uploads.
//!
//! A large artboard array is split into contiguous runs whose serialized
//! size approximates a target, and each run is submitted as one numbered
//! chunk. Concatenating the runs in index order yields the original
//! array, which is exactly what the server does on assembly.

use serde_json::Value;

/// Splits an artboard array into contiguous runs of roughly `target_bytes`
/// serialized size each.
///
/// Every run is non-empty and the runs concatenate back to the input in
/// order. A single artboard larger than `target_bytes` gets a run of its
/// own rather than being split further.
pub fn split_artboards(artboards: &[Value], target_bytes: usize) -> Vec<Vec<Value>> {
    let mut chunks: Vec<Vec<Value>> = Vec::new();
    let mut current: Vec<Value> = Vec::new();
    let mut current_bytes = 0usize;

    for artboard in artboards {
        let size = serialized_size(artboard);

        if !current.is_empty() && current_bytes + size > target_bytes {
            chunks.push(std::mem::take(&mut current));
            current_bytes = 0;
        }

        current.push(artboard.clone());
        current_bytes += size;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Serialized size of one artboard in bytes.
fn serialized_size(artboard: &Value) -> usize {
    // Compact encoding, same as what goes on the wire.
    serde_json::to_string(artboard).map(|s| s.len()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn artboard(id: usize, padding: usize) -> Value {
        json!({ "id": format!("ab-{id}"), "name": "x".repeat(padding) })
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(split_artboards(&[], 1024).is_empty());
    }

    #[test]
    fn test_small_array_is_one_chunk() {
        let boards: Vec<Value> = (0..4).map(|i| artboard(i, 10)).collect();
        let chunks = split_artboards(&boards, 1024 * 1024);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], boards);
    }

    #[test]
    fn test_split_preserves_order_and_content() {
        let boards: Vec<Value> = (0..50).map(|i| artboard(i, 100)).collect();
        let chunks = split_artboards(&boards, 256);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.is_empty());
        }

        let reassembled: Vec<Value> = chunks.into_iter().flatten().collect();
        assert_eq!(reassembled, boards);
    }

    #[test]
    fn test_oversized_artboard_gets_own_chunk() {
        let boards = vec![artboard(0, 10), artboard(1, 5000), artboard(2, 10)];
        let chunks = split_artboards(&boards, 512);

        let reassembled: Vec<Value> = chunks.iter().flatten().cloned().collect();
        assert_eq!(reassembled, boards);

        // The big artboard must not share a chunk with the one after it.
        assert!(chunks.iter().any(|c| c.len() == 1 && c[0] == boards[1]));
    }
}
