//! Pack manifest streams into one export session

use anyhow::{Context, Result};
use std::path::Path;
use vrm_glb::{AccessorIndex, AccessorTarget, ExportSession, TypedBuffer, float_min_max};

use crate::manifest::{Manifest, StreamEntry, validate};

/// Outcome of packing a single stream
#[derive(Debug, Clone)]
pub struct StreamReport {
    pub name: String,
    pub accessor: AccessorIndex,
    pub count: usize,
    /// Override count when the stream was written sparse
    pub sparse_count: Option<usize>,
}

/// Packed session plus per-stream summary
#[derive(Debug)]
pub struct PackReport {
    pub session: ExportSession,
    pub streams: Vec<StreamReport>,
}

/// Read, validate and encode every stream of `manifest` into blob 0
pub fn pack_manifest(manifest: &Manifest) -> Result<PackReport> {
    validate(manifest)?;

    let mut session = ExportSession::new();
    let mut streams = Vec::with_capacity(manifest.streams.len());
    for (name, entry) in &manifest.streams {
        let report = pack_stream(&mut session, name, entry)
            .with_context(|| format!("Failed to pack stream '{}'", name))?;
        match report.sparse_count {
            Some(overrides) => tracing::info!(
                "Packed {}: {} elements, sparse with {} overrides",
                name,
                report.count,
                overrides
            ),
            None => tracing::info!("Packed {}: {} elements, dense", name, report.count),
        }
        streams.push(report);
    }

    Ok(PackReport { session, streams })
}

fn pack_stream(session: &mut ExportSession, name: &str, entry: &StreamEntry) -> Result<StreamReport> {
    let bytes = std::fs::read(&entry.path)
        .with_context(|| format!("Failed to read stream: {:?}", entry.path))?;
    let stride = entry.stride()?;
    let element_size = entry.element_size()?;
    let count = bytes.len() / stride;
    tracing::debug!(stream = name, stride, count, "loaded stream");

    let buffer = TypedBuffer::new(&bytes, entry.component_type()?, entry.shape()?, stride, count)?;
    let target = AccessorTarget::Buffer {
        index: 0,
        allow_sparse: entry.sparse,
    };

    // The bounds callback reads packed elements only
    let mut bounds = float_min_max;
    let min_max = if entry.bounds && stride == element_size {
        Some(&mut bounds as vrm_glb::MinMaxFn<'_>)
    } else {
        if entry.bounds {
            tracing::warn!("Skipping bounds for interleaved stream '{}'", name);
        }
        None
    };

    let accessor = session.add_accessor(&buffer, target, min_max, None)?;
    let sparse_count = session
        .accessor(accessor)
        .and_then(|a| a.sparse.as_ref())
        .map(|s| s.count);

    Ok(StreamReport {
        name: name.to_string(),
        accessor,
        count,
        sparse_count,
    })
}

/// Serialize the session as GLB at `path`
pub fn write_glb(session: &ExportSession, path: &Path, generator: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let glb = session.to_glb(generator)?;
    std::fs::write(path, &glb).with_context(|| format!("Failed to write GLB: {:?}", path))?;
    tracing::info!("Wrote {:?} ({} bytes)", path, glb.len());
    Ok(())
}
