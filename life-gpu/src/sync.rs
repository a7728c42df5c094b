//! Moving cell state between the GPU buffers and the CPU.

use life_core::{CellGrid, LifeError};
use log::{error, trace};

use crate::{buffers::GridState, GpuError};

/// Maps `buffer` for reading and returns a copy of its contents.
///
/// All work touching `buffer` must already be submitted.
pub(crate) async fn map_read(
    device: &wgpu::Device,
    buffer: &wgpu::Buffer,
) -> Result<Vec<u8>, GpuError> {
    let slice = buffer.slice(..);
    let (sender, receiver) = futures::channel::oneshot::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });

    device
        .poll(wgpu::PollType::Wait)
        .map_err(|e| GpuError::BufferMapping(e.to_string()))?;

    match receiver.await {
        Ok(Ok(())) => {
            let data = slice.get_mapped_range().to_vec();
            buffer.unmap();
            Ok(data)
        }
        Ok(Err(e)) => {
            error!("Failed to map buffer: {e}");
            Err(GpuError::BufferMapping(e.to_string()))
        }
        Err(_) => Err(GpuError::BufferMapping(
            "buffer map callback was dropped".to_string(),
        )),
    }
}

/// Reinterprets mapped bytes as cell values. The bytes come from a `Vec<u8>`
/// with no alignment guarantee, so they are copied rather than cast in place.
fn cells_from_bytes(bytes: &[u8]) -> Vec<u32> {
    bytemuck::pod_collect_to_vec(bytes)
}

/// Copies cell-state buffer `index` back into a [`CellGrid`].
///
/// # Arguments
///
/// * `device` - Device that owns `state`.
/// * `queue` - Queue the copy into the staging buffer is submitted on.
/// * `state` - The grid's buffers.
/// * `index` - Which cell-state buffer to read; only its parity matters.
///
/// # Returns
///
/// * `Ok(CellGrid)` - The buffer's contents, shaped by the grid's dimensions.
/// * `Err(GpuError)` - If mapping the staging buffer fails.
pub async fn download_state(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    state: &GridState,
    index: usize,
) -> Result<CellGrid, GpuError> {
    let size = state.state_buffer_size();
    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Cell State Download Encoder"),
    });
    encoder.copy_buffer_to_buffer(state.cell_buffer(index), 0, &state.staging_buf, 0, size);
    queue.submit(Some(encoder.finish()));

    let bytes = map_read(device, &state.staging_buf).await?;
    let cells = cells_from_bytes(&bytes);
    trace!("Downloaded cell state buffer {} ({size} bytes)", index & 1);
    Ok(CellGrid::from_vec(state.dims(), cells)?)
}

/// Overwrites cell-state buffer `index` with `grid`.
pub fn upload_state(
    queue: &wgpu::Queue,
    state: &GridState,
    index: usize,
    grid: &CellGrid,
) -> Result<(), GpuError> {
    let dims = state.dims();
    if grid.dims() != dims {
        return Err(LifeError::DimensionMismatch {
            expected: (dims.width(), dims.height()),
            actual: (grid.width(), grid.height()),
        }
        .into());
    }
    queue.write_buffer(
        state.cell_buffer(index),
        0,
        bytemuck::cast_slice(grid.as_slice()),
    );
    trace!("Uploaded cell state buffer {}", index & 1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_from_unaligned_bytes() {
        let words: [u32; 4] = [0, 1, 1, 0];
        let mut padded = vec![0xAAu8];
        padded.extend_from_slice(bytemuck::cast_slice(&words));

        // Starting one byte in leaves the slice misaligned for u32.
        assert_eq!(cells_from_bytes(&padded[1..]), words);
    }

    #[test]
    fn cells_from_empty_bytes() {
        assert!(cells_from_bytes(&[]).is_empty());
    }
}
