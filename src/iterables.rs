//! Helpers over value streams.

use async_stream::stream;
use futures_util::{pin_mut, StreamExt};

use crate::error::{StreamError, StreamResult};
use crate::stream::ValueStream;

/// Chops `values` into chunks of `chunksize` elements; the last chunk may be
/// smaller. The returned stream is lazy and buffers at most one chunk at a
/// time.
///
/// Returns [`StreamError::InvalidChunkSize`] when `chunksize` is zero.
pub fn get_chunks<V>(values: ValueStream<V>, chunksize: usize) -> StreamResult<ValueStream<Vec<V>>>
where
    V: Send + 'static,
{
    if chunksize < 1 {
        return Err(StreamError::InvalidChunkSize(chunksize));
    }
    Ok(chunked(values, chunksize))
}

/// Non-validating chunking used by the parallel engine, where the chunk size
/// was already validated by the parallel configuration.
pub(crate) fn chunked<V>(values: ValueStream<V>, chunksize: usize) -> ValueStream<Vec<V>>
where
    V: Send + 'static,
{
    stream! {
        let mut chunk = Vec::with_capacity(chunksize);
        pin_mut!(values);
        while let Some(value) = values.next().await {
            chunk.push(value);
            if chunk.len() == chunksize {
                yield std::mem::take(&mut chunk);
            }
        }
        if !chunk.is_empty() {
            yield chunk;
        }
    }
    .boxed()
}
