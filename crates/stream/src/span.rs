use std::io::{self, SeekFrom};
use std::path::Path;

use bytes::{Bytes, BytesMut};
use futures_util::{stream, Stream};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::debug;

use crate::ByteSpan;

pub const CHUNK_SIZE: usize = 64 * 1024;

/// Open `path` and stream exactly the bytes covered by `span`.
///
/// The file handle is owned by the returned stream and closed when the stream
/// is dropped, whether it ran to completion or the consumer went away.
pub async fn open_span(
    path: &Path,
    span: ByteSpan,
) -> io::Result<impl Stream<Item = io::Result<Bytes>> + Send + 'static> {
    let mut file = File::open(path).await?;
    if span.start > 0 {
        file.seek(SeekFrom::Start(span.start)).await?;
    }
    debug!(path = %path.display(), start = span.start, len = span.len, "streaming span");

    let reader = file.take(span.len);
    Ok(stream::try_unfold(reader, |mut reader| async move {
        let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
        let read = reader.read_buf(&mut buf).await?;
        let chunk = (read > 0).then(|| (buf.freeze(), reader));
        Ok::<_, io::Error>(chunk)
    }))
}
