//! Reading queries from the terminal.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Reads the next line from `reader`, returning `None` at end of input.
///
/// The same reader must be reused for every line: anything it has buffered
/// past the returned line (pasted or piped input) is kept for the next call.
pub async fn read_line<R>(reader: &mut R) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();

    match reader.read_line(&mut line).await {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(err) => {
            error!("error reading input: {err}");
            None
        }
    }
}
