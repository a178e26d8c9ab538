//! Server-sent event decoding for `streamGenerateContent?alt=sse`.

use super::types::GenerateContentResponse;
use crate::{Error, Result};
use futures::stream::unfold;
use futures::{Stream, StreamExt};

/// Turns a raw SSE byte stream into a stream of text chunks.
///
/// Each `data:` event is one `GenerateContentResponse`; events without text
/// are skipped. Lines are split on raw bytes so a multi-byte character cut
/// across network chunks is decoded intact.
pub fn sse_text_stream<S, B>(bytes: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = reqwest::Result<B>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    let initial_state = (Box::pin(bytes), Vec::<u8>::new(), false);

    unfold(
        initial_state,
        |(mut stream, mut buffer, mut finished)| async move {
            loop {
                while let Some(line) = next_line(&mut buffer, finished) {
                    if let Some(item) = decode_event(&line) {
                        return Some((item, (stream, buffer, finished)));
                    }
                }

                if finished {
                    return None;
                }

                match stream.next().await {
                    Some(Ok(chunk)) => buffer.extend_from_slice(chunk.as_ref()),
                    Some(Err(e)) => {
                        tracing::error!("Gemini stream interrupted: {}", e);
                        return Some((Err(Error::Http(e)), (stream, Vec::new(), true)));
                    }
                    None => finished = true,
                }
            }
        },
    )
}

/// Pops the next complete line; once the body has ended the remainder counts
/// as a final line.
fn next_line(buffer: &mut Vec<u8>, finished: bool) -> Option<String> {
    if let Some(pos) = buffer.iter().position(|&b| b == b'\n') {
        let line: Vec<u8> = buffer.drain(..=pos).collect();
        return Some(String::from_utf8_lossy(&line).trim().to_string());
    }

    if finished && !buffer.is_empty() {
        let line = std::mem::take(buffer);
        return Some(String::from_utf8_lossy(&line).trim().to_string());
    }

    None
}

fn decode_event(line: &str) -> Option<Result<String>> {
    let payload = line.strip_prefix("data:")?.trim();
    if payload.is_empty() || payload == "[DONE]" {
        return None;
    }

    match serde_json::from_str::<GenerateContentResponse>(payload) {
        Ok(event) => {
            let text = event.text();
            if text.is_empty() {
                None
            } else {
                Some(Ok(text))
            }
        }
        Err(e) => {
            tracing::error!("Failed to parse Gemini stream event: {}\nEvent: {}", e, payload);
            Some(Err(Error::Parse(e)))
        }
    }
}
