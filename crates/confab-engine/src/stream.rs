//! Frame decoding for streamed answers.
//!
//! The answer endpoint streams its body as a sequence of frames delimited by
//! a blank line, each carrying a `data: <json>` payload:
//!
//! ```text
//! data: {"partial_answer":"X is"}\n\n
//! data: {"partial_answer":"X is a concept.","complete":true,"question_count":3}\n\n
//! ```
//!
//! [`decode_frames`] turns the raw byte stream into a stream of parsed
//! [`AnswerFrame`]s, reassembling frames that arrive split across chunks.
//! Frames whose payload is not valid JSON are skipped with a warning rather
//! than aborting the stream.

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use tracing::warn;

use crate::client::ClientError;
use crate::protocol::AnswerFrame;

/// Frame delimiter within the response body.
const FRAME_DELIMITER: &[u8] = b"\n\n";

/// Payload prefix within a frame.
const DATA_PREFIX: &str = "data:";

/// Decode a byte stream into a stream of answer frames.
///
/// Bytes are buffered until a complete frame (terminated by a blank line) is
/// available; a trailing unterminated frame is still decoded when the stream
/// ends. Transport errors are passed through as [`ClientError::Stream`].
pub fn decode_frames<S>(byte_stream: S) -> impl Stream<Item = Result<AnswerFrame, ClientError>>
where
    S: Stream<Item = reqwest::Result<Bytes>> + Send + Unpin + 'static,
{
    let state = (byte_stream, Vec::<u8>::new(), false);

    stream::unfold(state, |(mut stream, mut buffer, mut eof)| async move {
        loop {
            // Drain complete frames already buffered.
            while let Some(text) = split_frame(&mut buffer) {
                if let Some(frame) = parse_frame(&text) {
                    return Some((Ok(frame), (stream, buffer, eof)));
                }
            }

            if eof {
                // The final frame may arrive without a trailing delimiter.
                if !buffer.is_empty() {
                    let text = String::from_utf8_lossy(&buffer).into_owned();
                    buffer.clear();
                    if let Some(frame) = parse_frame(&text) {
                        return Some((Ok(frame), (stream, buffer, eof)));
                    }
                }
                return None;
            }

            match stream.next().await {
                Some(Ok(chunk)) => buffer.extend_from_slice(&chunk),
                Some(Err(e)) => {
                    return Some((
                        Err(ClientError::Stream(e.to_string())),
                        (stream, buffer, eof),
                    ));
                }
                None => eof = true,
            }
        }
    })
}

/// Pop one delimiter-terminated frame off the front of the buffer.
fn split_frame(buffer: &mut Vec<u8>) -> Option<String> {
    let pos = buffer
        .windows(FRAME_DELIMITER.len())
        .position(|window| window == FRAME_DELIMITER)?;

    let frame: Vec<u8> = buffer.drain(..pos + FRAME_DELIMITER.len()).collect();
    Some(String::from_utf8_lossy(&frame[..pos]).into_owned())
}

/// Parse the `data:` payload of a frame.
///
/// Returns `None` for frames without a payload (keepalives, comments) and for
/// payloads that fail to parse as JSON, which are logged and skipped.
fn parse_frame(text: &str) -> Option<AnswerFrame> {
    let payload = text
        .lines()
        .find_map(|line| line.strip_prefix(DATA_PREFIX))
        .map(str::trim)?;

    match serde_json::from_str::<AnswerFrame>(payload) {
        Ok(frame) => Some(frame),
        Err(e) => {
            warn!(error = %e, "skipping malformed answer frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn byte_stream(
        chunks: Vec<&'static [u8]>,
    ) -> impl Stream<Item = reqwest::Result<Bytes>> + Send + Unpin + 'static {
        Box::pin(stream::iter(
            chunks.into_iter().map(|c| Ok(Bytes::from_static(c))),
        ))
    }

    async fn collect_frames(chunks: Vec<&'static [u8]>) -> Vec<AnswerFrame> {
        let mut decoded = Box::pin(decode_frames(byte_stream(chunks)));
        let mut frames = Vec::new();
        while let Some(item) = decoded.next().await {
            frames.push(item.expect("stream error"));
        }
        frames
    }

    #[tokio::test]
    async fn decodes_single_frame() {
        let frames = collect_frames(vec![b"data: {\"partial_answer\":\"Hello\"}\n\n"]).await;
        assert_eq!(frames, vec![AnswerFrame::partial("Hello")]);
    }

    #[tokio::test]
    async fn decodes_cumulative_sequence() {
        // The worked example: two frames, the second carrying completion.
        let frames = collect_frames(vec![
            b"data: {\"partial_answer\":\"X is\"}\n\n",
            b"data: {\"partial_answer\":\"X is a concept.\",\"complete\":true,\"question_count\":3}\n\n",
        ])
        .await;

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].partial_answer.as_deref(), Some("X is"));
        assert_eq!(frames[1].partial_answer.as_deref(), Some("X is a concept."));
        assert!(frames[1].complete);
        assert_eq!(frames[1].question_count, Some(3));
    }

    #[tokio::test]
    async fn reassembles_frame_split_across_chunks() {
        let frames = collect_frames(vec![
            b"data: {\"partial_",
            b"answer\":\"Hi\"}",
            b"\n\ndata: {\"complete\":true,\"question_count\":1}\n\n",
        ])
        .await;

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].partial_answer.as_deref(), Some("Hi"));
        assert!(frames[1].complete);
    }

    #[tokio::test]
    async fn decodes_multiple_frames_in_one_chunk() {
        let frames = collect_frames(vec![
            b"data: {\"partial_answer\":\"a\"}\n\ndata: {\"partial_answer\":\"ab\"}\n\n",
        ])
        .await;

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].partial_answer.as_deref(), Some("ab"));
    }

    #[tokio::test]
    async fn skips_malformed_json() {
        let frames = collect_frames(vec![
            b"data: {not json}\n\n",
            b"data: {\"partial_answer\":\"ok\"}\n\n",
        ])
        .await;

        assert_eq!(frames, vec![AnswerFrame::partial("ok")]);
    }

    #[tokio::test]
    async fn ignores_frames_without_data_payload() {
        let frames = collect_frames(vec![
            b": keepalive\n\n",
            b"data: {\"partial_answer\":\"ok\"}\n\n",
        ])
        .await;

        assert_eq!(frames, vec![AnswerFrame::partial("ok")]);
    }

    #[tokio::test]
    async fn decodes_trailing_frame_without_delimiter() {
        let frames = collect_frames(vec![b"data: {\"complete\":true,\"question_count\":2}"]).await;

        assert_eq!(frames.len(), 1);
        assert!(frames[0].complete);
        assert_eq!(frames[0].question_count, Some(2));
    }

    #[tokio::test]
    async fn empty_stream_yields_nothing() {
        let frames = collect_frames(vec![]).await;
        assert!(frames.is_empty());
    }

    #[test]
    fn test_split_frame() {
        let mut buffer = b"data: {}\n\nrest".to_vec();
        assert_eq!(split_frame(&mut buffer), Some("data: {}".to_string()));
        assert_eq!(buffer, b"rest");
        assert_eq!(split_frame(&mut buffer), None);
    }

    #[test]
    fn test_parse_frame_trims_payload() {
        let frame = parse_frame("data:   {\"partial_answer\":\"x\"}  ").unwrap();
        assert_eq!(frame.partial_answer.as_deref(), Some("x"));
    }

    #[test]
    fn test_parse_frame_no_payload() {
        assert_eq!(parse_frame(": comment"), None);
        assert_eq!(parse_frame(""), None);
    }
}
