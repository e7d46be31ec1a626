//! Stream one reply from the chat API to stdout.
//!
//! Reads `CHAT_API_BASE_URL` and `CHAT_API_TOKEN` from the environment
//! (or `.env`).
//!
//! ```text
//! cargo run --example chat_stream -- <session-id> "your message"
//! ```

use std::io::Write;

use unai_chat::{OutboundMessage, StreamId, StreamingChatClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let session_id = args.next().ok_or("usage: chat_stream <session-id> <message>")?;
    let text = args.collect::<Vec<_>>().join(" ");

    let client = StreamingChatClient::from_env()?;
    let message = OutboundMessage::user(text, chrono::Utc::now().to_rfc3339());

    let result = client
        .send(&session_id, &message, |text: &str, is_last: bool, id: &StreamId| {
            if is_last {
                println!("\n--- end of {} ---", id);
            } else {
                print!("{}", text);
                let _ = std::io::stdout().flush();
            }
        })
        .await;

    match result {
        Ok(stream_id) => println!("Stream {} completed", stream_id),
        Err(e) => eprintln!("Stream failed: {}", e),
    }

    Ok(())
}
