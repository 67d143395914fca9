//! Message formatting utilities for client display.

use kaiwa_shared::time::timestamp_to_rfc3339;

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the banner shown once the WebSocket is open
    ///
    /// # Arguments
    ///
    /// * `room_id` - The room the session is attached to
    /// * `username` - The participant name used for the session
    pub fn format_connected(room_id: &str, username: &str) -> String {
        format!(
            "\n============================================================\n\
             Room: {}\n\
             You are '{}'. Type messages and press Enter to send. Press Ctrl+C to exit.\n\
             ============================================================\n",
            room_id, username
        )
    }

    /// Format a chat message
    ///
    /// Messages written by `current_username` are marked with "(me)".
    ///
    /// # Arguments
    ///
    /// * `from` - The username of the sender
    /// * `text` - The message text
    /// * `sent_at` - Unix timestamp set by the sender (milliseconds)
    /// * `current_username` - The username of this session
    pub fn format_chat_message(
        from: &str,
        text: &str,
        sent_at: i64,
        current_username: &str,
    ) -> String {
        let me_suffix = if from == current_username { " (me)" } else { "" };
        let timestamp_str = timestamp_to_rfc3339(sent_at);
        format!(
            "\n\n------------------------------------------------------------\n\
             @{}{}: {}\n\
             sent at {}\n\
             ------------------------------------------------------------\n",
            from, me_suffix, text, timestamp_str
        )
    }

    /// Format a confirmation message after sending
    pub fn format_sent_confirmation(sent_at: i64) -> String {
        let timestamp_str = timestamp_to_rfc3339(sent_at);
        format!("sent at {}\n", timestamp_str)
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }
}
