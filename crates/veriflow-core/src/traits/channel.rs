// SPDX-FileCopyrightText: 2026 Veriflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Outbound delivery capability for chat platforms (LINE, Telegram, etc.).

use async_trait::async_trait;

use crate::error::VeriflowError;
use crate::types::ConversationKey;

/// Minimal send capability the pipeline needs from a platform adapter.
///
/// Transport concerns (retry, signature, webhooks) live behind this trait
/// and are out of scope for the pipeline.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    /// Sends a plain text reply to the conversation.
    async fn send_text(
        &self,
        conversation: &ConversationKey,
        text: &str,
    ) -> Result<(), VeriflowError>;

    /// Sends a text reply with platform quick-reply suggestions.
    ///
    /// Platforms without quick-reply support may fall back to plain text.
    async fn send_with_quick_replies(
        &self,
        conversation: &ConversationKey,
        text: &str,
        replies: &[String],
    ) -> Result<(), VeriflowError>;
}
