//! Shopper-facing notices and the sinks that deliver them.
//!
//! Every failed or rejected cart operation produces exactly one [`Notice`].
//! The four [`NoticeKind`]s are the only signal the shopper gets; error
//! details stay in the logs.

use std::fmt;

use rocketshoes_core::ProductId;
use serde::Serialize;
use tokio::sync::mpsc;

/// The kinds of message surfaced to the shopper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    /// The requested quantity is more than the stock on hand.
    StockExceeded,
    /// Adding a product failed.
    AddFailed,
    /// Removing a product failed.
    RemoveFailed,
    /// Changing a quantity failed.
    UpdateFailed,
}

impl NoticeKind {
    /// Message shown to the shopper.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::StockExceeded => "Requested quantity is out of stock",
            Self::AddFailed => "Could not add product",
            Self::RemoveFailed => "Could not remove product",
            Self::UpdateFailed => "Could not update product quantity",
        }
    }

    /// Whether the notice reports a failure rather than the stock limit.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        !matches!(self, Self::StockExceeded)
    }
}

impl fmt::Display for NoticeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// A notice about one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub product_id: ProductId,
}

impl Notice {
    #[must_use]
    pub const fn new(kind: NoticeKind, product_id: ProductId) -> Self {
        Self { kind, product_id }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (product {})", self.kind, self.product_id)
    }
}

/// Destination for shopper notices (toast, status line, channel...).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Sink that writes notices to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    fn notify(&self, notice: Notice) {
        // The stock limit is an expected outcome, not a warning
        if notice.kind.is_failure() {
            tracing::warn!(
                kind = ?notice.kind,
                product_id = %notice.product_id,
                "{}",
                notice.kind.message()
            );
        } else {
            tracing::info!(
                kind = ?notice.kind,
                product_id = %notice.product_id,
                "{}",
                notice.kind.message()
            );
        }
    }
}

/// Sink that forwards notices to a channel, for UIs and tests.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelSink {
    /// Create a sink and the receiver its notices arrive on.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl NotificationSink for ChannelSink {
    fn notify(&self, notice: Notice) {
        // A dropped receiver means nobody is listening any more
        let _ = self.tx.send(notice);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_messages_are_distinct() {
        let kinds = [
            NoticeKind::StockExceeded,
            NoticeKind::AddFailed,
            NoticeKind::RemoveFailed,
            NoticeKind::UpdateFailed,
        ];
        let mut messages: Vec<&str> = kinds.iter().map(|k| k.message()).collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), 4);
    }

    #[test]
    fn test_only_stock_limit_is_not_a_failure() {
        assert!(!NoticeKind::StockExceeded.is_failure());
        assert!(NoticeKind::AddFailed.is_failure());
        assert!(NoticeKind::RemoveFailed.is_failure());
        assert!(NoticeKind::UpdateFailed.is_failure());
    }

    #[test]
    fn test_notice_display() {
        let notice = Notice::new(NoticeKind::RemoveFailed, ProductId::new(3));
        assert_eq!(notice.to_string(), "Could not remove product (product 3)");
    }

    #[test]
    fn test_notice_kind_serializes_snake_case() {
        let json = serde_json::to_string(&NoticeKind::StockExceeded).unwrap();
        assert_eq!(json, "\"stock_exceeded\"");
    }

    #[test]
    fn test_channel_sink_delivers() {
        let (sink, mut rx) = ChannelSink::channel();
        sink.notify(Notice::new(NoticeKind::AddFailed, ProductId::new(1)));
        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.kind, NoticeKind::AddFailed);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (sink, rx) = ChannelSink::channel();
        drop(rx);
        sink.notify(Notice::new(NoticeKind::UpdateFailed, ProductId::new(1)));
    }
}
