//! User-facing toasts and the notifiers that carry them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::collaborators::{MessageArgs, Notifier, Translator};

/// Message key used when an import fails.
pub const IMPORT_FAIL_KEY: &str = "message.import.fail";

const TOAST_CHANNEL_CAPACITY: usize = 64;

/// Toast severity. The pipeline only raises failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastKind {
    Error,
}

/// A notification ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub kind: ToastKind,
    pub key: String,
    pub path: Option<String>,
    pub err: Option<String>,
    /// Translated text.
    pub message: String,
}

impl Toast {
    /// Build the failure toast for a link URL and error text.
    pub fn import_failed(translator: &dyn Translator, url: &str, err: &str) -> Self {
        let args = MessageArgs {
            path: Some(url.to_string()),
            err: Some(err.to_string()),
        };
        Self {
            kind: ToastKind::Error,
            key: IMPORT_FAIL_KEY.to_string(),
            message: translator.translate(IMPORT_FAIL_KEY, &args),
            path: args.path,
            err: args.err,
        }
    }
}

/// Broadcasts toasts to any number of subscribers.
///
/// With no subscribers the toast is dropped.
#[derive(Clone)]
pub struct ToastBus {
    sender: broadcast::Sender<Toast>,
}

impl ToastBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(TOAST_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Toast> {
        self.sender.subscribe()
    }
}

impl Default for ToastBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for ToastBus {
    async fn notify(&self, toast: Toast) {
        if self.sender.send(toast).is_err() {
            tracing::debug!("toast dropped: no subscribers");
        }
    }
}

/// Writes toasts to the log.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, toast: Toast) {
        match toast.kind {
            ToastKind::Error => tracing::error!(key = %toast.key, "{}", toast.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTranslator;

    impl Translator for EchoTranslator {
        fn translate(&self, key: &str, args: &MessageArgs) -> String {
            format!(
                "{key}:{}:{}",
                args.path.as_deref().unwrap_or_default(),
                args.err.as_deref().unwrap_or_default()
            )
        }
    }

    #[test]
    fn test_import_failed_toast() {
        let toast = Toast::import_failed(&EchoTranslator, "http://x/a", "boom");
        assert_eq!(toast.kind, ToastKind::Error);
        assert_eq!(toast.key, IMPORT_FAIL_KEY);
        assert_eq!(toast.path.as_deref(), Some("http://x/a"));
        assert_eq!(toast.message, "message.import.fail:http://x/a:boom");
    }

    #[test]
    fn test_toast_serializes_kind_and_key() {
        let toast = Toast::import_failed(&EchoTranslator, "http://x/a", "boom");
        let value = serde_json::to_value(&toast).unwrap();
        assert_eq!(value["kind"], "error");
        assert_eq!(value["key"], IMPORT_FAIL_KEY);
    }

    #[tokio::test]
    async fn test_bus_delivers_to_subscriber() {
        let bus = ToastBus::new();
        let mut rx = bus.subscribe();
        let toast = Toast::import_failed(&EchoTranslator, "http://x/a", "boom");

        bus.notify(toast.clone()).await;
        assert_eq!(rx.recv().await.unwrap(), toast);
    }

    #[tokio::test]
    async fn test_bus_without_subscribers_does_not_fail() {
        let bus = ToastBus::new();
        bus.notify(Toast::import_failed(&EchoTranslator, "u", "e"))
            .await;
    }
}
