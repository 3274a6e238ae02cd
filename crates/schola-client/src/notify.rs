//! Transaction notice bus.
//!
//! Write paths publish pending/confirmed/failed notices keyed off the
//! transaction future's lifecycle. Rendering them (toasts, status bars) is
//! the embedding application's concern; this crate only provides the bus.

use std::future::Future;

use schola_ledger::TxReceipt;
use tokio::sync::broadcast;

use crate::checkout::CheckoutError;

/// Lifecycle notice for one write transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxNotice {
    /// The transaction was submitted and is being processed.
    Pending {
        /// Human-readable operation label (e.g. the course title).
        label: String,
    },
    /// The transaction was mined.
    Confirmed {
        label: String,
        /// Receipt hash, for explorer links.
        tx_hash: String,
    },
    /// The transaction reverted or failed to submit.
    Failed {
        label: String,
        message: String,
    },
}

/// Broadcast bus for transaction notices.
#[derive(Clone)]
pub struct TxNotifier {
    sender: broadcast::Sender<TxNotice>,
}

impl TxNotifier {
    /// Create a bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to notices.
    pub fn subscribe(&self) -> broadcast::Receiver<TxNotice> {
        self.sender.subscribe()
    }

    /// Emit a notice. Send errors (no subscribers) are ignored.
    pub fn emit(&self, notice: TxNotice) {
        let _ = self.sender.send(notice);
    }

    /// Drive a transaction future, publishing `Pending` before it runs and
    /// `Confirmed`/`Failed` from its outcome. The outcome is passed through
    /// unchanged for the caller to report.
    pub async fn watch<F>(&self, label: &str, fut: F) -> Result<TxReceipt, CheckoutError>
    where
        F: Future<Output = Result<TxReceipt, CheckoutError>>,
    {
        self.emit(TxNotice::Pending {
            label: label.to_string(),
        });
        match fut.await {
            Ok(receipt) => {
                self.emit(TxNotice::Confirmed {
                    label: label.to_string(),
                    tx_hash: receipt.tx_hash.to_string(),
                });
                Ok(receipt)
            }
            Err(error) => {
                self.emit(TxNotice::Failed {
                    label: label.to_string(),
                    message: error.to_string(),
                });
                Err(error)
            }
        }
    }
}

impl Default for TxNotifier {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use schola_types::Fingerprint;

    use super::*;

    #[tokio::test]
    async fn test_watch_emits_pending_then_confirmed() {
        let notifier = TxNotifier::new(8);
        let mut rx = notifier.subscribe();

        let receipt = TxReceipt {
            tx_hash: Fingerprint([0x01; 32]),
            block: 1,
        };
        let result = notifier
            .watch("Intro to Solidity", async { Ok(receipt.clone()) })
            .await;
        assert!(result.is_ok());

        assert!(matches!(
            rx.try_recv().expect("pending"),
            TxNotice::Pending { .. }
        ));
        match rx.try_recv().expect("confirmed") {
            TxNotice::Confirmed { tx_hash, .. } => {
                assert_eq!(tx_hash, receipt.tx_hash.to_string());
            }
            other => unreachable!("expected Confirmed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_watch_emits_failed_and_rethrows() {
        let notifier = TxNotifier::new(8);
        let mut rx = notifier.subscribe();

        let result = notifier
            .watch("Intro to Solidity", async {
                Err(CheckoutError::Transaction {
                    message: "revert".to_string(),
                })
            })
            .await;
        assert!(result.is_err());

        assert!(matches!(
            rx.try_recv().expect("pending"),
            TxNotice::Pending { .. }
        ));
        assert!(matches!(
            rx.try_recv().expect("failed"),
            TxNotice::Failed { .. }
        ));
    }
}
