//! Navigator that forwards transition requests over a tokio channel.
//!
//! The host loop owns the receiving end and calls
//! `ScreenSession::activate` for each request it pulls off the channel.

use tokio::sync::mpsc;
use tracing::warn;

use crate::models::NavigationRequest;
use crate::traits::Navigator;

/// [`Navigator`] backed by an unbounded mpsc sender.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<NavigationRequest>,
}

impl ChannelNavigator {
    /// Create a navigator and the receiver the host should poll.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<NavigationRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Wrap an existing sender.
    pub fn from_sender(tx: mpsc::UnboundedSender<NavigationRequest>) -> Self {
        Self { tx }
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&mut self, request: NavigationRequest) {
        if let Err(err) = self.tx.send(request) {
            warn!("Navigation dropped, host receiver closed: {}", err.0.screen);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_requests_arrive_in_order() {
        let (mut navigator, mut rx) = ChannelNavigator::new();
        navigator.navigate(NavigationRequest::new("LinkingStep1"));
        navigator.navigate(NavigationRequest::with_params(
            "Error",
            json!({"message": "boom"}),
        ));

        assert_eq!(rx.recv().await.unwrap().screen, "LinkingStep1");
        let second = rx.recv().await.unwrap();
        assert_eq!(second.screen, "Error");
        assert_eq!(second.params, Some(json!({"message": "boom"})));
    }

    #[test]
    fn test_closed_receiver_does_not_panic() {
        let (mut navigator, rx) = ChannelNavigator::new();
        drop(rx);
        navigator.navigate(NavigationRequest::new("Home"));
    }
}
