//! Network quiescence detection.

use aliven_core::{AlivenError, AlivenResult};
use futures::{Stream, StreamExt};
use std::collections::HashSet;
use std::time::Duration;

/// A request lifecycle event observed on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkActivity {
    Started(String),
    /// The request finished or failed.
    Settled(String),
}

/// Requests currently in flight on a page.
#[derive(Debug, Default)]
pub struct IdleTracker {
    in_flight: HashSet<String>,
}

impl IdleTracker {
    pub fn observe(&mut self, activity: NetworkActivity) {
        match activity {
            NetworkActivity::Started(id) => {
                self.in_flight.insert(id);
            }
            NetworkActivity::Settled(id) => {
                self.in_flight.remove(&id);
            }
        }
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_empty()
    }
}

/// Waits until no request has been in flight for `window`.
///
/// Any activity restarts the window. Fails with [`AlivenError::NetworkIdleTimeout`] when the
/// page does not settle within `timeout`, and with [`AlivenError::Navigation`] when the
/// activity stream ends while requests are still pending.
pub async fn wait_for_network_idle<S>(
    mut activity: S,
    window: Duration,
    timeout: Duration,
) -> AlivenResult<()>
where
    S: Stream<Item = NetworkActivity> + Unpin,
{
    let settle = async {
        let mut tracker = IdleTracker::default();
        loop {
            let idle = tracker.is_idle();
            tokio::select! {
                next = activity.next() => match next {
                    Some(event) => tracker.observe(event),
                    None if idle => return Ok(()),
                    None => {
                        return Err(AlivenError::Navigation(format!(
                            "page closed with {} requests pending",
                            tracker.in_flight()
                        )))
                    }
                },
                _ = tokio::time::sleep(window), if idle => return Ok(()),
            }
        }
    };

    tokio::time::timeout(timeout, settle)
        .await
        .map_err(|_| AlivenError::NetworkIdleTimeout(timeout))?
}
