use std::sync::Arc;

use futures::StreamExt;

use crate::mapping::Scope;
use crate::router::Router;

use super::DataChange;

/// Drains a worker's notification channel into the router
///
/// At most `max_in_flight` changes are routed at a time; returns once every
/// sender is gone and the channel is empty.
pub async fn dispatch_notifications(
    notifications: flume::Receiver<DataChange>,
    router: Arc<Router>,
    scope: Scope,
    max_in_flight: usize,
) {
    notifications
        .into_stream()
        .for_each_concurrent(max_in_flight, |change| {
            let router = router.clone();
            let scope = scope.clone();
            async move {
                log::trace!(
                    "Data change on {scope}:{} = {} (source time {:?})",
                    change.channel,
                    change.value,
                    change.source_timestamp
                );
                router.route(&scope, &change.channel, change.value);
            }
        })
        .await;
    log::debug!("Notification dispatch for {scope} finished");
}
