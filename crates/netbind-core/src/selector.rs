// ── Network selection ──
//
// Resolves the networks a tenant may attach to: its own non-shared
// networks first, then shared ones, optionally restricted to (and ordered
// by) a caller-supplied id list.

use tracing::debug;

use netbind_api::NetworkFilter;

use crate::error::CoreError;
use crate::model::Network;
use crate::remote::NetworkService;

/// Stable-sort `items` by the position of `key(item)` in `preferred`.
///
/// Items whose key is not in `preferred` keep their relative order and
/// land after every listed one. An empty `preferred` leaves `items` as is.
pub fn ensure_requested_ordering<T, F>(items: &mut [T], preferred: &[String], key: F)
where
    F: Fn(&T) -> &str,
{
    if preferred.is_empty() {
        return;
    }
    items.sort_by_key(|item| {
        let k = key(item);
        preferred
            .iter()
            .position(|p| p == k)
            .unwrap_or(usize::MAX)
    });
}

/// Networks available to `tenant_id`, private before shared.
///
/// With `requested_ids`, both listings are filtered to those ids and the
/// result follows their order. Unknown ids are silently absent; callers
/// that care compare lengths.
pub async fn available_networks(
    api: &dyn NetworkService,
    tenant_id: &str,
    requested_ids: &[String],
) -> Result<Vec<Network>, CoreError> {
    let private = NetworkFilter {
        tenant_id: Some(tenant_id.to_owned()),
        shared: Some(false),
        ids: requested_ids.to_vec(),
        ..NetworkFilter::default()
    };
    let mut nets = api.list_networks(&private).await?;

    let shared = NetworkFilter {
        shared: Some(true),
        ids: requested_ids.to_vec(),
        ..NetworkFilter::default()
    };
    nets.extend(api.list_networks(&shared).await?);

    ensure_requested_ordering(&mut nets, requested_ids, |n| n.id.as_str());
    debug!(tenant_id, count = nets.len(), "resolved available networks");
    Ok(nets)
}

/// Fail with `NetworkNotFound` unless every requested id resolved.
///
/// Duplicated ids are reported once, in request order.
pub fn ensure_all_found(requested_ids: &[String], nets: &[Network]) -> Result<(), CoreError> {
    let mut missing: Vec<&str> = Vec::new();
    for id in requested_ids {
        if !nets.iter().any(|n| &n.id == id) && !missing.contains(&id.as_str()) {
            missing.push(id);
        }
    }
    if missing.is_empty() {
        return Ok(());
    }
    debug!(missing = ?missing, "requested networks not available");
    Err(CoreError::NetworkNotFound {
        ids: missing.join(", "),
    })
}
