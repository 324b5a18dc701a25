use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::{Block, CollabError, HistoryEntry, Page, HISTORY_CAP};
use crate::store::PageStore;

/// Append a snapshot of the page's current (pre-mutation) blocks and version,
/// evicting the oldest entry once the log exceeds the cap.
pub fn record_history(page: &mut Page, author: Uuid, description: impl Into<String>) {
    page.history.push_back(HistoryEntry {
        version: page.version,
        blocks: page.blocks.clone(),
        timestamp: Utc::now(),
        author,
        description: description.into(),
    });
    while page.history.len() > HISTORY_CAP {
        page.history.pop_front();
    }
}

/// Replace the page's block set. Snapshot, apply, bump version, persist as
/// one unit; a store failure leaves nothing to broadcast.
pub async fn apply_blocks(
    store: &PageStore,
    page: &mut Page,
    blocks: Vec<Block>,
    author: Uuid,
    change_type: &str,
) -> Result<(), CollabError> {
    record_history(page, author, format!("Blocks updated ({})", change_type));
    page.blocks = blocks;
    page.version += 1;
    store.save_page(page).await?;
    debug!("Page {} advanced to version {}", page.id, page.version);
    Ok(())
}

/// Merge new settings into the page's settings map.
pub async fn apply_settings(
    store: &PageStore,
    page: &mut Page,
    settings: Map<String, Value>,
    author: Uuid,
) -> Result<(), CollabError> {
    record_history(page, author, "Settings updated");
    for (key, value) in settings {
        page.settings.insert(key, value);
    }
    page.version += 1;
    store.save_page(page).await
}

/// Rename the page.
pub async fn apply_title(
    store: &PageStore,
    page: &mut Page,
    title: String,
    author: Uuid,
) -> Result<(), CollabError> {
    record_history(page, author, format!("Title changed to '{}'", title));
    page.title = title;
    page.version += 1;
    store.save_page(page).await
}

/// Navigate the history window.
///
/// `undo` targets version−1, `redo` targets version+1, anything else targets
/// `explicit_version`. A target outside the retained window is a silent
/// no-op: `Ok(None)`, no state change, nothing persisted. A hit restores the
/// snapshot's blocks and sets `version = target` without appending history,
/// so repeated undo/redo can revisit entries without growing the log.
pub async fn navigate_history(
    store: &PageStore,
    page: &mut Page,
    action: &str,
    explicit_version: Option<i64>,
) -> Result<Option<i64>, CollabError> {
    let target = match action {
        "undo" => page.version - 1,
        "redo" => page.version + 1,
        _ => match explicit_version {
            Some(v) => v,
            None => return Ok(None),
        },
    };

    let Some(entry) = page.history.iter().find(|e| e.version == target) else {
        debug!(
            "History target {} not retained for page {}; ignoring",
            target, page.id
        );
        return Ok(None);
    };

    page.blocks = entry.blocks.clone();
    page.version = target;
    store.save_page(page).await?;
    info!("Page {} navigated to version {}", page.id, target);
    Ok(Some(target))
}
