use time::OffsetDateTime;
use uuid::Uuid;

use crate::entities::AuditLog;
use crate::state::AppState;

/// Appends one audit record. Best-effort: a failed audit write is logged and
/// never fails the mutation it records.
pub async fn record(state: &AppState, actor_id: &str, action: &str, target_type: &str, target_id: &str) {
    let entry = AuditLog {
        id: Uuid::new_v4().to_string(),
        actor_id: actor_id.to_string(),
        action: action.to_string(),
        target_id: target_id.to_string(),
        target_type: target_type.to_string(),
        created_at: OffsetDateTime::now_utc(),
    };
    if let Err(error) = state.audit().create(&entry).await {
        tracing::warn!(%error, action, "audit record failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_append() {
        let state = AppState::in_memory();
        record(&state, "u1", "user.role", "user", "u2").await;
        record(&state, "u1", "user.delete", "user", "u3").await;

        let entries = state.audit().list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.actor_id == "u1"));
    }
}
