//! Audit trail storage
//!
//! Append-only: there is no delete or update interface. Appends are
//! serialized through a process-wide lock so sequence numbers never collide,
//! and every entry hashes its predecessor into a verifiable chain.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use super::types::{AuditAction, AuditEntry, AuditQuery, ChainBreak, ChainVerification};
use crate::utils::{AppResult, time};

/// Stored row, including the store-native id
#[derive(Debug, Clone, serde::Deserialize)]
struct AuditRecord {
    #[allow(dead_code)]
    id: surrealdb::RecordId,
    sequence: u64,
    timestamp: i64,
    action: AuditAction,
    resource_type: String,
    resource_id: String,
    operator_id: Option<String>,
    operator_name: Option<String>,
    details: serde_json::Value,
    prev_hash: String,
    curr_hash: String,
}

impl From<AuditRecord> for AuditEntry {
    fn from(r: AuditRecord) -> Self {
        AuditEntry {
            id: r.sequence,
            timestamp: r.timestamp,
            action: r.action,
            resource_type: r.resource_type,
            resource_id: r.resource_id,
            operator_id: r.operator_id,
            operator_name: r.operator_name,
            details: r.details,
            prev_hash: r.prev_hash,
            curr_hash: r.curr_hash,
        }
    }
}

/// Tail of the chain
#[derive(Debug, serde::Deserialize)]
struct LastEntry {
    sequence: u64,
    curr_hash: String,
}

#[derive(Debug, serde::Deserialize)]
struct CountResult {
    total: u64,
}

/// Insert shape, without the store-native id
#[derive(Debug, serde::Serialize)]
struct AuditInsert {
    sequence: u64,
    timestamp: i64,
    action: AuditAction,
    resource_type: String,
    resource_id: String,
    operator_id: Option<String>,
    operator_name: Option<String>,
    details: serde_json::Value,
    prev_hash: String,
    curr_hash: String,
}

#[derive(Clone)]
pub struct AuditStorage {
    db: Surreal<Db>,
    /// Serializes appends; the sequence read and the insert are not one
    /// store transaction
    append_lock: Arc<tokio::sync::Mutex<()>>,
}

impl AuditStorage {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            db,
            append_lock: Arc::new(tokio::sync::Mutex::new(())),
        }
    }

    /// Append one entry: read the chain tail, hash, insert
    pub async fn append(
        &self,
        action: AuditAction,
        resource_type: String,
        resource_id: String,
        operator_id: Option<String>,
        operator_name: Option<String>,
        details: serde_json::Value,
    ) -> AppResult<AuditEntry> {
        let _guard = self.append_lock.lock().await;

        let mut result = self
            .db
            .query("SELECT sequence, curr_hash FROM audit_log ORDER BY sequence DESC LIMIT 1")
            .await?;
        let last: Vec<LastEntry> = result.take(0)?;

        let (sequence, prev_hash) = match last.first() {
            Some(last) => (last.sequence + 1, last.curr_hash.clone()),
            None => (1, "genesis".to_string()),
        };

        let timestamp = time::now_millis();
        let curr_hash = compute_entry_hash(
            &prev_hash,
            sequence,
            timestamp,
            &action,
            &resource_type,
            &resource_id,
            operator_id.as_deref(),
            operator_name.as_deref(),
            &details,
        );

        let entry = AuditEntry {
            id: sequence,
            timestamp,
            action,
            resource_type: resource_type.clone(),
            resource_id: resource_id.clone(),
            operator_id: operator_id.clone(),
            operator_name: operator_name.clone(),
            details: details.clone(),
            prev_hash: prev_hash.clone(),
            curr_hash: curr_hash.clone(),
        };

        let insert = AuditInsert {
            sequence,
            timestamp,
            action,
            resource_type,
            resource_id,
            operator_id,
            operator_name,
            details,
            prev_hash,
            curr_hash,
        };

        let mut res = self
            .db
            .query("CREATE audit_log CONTENT $data")
            .bind(("data", insert))
            .await?;
        let _: Vec<AuditRecord> = res.take(0)?;

        Ok(entry)
    }

    /// Fire-and-forget append for request handlers.
    ///
    /// The audited mutation is already persisted by the time this runs, so
    /// a failed audit write is logged and swallowed rather than turning a
    /// successful request into an error.
    pub async fn log(
        &self,
        action: AuditAction,
        resource_type: &str,
        resource_id: &str,
        operator_id: Option<String>,
        operator_name: Option<String>,
        details: serde_json::Value,
    ) {
        if let Err(e) = self
            .append(
                action,
                resource_type.to_string(),
                resource_id.to_string(),
                operator_id,
                operator_name,
                details,
            )
            .await
        {
            tracing::warn!(target: "audit", error = %e, "Failed to append audit entry");
        }
    }

    pub async fn query(&self, q: &AuditQuery) -> AppResult<(Vec<AuditEntry>, u64)> {
        let mut conditions = Vec::new();
        if q.from.is_some() {
            conditions.push("timestamp >= $from");
        }
        if q.to.is_some() {
            conditions.push("timestamp <= $to");
        }
        if q.action.is_some() {
            conditions.push("action = $action");
        }
        if q.operator_id.is_some() {
            conditions.push("operator_id = $operator_id");
        }
        if q.resource_type.is_some() {
            conditions.push("resource_type = $resource_type");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            "SELECT count() as total FROM audit_log{where_clause} GROUP ALL; \
             SELECT * FROM audit_log{where_clause} ORDER BY sequence DESC LIMIT {} START {}",
            q.limit, q.offset
        );

        let mut qb = self.db.query(sql);
        if let Some(from) = q.from {
            qb = qb.bind(("from", from));
        }
        if let Some(to) = q.to {
            qb = qb.bind(("to", to));
        }
        if let Some(ref action) = q.action {
            let action_str = serde_json::to_value(action)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            qb = qb.bind(("action", action_str));
        }
        if let Some(ref operator_id) = q.operator_id {
            qb = qb.bind(("operator_id", operator_id.clone()));
        }
        if let Some(ref resource_type) = q.resource_type {
            qb = qb.bind(("resource_type", resource_type.clone()));
        }

        let mut result = qb.await?;
        let count_result: Vec<CountResult> = result.take(0)?;
        let total = count_result.first().map(|c| c.total).unwrap_or(0);
        let records: Vec<AuditRecord> = result.take(1)?;
        Ok((records.into_iter().map(AuditEntry::from).collect(), total))
    }

    /// Walk the whole chain and report every break: a prev_hash that does
    /// not match its predecessor, or a stored hash that no longer matches
    /// the entry's own fields
    pub async fn verify_chain(&self) -> AppResult<ChainVerification> {
        let mut result = self
            .db
            .query("SELECT * FROM audit_log ORDER BY sequence ASC")
            .await?;
        let records: Vec<AuditRecord> = result.take(0)?;

        let mut breaks = Vec::new();
        let mut expected_prev = "genesis".to_string();
        for r in &records {
            if r.prev_hash != expected_prev {
                breaks.push(ChainBreak {
                    entry_id: r.sequence,
                    expected_hash: expected_prev.clone(),
                    actual_hash: r.prev_hash.clone(),
                });
            }
            let recomputed = compute_entry_hash(
                &r.prev_hash,
                r.sequence,
                r.timestamp,
                &r.action,
                &r.resource_type,
                &r.resource_id,
                r.operator_id.as_deref(),
                r.operator_name.as_deref(),
                &r.details,
            );
            if recomputed != r.curr_hash {
                breaks.push(ChainBreak {
                    entry_id: r.sequence,
                    expected_hash: recomputed,
                    actual_hash: r.curr_hash.clone(),
                });
            }
            expected_prev = r.curr_hash.clone();
        }

        Ok(ChainVerification {
            total_entries: records.len() as u64,
            chain_intact: breaks.is_empty(),
            breaks,
        })
    }
}

/// Restore integers the store read back as floats, so the hashed JSON is
/// identical on write and on re-read. Only |value| <= 2^53 converts
/// losslessly.
fn normalize_json(value: &serde_json::Value) -> serde_json::Value {
    const MAX_SAFE_INT: f64 = (1_i64 << 53) as f64;

    match value {
        serde_json::Value::Number(n) => {
            if let Some(f) = n.as_f64()
                && f.fract() == 0.0
                && f.abs() <= MAX_SAFE_INT
            {
                return serde_json::Value::Number(serde_json::Number::from(f as i64));
            }
            value.clone()
        }
        serde_json::Value::Object(map) => {
            let normalized: serde_json::Map<String, serde_json::Value> = map
                .iter()
                .map(|(k, v)| (k.clone(), normalize_json(v)))
                .collect();
            serde_json::Value::Object(normalized)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(normalize_json).collect())
        }
        _ => value.clone(),
    }
}

/// SHA256 over every stored field.
///
/// Variable-length fields are separated with `\x00` so adjacent values
/// cannot collide; fixed-width numbers go in as LE bytes; optional fields
/// carry a tag byte so None and Some("") differ; the action hashes in its
/// serde form, which is stable across versions unlike Debug.
fn compute_entry_hash(
    prev_hash: &str,
    id: u64,
    timestamp: i64,
    action: &AuditAction,
    resource_type: &str,
    resource_id: &str,
    operator_id: Option<&str>,
    operator_name: Option<&str>,
    details: &serde_json::Value,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(prev_hash.as_bytes());
    hasher.update(b"\x00");

    hasher.update(id.to_le_bytes());
    hasher.update(timestamp.to_le_bytes());

    let action_str = serde_json::to_string(action).unwrap_or_default();
    hasher.update(action_str.as_bytes());
    hasher.update(b"\x00");

    hasher.update(resource_type.as_bytes());
    hasher.update(b"\x00");
    hasher.update(resource_id.as_bytes());
    hasher.update(b"\x00");

    hash_optional(&mut hasher, operator_id);
    hash_optional(&mut hasher, operator_name);

    let normalized = normalize_json(details);
    let details_json = serde_json::to_string(&normalized).unwrap_or_default();
    hasher.update(details_json.as_bytes());
    hasher.update(b"\x00");

    format!("{:x}", hasher.finalize())
}

/// `\x00` = None, `\x01` + bytes + `\x00` = Some
fn hash_optional(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update(b"\x01");
            hasher.update(v.as_bytes());
        }
        None => {
            hasher.update(b"\x00");
        }
    }
    hasher.update(b"\x00");
}
