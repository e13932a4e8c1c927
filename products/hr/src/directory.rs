//! The employee directory: single owner of "which employees exist".
//!
//! Remote state is read through an [`EmployeeApi`]; failures are absorbed and
//! replaced by the seed list or by optimistic local records. Every publication
//! goes through a watch channel, so subscribers always observe the latest list.

use std::collections::{BTreeSet, HashSet};

use platform_api::{ApiError, Synced};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::{
    api::EmployeeApi,
    employee::{Employee, EmployeeDraft},
    envelope::{Envelope, decode_acknowledgment, normalize},
    seed::fallback_employees,
};

pub struct EmployeeDirectory<A> {
    api: A,
    current: watch::Sender<Vec<Employee>>,
    /// Records created while the remote write was failing. Merged into every
    /// reload for the lifetime of the directory.
    pending: Mutex<Vec<Employee>>,
}

impl<A: EmployeeApi> EmployeeDirectory<A> {
    pub fn new(api: A) -> Self {
        let (current, _) = watch::channel(fallback_employees());
        Self {
            api,
            current,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> EmployeeSubscription {
        EmployeeSubscription {
            rx: self.current.subscribe(),
            primed: false,
        }
    }

    pub fn snapshot(&self) -> Vec<Employee> {
        self.current.borrow().clone()
    }

    pub async fn pending(&self) -> Vec<Employee> {
        self.pending.lock().await.clone()
    }

    /// Reads the remote list. A failed read resolves to the seed list.
    pub async fn fetch_list(&self) -> Synced<Envelope<Employee>> {
        match self.api.list().await {
            Ok(body) => Synced::Confirmed(normalize(body)),
            Err(cause) => {
                warn!(code = cause.code(), error = %cause, "employee list fetch failed; serving fallback");
                Synced::Degraded {
                    value: Envelope::ok(fallback_employees()),
                    cause,
                }
            }
        }
    }

    /// Reloads the list, merges pending local records and publishes the result.
    pub async fn refresh(&self) -> Synced<Vec<Employee>> {
        let fetched = match self.fetch_list().await {
            Synced::Confirmed(envelope) if envelope.success => Synced::Confirmed(envelope.data),
            Synced::Confirmed(_) => {
                warn!("employee list response reported failure; serving fallback");
                Synced::Degraded {
                    value: fallback_employees(),
                    cause: ApiError::Rejected,
                }
            }
            degraded => degraded.map(|envelope| envelope.data),
        };

        let pending = self.pending.lock().await;
        let merged = fetched.map(|list| merge_pending(list, &pending));
        self.current.send_replace(merged.value().clone());
        info!(
            count = merged.value().len(),
            pending = pending.len(),
            degraded = merged.is_degraded(),
            "employee list published"
        );
        merged
    }

    /// Submits a new record. When the write fails the record is kept locally
    /// under the next free id and reported as degraded.
    pub async fn create(&self, draft: EmployeeDraft) -> Synced<Employee> {
        match self.api.create(&draft).await {
            Ok(ack) => {
                let created = decode_acknowledgment(ack).unwrap_or_else(|| {
                    debug!("create acknowledgment carried no record; echoing draft");
                    draft.to_unassigned()
                });
                let reconciled = self.refresh().await;
                if let Some(cause) = reconciled.cause() {
                    debug!(code = cause.code(), "reload after create was degraded");
                }
                Synced::Confirmed(created)
            }
            Err(cause) => {
                let mut pending = self.pending.lock().await;
                let id = {
                    let current = self.current.borrow();
                    next_id(current.iter().chain(pending.iter()))
                };
                let record = draft.into_employee(id);
                warn!(
                    code = cause.code(),
                    error = %cause,
                    id,
                    "employee create failed; keeping record locally"
                );
                pending.push(record.clone());
                self.current.send_modify(|list| list.push(record.clone()));
                Synced::Degraded {
                    value: record,
                    cause,
                }
            }
        }
    }
}

/// Read-only handle on the published list.
///
/// The first [`next`](Self::next) yields the value current at subscription
/// time; later calls wait for the next publication. A reader that falls behind
/// sees only the newest list.
#[derive(Debug)]
pub struct EmployeeSubscription {
    rx: watch::Receiver<Vec<Employee>>,
    primed: bool,
}

impl EmployeeSubscription {
    pub fn latest(&self) -> Vec<Employee> {
        self.rx.borrow().clone()
    }

    /// Returns `None` once the directory has been dropped.
    pub async fn next(&mut self) -> Option<Vec<Employee>> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}

fn merge_pending(mut fetched: Vec<Employee>, pending: &[Employee]) -> Vec<Employee> {
    let known: HashSet<i64> = fetched.iter().map(|e| e.id).collect();
    fetched.extend(
        pending
            .iter()
            .filter(|record| !known.contains(&record.id))
            .cloned(),
    );
    fetched
}

/// `max + 1`, or the smallest free positive id once `max` is `i64::MAX`.
fn next_id<'a>(records: impl Iterator<Item = &'a Employee>) -> i64 {
    let ids: BTreeSet<i64> = records.map(|e| e.id).collect();
    match ids.last() {
        None => 1,
        Some(max) => max
            .checked_add(1)
            .unwrap_or_else(|| (1..).find(|id| !ids.contains(id)).unwrap_or(1)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use platform_api::ApiResult;
    use serde_json::{Value, json};

    use super::*;

    /// Replays queued responses; an empty queue behaves like a dead network.
    #[derive(Default)]
    struct ScriptedApi {
        lists: std::sync::Mutex<VecDeque<ApiResult<Value>>>,
        creates: std::sync::Mutex<VecDeque<ApiResult<Value>>>,
    }

    impl ScriptedApi {
        fn offline() -> Self {
            Self::default()
        }

        fn list_ok(self, body: Value) -> Self {
            self.lists.lock().unwrap().push_back(Ok(body));
            self
        }

        fn create_ok(self, body: Value) -> Self {
            self.creates.lock().unwrap().push_back(Ok(body));
            self
        }
    }

    fn offline_error() -> ApiError {
        ApiError::transport(anyhow::anyhow!("connection refused"))
    }

    #[async_trait]
    impl EmployeeApi for ScriptedApi {
        async fn list(&self) -> ApiResult<Value> {
            self.lists
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(offline_error()))
        }

        async fn create(&self, _draft: &EmployeeDraft) -> ApiResult<Value> {
            self.creates
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(offline_error()))
        }
    }

    fn record(id: i64) -> Value {
        json!({
            "id": id,
            "firstName": format!("First{id}"),
            "lastName": format!("Last{id}"),
            "dateOfBirth": "1991-03-04",
            "jobTitle": "Developer"
        })
    }

    fn draft(first: &str) -> EmployeeDraft {
        EmployeeDraft {
            first_name: first.into(),
            last_name: "Doe".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1999, 12, 31).unwrap(),
            job_title: "Tester".into(),
        }
    }

    fn ids(list: &[Employee]) -> Vec<i64> {
        list.iter().map(|e| e.id).collect()
    }

    #[tokio::test]
    async fn starts_with_fallback() {
        let directory = EmployeeDirectory::new(ScriptedApi::offline());
        assert_eq!(ids(&directory.snapshot()), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn fetch_failure_resolves_to_fallback() {
        let directory = EmployeeDirectory::new(ScriptedApi::offline());
        let fetched = directory.fetch_list().await;
        assert_eq!(fetched.cause().map(ApiError::code), Some("TRANSPORT"));
        let envelope = fetched.into_inner();
        assert!(envelope.success);
        assert_eq!(ids(&envelope.data), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn refresh_publishes_remote_list() {
        let api = ScriptedApi::offline().list_ok(json!({ "success": true, "data": [record(10), record(11)] }));
        let directory = EmployeeDirectory::new(api);
        let refreshed = directory.refresh().await;
        assert!(!refreshed.is_degraded());
        assert_eq!(ids(&directory.snapshot()), vec![10, 11]);
    }

    #[tokio::test]
    async fn rejected_response_is_degraded_fallback() {
        let api = ScriptedApi::offline().list_ok(json!({ "success": false, "data": [record(10)] }));
        let directory = EmployeeDirectory::new(api);
        let refreshed = directory.refresh().await;
        assert_eq!(refreshed.cause().map(ApiError::code), Some("REJECTED"));
        assert_eq!(ids(&directory.snapshot()), vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn failed_create_appends_next_id_and_survives_failing_refresh() {
        let directory = EmployeeDirectory::new(ScriptedApi::offline());
        let before = directory.snapshot().len();

        let created = directory.create(draft("X")).await;
        assert!(created.is_degraded());
        let created = created.into_inner();
        assert_eq!(created.id, 6);
        assert_eq!(created.first_name, "X");

        let published = directory.snapshot();
        assert_eq!(published.len(), before + 1);
        assert_eq!(published.last(), Some(&created));

        let refreshed = directory.refresh().await;
        assert!(refreshed.is_degraded());
        assert_eq!(ids(&directory.snapshot()), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(directory.pending().await, vec![created]);
    }

    #[tokio::test]
    async fn consecutive_failed_creates_get_distinct_ids() {
        let directory = EmployeeDirectory::new(ScriptedApi::offline());
        let first = directory.create(draft("A")).await.into_inner();
        let second = directory.create(draft("B")).await.into_inner();
        assert_eq!((first.id, second.id), (6, 7));
        assert_eq!(directory.snapshot().len(), 7);
    }

    #[tokio::test]
    async fn pending_record_is_merged_into_successful_reload() {
        let remote = json!([record(1), record(2), record(3), record(4), record(5)]);
        let api = ScriptedApi::offline().list_ok(remote);
        let directory = EmployeeDirectory::new(api);

        let created = directory.create(draft("X")).await.into_inner();
        assert_eq!(created.id, 6);
        assert_eq!(directory.snapshot().len(), 6);

        let refreshed = directory.refresh().await;
        assert!(!refreshed.is_degraded());
        let list = directory.snapshot();
        assert_eq!(ids(&list), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(list[5].first_name, "X");
    }

    #[tokio::test]
    async fn pending_record_yields_to_remote_record_with_same_id() {
        let api = ScriptedApi::offline().list_ok(json!([record(6)]));
        let directory = EmployeeDirectory::new(api);
        directory.create(draft("Local")).await;

        directory.refresh().await;
        let list = directory.snapshot();
        assert_eq!(ids(&list), vec![6]);
        assert_eq!(list[0].first_name, "First6");
    }

    #[tokio::test]
    async fn refresh_is_idempotent_with_stable_backend() {
        let remote = json!({ "data": [record(1), record(2), record(6)] });
        let api = ScriptedApi::offline()
            .list_ok(remote.clone())
            .list_ok(remote);
        let directory = EmployeeDirectory::new(api);
        directory.create(draft("Local")).await;

        let first = directory.refresh().await.into_inner();
        let second = directory.refresh().await.into_inner();
        assert_eq!(first, second);
        assert_eq!(ids(&second), vec![1, 2, 6]);
    }

    #[tokio::test]
    async fn successful_create_returns_ack_and_reloads() {
        let api = ScriptedApi::offline()
            .create_ok(json!({ "success": true, "data": record(42) }))
            .list_ok(json!([record(1), record(42)]));
        let directory = EmployeeDirectory::new(api);

        let created = directory.create(draft("X")).await;
        assert!(!created.is_degraded());
        assert_eq!(created.value().id, 42);
        assert_eq!(ids(&directory.snapshot()), vec![1, 42]);
        assert!(directory.pending().await.is_empty());
    }

    #[tokio::test]
    async fn successful_create_without_record_echoes_draft() {
        let api = ScriptedApi::offline().create_ok(json!({ "success": true }));
        let directory = EmployeeDirectory::new(api);

        let created = directory.create(draft("Echo")).await;
        assert!(!created.is_degraded());
        let created = created.into_inner();
        assert!(!created.is_assigned());
        assert_eq!(created.first_name, "Echo");
    }

    #[tokio::test]
    async fn subscriber_sees_latest_then_updates() {
        let api = ScriptedApi::offline().list_ok(json!([record(9)]));
        let directory = EmployeeDirectory::new(api);
        let mut subscription = directory.subscribe();

        let initial = subscription.next().await.unwrap();
        assert_eq!(ids(&initial), vec![1, 2, 3, 4, 5]);

        directory.refresh().await;
        let updated = subscription.next().await.unwrap();
        assert_eq!(ids(&updated), vec![9]);
        assert_eq!(ids(&subscription.latest()), vec![9]);
    }

    #[tokio::test]
    async fn late_subscriber_gets_only_latest() {
        let directory = EmployeeDirectory::new(ScriptedApi::offline());
        directory.create(draft("A")).await;
        directory.create(draft("B")).await;

        let mut late = directory.subscribe();
        let first = late.next().await.unwrap();
        assert_eq!(first.len(), 7);
    }

    #[tokio::test]
    async fn subscription_ends_when_directory_drops() {
        let directory = EmployeeDirectory::new(ScriptedApi::offline());
        let mut subscription = directory.subscribe();
        subscription.next().await;
        drop(directory);
        assert!(subscription.next().await.is_none());
    }

    #[test]
    fn next_id_starts_at_one() {
        assert_eq!(next_id(std::iter::empty()), 1);
    }

    #[test]
    fn next_id_reuses_gap_when_max_is_exhausted() {
        let records: Vec<Employee> = [1, 2, i64::MAX, 4]
            .into_iter()
            .map(|id| draft("Gap").into_employee(id))
            .collect();
        assert_eq!(next_id(records.iter()), 3);
    }

    #[tokio::test]
    async fn failed_create_after_max_remote_id_does_not_overflow() {
        let api = ScriptedApi::offline().list_ok(json!([record(i64::MAX)]));
        let directory = EmployeeDirectory::new(api);
        directory.refresh().await;

        let created = directory.create(draft("Overflow")).await;
        assert!(created.is_degraded());
        assert_eq!(created.value().id, 1);
        assert_eq!(ids(&directory.snapshot()), vec![i64::MAX, 1]);

        let second = directory.create(draft("Next")).await.into_inner();
        assert_eq!(second.id, 2);
    }
}
