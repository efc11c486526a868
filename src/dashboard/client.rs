//! HTTP client for the assignments API plus the dashboard's local state.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::assignments::repo_types::Assignment;
use crate::auth::dto::{LoginRequest, LoginResponse, RegisterRequest, RegisteredResponse};
use crate::dashboard::view::{self, Filter, Stats};
use crate::error::ErrorBody;

/// Client-side failure. `Api` carries the server's own `message` so callers
/// can show it verbatim.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{message}")]
    Api { status: u16, message: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("assignment {0} is not in the current list")]
    NotLoaded(Uuid),
}

/// Fields sent when creating an assignment. Only what the caller sets goes
/// on the wire.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAssignment {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub due_date: Option<OffsetDateTime>,
}

/// Fields sent on update; unset fields are left out of the body entirely,
/// so the server leaves them unchanged.
#[derive(Debug, Default, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentChanges {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub due_date: Option<OffsetDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
}

/// The surface the dashboard needs from the assignments API. Tests swap in
/// an in-memory implementation.
#[async_trait]
pub trait AssignmentsApi: Send + Sync {
    async fn list(&self) -> Result<Vec<Assignment>, ClientError>;
    async fn create(&self, new: NewAssignment) -> Result<Assignment, ClientError>;
    async fn update(&self, id: Uuid, changes: AssignmentChanges)
        -> Result<Assignment, ClientError>;
    async fn delete(&self, id: Uuid) -> Result<(), ClientError>;
}

/// `AssignmentsApi` over HTTP with an optional bearer token.
#[derive(Clone)]
pub struct HttpApi {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpApi {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn into_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        Ok(Self::check(response).await?.json::<T>().await?)
    }

    /// Turns a non-2xx response into `ClientError::Api`, keeping the
    /// server's `message` when the body has one.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.message,
            Err(_) => format!("request failed with status {status}"),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
    ) -> Result<RegisteredResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/register"))
            .json(&RegisterRequest {
                email: email.into(),
                password: password.into(),
            })
            .send()
            .await?;
        Self::into_json(response).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/login"))
            .json(&LoginRequest {
                email: email.into(),
                password: password.into(),
            })
            .send()
            .await?;
        Self::into_json(response).await
    }
}

#[async_trait]
impl AssignmentsApi for HttpApi {
    async fn list(&self) -> Result<Vec<Assignment>, ClientError> {
        let response = self.authed(self.http.get(self.url("/assignments"))).send().await?;
        Self::into_json(response).await
    }

    async fn create(&self, new: NewAssignment) -> Result<Assignment, ClientError> {
        let response = self
            .authed(self.http.post(self.url("/assignments")))
            .json(&new)
            .send()
            .await?;
        Self::into_json(response).await
    }

    async fn update(
        &self,
        id: Uuid,
        changes: AssignmentChanges,
    ) -> Result<Assignment, ClientError> {
        let response = self
            .authed(self.http.patch(self.url(&format!("/assignments/{id}"))))
            .json(&changes)
            .send()
            .await?;
        Self::into_json(response).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .authed(self.http.delete(self.url(&format!("/assignments/{id}"))))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

/// Local dashboard state over an `AssignmentsApi`.
///
/// Mutations call the API first and touch the local list only on success;
/// on failure the list is exactly as it was and the error carries the
/// server's message.
pub struct Dashboard {
    api: Arc<dyn AssignmentsApi>,
    assignments: Vec<Assignment>,
    pub filter: Filter,
    pub search: String,
}

impl Dashboard {
    pub fn new(api: Arc<dyn AssignmentsApi>) -> Self {
        Dashboard {
            api,
            assignments: Vec::new(),
            filter: Filter::All,
            search: String::new(),
        }
    }

    /// Replaces the local list with the server's.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        self.assignments = self.api.list().await?;
        Ok(())
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    /// The current filtered, searched, display-sorted view.
    pub fn visible(&self, now: OffsetDateTime) -> Vec<Assignment> {
        let mut rows: Vec<Assignment> = self
            .assignments
            .iter()
            .filter(|a| self.filter.matches(a, now))
            .filter(|a| view::matches_search(a, &self.search))
            .cloned()
            .collect();
        view::sort_for_display(&mut rows, now);
        rows
    }

    /// Counts over the whole list, regardless of filter and search.
    pub fn stats(&self, now: OffsetDateTime) -> Stats {
        view::stats(&self.assignments, now)
    }

    /// Creates on the server, then prepends locally (the list is
    /// newest-first, so this matches what a refetch would show).
    pub async fn add(&mut self, new: NewAssignment) -> Result<Assignment, ClientError> {
        let created = self.api.create(new).await?;
        self.assignments.insert(0, created.clone());
        Ok(created)
    }

    /// Flips completion relative to the local copy and stores the server's
    /// row. Returns the new completion state.
    pub async fn toggle(&mut self, id: Uuid) -> Result<bool, ClientError> {
        let target = !self
            .assignments
            .iter()
            .find(|a| a.id == id)
            .ok_or(ClientError::NotLoaded(id))?
            .is_completed;

        let changes = AssignmentChanges {
            is_completed: Some(target),
            ..AssignmentChanges::default()
        };
        let updated = self.api.update(id, changes).await?;
        if let Some(slot) = self.assignments.iter_mut().find(|a| a.id == id) {
            *slot = updated;
        }
        Ok(target)
    }

    /// Deletes on the server, then drops the local copy.
    pub async fn remove(&mut self, id: Uuid) -> Result<(), ClientError> {
        self.api.delete(id).await?;
        self.assignments.retain(|a| a.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use time::Duration;

    use super::*;
    use crate::dashboard::view::Status;

    /// In-memory stand-in for the HTTP API. `fail_next` makes the next
    /// call answer like a misbehaving server.
    #[derive(Default)]
    struct FakeApi {
        items: Mutex<Vec<Assignment>>,
        fail_next: AtomicBool,
    }

    impl FakeApi {
        fn seeded(items: Vec<Assignment>) -> Arc<Self> {
            Arc::new(FakeApi {
                items: Mutex::new(items),
                fail_next: AtomicBool::new(false),
            })
        }

        fn check_failure(&self) -> Result<(), ClientError> {
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(ClientError::Api {
                    status: 500,
                    message: "Internal server error".into(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl AssignmentsApi for FakeApi {
        async fn list(&self) -> Result<Vec<Assignment>, ClientError> {
            self.check_failure()?;
            Ok(self.items.lock().unwrap().clone())
        }

        async fn create(&self, new: NewAssignment) -> Result<Assignment, ClientError> {
            self.check_failure()?;
            let now = OffsetDateTime::now_utc();
            let created = Assignment {
                id: Uuid::new_v4(),
                user_id: Uuid::nil(),
                title: new.title,
                description: new.description,
                due_date: new.due_date,
                is_completed: false,
                created_at: now,
                updated_at: now,
            };
            self.items.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn update(
            &self,
            id: Uuid,
            changes: AssignmentChanges,
        ) -> Result<Assignment, ClientError> {
            self.check_failure()?;
            let mut items = self.items.lock().unwrap();
            let item = items
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| ClientError::Api {
                    status: 404,
                    message: "Assignment not found".into(),
                })?;
            if let Some(title) = changes.title {
                item.title = title;
            }
            if let Some(description) = changes.description {
                item.description = Some(description);
            }
            if let Some(due) = changes.due_date {
                item.due_date = Some(due);
            }
            if let Some(done) = changes.is_completed {
                item.is_completed = done;
            }
            item.updated_at = OffsetDateTime::now_utc();
            Ok(item.clone())
        }

        async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
            self.check_failure()?;
            let mut items = self.items.lock().unwrap();
            let before = items.len();
            items.retain(|a| a.id != id);
            if items.len() == before {
                return Err(ClientError::Api {
                    status: 404,
                    message: "Assignment not found".into(),
                });
            }
            Ok(())
        }
    }

    fn item(title: &str, due: Option<OffsetDateTime>, completed: bool) -> Assignment {
        let now = OffsetDateTime::now_utc();
        Assignment {
            id: Uuid::new_v4(),
            user_id: Uuid::nil(),
            title: title.into(),
            description: None,
            due_date: due,
            is_completed: completed,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn refresh_replaces_the_local_list() {
        let api = FakeApi::seeded(vec![item("a", None, false), item("b", None, true)]);
        let mut dashboard = Dashboard::new(api);
        assert!(dashboard.assignments().is_empty());

        dashboard.refresh().await.unwrap();
        assert_eq!(dashboard.assignments().len(), 2);
    }

    #[tokio::test]
    async fn toggle_flips_completion_and_keeps_the_server_row() {
        let target = item("essay", None, false);
        let id = target.id;
        let api = FakeApi::seeded(vec![target]);
        let mut dashboard = Dashboard::new(api);
        dashboard.refresh().await.unwrap();

        let now_completed = dashboard.toggle(id).await.unwrap();
        assert!(now_completed);
        assert!(dashboard.assignments()[0].is_completed);

        let reopened = dashboard.toggle(id).await.unwrap();
        assert!(!reopened);
        assert!(!dashboard.assignments()[0].is_completed);
    }

    #[tokio::test]
    async fn failed_toggle_leaves_local_state_untouched() {
        let target = item("essay", None, false);
        let id = target.id;
        let api = FakeApi::seeded(vec![target]);
        let mut dashboard = Dashboard::new(api.clone());
        dashboard.refresh().await.unwrap();

        api.fail_next.store(true, Ordering::SeqCst);
        let err = dashboard.toggle(id).await.unwrap_err();
        assert_eq!(err.to_string(), "Internal server error");
        assert!(!dashboard.assignments()[0].is_completed);
    }

    #[tokio::test]
    async fn remove_drops_the_item_only_on_success() {
        let target = item("essay", None, false);
        let id = target.id;
        let api = FakeApi::seeded(vec![target]);
        let mut dashboard = Dashboard::new(api.clone());
        dashboard.refresh().await.unwrap();

        api.fail_next.store(true, Ordering::SeqCst);
        assert!(dashboard.remove(id).await.is_err());
        assert_eq!(dashboard.assignments().len(), 1);

        dashboard.remove(id).await.unwrap();
        assert!(dashboard.assignments().is_empty());
    }

    #[tokio::test]
    async fn add_prepends_the_created_assignment() {
        let api = FakeApi::seeded(vec![item("old", None, false)]);
        let mut dashboard = Dashboard::new(api);
        dashboard.refresh().await.unwrap();

        let created = dashboard
            .add(NewAssignment {
                title: "new".into(),
                ..NewAssignment::default()
            })
            .await
            .unwrap();
        assert_eq!(dashboard.assignments()[0].id, created.id);
        assert_eq!(dashboard.assignments().len(), 2);
    }

    #[tokio::test]
    async fn server_404_message_surfaces_verbatim() {
        let api = FakeApi::seeded(Vec::new());
        let mut dashboard = Dashboard::new(api);
        dashboard.refresh().await.unwrap();

        let err = dashboard.remove(Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.to_string(), "Assignment not found");
    }

    #[tokio::test]
    async fn visible_composes_filter_search_and_sort() {
        let now = OffsetDateTime::now_utc();
        let mut late = item("late essay", Some(now - Duration::days(1)), false);
        late.description = Some("history".into());
        let soon = item("soon quiz", Some(now + Duration::hours(2)), false);
        let done = item("done essay", None, true);

        let api = FakeApi::seeded(vec![done, soon, late]);
        let mut dashboard = Dashboard::new(api);
        dashboard.refresh().await.unwrap();

        let all = dashboard.visible(now);
        let titles: Vec<&str> = all.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["late essay", "soon quiz", "done essay"]);

        dashboard.search = "essay".into();
        let essays = dashboard.visible(now);
        assert_eq!(essays.len(), 2);

        dashboard.search.clear();
        dashboard.filter = Filter::Overdue;
        let overdue = dashboard.visible(now);
        assert_eq!(overdue.len(), 1);
        assert_eq!(view::status_of(&overdue[0], now), Status::Overdue);

        let stats = dashboard.stats(now);
        assert_eq!((stats.total, stats.overdue, stats.completed), (3, 1, 1));
    }
}
