use serde_json::Value;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use super::confirm::{Confirm, DELETE_PROMPT};
use super::generation::{RequestGeneration, Synced};
use super::SyncError;
use crate::api::{ApiClient, HttpTransport, Method, ReqwestTransport};
use crate::models::{pending_count, Loadable, NewTask, Task, TaskPatch};

/// Held task list plus the mutations that resynchronize it.
///
/// Every mutation is followed by a full refetch; nothing is patched locally.
pub struct TaskController<T: HttpTransport = ReqwestTransport> {
    api: ApiClient<T>,
    generation: RequestGeneration,
    tasks: Mutex<Loadable<Vec<Task>>>,
}

impl<T: HttpTransport> TaskController<T> {
    pub fn new(api: ApiClient<T>) -> Self {
        Self {
            api,
            generation: RequestGeneration::new(),
            tasks: Mutex::new(Loadable::NotLoaded),
        }
    }

    fn held(&self) -> MutexGuard<'_, Loadable<Vec<Task>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub async fn list(&self) -> Result<Synced<Vec<Task>>, SyncError> {
        let ticket = self.generation.begin();
        let tasks: Vec<Task> = self.api.get_json("/tasks").await?;

        let mut held = self.held();
        if !self.generation.is_current(ticket) {
            debug!("Discarding superseded task list ({} tasks)", tasks.len());
            return Ok(Synced::Superseded);
        }
        debug!("Loaded {} tasks", tasks.len());
        *held = Loadable::Loaded(tasks.clone());
        Ok(Synced::Applied(tasks))
    }

    pub async fn create(&self, title: &str) -> Result<Synced<Vec<Task>>, SyncError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SyncError::EmptyInput("title"));
        }

        let _: Value = self
            .api
            .send_json("/tasks", Method::Post, Some(&NewTask { title }), true)
            .await?;
        debug!("Created task {:?}", title);
        self.list().await
    }

    pub async fn toggle(&self, id: &str, completed: bool) -> Result<Synced<Vec<Task>>, SyncError> {
        let _: Value = self
            .api
            .send_json(
                &format!("/tasks/{}", id),
                Method::Patch,
                Some(&TaskPatch { completed }),
                true,
            )
            .await?;
        debug!("Marked task {} completed={}", id, completed);
        self.list().await
    }

    /// Deletes after asking `confirm`. Returns `None` when the operator declined;
    /// no call is made in that case.
    pub async fn delete(
        &self,
        id: &str,
        confirm: &dyn Confirm,
    ) -> Result<Option<Synced<Vec<Task>>>, SyncError> {
        if !confirm.confirm(DELETE_PROMPT) {
            debug!("Delete of task {} declined", id);
            return Ok(None);
        }

        self.api
            .request(&format!("/tasks/{}", id), Method::Delete, None, true)
            .await?;
        debug!("Deleted task {}", id);
        self.list().await.map(Some)
    }

    pub fn snapshot(&self) -> Loadable<Vec<Task>> {
        self.held().clone()
    }

    /// `None` until a list has been loaded.
    pub fn pending_count(&self) -> Option<usize> {
        self.held().as_ref().map(|tasks| pending_count(tasks))
    }

    pub fn completed_count(&self) -> Option<usize> {
        self.held()
            .as_ref()
            .map(|tasks| tasks.len() - pending_count(tasks))
    }

    /// Forgets the held list, e.g. on sign-out.
    pub fn clear(&self) {
        self.generation.begin();
        *self.held() = Loadable::NotLoaded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{wait_for_requests, GatedTransport, MockTransport, TEST_BASE};
    use crate::api::ApiError;
    use crate::models::AuthState;
    use crate::session::test_support::authenticated_session;
    use crate::session::SessionStore;
    use crate::sync::confirm::{Confirmed, Declined};
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    fn controller<T: HttpTransport>(transport: T, session: SessionStore) -> TaskController<T> {
        TaskController::new(ApiClient::with_transport(transport, TEST_BASE, session))
    }

    fn task_json(id: &str, title: &str, completed: bool) -> serde_json::Value {
        json!({"id": id, "title": title, "completed": completed, "created_at": "2025-01-01T00:00:00Z"})
    }

    #[tokio::test]
    async fn list_distinguishes_empty_from_not_loaded() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond("GET /tasks", 200, "[]");
        let tasks = controller(mock.clone(), session);

        assert_eq!(tasks.snapshot(), Loadable::NotLoaded);
        assert_eq!(tasks.pending_count(), None);

        tasks.list().await.unwrap();

        assert_eq!(tasks.snapshot(), Loadable::Loaded(vec![]));
        assert_eq!(tasks.pending_count(), Some(0));
    }

    #[tokio::test]
    async fn list_counts_pending_and_completed() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond_json(
            "GET /tasks",
            200,
            json!([task_json("1", "a", false), task_json("2", "b", true), task_json("3", "c", false)]),
        );
        let tasks = controller(mock.clone(), session);

        tasks.list().await.unwrap();

        assert_eq!(tasks.pending_count(), Some(2));
        assert_eq!(tasks.completed_count(), Some(1));
    }

    #[tokio::test]
    async fn create_posts_trimmed_title_then_refetches() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond_json("POST /tasks", 201, task_json("1", "buy milk", false));
        mock.respond_json("GET /tasks", 200, json!([task_json("1", "buy milk", false)]));
        let tasks = controller(mock.clone(), session);

        let synced = tasks.create("  buy milk ").await.unwrap();

        assert_eq!(mock.routes(), vec!["POST /tasks", "GET /tasks"]);
        assert_eq!(mock.requests()[0].body, Some(json!({"title": "buy milk"})));
        assert_eq!(synced.applied().unwrap()[0].title, "buy milk");
    }

    #[tokio::test]
    async fn toggle_patches_completed_then_refetches() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond_json("PATCH /tasks/7", 200, task_json("7", "a", true));
        mock.respond_json("GET /tasks", 200, json!([task_json("7", "a", true)]));
        let tasks = controller(mock.clone(), session);

        tasks.toggle("7", true).await.unwrap();

        assert_eq!(mock.routes(), vec!["PATCH /tasks/7", "GET /tasks"]);
        assert_eq!(mock.requests()[0].body, Some(json!({"completed": true})));
        assert_eq!(tasks.completed_count(), Some(1));
    }

    #[tokio::test]
    async fn declined_delete_makes_no_call() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        let tasks = controller(mock.clone(), session);

        let result = tasks.delete("7", &Declined).await.unwrap();

        assert!(result.is_none());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_then_refetches() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond("DELETE /tasks/7", 204, "");
        mock.respond("GET /tasks", 200, "[]");
        let tasks = controller(mock.clone(), session);

        let result = tasks.delete("7", &Confirmed).await.unwrap();

        assert_eq!(result, Some(Synced::Applied(vec![])));
        assert_eq!(mock.routes(), vec!["DELETE /tasks/7", "GET /tasks"]);
    }

    #[tokio::test]
    async fn unauthorized_list_invalidates_session() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond("GET /tasks", 401, "Invalid token");
        let tasks = controller(mock.clone(), session.clone());

        let err = tasks.list().await.unwrap_err();

        assert!(err.is_auth());
        assert_eq!(session.auth_state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn failed_refetch_keeps_previous_list() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond_json("GET /tasks", 200, json!([task_json("1", "a", false)]));
        mock.respond("GET /tasks", 500, "boom");
        let tasks = controller(mock.clone(), session);

        tasks.list().await.unwrap();
        let err = tasks.list().await.unwrap_err();

        assert!(matches!(err, SyncError::Api(ApiError::Api { status: 500, .. })));
        assert_eq!(tasks.snapshot().as_ref().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn superseded_list_does_not_overwrite_newer_state() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond_json("GET /tasks", 200, json!([task_json("1", "old", false)]));
        mock.respond_json("GET /tasks", 200, json!([task_json("1", "new", false)]));
        let (gated, release) = GatedTransport::new(mock.clone());
        let tasks = Arc::new(controller(gated, session));

        let slow = tokio::spawn({
            let tasks = Arc::clone(&tasks);
            async move { tasks.list().await }
        });
        wait_for_requests(&mock, 1).await;

        let fast = tasks.list().await.unwrap();
        release.send(()).unwrap();
        let slow = slow.await.unwrap().unwrap();

        assert!(matches!(fast, Synced::Applied(_)));
        assert_eq!(slow, Synced::Superseded);
        assert_eq!(tasks.snapshot().as_ref().unwrap()[0].title, "new");
    }

    #[tokio::test]
    async fn clear_forgets_held_list() {
        let (session, _temp) = authenticated_session("t1").await;
        let mock = MockTransport::new();
        mock.respond("GET /tasks", 200, "[]");
        let tasks = controller(mock.clone(), session);

        tasks.list().await.unwrap();
        tasks.clear();

        assert_eq!(tasks.snapshot(), Loadable::NotLoaded);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn blank_titles_never_reach_the_network(title in "[ \t\n]*") {
            tokio_test::block_on(async {
                let (session, _temp) = authenticated_session("t1").await;
                let mock = MockTransport::new();
                let tasks = controller(mock.clone(), session);

                let result = tasks.create(&title).await;

                assert!(matches!(result, Err(SyncError::EmptyInput("title"))));
                assert_eq!(mock.request_count(), 0);
            });
        }
    }
}
