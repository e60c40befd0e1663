use std::sync::{Arc, Weak};

use shared::domain::{OrganizationList, OrganizationName};
use tokio::{sync::RwLock, task::JoinHandle};
use tracing::{debug, warn};

use crate::fetch::{fetch_organizations, Fetcher};

pub const VIEW_TITLE: &str = "study-app-front";

/// Display state for the organization listing.
pub struct OrganizationsView {
    fetcher: Arc<dyn Fetcher>,
    title: String,
    organization_names: OrganizationList,
}

impl OrganizationsView {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            title: VIEW_TITLE.to_string(),
            organization_names: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn organization_names(&self) -> &[OrganizationName] {
        &self.organization_names
    }

    /// Fetches once. On success the names are replaced wholesale; on failure
    /// the previous names stay and nothing is returned to the caller.
    pub async fn activate(&mut self) {
        let result = fetch_organizations(self.fetcher.as_ref()).await;
        self.apply(result);
    }

    fn apply(&mut self, result: Result<OrganizationList, crate::FetchError>) {
        match result {
            Ok(names) => {
                debug!(count = names.len(), "organization names replaced");
                self.organization_names = names;
            }
            Err(error) => {
                warn!(%error, "organization fetch failed; keeping previous names");
            }
        }
    }

    /// Activates in a background task. The returned handle owns the view;
    /// dropping it aborts a fetch that is still in flight.
    pub fn mount(self) -> MountedView {
        let fetcher = self.fetcher.clone();
        let view = Arc::new(RwLock::new(self));
        let weak: Weak<RwLock<OrganizationsView>> = Arc::downgrade(&view);

        let task = tokio::spawn(async move {
            let result = fetch_organizations(fetcher.as_ref()).await;
            let Some(view) = weak.upgrade() else {
                debug!("view torn down before fetch completed");
                return;
            };
            view.write().await.apply(result);
        });

        MountedView {
            view,
            task: Some(task),
        }
    }
}

pub struct MountedView {
    view: Arc<RwLock<OrganizationsView>>,
    task: Option<JoinHandle<()>>,
}

impl MountedView {
    pub async fn title(&self) -> String {
        self.view.read().await.title().to_string()
    }

    pub async fn organization_names(&self) -> OrganizationList {
        self.view.read().await.organization_names().to_vec()
    }

    /// Waits for the activation fetch to finish, successfully or not.
    pub async fn settled(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };
        if let Err(error) = task.await {
            warn!(%error, "activation task ended abnormally");
        }
    }

    pub fn is_settled(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Tears the view down; `Drop` aborts a fetch still in flight.
    pub fn teardown(self) {
        drop(self);
    }
}

impl Drop for MountedView {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                debug!("aborting pending organization fetch");
            }
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "tests/view_tests.rs"]
mod tests;
