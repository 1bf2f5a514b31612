use crate::adapters::{
    RobotDetail, RobotRow, TaskDetail, TaskRow, robot_detail, robot_rows, task_detail, task_rows,
};
use crate::api::RequestSlot;
use crate::error::AppError;
use crate::model::{Robot, Task};
use crate::screens::{RemoteSession, ScreenState};
use crate::storage::json_store::{ROBOTS_FILE, TASKS_FILE};
use crate::storage::{CollectionSource, DataStore};
use tracing::debug;

/// Robots and tasks as last loaded by a [`FleetScreen`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetSnapshot {
    pub robots: Vec<Robot>,
    pub tasks: Vec<Task>,
}

impl FleetSnapshot {
    pub fn task_rows(&self) -> Vec<TaskRow> {
        task_rows(&self.tasks, &self.robots)
    }

    pub fn robot_rows(&self) -> Vec<RobotRow> {
        robot_rows(&self.robots, &self.tasks)
    }

    pub fn task_detail(&self, id: &str) -> Result<TaskDetail, AppError> {
        let id = require_id(id)?;
        self.tasks
            .iter()
            .find(|task| task.id == id)
            .map(|task| task_detail(task, &self.robots))
            .ok_or_else(|| AppError::invalid_input("task not found"))
    }

    pub fn robot_detail(&self, id: &str) -> Result<RobotDetail, AppError> {
        let id = require_id(id)?;
        self.robots
            .iter()
            .find(|robot| robot.id == id)
            .map(|robot| robot_detail(robot, &self.tasks))
            .ok_or_else(|| AppError::invalid_input("robot not found"))
    }
}

fn require_id(id: &str) -> Result<&str, AppError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(AppError::invalid_input("id is required"));
    }
    Ok(id)
}

/// Home screen lists: robots with their active task, and the ordered task list.
#[derive(Debug)]
pub struct FleetScreen {
    pub state: ScreenState,
    store: DataStore,
    fleet_slot: RequestSlot,
}

impl FleetScreen {
    pub fn new(store: DataStore) -> Self {
        Self {
            state: ScreenState::new(),
            store,
            fleet_slot: RequestSlot::new(),
        }
    }

    /// Reads the bundled files. Unreadable files become empty lists with a notice.
    pub fn load_local(&mut self) -> FleetSnapshot {
        let robots = self
            .store
            .load_collection_or_notice(self.store.robots_source(), ROBOTS_FILE);
        let tasks = self
            .store
            .load_collection_or_notice(CollectionSource::Asset, TASKS_FILE);

        for notice in [robots.notice, tasks.notice].into_iter().flatten() {
            self.state.notify(notice.message());
        }
        FleetSnapshot {
            robots: robots.records,
            tasks: tasks.records,
        }
    }

    /// Fetches both lists from the backend. Returns `None` when a newer load
    /// was started before this one completed.
    pub async fn load_remote(
        &self,
        remote: &RemoteSession,
    ) -> Result<Option<FleetSnapshot>, AppError> {
        let ticket = self.fleet_slot.issue();
        let fetched = async {
            let robots = remote.api.fetch_robots(&remote.token).await?;
            let tasks = remote.api.fetch_tasks(&remote.token).await?;
            Ok::<_, AppError>(FleetSnapshot { robots, tasks })
        }
        .await;

        match fetched {
            Ok(snapshot) => {
                debug!(
                    robots = snapshot.robots.len(),
                    tasks = snapshot.tasks.len(),
                    "fleet loaded"
                );
                Ok(self.fleet_slot.accept(ticket, snapshot))
            }
            Err(err) if self.fleet_slot.is_current(ticket) => Err(err),
            Err(err) => {
                debug!(error = %err, "discarding superseded failure");
                Ok(None)
            }
        }
    }
}
