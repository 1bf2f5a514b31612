//! Row and detail bindings for the robot and task lists.

use crate::model::{BatteryLevel, NULL_TIMESTAMP, Robot, Task, TaskStatus, display_timestamp};
use crate::task_list::{classify, find_robot_for_task, order_tasks, task_in_progress};
use serde::Serialize;

pub const UNKNOWN_ROBOT: &str = "Unknown Robot";
pub const NO_TASK: &str = "None";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRow {
    pub id: String,
    pub name: String,
    pub robot: String,
    pub started: String,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskDetail {
    pub id: String,
    pub name: String,
    pub robot: String,
    pub started: String,
    pub completed: Option<String>,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotRow {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub battery: u8,
    pub battery_level: BatteryLevel,
    pub location: String,
    pub task: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RobotDetail {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub battery: u8,
    pub battery_level: BatteryLevel,
    pub location: String,
    pub coordinates: String,
    pub active_task: Option<ActiveTask>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveTask {
    pub name: String,
    pub started: String,
}

/// Rows in display order, one per entry of [`order_tasks`].
pub fn task_rows(tasks: &[Task], robots: &[Robot]) -> Vec<TaskRow> {
    order_tasks(tasks)
        .into_iter()
        .map(|task| {
            let robot = robot_label(&task, robots);
            TaskRow {
                started: display_timestamp(&task.date_created).to_string(),
                status: classify(&task),
                robot,
                id: task.id,
                name: task.name,
            }
        })
        .collect()
}

pub fn task_detail(task: &Task, robots: &[Robot]) -> TaskDetail {
    let completed = Some(task.end.trim())
        .filter(|end| !end.is_empty() && *end != NULL_TIMESTAMP)
        .map(str::to_string);

    TaskDetail {
        id: task.id.clone(),
        name: task.name.clone(),
        robot: find_robot_for_task(task, robots)
            .map(|robot| robot.name.clone())
            .unwrap_or_else(|| "Unknown".to_string()),
        started: display_timestamp(&task.date_created).to_string(),
        completed,
        status: classify(task),
    }
}

fn robot_label(task: &Task, robots: &[Robot]) -> String {
    find_robot_for_task(task, robots)
        .map(|robot| robot.name.clone())
        .unwrap_or_else(|| UNKNOWN_ROBOT.to_string())
}

pub fn robot_rows(robots: &[Robot], tasks: &[Task]) -> Vec<RobotRow> {
    robots
        .iter()
        .map(|robot| RobotRow {
            id: robot.id.clone(),
            name: robot.name.clone(),
            ip: robot.ip.clone(),
            battery: robot.battery,
            battery_level: robot.battery_level(),
            location: robot.location_name.clone(),
            task: task_in_progress(robot, tasks)
                .map(|task| task.name.clone())
                .unwrap_or_else(|| NO_TASK.to_string()),
        })
        .collect()
}

pub fn robot_detail(robot: &Robot, tasks: &[Task]) -> RobotDetail {
    RobotDetail {
        id: robot.id.clone(),
        name: robot.name.clone(),
        ip: robot.ip.clone(),
        battery: robot.battery,
        battery_level: robot.battery_level(),
        location: robot.location_name.clone(),
        coordinates: robot.location_coordinates.clone(),
        active_task: task_in_progress(robot, tasks).map(|task| ActiveTask {
            name: task.name.clone(),
            started: display_timestamp(&task.date_created).to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{NO_TASK, UNKNOWN_ROBOT, robot_detail, robot_rows, task_detail, task_rows};
    use crate::model::{BatteryLevel, Robot, Task, TaskState, TaskStatus};

    fn robot() -> Robot {
        Robot {
            id: "robot-1".to_string(),
            name: "Atlas".to_string(),
            ip: "10.0.0.5".to_string(),
            battery: 80,
            location_name: "Dock A".to_string(),
            location_coordinates: "45.0,-93.5".to_string(),
            tasks: vec!["task-1".to_string()],
        }
    }

    fn task(id: &str, robot_id: &str, state: TaskState) -> Task {
        Task {
            id: id.to_string(),
            name: format!("job {id}"),
            robot_id: robot_id.to_string(),
            state,
            date_created: "null".to_string(),
            end: "null".to_string(),
        }
    }

    #[test]
    fn task_rows_fall_back_for_missing_robot_and_date() {
        let tasks = vec![
            task("task-1", "robot-1", TaskState::Active),
            task("task-2", "robot-9", TaskState::Unknown("3".into())),
        ];

        let rows = task_rows(&tasks, &[robot()]);

        assert_eq!(rows[0].robot, "Atlas");
        assert_eq!(rows[0].started, "Unknown");
        assert_eq!(rows[0].status, TaskStatus::Active);
        assert_eq!(rows[1].robot, UNKNOWN_ROBOT);
        assert_eq!(rows[1].status, TaskStatus::Unknown);
    }

    #[test]
    fn task_detail_hides_null_completion() {
        let mut done = task("task-1", "robot-1", TaskState::Complete);
        let open = task("task-2", "robot-2", TaskState::Queued);
        done.end = "2024-03-01 10:00:00".to_string();

        assert_eq!(
            task_detail(&done, &[robot()]).completed.as_deref(),
            Some("2024-03-01 10:00:00")
        );
        let detail = task_detail(&open, &[robot()]);
        assert_eq!(detail.completed, None);
        assert_eq!(detail.robot, "Unknown");
    }

    #[test]
    fn robot_rows_show_active_task_or_none() {
        let busy = robot_rows(&[robot()], &[task("task-1", "robot-1", TaskState::Active)]);
        let idle = robot_rows(&[robot()], &[task("task-1", "robot-1", TaskState::Queued)]);

        assert_eq!(busy[0].task, "job task-1");
        assert_eq!(busy[0].battery_level, BatteryLevel::Full);
        assert_eq!(idle[0].task, NO_TASK);
    }

    #[test]
    fn robot_detail_carries_coordinates() {
        let detail = robot_detail(&robot(), &[]);

        assert_eq!(detail.coordinates, "45.0,-93.5");
        assert!(detail.active_task.is_none());
    }
}
