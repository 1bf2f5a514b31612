//! Display ordering and classification for the task and robot lists.

use crate::model::{Robot, Task, TaskState, TaskStatus};
use std::cmp::Reverse;
use time::PrimitiveDateTime;
use time::macros::format_description;

/// Completed tasks shown after the open ones.
pub const COMPLETED_TAIL_LIMIT: usize = 5;

/// Parses the backend's `yyyy-MM-dd HH:mm:ss` timestamps.
pub fn parse_task_timestamp(raw: &str) -> Option<PrimitiveDateTime> {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    PrimitiveDateTime::parse(raw.trim(), format).ok()
}

/// Open tasks in their original order, then the most recently finished
/// completed tasks, newest first.
///
/// A completed task whose end time cannot be parsed keeps its slot among the
/// completed tasks; the dated ones are sorted into the remaining slots.
pub fn order_tasks(tasks: &[Task]) -> Vec<Task> {
    let (mut completed, mut ordered): (Vec<&Task>, Vec<&Task>) = tasks
        .iter()
        .partition(|task| task.state == TaskState::Complete);

    sort_dated_in_place(&mut completed);
    completed.truncate(COMPLETED_TAIL_LIMIT);

    ordered.extend(completed);
    ordered.into_iter().cloned().collect()
}

fn sort_dated_in_place(completed: &mut [&Task]) {
    let (slots, mut dated): (Vec<usize>, Vec<(PrimitiveDateTime, &Task)>) = completed
        .iter()
        .enumerate()
        .filter_map(|(slot, task)| {
            parse_task_timestamp(&task.end).map(|end| (slot, (end, *task)))
        })
        .unzip();

    dated.sort_by_key(|(end, _)| Reverse(*end));
    for (slot, (_, task)) in slots.into_iter().zip(dated) {
        completed[slot] = task;
    }
}

pub fn classify(task: &Task) -> TaskStatus {
    match task.state {
        TaskState::Active => TaskStatus::Active,
        TaskState::Error => TaskStatus::Error,
        TaskState::Queued => TaskStatus::Queued,
        TaskState::Complete => TaskStatus::Complete,
        TaskState::Unknown(_) => TaskStatus::Unknown,
    }
}

/// First robot whose id matches the task's owner.
pub fn find_robot_for_task<'a>(task: &Task, robots: &'a [Robot]) -> Option<&'a Robot> {
    robots.iter().find(|robot| robot.id == task.robot_id)
}

/// First active task owned by `robot`.
pub fn task_in_progress<'a>(robot: &Robot, tasks: &'a [Task]) -> Option<&'a Task> {
    tasks
        .iter()
        .find(|task| task.robot_id == robot.id && task.state == TaskState::Active)
}

pub fn find_robot_by_name<'a>(name: &str, robots: &'a [Robot]) -> Option<&'a Robot> {
    robots.iter().find(|robot| robot.name == name)
}
