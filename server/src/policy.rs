// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use chrono::NaiveDate;
use common::Task;
use std::cmp::Ordering;

/// Compares two tasks for display: higher priority first, then earlier due
/// date. A task without a due date sorts after every task that has one.
pub fn compare_for_display(a: &Task, b: &Task) -> Ordering {
    b.priority
        .rank()
        .cmp(&a.priority.rank())
        .then_with(|| due_key(a).cmp(&due_key(b)))
}

fn due_key(task: &Task) -> NaiveDate {
    task.due.unwrap_or(NaiveDate::MAX)
}

/// Sorts a project's tasks into display order. This is recomputed on every
/// read and never persisted; the stored array keeps insertion order.
pub fn display_order(tasks: &mut [Task]) {
    tasks.sort_by(compare_for_display);
}

/// Caps a task's due date at its project's due date. When both dates are set
/// and the requested date lands after the project's, the project date is
/// returned instead; the clamp is silent, not a validation failure.
pub fn cap_due(project_due: Option<NaiveDate>, requested: Option<NaiveDate>) -> Option<NaiveDate> {
    match (project_due, requested) {
        (Some(limit), Some(due)) if due > limit => Some(limit),
        _ => requested,
    }
}

/// Applies the due-date cap to every task in a replacement array. Tasks only
/// reach the store through full-array writes, so creation and edit both pass
/// through here.
pub fn cap_task_dues(project_due: Option<NaiveDate>, tasks: &mut [Task]) {
    for task in tasks {
        task.due = cap_due(project_due, task.due);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Priority;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn task(id: &str, priority: Priority, due: Option<NaiveDate>) -> Task {
        Task {
            id: id.to_string(),
            text: format!("task {id}"),
            done: false,
            due,
            priority,
        }
    }

    #[test]
    fn test_display_order_scenario() {
        // [{High, due:null}, {High, 2025-01-01}, {Medium, 2024-01-01}]
        // must come out [{High, 2025-01-01}, {High, null}, {Medium, 2024-01-01}].
        let mut tasks = vec![
            task("a", Priority::High, None),
            task("b", Priority::High, Some(date(2025, 1, 1))),
            task("c", Priority::Medium, Some(date(2024, 1, 1))),
        ];
        display_order(&mut tasks);

        let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_display_order_adjacent_pairs_hold() {
        let mut tasks = vec![
            task("a", Priority::Low, Some(date(2024, 3, 1))),
            task("b", Priority::Medium, None),
            task("c", Priority::High, Some(date(2026, 12, 31))),
            task("d", Priority::Medium, Some(date(2024, 1, 2))),
            task("e", Priority::High, None),
            task("f", Priority::Low, None),
            task("g", Priority::Medium, Some(date(2024, 1, 2))),
        ];
        display_order(&mut tasks);

        for pair in tasks.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.priority.rank() >= b.priority.rank());
            if a.priority.rank() == b.priority.rank() {
                assert!(a.due.unwrap_or(NaiveDate::MAX) <= b.due.unwrap_or(NaiveDate::MAX));
            }
        }
    }

    #[test]
    fn test_display_order_is_stable_for_ties() {
        let mut tasks = vec![
            task("first", Priority::Medium, Some(date(2025, 5, 5))),
            task("second", Priority::Medium, Some(date(2025, 5, 5))),
        ];
        display_order(&mut tasks);
        assert_eq!(tasks[0].id, "first");
        assert_eq!(tasks[1].id, "second");
    }

    #[test]
    fn test_cap_clamps_past_project_due() {
        // Project due 2025-06-01, requested 2025-06-15 -> stored 2025-06-01.
        let capped = cap_due(Some(date(2025, 6, 1)), Some(date(2025, 6, 15)));
        assert_eq!(capped, Some(date(2025, 6, 1)));
    }

    #[test]
    fn test_cap_leaves_valid_dates_alone() {
        assert_eq!(
            cap_due(Some(date(2025, 6, 1)), Some(date(2025, 5, 20))),
            Some(date(2025, 5, 20))
        );
        // Equal dates pass through.
        assert_eq!(
            cap_due(Some(date(2025, 6, 1)), Some(date(2025, 6, 1))),
            Some(date(2025, 6, 1))
        );
        // No project due: nothing to cap against.
        assert_eq!(
            cap_due(None, Some(date(2099, 1, 1))),
            Some(date(2099, 1, 1))
        );
        // No requested date: stays absent.
        assert_eq!(cap_due(Some(date(2025, 6, 1)), None), None);
    }

    #[test]
    fn test_cap_is_idempotent() {
        let limit = Some(date(2025, 6, 1));
        let once = cap_due(limit, Some(date(2025, 6, 15)));
        let twice = cap_due(limit, once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_cap_task_dues_applies_to_whole_array() {
        let limit = Some(date(2025, 6, 1));
        let mut tasks = vec![
            task("over", Priority::High, Some(date(2025, 7, 1))),
            task("under", Priority::Low, Some(date(2025, 5, 1))),
            task("unset", Priority::Medium, None),
        ];
        cap_task_dues(limit, &mut tasks);

        assert_eq!(tasks[0].due, Some(date(2025, 6, 1)));
        assert_eq!(tasks[1].due, Some(date(2025, 5, 1)));
        assert_eq!(tasks[2].due, None);
    }
}
