//! Derived numbers for the dashboard and the weekly chart.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;
use trackforge_common::{Stage, Task, parse_timestamp};

use crate::business::BusinessStore;

pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Completed tasks per weekday of creation, Monday first.
///
/// Days are UTC days, the zone every stored timestamp is written in, so the
/// chart does not shift with the host's time zone.
pub fn weekly_rhythm(tasks: &[Task]) -> [usize; 7] {
    let mut counts = [0usize; 7];
    for task in tasks.iter().filter(|t| t.completed) {
        if let Some(created) = parse_timestamp(&task.created_at) {
            counts[created.weekday().num_days_from_monday() as usize] += 1;
        }
    }
    counts
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessMetrics {
    pub total_clients: usize,
    pub active_projects: usize,
    pub revenue_potential: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub active_tasks: usize,
    pub completed_this_week: usize,
    /// Share of completed tasks, 0-100.
    pub productivity: u32,
    /// Present only while business mode is on.
    pub business: Option<BusinessMetrics>,
}

impl Dashboard {
    pub fn compute(tasks: &[Task], business: &BusinessStore, now: DateTime<Utc>) -> Self {
        let week_ago = now - Duration::days(7);
        let completed = tasks.iter().filter(|t| t.completed).count();

        let completed_this_week = tasks
            .iter()
            .filter(|t| t.completed)
            .filter(|t| parse_timestamp(&t.created_at).is_some_and(|at| at >= week_ago))
            .count();

        let productivity = if tasks.is_empty() {
            0
        } else {
            ((completed as f64 / tasks.len() as f64) * 100.0).round() as u32
        };

        let business = business.business_mode.then(|| {
            let projects = business.board.projects();
            BusinessMetrics {
                total_clients: business.clients.len(),
                active_projects: projects.iter().filter(|p| p.stage != Stage::Done).count(),
                revenue_potential: projects.iter().map(|p| p.value).sum(),
            }
        });

        Self {
            active_tasks: tasks.len() - completed,
            completed_this_week,
            productivity,
            business,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trackforge_common::{Priority, format_timestamp};

    fn task(completed: bool, created_at: &str) -> Task {
        Task {
            id: created_at.to_string(),
            title: "t".into(),
            description: None,
            priority: Priority::Low,
            completed,
            created_at: created_at.to_string(),
            project_id: None,
        }
    }

    #[test]
    fn test_weekly_rhythm_counts_completed_by_weekday() {
        let tasks = vec![
            // 2024-05-06 is a Monday, 2024-05-12 a Sunday
            task(true, "2024-05-06T10:00:00.000Z"),
            task(true, "2024-05-13T10:00:00.000Z"),
            task(true, "2024-05-12T10:00:00.000Z"),
            task(false, "2024-05-07T10:00:00.000Z"),
            task(true, "garbage"),
        ];
        assert_eq!(weekly_rhythm(&tasks), [2, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_weekly_rhythm_uses_utc_day() {
        // Late Sunday UTC is already Monday east of Greenwich.
        let tasks = vec![task(true, "2024-05-12T23:30:00.000Z")];
        assert_eq!(weekly_rhythm(&tasks), [0, 0, 0, 0, 0, 0, 1]);

        let offset = vec![task(true, "2024-05-13T01:30:00+02:00")];
        assert_eq!(weekly_rhythm(&offset), [0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_dashboard_without_business_mode() {
        let now = Utc::now();
        let tasks = vec![
            task(true, &format_timestamp(now - Duration::days(1))),
            task(true, &format_timestamp(now - Duration::days(30))),
            task(false, &format_timestamp(now)),
        ];
        let dashboard = Dashboard::compute(&tasks, &BusinessStore::default(), now);

        assert_eq!(dashboard.active_tasks, 1);
        assert_eq!(dashboard.completed_this_week, 1);
        assert_eq!(dashboard.productivity, 67);
        assert!(dashboard.business.is_none());
    }

    #[test]
    fn test_dashboard_with_demo_business_data() {
        let mut business = BusinessStore::default();
        business.load_demo_data();

        let dashboard = Dashboard::compute(&[], &business, Utc::now());

        assert_eq!(dashboard.productivity, 0);
        let metrics = dashboard.business.unwrap();
        assert_eq!(metrics.total_clients, 2);
        assert_eq!(metrics.active_projects, 2);
        assert_eq!(metrics.revenue_potential, 10_900.0);
    }
}
