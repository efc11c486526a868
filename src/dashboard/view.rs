//! Pure presentation logic for the assignments dashboard.
//!
//! Everything is a function of the assignment list and a caller-supplied
//! `now`, so the terminal front end and the tests share one definition of
//! status, ordering, and counts.

use std::cmp::Ordering;

use time::{Duration, OffsetDateTime};

use crate::assignments::repo_types::Assignment;

/// Derived display status. Never stored; recomputed from `is_completed`
/// and `due_date` against the caller's clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Overdue,
    Pending,
    Completed,
}

impl Status {
    pub fn label(self) -> &'static str {
        match self {
            Status::Overdue => "overdue",
            Status::Pending => "pending",
            Status::Completed => "completed",
        }
    }
}

/// Single source of truth for status; sorting, filtering, and stats all
/// go through here. An assignment without a due date cannot be overdue.
pub fn status_of(assignment: &Assignment, now: OffsetDateTime) -> Status {
    if assignment.is_completed {
        return Status::Completed;
    }
    match assignment.due_date {
        Some(due) if due < now => Status::Overdue,
        _ => Status::Pending,
    }
}

/// Incomplete and due within the next 24 hours, both ends inclusive.
/// Already-overdue items are not urgent, they are overdue.
pub fn is_urgent(assignment: &Assignment, now: OffsetDateTime) -> bool {
    if assignment.is_completed {
        return false;
    }
    match assignment.due_date {
        Some(due) => due >= now && due <= now + Duration::hours(24),
        None => false,
    }
}

/// Sorts for display: overdue first (most overdue leading), then pending
/// (soonest due first, undated last), then completed (most recently
/// updated first).
pub fn sort_for_display(assignments: &mut [Assignment], now: OffsetDateTime) {
    assignments.sort_by(|a, b| display_cmp(a, b, now));
}

fn display_cmp(a: &Assignment, b: &Assignment, now: OffsetDateTime) -> Ordering {
    let (status_a, status_b) = (status_of(a, now), status_of(b, now));
    bucket(status_a)
        .cmp(&bucket(status_b))
        .then_with(|| match status_a {
            Status::Completed => b.updated_at.cmp(&a.updated_at),
            _ => cmp_due(a.due_date, b.due_date),
        })
}

fn bucket(status: Status) -> u8 {
    match status {
        Status::Overdue => 0,
        Status::Pending => 1,
        Status::Completed => 2,
    }
}

// None sorts after any Some: undated work goes to the back of its bucket.
fn cmp_due(a: Option<OffsetDateTime>, b: Option<OffsetDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Which derived statuses to show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
    Overdue,
}

impl Filter {
    pub fn matches(self, assignment: &Assignment, now: OffsetDateTime) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => status_of(assignment, now) == Status::Pending,
            Filter::Completed => status_of(assignment, now) == Status::Completed,
            Filter::Overdue => status_of(assignment, now) == Status::Overdue,
        }
    }
}

impl std::str::FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Filter::All),
            "pending" => Ok(Filter::Pending),
            "completed" => Ok(Filter::Completed),
            "overdue" => Ok(Filter::Overdue),
            other => Err(format!(
                "unknown filter {other:?} (expected all, pending, completed or overdue)"
            )),
        }
    }
}

/// Case-insensitive substring match over title and description. A blank
/// query matches everything.
pub fn matches_search(assignment: &Assignment, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    assignment.title.to_lowercase().contains(&query)
        || assignment
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&query))
}

/// Counts by derived status; `pending + completed + overdue == total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub overdue: usize,
}

pub fn stats(assignments: &[Assignment], now: OffsetDateTime) -> Stats {
    let mut out = Stats {
        total: assignments.len(),
        ..Stats::default()
    };
    for assignment in assignments {
        match status_of(assignment, now) {
            Status::Pending => out.pending += 1,
            Status::Completed => out.completed += 1,
            Status::Overdue => out.overdue += 1,
        }
    }
    out
}
