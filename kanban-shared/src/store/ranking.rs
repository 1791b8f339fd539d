/// Rank planning for columns and tasks
///
/// Both store backends delegate every rank decision to the pure functions in
/// this module and only apply the resulting [`RankChange`]s, so the two
/// backends cannot drift apart.
///
/// # Policies
///
/// - [`RankPolicy::Append`]: new items get `count` at call time, moves write
///   the caller's rank verbatim, deletes never renumber. Ranks may collide or
///   leave gaps.
/// - [`RankPolicy::Dense`]: every mutation leaves ranks exactly `0..n` within
///   a column (tasks) or a board (columns).
///
/// # Example
///
/// ```
/// use kanban_shared::store::ranking::{plan_insert, Ranked};
/// use chrono::Utc;
/// use uuid::Uuid;
///
/// let now = Utc::now();
/// let a = Ranked { id: Uuid::new_v4(), order: 0, created_at: now };
/// let b = Ranked { id: Uuid::new_v4(), order: 1, created_at: now };
///
/// // Insert at the top: both siblings shift down one
/// let plan = plan_insert(&[a, b], 0);
/// assert_eq!(plan.order, 0);
/// assert_eq!(plan.changes.len(), 2);
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::models::{column::Column, task::Task};

/// How ranks are maintained across mutations
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankPolicy {
    /// Count-at-insert, verbatim moves, no renumbering
    #[default]
    Append,

    /// Dense, unique ranks maintained inside each mutation
    Dense,
}

impl RankPolicy {
    /// Converts policy to its configuration string
    pub fn as_str(&self) -> &'static str {
        match self {
            RankPolicy::Append => "append",
            RankPolicy::Dense => "dense",
        }
    }

    /// Whether mutations must renumber siblings
    pub fn is_dense(&self) -> bool {
        matches!(self, RankPolicy::Dense)
    }
}

impl fmt::Display for RankPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RankPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(RankPolicy::Append),
            "dense" => Ok(RankPolicy::Dense),
            other => Err(format!("unknown rank policy '{}', expected 'append' or 'dense'", other)),
        }
    }
}

/// Rank-relevant view of a column or task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranked {
    pub id: Uuid,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<&Task> for Ranked {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id,
            order: task.order,
            created_at: task.created_at,
        }
    }
}

impl From<&Column> for Ranked {
    fn from(column: &Column) -> Self {
        Self {
            id: column.id,
            order: column.order,
            created_at: column.created_at,
        }
    }
}

/// A rank rewrite to apply to one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankChange {
    pub id: Uuid,
    pub order: i32,
}

/// Where an inserted item lands and which siblings must shift
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertPlan {
    /// Final rank of the inserted item
    pub order: i32,

    /// Sibling rewrites, excluding the inserted item
    pub changes: Vec<RankChange>,
}

/// Sorts items the way listings present them: rank, then age, then ID
pub fn sort_ranked(items: &mut [Ranked]) {
    items.sort_by(|a, b| {
        a.order
            .cmp(&b.order)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
}

/// Rewrites needed to make `items` exactly `0..n` in their current sort order
pub fn compact(items: &[Ranked]) -> Vec<RankChange> {
    let mut sorted = items.to_vec();
    sort_ranked(&mut sorted);

    sorted
        .iter()
        .enumerate()
        .filter(|(idx, item)| item.order != *idx as i32)
        .map(|(idx, item)| RankChange {
            id: item.id,
            order: idx as i32,
        })
        .collect()
}

/// Plans inserting one item among `siblings` at `requested`
///
/// `siblings` must not contain the inserted item. The requested rank is
/// clamped to `[0, siblings.len()]`; siblings are renumbered densely around
/// the gap.
pub fn plan_insert(siblings: &[Ranked], requested: i32) -> InsertPlan {
    let mut sorted = siblings.to_vec();
    sort_ranked(&mut sorted);

    let slot = requested.clamp(0, sorted.len() as i32);

    let changes = sorted
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let idx = idx as i32;
            let target = if idx < slot { idx } else { idx + 1 };
            (item.order != target).then_some(RankChange {
                id: item.id,
                order: target,
            })
        })
        .collect();

    InsertPlan {
        order: slot,
        changes,
    }
}

/// Plans a dense move
///
/// `destination` holds the destination column's tasks without the moving
/// task. `vacated` holds the source column's remaining tasks when the task
/// changes column, and is `None` for a move within one column.
pub fn plan_move(destination: &[Ranked], vacated: Option<&[Ranked]>, requested: i32) -> InsertPlan {
    let mut plan = plan_insert(destination, requested);

    if let Some(vacated) = vacated {
        plan.changes.extend(compact(vacated));
    }

    plan
}
