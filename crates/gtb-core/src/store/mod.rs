//! Port to the todo-list service that owns boards, categories and goals.
//!
//! The dispatcher never touches those records directly; it reads and writes
//! through [`GoalStore`]. [`memory::InMemoryGoalStore`] is the in-process
//! implementation.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{AccountId, BoardId, CategoryId, GoalId},
    Result,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalStatus {
    ToDo = 1,
    InProgress = 2,
    Done = 3,
    Archived = 4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoardRole {
    Owner = 1,
    Writer = 2,
    Reader = 3,
}

impl BoardRole {
    pub fn can_write(self) -> bool {
        matches!(self, BoardRole::Owner | BoardRole::Writer)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub account: AccountId,
    pub role: BoardRole,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub participants: Vec<Participant>,
}

impl Board {
    pub fn role_of(&self, account: AccountId) -> Option<BoardRole> {
        self.participants
            .iter()
            .find(|p| p.account == account)
            .map(|p| p.role)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub title: String,
    pub board: BoardId,
    pub owner: AccountId,
    pub is_deleted: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: GoalId,
    pub title: String,
    pub category: CategoryId,
    pub owner: AccountId,
    pub status: GoalStatus,
    pub created: DateTime<Utc>,
}

#[async_trait]
pub trait GoalStore: Send + Sync {
    /// Non-deleted categories on boards `account` participates in, ordered by id.
    async fn list_categories(&self, account: AccountId) -> Result<Vec<Category>>;

    /// A non-deleted category, or `Error::NotFound`.
    async fn get_category(&self, id: CategoryId) -> Result<Category>;

    async fn create_goal(&self, account: AccountId, category: CategoryId, title: &str)
        -> Result<Goal>;

    /// Goals owned by `account`, excluding archived ones, ordered by id.
    async fn list_goals(&self, account: AccountId) -> Result<Vec<Goal>>;
}
