use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{
    domain::{AccountId, BoardId, CategoryId, ChatId, GoalId},
    errors::Error,
    registry::{ChatUser, ChatUserStore},
    store::{Board, BoardRole, Category, Goal, GoalStatus, GoalStore, Participant},
    Result,
};

#[derive(Default)]
struct Tables {
    last_board: i64,
    last_category: i64,
    last_goal: i64,
    boards: BTreeMap<BoardId, Board>,
    categories: BTreeMap<CategoryId, Category>,
    goals: BTreeMap<GoalId, Goal>,
}

impl Tables {
    fn live_category(&self, id: CategoryId) -> Result<&Category> {
        self.categories
            .get(&id)
            .filter(|c| !c.is_deleted)
            .ok_or_else(|| Error::NotFound(format!("category {id}")))
    }

    fn role_on_board(&self, board: BoardId, account: AccountId) -> Option<BoardRole> {
        self.boards.get(&board).and_then(|b| b.role_of(account))
    }
}

/// Process-local goal store with the todo-list service's visibility rules.
///
/// - categories are visible to every participant of their board
/// - goals can be created by board owners and writers only
/// - deleting a category is a soft delete that archives its goals
#[derive(Default)]
pub struct InMemoryGoalStore {
    tables: Mutex<Tables>,
}

impl InMemoryGoalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a board; `owner` becomes its first participant.
    pub async fn create_board(&self, title: &str, owner: AccountId) -> Board {
        let mut t = self.tables.lock().await;
        t.last_board += 1;
        let board = Board {
            id: BoardId(t.last_board),
            title: title.to_string(),
            participants: vec![Participant {
                account: owner,
                role: BoardRole::Owner,
            }],
        };
        t.boards.insert(board.id, board.clone());
        board
    }

    pub async fn add_participant(
        &self,
        board: BoardId,
        account: AccountId,
        role: BoardRole,
    ) -> Result<()> {
        let mut t = self.tables.lock().await;
        let b = t
            .boards
            .get_mut(&board)
            .ok_or_else(|| Error::NotFound(format!("board {}", board.0)))?;
        match b.participants.iter_mut().find(|p| p.account == account) {
            Some(p) => p.role = role,
            None => b.participants.push(Participant { account, role }),
        }
        Ok(())
    }

    pub async fn create_category(
        &self,
        board: BoardId,
        owner: AccountId,
        title: &str,
    ) -> Result<Category> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation("title must not be empty".to_string()));
        }

        let mut t = self.tables.lock().await;
        if !t.boards.contains_key(&board) {
            return Err(Error::NotFound(format!("board {}", board.0)));
        }
        if !t
            .role_on_board(board, owner)
            .is_some_and(BoardRole::can_write)
        {
            return Err(Error::Forbidden(format!("board {}", board.0)));
        }

        t.last_category += 1;
        let category = Category {
            id: CategoryId(t.last_category),
            title: title.to_string(),
            board,
            owner,
            is_deleted: false,
        };
        t.categories.insert(category.id, category.clone());
        Ok(category)
    }

    /// Soft-delete a category and archive every goal in it.
    pub async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let mut t = self.tables.lock().await;
        let category = t
            .categories
            .get_mut(&id)
            .filter(|c| !c.is_deleted)
            .ok_or_else(|| Error::NotFound(format!("category {id}")))?;
        category.is_deleted = true;

        for goal in t.goals.values_mut().filter(|g| g.category == id) {
            goal.status = GoalStatus::Archived;
        }
        Ok(())
    }

    pub async fn archive_goal(&self, id: GoalId) -> Result<()> {
        let mut t = self.tables.lock().await;
        let goal = t
            .goals
            .get_mut(&id)
            .filter(|g| g.status != GoalStatus::Archived)
            .ok_or_else(|| Error::NotFound(format!("goal {id}")))?;
        goal.status = GoalStatus::Archived;
        Ok(())
    }

    /// Every goal including archived ones, ordered by id.
    pub async fn all_goals(&self) -> Vec<Goal> {
        self.tables.lock().await.goals.values().cloned().collect()
    }
}

#[async_trait]
impl GoalStore for InMemoryGoalStore {
    async fn list_categories(&self, account: AccountId) -> Result<Vec<Category>> {
        let t = self.tables.lock().await;
        Ok(t.categories
            .values()
            .filter(|c| !c.is_deleted && t.role_on_board(c.board, account).is_some())
            .cloned()
            .collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Category> {
        let t = self.tables.lock().await;
        t.live_category(id).cloned()
    }

    async fn create_goal(
        &self,
        account: AccountId,
        category: CategoryId,
        title: &str,
    ) -> Result<Goal> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::Validation("title must not be empty".to_string()));
        }

        let mut t = self.tables.lock().await;
        let board = t
            .live_category(category)
            .map_err(|_| Error::Validation("category not found".to_string()))?
            .board;
        if !t
            .role_on_board(board, account)
            .is_some_and(BoardRole::can_write)
        {
            return Err(Error::Forbidden(format!("category {category}")));
        }

        t.last_goal += 1;
        let goal = Goal {
            id: GoalId(t.last_goal),
            title: title.to_string(),
            category,
            owner: account,
            status: GoalStatus::ToDo,
            created: Utc::now(),
        };
        t.goals.insert(goal.id, goal.clone());
        Ok(goal)
    }

    async fn list_goals(&self, account: AccountId) -> Result<Vec<Goal>> {
        let t = self.tables.lock().await;
        Ok(t.goals
            .values()
            .filter(|g| g.owner == account && g.status != GoalStatus::Archived)
            .cloned()
            .collect())
    }
}

/// Process-local chat user table (what the todo-list service persists for
/// linked chats).
#[derive(Default)]
pub struct InMemoryChatUsers {
    users: Mutex<HashMap<ChatId, ChatUser>>,
}

impl InMemoryChatUsers {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, chat_id: ChatId) -> Option<ChatUser> {
        self.users.lock().await.get(&chat_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.users.lock().await.len()
    }
}

#[async_trait]
impl ChatUserStore for InMemoryChatUsers {
    async fn get_or_create(&self, chat_id: ChatId) -> Result<ChatUser> {
        let mut users = self.users.lock().await;
        Ok(users
            .entry(chat_id)
            .or_insert_with(|| ChatUser::new(chat_id))
            .clone())
    }

    async fn save_code(&self, chat_id: ChatId, code: &str) -> Result<()> {
        let mut users = self.users.lock().await;
        let user = users
            .get_mut(&chat_id)
            .ok_or_else(|| Error::NotFound(format!("chat {}", chat_id.0)))?;
        user.verification_code = Some(code.to_string());
        Ok(())
    }

    async fn link(&self, code: &str, account: AccountId) -> Result<ChatUser> {
        let mut users = self.users.lock().await;
        let user = users
            .values_mut()
            .find(|u| u.verification_code.as_deref() == Some(code))
            .ok_or_else(|| Error::NotFound("invalid verification code".to_string()))?;
        if user.is_verified() {
            return Err(Error::Validation(format!(
                "chat {} is already linked",
                user.chat_id.0
            )));
        }
        user.account = Some(account);
        user.verification_code = None;
        Ok(user.clone())
    }
}
