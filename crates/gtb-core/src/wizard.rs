//! The create-goal wizard.
//!
//! `Idle --/create--> AwaitingCategory --id--> AwaitingTitle{category} --title--> Idle`
//!
//! Idle is the absence of a session, so `/create` and `/cancel` are handled by
//! the dispatcher; this module only advances an existing step on free text.

use crate::{
    domain::{AccountId, CategoryId},
    errors::Error,
    replies,
    session::Step,
    store::{Category, GoalStore},
    Result,
};

/// Outcome of feeding one text message to a step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// `None` ends the session.
    pub next: Option<Step>,
    pub reply: String,
}

impl Transition {
    fn stay(step: Step, reply: impl Into<String>) -> Self {
        Self {
            next: Some(step),
            reply: reply.into(),
        }
    }
}

/// Advance `step` with the user's `text`.
///
/// User mistakes (unknown category, empty title) keep the current step. If
/// the chosen category can no longer take goals (deleted, or the account lost
/// write access) the wizard goes back to `AwaitingCategory`; any other failed
/// goal creation keeps `AwaitingTitle` so the title can be resent. Only unexpected store failures while looking up a category are returned as
/// `Err`; the caller leaves the session untouched in that case.
pub async fn advance(
    goals: &dyn GoalStore,
    account: AccountId,
    step: Step,
    text: &str,
) -> Result<Transition> {
    match step {
        Step::AwaitingCategory => choose_category(goals, account, text).await,
        Step::AwaitingTitle { category } => create_goal(goals, account, category, text).await,
    }
}

async fn choose_category(
    goals: &dyn GoalStore,
    account: AccountId,
    text: &str,
) -> Result<Transition> {
    let Ok(id) = text.trim().parse::<i64>() else {
        return Ok(Transition::stay(
            Step::AwaitingCategory,
            replies::CATEGORY_NOT_FOUND,
        ));
    };

    match accessible_category(goals, account, CategoryId(id)).await {
        Ok(category) => Ok(Transition {
            next: Some(Step::AwaitingTitle {
                category: category.id,
            }),
            reply: replies::SET_TITLE.to_string(),
        }),
        Err(e) if e.is_not_found_like() => Ok(Transition::stay(
            Step::AwaitingCategory,
            replies::CATEGORY_NOT_FOUND,
        )),
        Err(e) => Err(e),
    }
}

/// Look a category up and check the account can see it.
async fn accessible_category(
    goals: &dyn GoalStore,
    account: AccountId,
    id: CategoryId,
) -> Result<Category> {
    let category = goals.get_category(id).await?;
    let visible = goals.list_categories(account).await?;
    if !visible.iter().any(|c| c.id == category.id) {
        return Err(Error::Forbidden(format!("category {id}")));
    }
    Ok(category)
}

async fn create_goal(
    goals: &dyn GoalStore,
    account: AccountId,
    category: CategoryId,
    text: &str,
) -> Result<Transition> {
    let step = Step::AwaitingTitle { category };
    let title = text.trim();
    if title.is_empty() {
        return Ok(Transition::stay(step, replies::EMPTY_TITLE));
    }

    match goals.create_goal(account, category, title).await {
        Ok(goal) => {
            tracing::info!(
                account = account.0,
                goal_id = goal.id.0,
                category = category.0,
                "goal created"
            );
            Ok(Transition {
                next: None,
                reply: replies::goal_created(&goal),
            })
        }
        Err(e) if category_unusable(&e) => {
            tracing::info!(
                account = account.0,
                category = category.0,
                error = %e,
                "category rejected at title step; back to category choice"
            );
            Ok(Transition::stay(
                Step::AwaitingCategory,
                replies::CATEGORY_NOT_FOUND,
            ))
        }
        Err(e) => {
            tracing::warn!(
                account = account.0,
                category = category.0,
                error = %e,
                "goal creation failed; keeping title step"
            );
            Ok(Transition::stay(step, replies::GOAL_NOT_CREATED))
        }
    }
}

/// Failures no title can fix. Empty titles never reach the store, so a
/// `Validation` here is about the category.
fn category_unusable(e: &Error) -> bool {
    e.is_not_found_like() || matches!(e, Error::Validation(_))
}
