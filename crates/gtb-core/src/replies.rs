//! User-facing reply texts.

use crate::store::{Category, Goal};

pub const GREETING: &str = "Hello!";
pub const NO_GOALS: &str = "You have no goals";
pub const NO_CATEGORIES: &str = "You have no categories";
pub const CANCELLED: &str = "Ok, cancelled";
pub const COMMAND_NOT_FOUND: &str = "Command not found";
pub const NOT_UNDERSTOOD: &str = "Sorry, I don't understand";
pub const CATEGORY_NOT_FOUND: &str = "Category not found";
pub const SET_TITLE: &str = "Set goal title";
pub const EMPTY_TITLE: &str = "Title must not be empty";
pub const GOAL_NOT_CREATED: &str =
    "Could not create the goal. Send the title again or /cancel";
pub const UNEXPECTED: &str = "Something went wrong, please try again later";

pub const HELP: &str = "Commands:\n\
/goals - list your goals\n\
/create - create a new goal\n\
/cancel - cancel goal creation";

pub fn verification_code(code: &str) -> String {
    format!("Your verification code: {code}")
}

pub fn goal_created(goal: &Goal) -> String {
    format!("Goal created: {}) {}", goal.id, goal.title)
}

pub fn goal_list(goals: &[Goal]) -> String {
    if goals.is_empty() {
        return NO_GOALS.to_string();
    }
    let lines: Vec<String> = goals
        .iter()
        .map(|g| format!("{}) {}", g.id, g.title))
        .collect();
    format!("Your goals:\n{}", lines.join("\n"))
}

pub fn category_list(categories: &[Category]) -> String {
    let lines: Vec<String> = categories
        .iter()
        .map(|c| format!("{}) {}", c.id, c.title))
        .collect();
    format!("Select category:\n{}", lines.join("\n"))
}
