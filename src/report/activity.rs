//! Activity report: one row per team member.

use crate::model::UserActivity;
use crate::report::Table;

pub const COLUMNS: [&str; 3] = ["Name", "Email", "Has made a pr"];

pub fn build(activity: &[UserActivity]) -> Table {
    let mut table = Table::new(COLUMNS.iter().map(|c| c.to_string()).collect());
    for user in activity {
        table.push_row(vec![
            user.username.clone(),
            user.email.clone().unwrap_or_default(),
            user.has_activity_today.to_string(),
        ]);
    }
    table
}
