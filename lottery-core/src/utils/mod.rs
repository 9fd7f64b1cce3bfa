pub mod recurrence;
pub mod winner_selection;
