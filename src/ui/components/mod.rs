pub mod dashboard;
pub mod menu;
pub mod progress_bar;
pub mod question_card;
pub mod question_list;
pub mod score_table;
