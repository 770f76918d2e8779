pub mod credentials;
pub mod high_scores;
pub mod kv;
pub mod question_bank;
pub mod schema;
