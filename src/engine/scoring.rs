pub const BASE_POINTS: u32 = 100;
pub const POINTS_PER_SECOND_LEFT: u32 = 10;

/// Points for a correct answer submitted with `time_left` seconds remaining.
pub fn points_for_correct(time_left: u32) -> u32 {
    BASE_POINTS + POINTS_PER_SECOND_LEFT * time_left
}

/// Integer percentage of correct answers, rounded half up. Zero when there
/// were no questions.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct as f64 / total as f64) * 100.0).round() as u32
}

/// Encouragement line shown on the results screen.
pub fn feedback_message(percentage: u32) -> &'static str {
    match percentage {
        100.. => "Perfect Score! You're an English wizard!",
        80..=99 => "Excellent work! You really know your stuff.",
        60..=79 => "Good job! A little more practice and you'll be an expert.",
        40..=59 => "Nice try! Keep practicing. You're getting there.",
        _ => "Keep learning and try again! You can do it.",
    }
}
