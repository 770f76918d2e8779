use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "5")]
    Five,
    #[serde(rename = "6")]
    Six,
    #[serde(rename = "7")]
    Seven,
    #[serde(rename = "8")]
    Eight,
}

impl Grade {
    pub const ALL: [Grade; 4] = [Grade::Five, Grade::Six, Grade::Seven, Grade::Eight];

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Five => "5",
            Grade::Six => "6",
            Grade::Seven => "7",
            Grade::Eight => "8",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == name.trim())
    }

    pub fn topics(self) -> &'static [&'static str] {
        match self {
            Grade::Five => &[
                "Greetings & Meeting People",
                "My Town",
                "Games & Hobbies",
                "My Daily Routine",
                "Health",
            ],
            Grade::Six => &[
                "Life",
                "Yummy Breakfast",
                "A Day in My City",
                "Weather & Emotions",
                "At the Fair",
            ],
            Grade::Seven => &[
                "Appearance & Personality",
                "Biographies",
                "Sports",
                "Wild Animals",
                "Television",
            ],
            Grade::Eight => &[
                "Friendship",
                "Teen Life",
                "In the Kitchen",
                "On the Phone",
                "The Internet",
            ],
        }
    }

    /// First topic of the grade; the settings form falls back to it whenever
    /// the grade changes.
    pub fn default_topic(self) -> &'static str {
        self.topics()[0]
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    FillInTheBlank,
    Matching,
}

impl QuestionType {
    pub const ALL: [QuestionType; 3] = [
        QuestionType::MultipleChoice,
        QuestionType::FillInTheBlank,
        QuestionType::Matching,
    ];

    /// Wire tag, as used in the `type` field of stored and generated questions.
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::FillInTheBlank => "fill-in-the-blank",
            QuestionType::Matching => "matching",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "Multiple Choice",
            QuestionType::FillInTheBlank => "Fill in the Blank",
            QuestionType::Matching => "Matching",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name.trim())
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Step through a fixed list of choices, wrapping at both ends.
pub fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
    let idx = all.iter().position(|v| *v == current).unwrap_or(0);
    let next = if forward {
        (idx + 1) % all.len()
    } else if idx == 0 {
        all.len() - 1
    } else {
        idx - 1
    };
    all[next]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_serializes_as_number_string() {
        assert_eq!(serde_json::to_string(&Grade::Six).unwrap(), "\"6\"");
        let g: Grade = serde_json::from_str("\"8\"").unwrap();
        assert_eq!(g, Grade::Eight);
    }

    #[test]
    fn test_question_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&QuestionType::FillInTheBlank).unwrap(),
            "\"fill-in-the-blank\""
        );
        for t in QuestionType::ALL {
            assert_eq!(QuestionType::from_name(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_every_grade_has_five_topics() {
        for g in Grade::ALL {
            assert_eq!(g.topics().len(), 5);
        }
        assert_eq!(Grade::Eight.default_topic(), "Friendship");
    }

    #[test]
    fn test_cycle_wraps_both_ways() {
        assert_eq!(cycle(&Difficulty::ALL, Difficulty::Hard, true), Difficulty::Easy);
        assert_eq!(cycle(&Difficulty::ALL, Difficulty::Easy, false), Difficulty::Hard);
        assert_eq!(cycle(&Grade::ALL, Grade::Five, true), Grade::Six);
    }

    #[test]
    fn test_difficulty_from_name_is_case_insensitive() {
        assert_eq!(Difficulty::from_name("medium"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_name("extreme"), None);
    }
}
