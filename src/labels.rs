use std::fmt;

use serde::{Deserialize, Serialize};

/// Styling hint for a categorical value. Unknown values get `Neutral`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Green,
    Blue,
    Yellow,
    Orange,
    Red,
    Purple,
    Indigo,
    Pink,
    Gray,
    Neutral,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tone::Green => "green",
            Tone::Blue => "blue",
            Tone::Yellow => "yellow",
            Tone::Orange => "orange",
            Tone::Red => "red",
            Tone::Purple => "purple",
            Tone::Indigo => "indigo",
            Tone::Pink => "pink",
            Tone::Gray => "gray",
            Tone::Neutral => "neutral",
        };
        f.write_str(name)
    }
}

// Every label enum round-trips through its display string and keeps
// unrecognized input verbatim in `Other`.
macro_rules! label_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $(Self::$variant => $label,)+
                    Self::Other(raw) => raw,
                }
            }

            pub fn is_known(&self) -> bool {
                !matches!(self, Self::Other(_))
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                let known = match raw.trim() {
                    $($label => Some(Self::$variant),)+
                    _ => None,
                };
                known.unwrap_or_else(|| Self::Other(raw))
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self::from(raw.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                match value {
                    $name::Other(raw) => raw,
                    known => known.as_str().to_string(),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

label_enum!(
    /// Letter grade on the ten-point scale.
    Grade {
        APlus => "A+",
        A => "A",
        BPlus => "B+",
        B => "B",
        CPlus => "C+",
        C => "C",
        D => "D",
        F => "F",
    }
);

impl Grade {
    /// Grade points used for GPA. Unknown grades are worth nothing.
    pub fn points(&self) -> f64 {
        match self {
            Grade::APlus => 10.0,
            Grade::A => 9.0,
            Grade::BPlus => 8.0,
            Grade::B => 7.0,
            Grade::CPlus => 6.0,
            Grade::C => 5.0,
            Grade::D => 4.0,
            Grade::F | Grade::Other(_) => 0.0,
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Grade::APlus | Grade::A => Tone::Green,
            Grade::BPlus | Grade::B => Tone::Blue,
            Grade::CPlus | Grade::C => Tone::Yellow,
            Grade::D => Tone::Orange,
            Grade::F => Tone::Red,
            Grade::Other(_) => Tone::Neutral,
        }
    }
}

label_enum!(AttendanceStatus {
    Present => "Present",
    Absent => "Absent",
    Late => "Late",
});

impl AttendanceStatus {
    pub fn tone(&self) -> Tone {
        match self {
            AttendanceStatus::Present => Tone::Green,
            AttendanceStatus::Absent => Tone::Red,
            AttendanceStatus::Late => Tone::Orange,
            AttendanceStatus::Other(_) => Tone::Neutral,
        }
    }
}

label_enum!(EventStatus {
    Upcoming => "Upcoming",
    Completed => "Completed",
    Cancelled => "Cancelled",
});

label_enum!(EventCategory {
    Tech => "Tech",
    Cultural => "Cultural",
    Sports => "Sports",
    Club => "Club",
    Workshop => "Workshop",
    Seminar => "Seminar",
    Competition => "Competition",
});

impl EventCategory {
    pub fn tone(&self) -> Tone {
        match self {
            EventCategory::Tech => Tone::Blue,
            EventCategory::Cultural => Tone::Purple,
            EventCategory::Sports => Tone::Green,
            EventCategory::Club => Tone::Orange,
            EventCategory::Workshop => Tone::Indigo,
            EventCategory::Seminar => Tone::Pink,
            EventCategory::Competition => Tone::Red,
            EventCategory::Other(_) => Tone::Neutral,
        }
    }
}

label_enum!(ExamStatus {
    Scheduled => "Scheduled",
    InProgress => "In Progress",
    Completed => "Completed",
    Cancelled => "Cancelled",
});

impl ExamStatus {
    pub fn tone(&self) -> Tone {
        match self {
            ExamStatus::Scheduled => Tone::Blue,
            ExamStatus::InProgress => Tone::Yellow,
            ExamStatus::Completed => Tone::Green,
            ExamStatus::Cancelled => Tone::Red,
            ExamStatus::Other(_) => Tone::Neutral,
        }
    }
}

label_enum!(ExamType {
    MidTerm => "Mid-term",
    EndTerm => "End-term",
    Quiz => "Quiz",
    Practical => "Practical",
    Assignment => "Assignment",
});

impl ExamType {
    pub fn tone(&self) -> Tone {
        match self {
            ExamType::MidTerm => Tone::Blue,
            ExamType::EndTerm => Tone::Red,
            ExamType::Quiz => Tone::Green,
            ExamType::Practical => Tone::Purple,
            ExamType::Assignment => Tone::Yellow,
            ExamType::Other(_) => Tone::Neutral,
        }
    }
}

label_enum!(Priority {
    Low => "Low",
    Medium => "Medium",
    High => "High",
    Urgent => "Urgent",
});

impl Priority {
    /// Sort rank, higher first. Unknown priorities rank with `Low`.
    pub fn rank(&self) -> u8 {
        match self {
            Priority::Urgent => 4,
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low | Priority::Other(_) => 1,
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            Priority::Low => Tone::Gray,
            Priority::Medium => Tone::Blue,
            Priority::High => Tone::Yellow,
            Priority::Urgent => Tone::Red,
            Priority::Other(_) => Tone::Neutral,
        }
    }
}

label_enum!(AnnouncementCategory {
    Academic => "Academic",
    Events => "Events",
    Holidays => "Holidays",
    Exams => "Exams",
    Important => "Important",
    General => "General",
});

impl AnnouncementCategory {
    pub fn tone(&self) -> Tone {
        match self {
            AnnouncementCategory::Academic => Tone::Blue,
            AnnouncementCategory::Events => Tone::Purple,
            AnnouncementCategory::Holidays => Tone::Green,
            AnnouncementCategory::Exams => Tone::Red,
            AnnouncementCategory::Important => Tone::Orange,
            AnnouncementCategory::General => Tone::Gray,
            AnnouncementCategory::Other(_) => Tone::Neutral,
        }
    }
}

label_enum!(BookStatus {
    Available => "Available",
    Issued => "Issued",
    Reserved => "Reserved",
    Lost => "Lost",
});

impl BookStatus {
    pub fn tone(&self) -> Tone {
        match self {
            BookStatus::Available => Tone::Green,
            BookStatus::Issued => Tone::Yellow,
            BookStatus::Reserved => Tone::Blue,
            BookStatus::Lost => Tone::Red,
            BookStatus::Other(_) => Tone::Neutral,
        }
    }
}

label_enum!(SessionType {
    Lecture => "Lecture",
    Lab => "Lab",
    Tutorial => "Tutorial",
    Break => "Break",
});

impl SessionType {
    pub fn tone(&self) -> Tone {
        match self {
            SessionType::Lecture => Tone::Blue,
            SessionType::Lab => Tone::Green,
            SessionType::Tutorial => Tone::Purple,
            SessionType::Break => Tone::Orange,
            SessionType::Other(_) => Tone::Neutral,
        }
    }
}
