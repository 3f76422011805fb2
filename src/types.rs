//! Shared enumerations stored as text columns

use serde::{Deserialize, Serialize};

/// Declares a snake_case string enum with `as_str`, `FromStr` and `ALL`
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!(
                        "invalid value '{}', expected one of: {}",
                        other,
                        [$($text),+].join(", ")
                    )),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

text_enum! {
    /// Global user role. Ordered from most to least privileged.
    Role {
        Admin => "admin",
        Manager => "manager",
        Member => "member",
    }
}

impl Role {
    fn rank(&self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Manager => 2,
            Role::Member => 1,
        }
    }

    /// True when this role grants at least the privileges of `required`
    pub fn at_least(&self, required: Role) -> bool {
        self.rank() >= required.rank()
    }
}

text_enum! {
    TeamRole {
        Lead => "lead",
        Member => "member",
    }
}

text_enum! {
    ProjectStatus {
        Planning => "planning",
        Active => "active",
        OnHold => "on_hold",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

text_enum! {
    GoalStatus {
        NotStarted => "not_started",
        InProgress => "in_progress",
        Completed => "completed",
    }
}

text_enum! {
    TaskStatus {
        Todo => "todo",
        InProgress => "in_progress",
        Done => "done",
    }
}

text_enum! {
    TaskPriority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Urgent => "urgent",
    }
}

text_enum! {
    NotificationKind {
        Registration => "registration",
        Approval => "approval",
        Team => "team",
        Task => "task",
        Message => "message",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_ordering() {
        assert!(Role::Admin.at_least(Role::Manager));
        assert!(Role::Manager.at_least(Role::Manager));
        assert!(!Role::Member.at_least(Role::Manager));
        assert!(Role::Member.at_least(Role::Member));
    }

    #[test]
    fn parses_snake_case_values() {
        assert_eq!("on_hold".parse::<ProjectStatus>().unwrap(), ProjectStatus::OnHold);
        assert_eq!("in_progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        let err = "paused".parse::<ProjectStatus>().unwrap_err();
        assert!(err.contains("planning, active, on_hold, completed, cancelled"));
    }

    #[test]
    fn serde_matches_database_text() {
        for status in ProjectStatus::ALL {
            let json = serde_json::to_value(status).unwrap();
            assert_eq!(json, status.as_str());
        }
        let priority: TaskPriority = serde_json::from_str("\"urgent\"").unwrap();
        assert_eq!(priority, TaskPriority::Urgent);
    }
}
