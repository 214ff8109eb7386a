use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The resource-access operation a privacy request targets.
///
/// Each action is owned by exactly one handler. The wire tags
/// (`view_profile`, `view_attendees`, ...) are the only accepted spellings.
///
/// # Examples
///
/// ```
/// use privacy_policy::Action;
///
/// let action: Action = "view_carpool".parse().unwrap();
/// assert_eq!(action, Action::ViewCarpool);
/// assert_eq!(action.as_str(), "view_carpool");
///
/// let err = "view_wallet".parse::<Action>().unwrap_err();
/// assert_eq!(err.to_string(), "Unknown action: view_wallet");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// View a single user's profile
    ViewProfile,
    /// View the attendee list of an event
    ViewAttendees,
    /// View the carpool roster of an event
    ViewCarpool,
    /// View a user's personal schedule
    ViewSchedule,
}

impl Action {
    /// All actions in handler-chain priority order.
    pub const ALL: [Action; 4] = [
        Action::ViewProfile,
        Action::ViewAttendees,
        Action::ViewCarpool,
        Action::ViewSchedule,
    ];

    /// Returns the wire tag for this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ViewProfile => "view_profile",
            Action::ViewAttendees => "view_attendees",
            Action::ViewCarpool => "view_carpool",
            Action::ViewSchedule => "view_schedule",
        }
    }

    /// Returns the diagnostic name of the handler that owns this action.
    pub fn handler_name(&self) -> &'static str {
        match self {
            Action::ViewProfile => "ViewProfileHandler",
            Action::ViewAttendees => "ViewAttendeesHandler",
            Action::ViewCarpool => "ViewCarpoolHandler",
            Action::ViewSchedule => "ViewScheduleHandler",
        }
    }

    /// Parses a possibly absent action tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownAction`] carrying the literal value (or `<none>`)
    /// when the tag is not recognized.
    pub fn parse_tag(tag: Option<&str>) -> Result<Self, Error> {
        match tag {
            Some(tag) => tag.parse(),
            None => Err(Error::unknown_action(None)),
        }
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| Error::unknown_action(Some(s)))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
