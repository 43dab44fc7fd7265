//! User actions the banner can raise.

use std::fmt;
use std::str::FromStr;

use super::view::ids;
use crate::error::Error;

/// A click on one of the banner's buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerAction {
    AcceptAll,
    /// Raised by both the summary and the detail "Reject All" buttons.
    RejectAll,
    Customize,
    CloseDetail,
    /// Save whatever the detail toggles currently say.
    SavePreferences,
}

impl BannerAction {
    /// Element id of the button that raises this action.
    ///
    /// `RejectAll` maps to the summary button.
    pub fn element_id(self) -> &'static str {
        match self {
            Self::AcceptAll => ids::ACCEPT,
            Self::RejectAll => ids::REJECT,
            Self::Customize => ids::CUSTOMISE,
            Self::CloseDetail => ids::CLOSE,
            Self::SavePreferences => ids::SAVE,
        }
    }
}

impl FromStr for BannerAction {
    type Err = Error;

    /// Maps a clicked element id to its action.
    fn from_str(id: &str) -> Result<Self, Self::Err> {
        match id {
            ids::ACCEPT => Ok(Self::AcceptAll),
            ids::REJECT | ids::REJECT_DETAIL => Ok(Self::RejectAll),
            ids::CUSTOMISE => Ok(Self::Customize),
            ids::CLOSE => Ok(Self::CloseDetail),
            ids::SAVE => Ok(Self::SavePreferences),
            other => Err(Error::UnknownElement {
                id: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for BannerAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AcceptAll => "accept-all",
            Self::RejectAll => "reject-all",
            Self::Customize => "customize",
            Self::CloseDetail => "close-detail",
            Self::SavePreferences => "save-preferences",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_button_ids() {
        assert_eq!("ccAccept".parse::<BannerAction>().unwrap(), BannerAction::AcceptAll);
        assert_eq!("ccReject".parse::<BannerAction>().unwrap(), BannerAction::RejectAll);
        assert_eq!(
            "ccRejectDetail".parse::<BannerAction>().unwrap(),
            BannerAction::RejectAll
        );
        assert_eq!("ccCustomise".parse::<BannerAction>().unwrap(), BannerAction::Customize);
        assert_eq!("ccClose".parse::<BannerAction>().unwrap(), BannerAction::CloseDetail);
        assert_eq!("ccSave".parse::<BannerAction>().unwrap(), BannerAction::SavePreferences);
    }

    #[test]
    fn test_checkboxes_are_not_actions() {
        let err = "ccAnalytics".parse::<BannerAction>().unwrap_err();
        assert!(matches!(err, Error::UnknownElement { id } if id == "ccAnalytics"));
    }

    #[test]
    fn test_element_id_parses_back() {
        for action in [
            BannerAction::AcceptAll,
            BannerAction::RejectAll,
            BannerAction::Customize,
            BannerAction::CloseDetail,
            BannerAction::SavePreferences,
        ] {
            assert_eq!(action.element_id().parse::<BannerAction>().unwrap(), action);
        }
    }
}
