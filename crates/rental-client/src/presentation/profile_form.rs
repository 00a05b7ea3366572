//! Profile editor state.

use serde::Deserialize;

use crate::model::{ProfileChanges, UserProfile};

/// Claims reported by the identity provider for the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdentityClaims {
    /// Verified e-mail address.
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub picture: Option<String>,
}

/// Editable profile fields, prefilled from the stored profile.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    /// Display name.
    pub name: String,
    /// Free-form gender.
    pub gender: String,
    /// Contact number.
    pub phone: String,
    /// Avatar URL.
    pub image: String,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.trim().is_empty())
}

impl ProfileForm {
    /// Prefill from the stored profile, falling back to identity claims for
    /// the name and image.
    #[must_use]
    pub fn prefill(profile: Option<&UserProfile>, claims: &IdentityClaims) -> Self {
        let pick = |stored: Option<&str>, claimed: Option<&str>| {
            non_blank(stored)
                .or_else(|| non_blank(claimed))
                .unwrap_or_default()
                .to_owned()
        };
        Self {
            name: pick(profile.map(|p| p.name.as_str()), claims.name.as_deref()),
            gender: pick(profile.and_then(|p| p.gender.as_deref()), None),
            phone: pick(profile.and_then(|p| p.phone.as_deref()), None),
            image: pick(
                profile.and_then(|p| p.image.as_deref()),
                claims.picture.as_deref(),
            ),
        }
    }

    /// Changes to send; blank fields are left out so stored values survive.
    #[must_use]
    pub fn changes(&self) -> ProfileChanges {
        let keep = |value: &str| non_blank(Some(value)).map(|text| text.trim().to_owned());
        ProfileChanges {
            name: keep(&self.name),
            gender: keep(&self.gender),
            phone: keep(&self.phone),
            image: keep(&self.image),
        }
    }
}
