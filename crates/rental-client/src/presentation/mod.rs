//! Helpers behind the listing, search and profile views.

mod filter;
mod profile_form;
mod wizard;

pub use filter::{matches_property_filter, toggle_favourite_ids, validate_string};
pub use profile_form::{IdentityClaims, ProfileForm};
pub use wizard::{
    BasicsStep, FacilitiesStep, ImageStep, ListingWizard, LocationStep, StepErrors, WizardStep,
};
