//! Four-step listing creation: location, image, basics, then facilities.
//!
//! Each step validates its own input before the wizard advances. The final
//! step yields the [`NewListing`] to send to the API.

use std::collections::BTreeMap;

use super::filter::validate_string;
use crate::model::NewListing;

/// Field name to validation message.
pub type StepErrors = BTreeMap<&'static str, &'static str>;

const MIN_PRICE: i32 = 1000;
const PRICE_MESSAGE: &str = "Must be greater than 999 dollars";
const IMAGE_MESSAGE: &str = "Please provide an image";
const FACILITIES_MESSAGE: &str = "Must have atleast one facility";
const ORDER_MESSAGE: &str = "Complete the previous steps first";

/// Position in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WizardStep {
    /// Country, city and address.
    Location,
    /// Cover image URL.
    Image,
    /// Title, description and price.
    Basics,
    /// Amenities, then submit.
    Facilities,
}

impl WizardStep {
    fn next(self) -> Self {
        match self {
            Self::Location => Self::Image,
            Self::Image => Self::Basics,
            Self::Basics | Self::Facilities => Self::Facilities,
        }
    }

    fn previous(self) -> Self {
        match self {
            Self::Location | Self::Image => Self::Location,
            Self::Basics => Self::Image,
            Self::Facilities => Self::Basics,
        }
    }
}

/// Values for [`WizardStep::Location`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationStep {
    /// Country name.
    pub country: String,
    /// City name.
    pub city: String,
    /// Street address.
    pub address: String,
}

/// Values for [`WizardStep::Image`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageStep {
    /// Uploaded image URL.
    pub url: String,
}

/// Values for [`WizardStep::Basics`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BasicsStep {
    /// Listing headline.
    pub title: String,
    /// Listing description.
    pub description: String,
    /// Price in whole currency units.
    pub price: i32,
}

/// Values for [`WizardStep::Facilities`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacilitiesStep {
    /// Amenity labels.
    pub facilities: Vec<String>,
}

/// Collects a listing across the four steps.
#[derive(Debug, Clone)]
pub struct ListingWizard {
    step: WizardStep,
    owner_email: String,
    location: LocationStep,
    image: ImageStep,
    basics: BasicsStep,
}

fn check_text(errors: &mut StepErrors, field: &'static str, value: &str) {
    if let Some(message) = validate_string(value.trim()) {
        errors.insert(field, message);
    }
}

fn order_error() -> StepErrors {
    StepErrors::from([("step", ORDER_MESSAGE)])
}

impl ListingWizard {
    /// Start a wizard for a listing owned by `owner_email`.
    #[must_use]
    pub fn new(owner_email: impl Into<String>) -> Self {
        Self {
            step: WizardStep::Location,
            owner_email: owner_email.into(),
            location: LocationStep::default(),
            image: ImageStep::default(),
            basics: BasicsStep::default(),
        }
    }

    /// Current step.
    #[must_use]
    pub fn step(&self) -> WizardStep {
        self.step
    }

    /// Return to the previous step, keeping entered values.
    pub fn back(&mut self) -> WizardStep {
        self.step = self.step.previous();
        self.step
    }

    fn advance(&mut self, expected: WizardStep, errors: StepErrors) -> Result<WizardStep, StepErrors> {
        if self.step != expected {
            return Err(order_error());
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        self.step = self.step.next();
        Ok(self.step)
    }

    /// Validate and record the location.
    ///
    /// # Errors
    /// Per-field messages for country, city and address shorter than three
    /// characters.
    pub fn submit_location(&mut self, input: LocationStep) -> Result<WizardStep, StepErrors> {
        let mut errors = StepErrors::new();
        check_text(&mut errors, "country", &input.country);
        check_text(&mut errors, "city", &input.city);
        check_text(&mut errors, "address", &input.address);
        let next = self.advance(WizardStep::Location, errors)?;
        self.location = LocationStep {
            country: input.country.trim().to_owned(),
            city: input.city.trim().to_owned(),
            address: input.address.trim().to_owned(),
        };
        Ok(next)
    }

    /// Validate and record the image URL.
    ///
    /// # Errors
    /// `image` when the URL is blank.
    pub fn submit_image(&mut self, input: ImageStep) -> Result<WizardStep, StepErrors> {
        let mut errors = StepErrors::new();
        if input.url.trim().is_empty() {
            errors.insert("image", IMAGE_MESSAGE);
        }
        let next = self.advance(WizardStep::Image, errors)?;
        self.image = ImageStep {
            url: input.url.trim().to_owned(),
        };
        Ok(next)
    }

    /// Validate and record title, description and price.
    ///
    /// # Errors
    /// Short title or description, or a price of 999 or less.
    pub fn submit_basics(&mut self, input: BasicsStep) -> Result<WizardStep, StepErrors> {
        let mut errors = StepErrors::new();
        check_text(&mut errors, "title", &input.title);
        check_text(&mut errors, "description", &input.description);
        if input.price < MIN_PRICE {
            errors.insert("price", PRICE_MESSAGE);
        }
        let next = self.advance(WizardStep::Basics, errors)?;
        self.basics = BasicsStep {
            title: input.title.trim().to_owned(),
            description: input.description.trim().to_owned(),
            price: input.price,
        };
        Ok(next)
    }

    /// Validate the facilities and produce the listing.
    ///
    /// # Errors
    /// `facilities` when no non-blank facility is given, or `step` when an
    /// earlier step is incomplete.
    pub fn submit_facilities(&self, input: FacilitiesStep) -> Result<NewListing, StepErrors> {
        if self.step != WizardStep::Facilities {
            return Err(order_error());
        }
        let facilities: Vec<String> = input
            .facilities
            .iter()
            .map(|facility| facility.trim())
            .filter(|facility| !facility.is_empty())
            .map(str::to_owned)
            .collect();
        if facilities.is_empty() {
            return Err(StepErrors::from([("facilities", FACILITIES_MESSAGE)]));
        }
        Ok(NewListing {
            title: self.basics.title.clone(),
            description: self.basics.description.clone(),
            price: self.basics.price,
            address: self.location.address.clone(),
            city: self.location.city.clone(),
            country: self.location.country.clone(),
            image: self.image.url.clone(),
            facilities,
            user_email: self.owner_email.clone(),
        })
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "test code uses expect for clear failure messages")]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn location() -> LocationStep {
        LocationStep {
            country: "Portugal".to_owned(),
            city: "Lisbon".to_owned(),
            address: " 12 Rua Augusta ".to_owned(),
        }
    }

    fn basics(price: i32) -> BasicsStep {
        BasicsStep {
            title: "Sunny loft".to_owned(),
            description: "Bright and central".to_owned(),
            price,
        }
    }

    #[fixture]
    fn at_basics() -> ListingWizard {
        let mut wizard = ListingWizard::new("owner@example.com");
        wizard.submit_location(location()).expect("location");
        wizard
            .submit_image(ImageStep {
                url: "https://img.example/loft.jpg".to_owned(),
            })
            .expect("image");
        wizard
    }

    #[test]
    fn location_fields_need_three_characters() {
        let mut wizard = ListingWizard::new("owner@example.com");
        let errors = wizard
            .submit_location(LocationStep {
                country: "PT".to_owned(),
                city: "Lisbon".to_owned(),
                address: String::new(),
            })
            .expect_err("invalid");
        assert_eq!(errors.get("country"), Some(&"Must have atleast 3 characters"));
        assert!(errors.contains_key("address"));
        assert!(!errors.contains_key("city"));
        assert_eq!(wizard.step(), WizardStep::Location);
    }

    #[test]
    fn blank_image_is_rejected() {
        let mut wizard = ListingWizard::new("owner@example.com");
        wizard.submit_location(location()).expect("location");
        let errors = wizard
            .submit_image(ImageStep { url: "  ".to_owned() })
            .expect_err("blank");
        assert_eq!(errors.get("image"), Some(&IMAGE_MESSAGE));
    }

    #[rstest]
    #[case(999, true)]
    #[case(0, true)]
    #[case(1000, false)]
    fn price_must_exceed_999(mut at_basics: ListingWizard, #[case] price: i32, #[case] rejected: bool) {
        let result = at_basics.submit_basics(basics(price));
        assert_eq!(result.is_err(), rejected);
        if let Err(errors) = result {
            assert_eq!(errors.get("price"), Some(&PRICE_MESSAGE));
        }
    }

    #[rstest]
    fn completed_wizard_builds_listing(mut at_basics: ListingWizard) {
        at_basics.submit_basics(basics(1500)).expect("basics");
        let listing = at_basics
            .submit_facilities(FacilitiesStep {
                facilities: vec!["wifi".to_owned(), "  ".to_owned(), " parking ".to_owned()],
            })
            .expect("listing");
        assert_eq!(listing.address, "12 Rua Augusta");
        assert_eq!(listing.facilities, vec!["wifi", "parking"]);
        assert_eq!(listing.price, 1500);
        assert_eq!(listing.user_email, "owner@example.com");
    }

    #[rstest]
    fn facilities_need_one_entry(mut at_basics: ListingWizard) {
        at_basics.submit_basics(basics(1500)).expect("basics");
        let errors = at_basics
            .submit_facilities(FacilitiesStep::default())
            .expect_err("empty");
        assert_eq!(errors.get("facilities"), Some(&FACILITIES_MESSAGE));
    }

    #[test]
    fn steps_cannot_be_skipped() {
        let mut wizard = ListingWizard::new("owner@example.com");
        let errors = wizard.submit_basics(basics(1500)).expect_err("skipped");
        assert_eq!(errors.get("step"), Some(&ORDER_MESSAGE));
    }

    #[rstest]
    fn back_keeps_previous_values(mut at_basics: ListingWizard) {
        assert_eq!(at_basics.back(), WizardStep::Image);
        assert_eq!(at_basics.back(), WizardStep::Location);
        assert_eq!(at_basics.back(), WizardStep::Location);
        assert_eq!(at_basics.location.city, "Lisbon");
    }
}
