//! Closed code sets of the secondary mushroom dataset and the validated record type.
//!
//! Every categorical attribute is a single-letter code. The enums below are
//! the wire format (query strings, JSON bodies) and are never coerced: an
//! unknown code is a validation error. Collapsing rare levels into a catch-all
//! bucket is a preprocessing concern and lives with the model.

use crate::{DomainError, DomainErrorExt};
use crate::constants::{CAP_DIAMETER_MAX, STEM_HEIGHT_MAX, STEM_WIDTH_MAX};
use serde::{Deserialize, Serialize};
use spore_derive::api_model;
use utoipa::{IntoParams, ToSchema};

macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident = $code:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema,
            strum_macros::EnumIter, strum_macros::EnumString, strum_macros::IntoStaticStr,
            strum_macros::Display,
        )]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $code)]
                #[strum(serialize = $code)]
                $variant,
            )+
        }

        impl $name {
            /// The single-letter dataset code.
            #[must_use]
            pub fn code(self) -> &'static str {
                self.into()
            }
        }
    };
}

code_enum! {
    /// Shape of the cap.
    CapShape {
        Bell = "b",
        Conical = "c",
        Convex = "x",
        Flat = "f",
        Sunken = "s",
        Spherical = "p",
        Others = "o",
    }
}

code_enum! {
    /// Texture of the cap surface.
    CapSurface {
        Fibrous = "i",
        Grooves = "g",
        Scaly = "y",
        Smooth = "s",
        Shiny = "h",
        Leathery = "l",
        Silky = "k",
        Sticky = "t",
        Wrinkled = "w",
        Fleshy = "e",
        Dry = "d",
    }
}

code_enum! {
    /// Colour palette shared by cap, gills and stem.
    Color {
        Brown = "n",
        Buff = "b",
        Gray = "g",
        Green = "r",
        Pink = "p",
        Purple = "u",
        Red = "e",
        White = "w",
        Yellow = "y",
        Blue = "l",
        Orange = "o",
        Black = "k",
        NoColor = "f",
    }
}

code_enum! {
    /// Yes/no attributes (bruising or bleeding, ring presence).
    Presence {
        Yes = "t",
        No = "f",
    }
}

code_enum! {
    GillAttachment {
        Adnate = "a",
        Adnexed = "x",
        Decurrent = "d",
        Free = "e",
        Sinuate = "s",
        Pores = "p",
        NoGills = "f",
    }
}

code_enum! {
    RingType {
        Cobwebby = "c",
        Evanescent = "e",
        Flaring = "r",
        Grooved = "g",
        Large = "l",
        Pendant = "p",
        Sheathing = "s",
        Zone = "z",
        Scaly = "y",
        Movable = "m",
        NoRing = "f",
    }
}

code_enum! {
    Habitat {
        Grasses = "g",
        Leaves = "l",
        Meadows = "m",
        Paths = "p",
        Heaths = "h",
        Urban = "u",
        Waste = "w",
        Woods = "d",
    }
}

code_enum! {
    Season {
        Spring = "s",
        Summer = "u",
        Autumn = "a",
        Winter = "w",
    }
}

/// Range checks that serde cannot express.
pub trait Validate {
    /// # Errors
    /// Returns [`DomainError::Validation`] naming the first offending field.
    fn validate(&self) -> Result<(), DomainError>;
}

/// One mushroom observation as accepted by the prediction endpoints.
///
/// Keys outside the record (a dataset `id`, a `class` label) are ignored.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, PartialEq, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MushroomRecord {
    pub cap_shape: CapShape,
    pub cap_surface: CapSurface,
    pub cap_color: Color,
    pub does_bruise_or_bleed: Presence,
    pub gill_attachment: GillAttachment,
    pub gill_color: Color,
    pub stem_color: Color,
    pub has_ring: Presence,
    pub ring_type: RingType,
    pub habitat: Habitat,
    pub season: Season,
    /// Cap diameter, `0..=58.4` cm.
    #[schema(minimum = 0.0, maximum = 58.4)]
    #[param(minimum = 0.0, maximum = 58.4)]
    pub cap_diameter: f64,
    /// Stem height, `0..=27.3` cm.
    #[schema(minimum = 0.0, maximum = 27.3)]
    #[param(minimum = 0.0, maximum = 27.3)]
    pub stem_height: f64,
    /// Stem width, `0..=66.3` mm.
    #[schema(minimum = 0.0, maximum = 66.3)]
    #[param(minimum = 0.0, maximum = 66.3)]
    pub stem_width: f64,
}

fn check_range(field: &'static str, value: f64, max: f64) -> Result<(), DomainError> {
    if (0.0..=max).contains(&value) {
        Ok(())
    } else {
        Err(DomainError::Validation {
            message: format!("{field} must be between 0 and {max}, got {value}").into(),
            context: None,
        })
    }
}

impl Validate for MushroomRecord {
    fn validate(&self) -> Result<(), DomainError> {
        check_range("cap_diameter", self.cap_diameter, CAP_DIAMETER_MAX)?;
        check_range("stem_height", self.stem_height, STEM_HEIGHT_MAX)?;
        check_range("stem_width", self.stem_width, STEM_WIDTH_MAX)
    }
}

impl<T: Validate> Validate for [T] {
    fn validate(&self) -> Result<(), DomainError> {
        self.iter()
            .enumerate()
            .try_for_each(|(i, item)| item.validate().context(format!("item {i}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn sample() -> MushroomRecord {
        MushroomRecord {
            cap_shape: CapShape::Convex,
            cap_surface: CapSurface::Grooves,
            cap_color: Color::Orange,
            does_bruise_or_bleed: Presence::No,
            gill_attachment: GillAttachment::Adnexed,
            gill_color: Color::White,
            stem_color: Color::White,
            has_ring: Presence::Yes,
            ring_type: RingType::Grooved,
            habitat: Habitat::Woods,
            season: Season::Winter,
            cap_diameter: 15.26,
            stem_height: 16.95,
            stem_width: 17.09,
        }
    }

    #[test]
    fn codes_are_single_letters_and_unique() {
        let codes: Vec<_> = Color::iter().map(Color::code).collect();
        assert_eq!(codes.len(), 13);
        assert!(codes.iter().all(|c| c.len() == 1));
        let mut dedup = codes.clone();
        dedup.sort_unstable();
        dedup.dedup();
        assert_eq!(dedup.len(), codes.len());
    }

    #[test]
    fn codes_parse_back() {
        assert_eq!("x".parse::<CapShape>().unwrap(), CapShape::Convex);
        assert_eq!(RingType::NoRing.code(), "f");
        assert!("q".parse::<Habitat>().is_err());
    }

    #[test]
    fn bounds_are_inclusive() {
        let mut record = sample();
        record.cap_diameter = CAP_DIAMETER_MAX;
        record.stem_height = 0.0;
        assert!(record.validate().is_ok());

        record.stem_width = 66.31;
        let err = record.validate().unwrap_err();
        assert!(err.to_string().contains("stem_width"));
    }

    #[test]
    fn nan_is_rejected() {
        let mut record = sample();
        record.stem_height = f64::NAN;
        assert!(record.validate().is_err());
    }

    #[test]
    fn slice_validation_names_the_item() {
        let mut bad = sample();
        bad.cap_diameter = -1.0;
        let records = vec![sample(), bad];
        let err = records.validate().unwrap_err();
        assert!(err.to_string().contains("item 1"));
    }
}
