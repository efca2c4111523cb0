//! Request and response payloads of the HTTP surface.

use crate::DomainError;
use crate::mushroom::{
    CapShape, CapSurface, Color, GillAttachment, Habitat, MushroomRecord, Presence, RingType,
    Season, Validate,
};
use spore_derive::api_model;
use utoipa::IntoParams;

/// Body of `POST /predict/predict_batch/`. Extra keys are ignored.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone)]
pub struct MushroomsBatch {
    pub mushrooms: Vec<MushroomRecord>,
}

impl Validate for MushroomsBatch {
    fn validate(&self) -> Result<(), DomainError> {
        self.mushrooms.validate()
    }
}

/// Column-wise query of `GET /predict/predict_proba_batch/`.
///
/// Each parameter is repeated once per mushroom, e.g.
/// `?cap_shape=x&cap_shape=f&cap_surface=g&cap_surface=s...`.
/// All lists must have the same length. Parameters outside the record
/// fields are ignored.
#[api_model(deny_unknown_fields = false)]
#[derive(Clone, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProbaBatchQuery {
    pub cap_shape: Vec<CapShape>,
    pub cap_surface: Vec<CapSurface>,
    pub cap_color: Vec<Color>,
    pub does_bruise_or_bleed: Vec<Presence>,
    pub gill_attachment: Vec<GillAttachment>,
    pub gill_color: Vec<Color>,
    pub stem_color: Vec<Color>,
    pub has_ring: Vec<Presence>,
    pub ring_type: Vec<RingType>,
    pub habitat: Vec<Habitat>,
    pub season: Vec<Season>,
    pub cap_diameter: Vec<f64>,
    pub stem_height: Vec<f64>,
    pub stem_width: Vec<f64>,
}

impl ProbaBatchQuery {
    fn lengths(&self) -> [usize; 14] {
        [
            self.cap_shape.len(),
            self.cap_surface.len(),
            self.cap_color.len(),
            self.does_bruise_or_bleed.len(),
            self.gill_attachment.len(),
            self.gill_color.len(),
            self.stem_color.len(),
            self.has_ring.len(),
            self.ring_type.len(),
            self.habitat.len(),
            self.season.len(),
            self.cap_diameter.len(),
            self.stem_height.len(),
            self.stem_width.len(),
        ]
    }

    /// Zips the columns into records.
    ///
    /// # Errors
    /// Returns [`DomainError::Validation`] when the lists differ in length.
    pub fn into_records(self) -> Result<Vec<MushroomRecord>, DomainError> {
        let lengths = self.lengths();
        let n = lengths[0];
        if lengths.iter().any(|&len| len != n) {
            return Err(DomainError::Validation {
                message: "All lists must have the same length".into(),
                context: None,
            });
        }

        Ok((0..n)
            .map(|i| MushroomRecord {
                cap_shape: self.cap_shape[i],
                cap_surface: self.cap_surface[i],
                cap_color: self.cap_color[i],
                does_bruise_or_bleed: self.does_bruise_or_bleed[i],
                gill_attachment: self.gill_attachment[i],
                gill_color: self.gill_color[i],
                stem_color: self.stem_color[i],
                has_ring: self.has_ring[i],
                ring_type: self.ring_type[i],
                habitat: self.habitat[i],
                season: self.season[i],
                cap_diameter: self.cap_diameter[i],
                stem_height: self.stem_height[i],
                stem_width: self.stem_width[i],
            })
            .collect())
    }
}

/// Lengths are checked when zipping; here only the numeric ranges.
impl Validate for ProbaBatchQuery {
    fn validate(&self) -> Result<(), DomainError> {
        self.clone().into_records()?.validate()
    }
}

/// Classification result; `null` until a model has been trained.
#[api_model]
#[derive(Clone, Copy, PartialEq)]
pub struct PredictResponse {
    pub poisonous: Option<bool>,
}

/// Probability of the poisonous class; `null` until a model has been trained.
#[api_model]
#[derive(Clone, Copy, PartialEq)]
pub struct ProbaResponse {
    pub probability_of_poisonous: Option<f64>,
}

#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct StatusResponse {
    /// RFC 3339 timestamp of the last successful training run.
    pub model_trained_at: String,
}

#[api_model]
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FitResponse {
    pub success: bool,
}

/// Error body shared by every endpoint.
#[api_model]
#[derive(Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub detail: String,
}
