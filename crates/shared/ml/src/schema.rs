//! Static column schema of the mushroom table.
//!
//! Column names follow the dataset (`cap-shape`, `stem-width`, ...). Each
//! categorical column carries the allow-list used by collapsing and the
//! sentinel that replaces anything outside it.

use spore_domain::mushroom::MushroomRecord;

pub const ID_COLUMN: &str = "id";
pub const LABEL_COLUMN: &str = "class";
pub const AREA_COLUMN: &str = "mushroom_area";

pub const CAP_DIAMETER: &str = "cap-diameter";
pub const STEM_HEIGHT: &str = "stem-height";
pub const STEM_WIDTH: &str = "stem-width";

/// Continuous columns, in the order the area formula consumes them.
pub const CONTINUOUS_COLUMNS: [&str; 3] = [CAP_DIAMETER, STEM_HEIGHT, STEM_WIDTH];

const OTHER: &str = "oth";
const OTHER_SHORT: &str = "o";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoricalFeature {
    CapShape,
    CapSurface,
    CapColor,
    DoesBruiseOrBleed,
    GillAttachment,
    GillColor,
    StemColor,
    HasRing,
    RingType,
    Habitat,
    Season,
}

impl CategoricalFeature {
    pub const ALL: [Self; 11] = [
        Self::CapShape,
        Self::CapSurface,
        Self::CapColor,
        Self::DoesBruiseOrBleed,
        Self::GillAttachment,
        Self::GillColor,
        Self::StemColor,
        Self::HasRing,
        Self::RingType,
        Self::Habitat,
        Self::Season,
    ];

    /// Position in [`Self::ALL`] and in prepared rows.
    #[must_use]
    pub const fn slot(self) -> usize {
        self as usize
    }

    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::CapShape => "cap-shape",
            Self::CapSurface => "cap-surface",
            Self::CapColor => "cap-color",
            Self::DoesBruiseOrBleed => "does-bruise-or-bleed",
            Self::GillAttachment => "gill-attachment",
            Self::GillColor => "gill-color",
            Self::StemColor => "stem-color",
            Self::HasRing => "has-ring",
            Self::RingType => "ring-type",
            Self::Habitat => "habitat",
            Self::Season => "season",
        }
    }

    /// Codes kept as-is by collapsing.
    #[must_use]
    pub const fn allowed(self) -> &'static [&'static str] {
        match self {
            Self::CapShape => &["s", "o", "f", "b", "x", "c", "p"],
            Self::CapSurface => &["t", "d", "h", "s", "y", "k", "g"],
            Self::CapColor | Self::GillColor => &["n", "w", "y", "b", "p", "g", "e", "o"],
            Self::DoesBruiseOrBleed | Self::HasRing => &["t", "f"],
            Self::GillAttachment => &["a", "e", "p", "x", "d", "s"],
            Self::StemColor => &["n", "w", "y"],
            Self::RingType => &["f"],
            Self::Habitat => &["d", "g"],
            Self::Season => &["s", "u", "a", "w"],
        }
    }

    /// Catch-all value for codes outside [`Self::allowed`] and for missing cells.
    #[must_use]
    pub const fn sentinel(self) -> &'static str {
        match self {
            Self::RingType | Self::Habitat => OTHER_SHORT,
            _ => OTHER,
        }
    }

    /// Collapses a raw cell into the allow-list or the sentinel.
    #[must_use]
    pub fn collapse(self, value: Option<&str>) -> &'static str {
        value
            .and_then(|v| self.allowed().iter().find(|allowed| **allowed == v))
            .copied()
            .unwrap_or_else(|| self.sentinel())
    }

    /// Reads this attribute's code from a validated record.
    #[must_use]
    pub fn code_of(self, record: &MushroomRecord) -> &'static str {
        match self {
            Self::CapShape => record.cap_shape.code(),
            Self::CapSurface => record.cap_surface.code(),
            Self::CapColor => record.cap_color.code(),
            Self::DoesBruiseOrBleed => record.does_bruise_or_bleed.code(),
            Self::GillAttachment => record.gill_attachment.code(),
            Self::GillColor => record.gill_color.code(),
            Self::StemColor => record.stem_color.code(),
            Self::HasRing => record.has_ring.code(),
            Self::RingType => record.ring_type.code(),
            Self::Habitat => record.habitat.code(),
            Self::Season => record.season.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_keeps_allowed_and_buckets_the_rest() {
        assert_eq!(CategoricalFeature::CapShape.collapse(Some("x")), "x");
        assert_eq!(CategoricalFeature::CapShape.collapse(Some("z")), "oth");
        assert_eq!(CategoricalFeature::RingType.collapse(Some("f")), "f");
        assert_eq!(CategoricalFeature::RingType.collapse(Some("p")), "o");
        assert_eq!(CategoricalFeature::Habitat.collapse(Some("m")), "o");
        assert_eq!(CategoricalFeature::StemColor.collapse(None), "oth");
    }

    #[test]
    fn column_names_are_unique() {
        let mut names: Vec<_> = CategoricalFeature::ALL.iter().map(|f| f.column()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), CategoricalFeature::ALL.len());

        for (i, feature) in CategoricalFeature::ALL.iter().enumerate() {
            assert_eq!(feature.slot(), i);
        }
    }
}
