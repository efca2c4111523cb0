#![allow(dead_code)]

use spore_domain::config::TrainingConfig;
use spore_domain::mushroom::{
    CapShape, CapSurface, Color, GillAttachment, Habitat, MushroomRecord, Presence, RingType, Season,
};
use spore_ml::{ModelTrainer, TrainedArtifact};

pub fn artifact() -> TrainedArtifact {
    let mut rows = vec![
        "class,cap-diameter,cap-shape,cap-surface,cap-color,does-bruise-or-bleed,gill-attachment,gill-color,stem-height,stem-width,stem-color,has-ring,ring-type,habitat,season".to_owned(),
    ];
    for i in 0..40 {
        let jitter = f64::from(i % 5) * 0.2;
        rows.push(if i % 2 == 0 {
            format!("p,{:.1},x,g,o,f,e,w,{:.1},{:.1},w,t,g,d,w", 15.0 + jitter, 16.0 + jitter, 17.0 + jitter)
        } else {
            format!("e,{:.1},f,s,n,t,a,n,{:.1},{:.1},n,f,f,g,s", 3.0 + jitter, 4.0 + jitter, 5.0 + jitter)
        });
    }
    let config = TrainingConfig { n_trees: 15, min_samples_split: 2, ..TrainingConfig::default() };
    ModelTrainer::new(config).fit_csv(rows.join("\n").as_bytes()).unwrap()
}

/// Large orange woodland mushroom, the poisonous side of [`artifact`]'s data.
pub fn poisonous() -> MushroomRecord {
    MushroomRecord {
        cap_shape: CapShape::Convex,
        cap_surface: CapSurface::Grooves,
        cap_color: Color::Orange,
        does_bruise_or_bleed: Presence::No,
        gill_attachment: GillAttachment::Free,
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

pub fn edible() -> MushroomRecord {
    MushroomRecord {
        cap_shape: CapShape::Flat,
        cap_surface: CapSurface::Smooth,
        cap_color: Color::Brown,
        does_bruise_or_bleed: Presence::Yes,
        gill_attachment: GillAttachment::Adnate,
        gill_color: Color::Brown,
        stem_color: Color::Brown,
        has_ring: Presence::No,
        ring_type: RingType::NoRing,
        habitat: Habitat::Grasses,
        season: Season::Spring,
        cap_diameter: 3.2,
        stem_height: 4.1,
        stem_width: 5.3,
    }
}

/// Query string of one record, as a browser form would send it.
pub fn query(record: &MushroomRecord) -> String {
    format!(
        "cap_shape={}&cap_surface={}&cap_color={}&does_bruise_or_bleed={}&gill_attachment={}\
         &gill_color={}&stem_color={}&has_ring={}&ring_type={}&habitat={}&season={}\
         &cap_diameter={}&stem_height={}&stem_width={}",
        record.cap_shape.code(),
        record.cap_surface.code(),
        record.cap_color.code(),
        record.does_bruise_or_bleed.code(),
        record.gill_attachment.code(),
        record.gill_color.code(),
        record.stem_color.code(),
        record.has_ring.code(),
        record.ring_type.code(),
        record.habitat.code(),
        record.season.code(),
        record.cap_diameter,
        record.stem_height,
        record.stem_width,
    )
}
