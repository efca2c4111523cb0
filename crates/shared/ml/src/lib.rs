//! # Mushroom model
//!
//! Everything between an uploaded table and a probability:
//!
//! * [`RawFrame`]: typed CSV / record table with missing values.
//! * [`FeaturePreparer`]: fixed-order cleaning, collapsing and the derived `mushroom_area`.
//! * [`FeatureEncoder`] + [`RandomForest`] wrapped in a [`MushroomPipeline`].
//! * [`ModelTrainer`]: split, optional grid search, fit, [`TrainedArtifact`].
//! * [`ModelArtifactStore`]: atomic persistence of the artifact.
//!
//! ```rust
//! use spore_ml::{ModelTrainer, RawFrame};
//! use spore_domain::config::TrainingConfig;
//!
//! let csv = "class,cap-diameter,cap-shape,cap-surface,cap-color,does-bruise-or-bleed,\
//! gill-attachment,gill-color,stem-height,stem-width,stem-color,has-ring,ring-type,habitat,season
//! p,15.2,x,g,o,f,e,w,16.9,17.0,w,t,g,d,w
//! e,3.1,f,s,n,t,a,n,4.0,5.2,n,f,f,g,s
//! p,14.8,x,g,o,f,e,w,15.9,16.5,w,t,g,d,w
//! e,2.9,f,s,n,t,a,n,3.8,5.0,n,f,f,g,s
//! ";
//! let config = TrainingConfig { n_trees: 5, min_samples_split: 2, ..TrainingConfig::default() };
//! let artifact = ModelTrainer::new(config).fit_csv(csv.as_bytes()).unwrap();
//! assert_eq!(artifact.pipeline.forest().n_trees(), 5);
//! ```

mod artifact;
mod encoder;
mod error;
mod forest;
mod frame;
mod pipeline;
mod preparer;
pub mod schema;
mod search;
mod store;
mod trainer;

pub use artifact::TrainedArtifact;
pub use encoder::FeatureEncoder;
pub use error::{TrainError, TrainErrorExt};
pub use forest::{DecisionTree, ForestParams, RandomForest};
pub use frame::{Column, ColumnValues, RawFrame};
pub use pipeline::MushroomPipeline;
pub use preparer::{FeaturePreparer, PreparedTable, mushroom_area};
pub use search::{GridSearch, KFold, ParamGrid, SearchOutcome, f1_score};
pub use store::{ArtifactStoreError, ArtifactStoreErrorExt, ModelArtifactStore};
pub use trainer::{ModelTrainer, parse_label, train_test_split};
