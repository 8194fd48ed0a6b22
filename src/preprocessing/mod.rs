/// Feature derivation

pub mod binning;
pub mod feature_engineering;
pub mod imputation;

pub use binning::QuantileBinner;
pub use feature_engineering::{FeatureEngineer, FeatureStep};
pub use imputation::MissingValueImputer;
