//! Rule-based ad-copy variants for an underperforming campaign.

pub mod campaign;
pub mod generator;

pub use campaign::lowest_ctr_campaign;
pub use generator::generate_creatives;
