//! Record name generation.

pub mod dictionary;

use chrono::{SecondsFormat, Utc};
use rand::seq::SliceRandom;

use crate::config::NameSource;

pub use dictionary::CHARACTERS;

/// Produces the `name` value for new records.
///
/// Generated names are drawn uniformly from [CHARACTERS] and are not unique.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameGenerator {
    source: NameSource,
}

impl NameGenerator {
    pub fn new(source: NameSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> NameSource {
        self.source
    }

    pub fn generate(&self) -> String {
        match self.source {
            NameSource::Generated => CHARACTERS
                .choose(&mut rand::thread_rng())
                .copied()
                .unwrap_or("Yoda")
                .to_string(),
            NameSource::Timestamp => Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
