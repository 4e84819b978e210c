//! Ambient configuration: the knobs spec §6 calls out plus the numeric
//! limits and defaults from the same table.

/// Decimal places used when formatting real numbers for text-positioning
/// operators (`Td`, `TD`). Other operators always use [`DEFAULT_PRECISION`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextPlacementAccuracy {
    Two,
    Three,
    Four,
    Five,
}

impl TextPlacementAccuracy {
    pub fn decimal_places(self) -> u8 {
        match self {
            TextPlacementAccuracy::Two => 2,
            TextPlacementAccuracy::Three => 3,
            TextPlacementAccuracy::Four => 4,
            TextPlacementAccuracy::Five => 5,
        }
    }
}

impl Default for TextPlacementAccuracy {
    fn default() -> Self {
        TextPlacementAccuracy::Three
    }
}

/// General-purpose precision used for operators other than `Td`/`TD`.
pub const DEFAULT_PRECISION: u8 = 3;

pub const MAX_DASH_PATTERN: f32 = 32_000.0;
pub const MIN_CHARSPACE: f32 = -32_000.0;
pub const MAX_CHARSPACE: f32 = 32_000.0;
pub const MIN_WORDSPACE: f32 = -32_000.0;
pub const MAX_WORDSPACE: f32 = 32_000.0;
pub const MIN_HORIZONTAL_SCALING: f32 = 0.0;
pub const MAX_HORIZONTAL_SCALING: f32 = 1_000.0;
pub const MAX_FONT_SIZE: f32 = 1_000.0;
pub const MAX_STRING_LEN: usize = 65_535;

/// Document-wide settings. Constructed with [`DocumentConfig::default`] and
/// adjusted with the builder-style setters below.
#[derive(Clone, Debug)]
pub struct DocumentConfig {
    pub text_placement_accuracy: TextPlacementAccuracy,
    pub pdf_version: &'static str,
    pub producer: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        DocumentConfig {
            text_placement_accuracy: TextPlacementAccuracy::default(),
            pdf_version: "1.7",
            producer: "tagged_pdf".to_string(),
        }
    }
}

impl DocumentConfig {
    pub fn with_text_placement_accuracy(mut self, accuracy: TextPlacementAccuracy) -> Self {
        self.text_placement_accuracy = accuracy;
        self
    }

    pub fn with_producer(mut self, producer: impl Into<String>) -> Self {
        self.producer = producer.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_accuracy_is_three() {
        assert_eq!(TextPlacementAccuracy::default().decimal_places(), 3);
    }

    #[test]
    fn builder_overrides_producer() {
        let cfg = DocumentConfig::default().with_producer("acme");
        assert_eq!(cfg.producer, "acme");
    }
}
