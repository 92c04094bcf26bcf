//! SectionRegistry: the plugin set of one card variant, plus ordering and
//! composition.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::card_config::CardConfig;
use crate::markup;
use crate::section::Section;
use crate::sections;
use crate::variant::{CardVariant, SectionSpec};
use crate::view::ComposedRoot;

pub struct SectionRegistry {
    variant: CardVariant,
    sections: HashMap<&'static str, Arc<dyn Section>>,
}

impl SectionRegistry {
    pub fn for_variant(variant: CardVariant) -> Self {
        let sections = variant
            .sections()
            .iter()
            .filter_map(|spec| sections::build(spec).map(|s| (spec.key, s)))
            .collect();
        Self { variant, sections }
    }

    pub fn variant(&self) -> CardVariant {
        self.variant
    }

    pub fn get(&self, key: &str) -> Option<&Arc<dyn Section>> {
        self.sections.get(key)
    }

    /// Plugins paired with their catalog slot, in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static SectionSpec, &Arc<dyn Section>)> {
        self.variant
            .sections()
            .iter()
            .filter_map(|spec| self.sections.get(spec.key).map(|s| (spec, s)))
    }

    /// Sections with a configured entity, in first-occurrence order of their
    /// entity keys in the configuration. Families collapse to one entry.
    pub fn active_sections(&self, config: &CardConfig) -> Vec<String> {
        let mut ordered: Vec<String> = Vec::new();
        for (config_key, value) in config.values() {
            let Some(section) = self.variant.enabled_entity_section(config_key, value) else {
                continue;
            };
            if self.sections.contains_key(section) && !ordered.iter().any(|k| k == section) {
                ordered.push(section.to_string());
            }
        }
        ordered
    }

    /// Build the static shell: fixed chrome followed by each active section's template.
    /// Pure with respect to `config`.
    pub fn compose(&self, config: &CardConfig) -> ComposedRoot {
        let active = self.active_sections(config);
        let templates: String = active
            .iter()
            .filter_map(|key| self.sections.get(key.as_str()))
            .map(|section| section.generate_template(config))
            .collect::<Vec<_>>()
            .join("\n    ");
        debug!(sections = ?active, "card composed");
        ComposedRoot {
            shell: markup::card_shell(config, &templates),
            sections: active,
        }
    }
}
