use crate::coords::ColorRgba;
use crate::layout::{default_instance_attributes, default_vertex_attribute, AttributeSpec};
use crate::shader::{RECT_SHADOW_FRAGMENT, RECT_SHADOW_VERTEX};

use super::EngineError;

/// Vertex buffer slots available to a pipeline (wgpu's default limit):
/// one for the primitive plus one per instance attribute.
pub const MAX_VERTEX_BUFFERS: usize = 8;

/// Engine construction parameters.
///
/// Built once per engine and owned by it. [`Default`] yields the built-in
/// rounded-rectangle shadow setup.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Clear color. Default: a neutral gray, fully transparent.
    pub background_color: ColorRgba,

    /// WGSL module with the `@vertex` entry point.
    pub vertex_source: String,

    /// WGSL module with the `@fragment` entry point.
    pub fragment_source: String,

    /// Static primitive attribute. Default: `a_position`, 2 floats.
    pub vertex_attribute: AttributeSpec,

    /// Ordered per-instance attributes. Default: `v_box` 4, `v_color` 4,
    /// `v_corner` 4, `v_window` 2, `v_sigma` 1.
    pub instance_attributes: Vec<AttributeSpec>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            background_color: ColorRgba::neutral_gray(),
            vertex_source: RECT_SHADOW_VERTEX.to_owned(),
            fragment_source: RECT_SHADOW_FRAGMENT.to_owned(),
            vertex_attribute: default_vertex_attribute(),
            instance_attributes: default_instance_attributes(),
        }
    }
}

impl EngineConfig {
    pub fn with_background_color(mut self, color: ColorRgba) -> Self {
        self.background_color = color;
        self
    }

    pub fn with_shaders(mut self, vertex_source: impl Into<String>, fragment_source: impl Into<String>) -> Self {
        self.vertex_source = vertex_source.into();
        self.fragment_source = fragment_source.into();
        self
    }

    pub fn with_vertex_attribute(mut self, name: impl Into<String>, float_count: u32) -> Self {
        self.vertex_attribute = AttributeSpec::new(name, float_count);
        self
    }

    pub fn with_instance_attributes(mut self, attributes: impl IntoIterator<Item = AttributeSpec>) -> Self {
        self.instance_attributes = attributes.into_iter().collect();
        self
    }

    /// Sets the instance attributes from parallel name and length arrays.
    pub fn with_instance_attribute_arrays(self, names: &[&str], float_counts: &[u32]) -> Result<Self, EngineError> {
        if names.len() != float_counts.len() {
            return Err(EngineError::Config(format!(
                "{} attribute names but {} float lengths",
                names.len(),
                float_counts.len()
            )));
        }
        let attributes = names.iter().zip(float_counts).map(|(n, c)| AttributeSpec::new(*n, *c));
        Ok(self.with_instance_attributes(attributes))
    }

    /// Checks everything that can be checked without a GPU or a compiled program.
    pub fn validate(&self) -> Result<(), EngineError> {
        let fail = |msg: String| Err(EngineError::Config(msg));

        if !self.background_color.is_finite() {
            return fail(format!("background color {:?} is not finite", self.background_color));
        }
        if self.vertex_source.trim().is_empty() {
            return fail("vertex source is empty".into());
        }
        if self.fragment_source.trim().is_empty() {
            return fail("fragment source is empty".into());
        }
        if self.instance_attributes.is_empty() {
            return fail("at least one instance attribute is required".into());
        }
        if self.instance_attributes.len() + 1 > MAX_VERTEX_BUFFERS {
            return fail(format!(
                "{} instance attributes exceed the {} vertex buffer slots",
                self.instance_attributes.len(),
                MAX_VERTEX_BUFFERS - 1
            ));
        }

        let all = std::iter::once(&self.vertex_attribute).chain(&self.instance_attributes);
        let mut seen: Vec<&str> = Vec::new();
        for spec in all {
            if spec.name.is_empty() {
                return fail("attribute names must not be empty".into());
            }
            if !(1..=4).contains(&spec.float_count) {
                return fail(format!(
                    "attribute `{}` has {} floats; 1 to 4 are supported",
                    spec.name, spec.float_count
                ));
            }
            if seen.contains(&spec.name.as_str()) {
                return fail(format!("attribute `{}` is listed twice", spec.name));
            }
            seen.push(&spec.name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_err(cfg: &EngineConfig) -> String {
        match cfg.validate() {
            Err(EngineError::Config(msg)) => msg,
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        let cfg = EngineConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.vertex_attribute, AttributeSpec::new("a_position", 2));
        let counts: Vec<u32> = cfg.instance_attributes.iter().map(|a| a.float_count).collect();
        assert_eq!(counts, vec![4, 4, 4, 2, 1]);
        assert_eq!(cfg.background_color, ColorRgba::new(0.8118, 0.7843, 0.7843, 0.0));
    }

    #[test]
    fn parallel_arrays_must_match() {
        let err = EngineConfig::default()
            .with_instance_attribute_arrays(&["v_box", "v_color"], &[4])
            .unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));

        let cfg = EngineConfig::default()
            .with_instance_attribute_arrays(&["v_box", "v_sigma"], &[4, 1])
            .unwrap();
        assert_eq!(cfg.instance_attributes, vec![AttributeSpec::new("v_box", 4), AttributeSpec::new("v_sigma", 1)]);
    }

    #[test]
    fn rejects_bad_float_counts() {
        let cfg = EngineConfig::default().with_instance_attributes([AttributeSpec::new("v_box", 0)]);
        assert!(config_err(&cfg).contains("v_box"));
        let cfg = EngineConfig::default().with_vertex_attribute("a_position", 5);
        assert!(config_err(&cfg).contains("a_position"));
    }

    #[test]
    fn rejects_duplicates_and_empty_lists() {
        let cfg = EngineConfig::default()
            .with_instance_attributes([AttributeSpec::new("v_box", 4), AttributeSpec::new("v_box", 4)]);
        assert!(config_err(&cfg).contains("twice"));

        let cfg = EngineConfig::default().with_instance_attributes(Vec::new());
        assert!(config_err(&cfg).contains("at least one"));
    }

    #[test]
    fn rejects_too_many_slots() {
        let attrs = (0..8).map(|i| AttributeSpec::new(format!("v_{i}"), 1));
        let cfg = EngineConfig::default().with_instance_attributes(attrs);
        assert!(config_err(&cfg).contains("vertex buffer slots"));
    }

    #[test]
    fn rejects_non_finite_background_and_empty_sources() {
        let cfg = EngineConfig::default().with_background_color(ColorRgba::new(f32::NAN, 0.0, 0.0, 1.0));
        assert!(config_err(&cfg).contains("background"));
        let cfg = EngineConfig::default().with_shaders("  ", RECT_SHADOW_FRAGMENT);
        assert!(config_err(&cfg).contains("vertex source"));
    }
}
