//! Construction of public-layer features.

use crate::model::{Contour, LayerFeature};
use crate::util::new_id;
use chrono::Utc;
use std::collections::HashMap;

/// Builds publishable map features out of contours. Stateless; the store
/// owns the layer itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureBuilder;

impl FeatureBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Maps a contour plus an attribute set into a layer feature.
    ///
    /// The geometry is a by-value snapshot of the contour at publish time;
    /// later contour edits must not show up in already-published features.
    /// Pure construction, no failure modes.
    pub fn build_feature(
        &self,
        contour: &Contour,
        attributes: &HashMap<String, String>,
    ) -> LayerFeature {
        LayerFeature {
            id: new_id(),
            geometry: contour.clone(),
            properties: attributes.clone(),
            updated_at: Utc::now(),
        }
    }
}
