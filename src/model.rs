//! Domain entities of the «Zemlya Prosto» land-plot service.
//!
//! The models live in their own module so every layer — store, services,
//! HTTP handlers — can share them. Identifiers are opaque strings assigned
//! by the store on first save; an empty `id` marks a not-yet-persisted
//! value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Contours ──

/// Where a contour came from.
///
/// `Drawn` — sketched interactively on the map; `Coordinates` — built from
/// an uploaded list of boundary points; `Imported` — loaded from an
/// external GIS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContourSource {
    Drawn,
    Coordinates,
    Imported,
}

/// One boundary point of a land plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

/// Polygon boundary of a land plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    pub id: String,
    pub source: ContourSource,
    pub description: String,
    pub points: Vec<Point>,
    pub created_at: DateTime<Utc>,
}

// ── Information cards ──

/// Key/value pair on an information card.
///
/// A struct instead of a bare map so the origin of each attribute can be
/// tracked without changing public signatures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub key: String,
    pub value: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment: String,
}

/// Attribute record attached to one contour. Auto-filled and
/// manually-entered attributes are kept apart to preserve provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InformationCard {
    pub id: String,
    pub contour_id: String,
    pub auto_attributes: Vec<Attribute>,
    pub manual_attributes: Vec<Attribute>,
    pub created_at: DateTime<Utc>,
}

// ── Ready parcels ──

/// Catalog category of a pre-existing parcel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelCategory {
    Construction,
    Tourism,
}

/// A pre-existing plot available for direct selection, seeded at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadyParcel {
    pub id: String,
    pub name: String,
    pub category: ParcelCategory,
    pub location: String,
    pub description: String,
    pub contour: Contour,
    pub available: bool,
}

// ── Document packages ──

/// One placeholder document inside a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub description: String,
    pub source: String,
}

/// Generated bundle of documents needed to file a land-plot request.
///
/// At least one of `parcel_id` / `contour_id` refers to an existing entity;
/// `generated_by` records the provenance tokens joined with `;`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPackage {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parcel_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contour_id: Option<String>,
    pub documents: Vec<Document>,
    pub created_at: DateTime<Utc>,
    pub generated_by: String,
}

// ── Business processes ──

/// State of one approval stage.
///
/// pending → in_progress → {completed, rejected}; completed and rejected
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    InProgress,
    Completed,
    Rejected,
}

/// One step of the modeled approval workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessStage {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: StageStatus,
    pub updated_at: DateTime<Utc>,
}

/// Modeled approval workflow; owns its stages, order fixed at creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProcess {
    pub id: String,
    pub name: String,
    pub stages: Vec<BusinessStage>,
    pub created_at: DateTime<Utc>,
}

// ── Public map layer ──

/// One published geometry + attributes entry of the public layer.
///
/// The geometry is a snapshot taken at publish time; later contour edits do
/// not flow back into it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerFeature {
    pub id: String,
    pub geometry: Contour,
    pub properties: HashMap<String, String>,
    pub updated_at: DateTime<Utc>,
}

/// The single process-wide public map layer. Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub id: String,
    pub name: String,
    pub features: Vec<LayerFeature>,
}

// ── Assistant ──

/// One canned next-step hint from the digital assistant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantSuggestion {
    pub title: String,
    pub description: String,
    pub action: String,
}
