//! Persistence seam of the service.
//!
//! The domain service operates exclusively through [`PlotStore`], enabling
//! pluggable backends (in-memory for the demonstration, a database for
//! production). Exactly one implementation exists in this crate:
//! [`memory::MemoryStore`].

pub mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::model::{
    BusinessProcess, Contour, DocumentPackage, InformationCard, Layer, LayerFeature,
    ParcelCategory, ReadyParcel,
};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Persistence trait for all land-plot state.
///
/// `save_*` assigns an identifier and timestamp when missing, overwrites by
/// ID and returns the stored copy; saves are total and never fail. Reads
/// fail with `NotFound` on a missing ID, or `Cancelled` when the caller's
/// token fired before the lock was taken. `list_*` return snapshot copies
/// in unspecified order — callers must not assume any ordering.
#[async_trait]
pub trait PlotStore: Send + Sync {
    // ── Contours ──

    async fn save_contour(&self, contour: Contour) -> Contour;
    async fn get_contour(&self, cancel: &CancellationToken, id: &str) -> Result<Contour>;
    async fn list_contours(&self, cancel: &CancellationToken) -> Result<Vec<Contour>>;

    // ── Information cards ──

    async fn save_card(&self, card: InformationCard) -> InformationCard;
    async fn get_card_by_contour(
        &self,
        cancel: &CancellationToken,
        contour_id: &str,
    ) -> Result<Option<InformationCard>>;

    // ── Ready parcels (seeded reference data) ──

    async fn get_ready_parcel(&self, cancel: &CancellationToken, id: &str)
        -> Result<ReadyParcel>;
    async fn list_ready_parcels(
        &self,
        cancel: &CancellationToken,
        category: Option<ParcelCategory>,
    ) -> Result<Vec<ReadyParcel>>;

    // ── Document packages ──

    async fn save_document_package(&self, package: DocumentPackage) -> DocumentPackage;
    async fn list_document_packages(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<DocumentPackage>>;

    // ── Business processes ──

    async fn save_process(&self, process: BusinessProcess) -> BusinessProcess;
    async fn get_process(&self, cancel: &CancellationToken, id: &str)
        -> Result<BusinessProcess>;

    // ── Public layer (singleton) ──

    async fn add_layer_feature(&self, feature: LayerFeature) -> LayerFeature;
    async fn layer(&self, cancel: &CancellationToken) -> Result<Layer>;
}
