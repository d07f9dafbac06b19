//! In-memory [`PlotStore`] backend.
//!
//! A primitive process-memory store, useful while the business logic is
//! being demonstrated without a real database. All state is lost on
//! restart except the seeded ready parcels, which are re-created at
//! construction.

use crate::error::{Error, Result};
use crate::model::{
    BusinessProcess, Contour, ContourSource, DocumentPackage, InformationCard, Layer,
    LayerFeature, ParcelCategory, Point, ReadyParcel,
};
use crate::store::PlotStore;
use crate::util::new_id;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// Everything behind the single reader/writer lock: the five entity maps
/// plus the singleton public layer. There is no per-entity locking — reads
/// run concurrently with each other, any write excludes everything.
struct Inner {
    contours: HashMap<String, Contour>,
    cards: HashMap<String, InformationCard>,
    ready_parcels: HashMap<String, ReadyParcel>,
    doc_packages: HashMap<String, DocumentPackage>,
    processes: HashMap<String, BusinessProcess>,
    layer: Layer,
}

/// Thread-safe in-memory store. Construct one per process (or per test)
/// and inject it into the domain service; there is no hidden global.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Creates a store pre-populated with the demo ready parcels and an
    /// empty «Земля просто» layer.
    pub fn new() -> Self {
        let mut ready_parcels = HashMap::new();
        for parcel in seed_ready_parcels() {
            ready_parcels.insert(parcel.id.clone(), parcel);
        }

        Self {
            inner: RwLock::new(Inner {
                contours: HashMap::new(),
                cards: HashMap::new(),
                ready_parcels,
                doc_packages: HashMap::new(),
                processes: HashMap::new(),
                layer: Layer {
                    id: "layer-1".to_string(),
                    name: "Земля просто".to_string(),
                    features: Vec::new(),
                },
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Fails fast with `Cancelled` when the caller's token has already fired.
/// Called before the lock is taken; once inside the critical section an
/// operation runs to completion.
fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(Error::Cancelled);
    }
    Ok(())
}

#[async_trait]
impl PlotStore for MemoryStore {
    async fn save_contour(&self, mut contour: Contour) -> Contour {
        let mut inner = self.inner.write().await;

        if contour.id.is_empty() {
            contour.id = new_id();
        }
        contour.created_at = Utc::now();

        inner.contours.insert(contour.id.clone(), contour.clone());
        contour
    }

    async fn get_contour(&self, cancel: &CancellationToken, id: &str) -> Result<Contour> {
        check_cancelled(cancel)?;
        let inner = self.inner.read().await;

        inner
            .contours
            .get(id)
            .cloned()
            .ok_or(Error::NotFound { entity: "contour" })
    }

    async fn list_contours(&self, cancel: &CancellationToken) -> Result<Vec<Contour>> {
        check_cancelled(cancel)?;
        let inner = self.inner.read().await;

        Ok(inner.contours.values().cloned().collect())
    }

    async fn save_card(&self, mut card: InformationCard) -> InformationCard {
        let mut inner = self.inner.write().await;

        if card.id.is_empty() {
            card.id = new_id();
        }
        card.created_at = Utc::now();

        inner.cards.insert(card.id.clone(), card.clone());
        card
    }

    async fn get_card_by_contour(
        &self,
        cancel: &CancellationToken,
        contour_id: &str,
    ) -> Result<Option<InformationCard>> {
        check_cancelled(cancel)?;
        let inner = self.inner.read().await;

        Ok(inner
            .cards
            .values()
            .find(|card| card.contour_id == contour_id)
            .cloned())
    }

    async fn get_ready_parcel(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> Result<ReadyParcel> {
        check_cancelled(cancel)?;
        let inner = self.inner.read().await;

        inner.ready_parcels.get(id).cloned().ok_or(Error::NotFound {
            entity: "ready parcel",
        })
    }

    async fn list_ready_parcels(
        &self,
        cancel: &CancellationToken,
        category: Option<ParcelCategory>,
    ) -> Result<Vec<ReadyParcel>> {
        check_cancelled(cancel)?;
        let inner = self.inner.read().await;

        Ok(inner
            .ready_parcels
            .values()
            .filter(|parcel| category.map_or(true, |c| parcel.category == c))
            .cloned()
            .collect())
    }

    async fn save_document_package(&self, mut package: DocumentPackage) -> DocumentPackage {
        let mut inner = self.inner.write().await;

        if package.id.is_empty() {
            package.id = new_id();
        }
        package.created_at = Utc::now();

        inner.doc_packages.insert(package.id.clone(), package.clone());
        package
    }

    async fn list_document_packages(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<DocumentPackage>> {
        check_cancelled(cancel)?;
        let inner = self.inner.read().await;

        Ok(inner.doc_packages.values().cloned().collect())
    }

    async fn save_process(&self, mut process: BusinessProcess) -> BusinessProcess {
        let mut inner = self.inner.write().await;

        if process.id.is_empty() {
            process.id = new_id();
        }
        // created_at is stamped by the process template at construction and
        // kept across re-saves.

        inner.processes.insert(process.id.clone(), process.clone());
        process
    }

    async fn get_process(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> Result<BusinessProcess> {
        check_cancelled(cancel)?;
        let inner = self.inner.read().await;

        inner.processes.get(id).cloned().ok_or(Error::NotFound {
            entity: "business process",
        })
    }

    async fn add_layer_feature(&self, mut feature: LayerFeature) -> LayerFeature {
        let mut inner = self.inner.write().await;

        if feature.id.is_empty() {
            feature.id = new_id();
        }
        feature.updated_at = Utc::now();

        inner.layer.features.push(feature.clone());
        feature
    }

    async fn layer(&self, cancel: &CancellationToken) -> Result<Layer> {
        check_cancelled(cancel)?;
        let inner = self.inner.read().await;

        Ok(inner.layer.clone())
    }
}

/// Demo parcels: one from the construction catalog, one from tourism.
fn seed_ready_parcels() -> Vec<ReadyParcel> {
    vec![
        ReadyParcel {
            id: "construction-1".to_string(),
            name: "Промышленный парк «Северный»".to_string(),
            category: ParcelCategory::Construction,
            location: "Архангельская область, г. Архангельск".to_string(),
            description: "Участок в промышленной зоне с готовыми инженерными коммуникациями, \
                          подходит для размещения производства."
                .to_string(),
            contour: Contour {
                id: "contour-construction-1".to_string(),
                source: ContourSource::Imported,
                description: "Импортированная граница промышленного участка".to_string(),
                points: vec![
                    Point {
                        latitude: 64.54,
                        longitude: 40.55,
                    },
                    Point {
                        latitude: 64.55,
                        longitude: 40.56,
                    },
                ],
                created_at: Utc::now(),
            },
            available: true,
        },
        ReadyParcel {
            id: "tourism-1".to_string(),
            name: "Туристический кластер «Бирюзовая Катунь»".to_string(),
            category: ParcelCategory::Tourism,
            location: "Республика Алтай".to_string(),
            description: "Живописный участок в горной местности, предназначенный для развития туризма."
                .to_string(),
            contour: Contour {
                id: "contour-tourism-1".to_string(),
                source: ContourSource::Imported,
                description: "Контур сформирован органом власти и опубликован в справочнике"
                    .to_string(),
                points: vec![
                    Point {
                        latitude: 51.99,
                        longitude: 85.85,
                    },
                    Point {
                        latitude: 52.0,
                        longitude: 85.86,
                    },
                ],
                created_at: Utc::now(),
            },
            available: true,
        },
    ]
}
