//! Domain service of «Zemlya Prosto».
//!
//! One method per use case, each following the same contract: validate the
//! input, resolve cross-entity references through the store, construct or
//! transform the entity, persist, return the stored (ID-bearing) value.
//! All validation happens here — the store itself is total apart from
//! `NotFound` lookups.

use crate::assistant::{DigitalAssistant, SuggestionRequest};
use crate::business;
use crate::error::{Error, Result};
use crate::layer::FeatureBuilder;
use crate::model::{
    AssistantSuggestion, Attribute, BusinessProcess, Contour, ContourSource, Document,
    DocumentPackage, InformationCard, Layer, LayerFeature, ParcelCategory, Point, ReadyParcel,
};
use crate::store::PlotStore;
use crate::util::new_id;
use crate::workflow::WorkflowService;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Orchestrates the store, the process engine, the feature builder and the
/// digital assistant. Holds no entity state of its own — the store is the
/// sole owner of storage.
pub struct PlotService {
    store: Arc<dyn PlotStore>,
    workflow: Arc<dyn WorkflowService>,
    assistant: DigitalAssistant,
    features: FeatureBuilder,
}

impl PlotService {
    pub fn new(store: Arc<dyn PlotStore>, workflow: Arc<dyn WorkflowService>) -> Self {
        Self {
            store,
            workflow,
            assistant: DigitalAssistant::new(),
            features: FeatureBuilder::new(),
        }
    }

    fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }

    // ── Contours ──

    /// Registers a contour sketched by the user on the map. A polygon needs
    /// at least three points.
    pub async fn create_contour_from_drawing(
        &self,
        cancel: &CancellationToken,
        description: &str,
        points: Vec<Point>,
    ) -> Result<Contour> {
        Self::check_cancelled(cancel)?;
        if points.len() < 3 {
            return Err(Error::validation(
                "a drawn contour requires at least 3 points",
            ));
        }
        let contour = self.new_contour(ContourSource::Drawn, description, points);
        Ok(self.store.save_contour(contour).await)
    }

    /// Builds a contour from an uploaded list of boundary coordinates.
    pub async fn create_contour_from_coordinates(
        &self,
        cancel: &CancellationToken,
        description: &str,
        points: Vec<Point>,
    ) -> Result<Contour> {
        Self::check_cancelled(cancel)?;
        if points.is_empty() {
            return Err(Error::validation("the coordinate list cannot be empty"));
        }
        let contour = self.new_contour(ContourSource::Coordinates, description, points);
        Ok(self.store.save_contour(contour).await)
    }

    /// Loads a contour delivered by an external GIS.
    pub async fn import_contour(
        &self,
        cancel: &CancellationToken,
        description: &str,
        points: Vec<Point>,
    ) -> Result<Contour> {
        Self::check_cancelled(cancel)?;
        if points.is_empty() {
            return Err(Error::validation("an imported contour contains no points"));
        }
        let contour = self.new_contour(ContourSource::Imported, description, points);
        Ok(self.store.save_contour(contour).await)
    }

    pub async fn list_contours(&self, cancel: &CancellationToken) -> Result<Vec<Contour>> {
        self.store.list_contours(cancel).await
    }

    fn new_contour(
        &self,
        source: ContourSource,
        description: &str,
        points: Vec<Point>,
    ) -> Contour {
        Contour {
            id: String::new(),
            source,
            description: description.to_string(),
            points,
            created_at: Utc::now(),
        }
    }

    // ── Information cards ──

    /// Attaches an attribute card to an existing contour.
    pub async fn create_information_card(
        &self,
        cancel: &CancellationToken,
        contour_id: &str,
        auto_attributes: Vec<Attribute>,
        manual_attributes: Vec<Attribute>,
    ) -> Result<InformationCard> {
        Self::check_cancelled(cancel)?;
        if contour_id.is_empty() {
            return Err(Error::validation("contour id is required"));
        }
        self.store.get_contour(cancel, contour_id).await?;

        let card = InformationCard {
            id: String::new(),
            contour_id: contour_id.to_string(),
            auto_attributes,
            manual_attributes,
            created_at: Utc::now(),
        };
        Ok(self.store.save_card(card).await)
    }

    /// Looks up the card attached to a contour, if any.
    pub async fn card_for_contour(
        &self,
        cancel: &CancellationToken,
        contour_id: &str,
    ) -> Result<Option<InformationCard>> {
        self.store.get_card_by_contour(cancel, contour_id).await
    }

    // ── Ready parcels ──

    pub async fn list_ready_parcels(
        &self,
        cancel: &CancellationToken,
        category: Option<ParcelCategory>,
    ) -> Result<Vec<ReadyParcel>> {
        self.store.list_ready_parcels(cancel, category).await
    }

    // ── Document packages ──

    /// Assembles the document bundle for a filing, based on a contour, a
    /// ready parcel, or both. Each present source must resolve and
    /// contributes its documents plus a provenance token; two universal
    /// template documents are always appended. Document IDs are freshly
    /// generated per call.
    pub async fn generate_document_package(
        &self,
        cancel: &CancellationToken,
        contour_id: Option<String>,
        parcel_id: Option<String>,
    ) -> Result<DocumentPackage> {
        Self::check_cancelled(cancel)?;

        let contour_id = contour_id.filter(|id| !id.is_empty());
        let parcel_id = parcel_id.filter(|id| !id.is_empty());
        if contour_id.is_none() && parcel_id.is_none() {
            return Err(Error::validation(
                "a contour or a ready parcel must be specified",
            ));
        }

        let mut documents = Vec::new();
        let mut provenance = Vec::new();

        if let Some(id) = &contour_id {
            let contour = self.store.get_contour(cancel, id).await?;
            documents.push(Document {
                id: new_id(),
                name: "Схема расположения земельного участка".to_string(),
                description: "Схема автоматически сформирована на основании созданного контура"
                    .to_string(),
                source: "generated_from_contour".to_string(),
            });
            documents.push(Document {
                id: new_id(),
                name: "Координаты характерных точек".to_string(),
                description: "Ведомость координат для подачи в органы кадастрового учёта"
                    .to_string(),
                source: "generated_from_contour".to_string(),
            });
            provenance.push(format!("contour:{}", contour.id));
        }

        if let Some(id) = &parcel_id {
            let parcel = self.store.get_ready_parcel(cancel, id).await?;
            documents.push(Document {
                id: new_id(),
                name: "Выписка из перечня готовых участков".to_string(),
                description: "Документ подтверждает параметры участка из перечня".to_string(),
                source: "ready_parcel_registry".to_string(),
            });
            provenance.push(format!("ready_parcel:{}", parcel.id));
        }

        // Universal documents required for any filing.
        documents.push(Document {
            id: new_id(),
            name: "Заявление".to_string(),
            description: "Черновик заявления на предоставление земельного участка".to_string(),
            source: "template".to_string(),
        });
        documents.push(Document {
            id: new_id(),
            name: "Согласие на обработку персональных данных".to_string(),
            description: "Обязательный документ для подачи обращения".to_string(),
            source: "template".to_string(),
        });

        let package = DocumentPackage {
            id: String::new(),
            parcel_id,
            contour_id,
            documents,
            created_at: Utc::now(),
            generated_by: provenance.join(";"),
        };
        let package = self.store.save_document_package(package).await;

        // The package is already persisted; an orchestrator hiccup is logged,
        // not surfaced.
        if let Err(err) = self
            .workflow
            .notify_package_ready(cancel, &package.id)
            .await
        {
            warn!(package_id = %package.id, %err, "workflow notification failed");
        }

        Ok(package)
    }

    pub async fn list_document_packages(
        &self,
        cancel: &CancellationToken,
    ) -> Result<Vec<DocumentPackage>> {
        self.store.list_document_packages(cancel).await
    }

    // ── Business processes ──

    /// Creates the standard approval process and persists it.
    pub async fn create_business_process(
        &self,
        cancel: &CancellationToken,
        name: &str,
    ) -> Result<BusinessProcess> {
        Self::check_cancelled(cancel)?;
        let process = business::new_default_process(name);
        Ok(self.store.save_process(process).await)
    }

    /// Moves the next stage of the process into work.
    pub async fn advance_business_process(
        &self,
        cancel: &CancellationToken,
        process_id: &str,
    ) -> Result<BusinessProcess> {
        Self::check_cancelled(cancel)?;
        let process = self.store.get_process(cancel, process_id).await?;

        let (process, advanced) = business::advance_to_next_stage(process);
        if !advanced {
            return Err(Error::validation(
                "the process has no stages left to advance",
            ));
        }
        Ok(self.store.save_process(process).await)
    }

    /// Finishes one stage of the process, successfully or not. An unknown
    /// stage ID is reported as `NotFound` and nothing is persisted.
    pub async fn complete_business_stage(
        &self,
        cancel: &CancellationToken,
        process_id: &str,
        stage_id: &str,
        success: bool,
    ) -> Result<BusinessProcess> {
        Self::check_cancelled(cancel)?;
        let process = self.store.get_process(cancel, process_id).await?;

        let (process, found) = business::complete_stage(process, stage_id, success);
        if !found {
            return Err(Error::not_found("business stage"));
        }
        Ok(self.store.save_process(process).await)
    }

    // ── Public layer ──

    /// Publishes a contour to the public map layer. The feature snapshots
    /// the contour geometry at publish time.
    pub async fn publish_contour_to_layer(
        &self,
        cancel: &CancellationToken,
        contour_id: &str,
        attributes: HashMap<String, String>,
    ) -> Result<LayerFeature> {
        Self::check_cancelled(cancel)?;
        let contour = self.store.get_contour(cancel, contour_id).await?;

        let feature = self.features.build_feature(&contour, &attributes);
        Ok(self.store.add_layer_feature(feature).await)
    }

    pub async fn layer(&self, cancel: &CancellationToken) -> Result<Layer> {
        self.store.layer(cancel).await
    }

    // ── Assistant ──

    /// Forwards the request to the digital assistant together with the
    /// ready parcels matching the preferred category.
    pub async fn assistant_suggestions(
        &self,
        cancel: &CancellationToken,
        request: &SuggestionRequest,
    ) -> Result<Vec<AssistantSuggestion>> {
        let parcels = self
            .store
            .list_ready_parcels(cancel, request.preferred_category)
            .await?;
        Ok(self.assistant.suggest(request, &parcels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StageStatus;
    use crate::store::MemoryStore;
    use crate::workflow::StubWorkflow;

    fn service() -> PlotService {
        PlotService::new(Arc::new(MemoryStore::new()), Arc::new(StubWorkflow::new()))
    }

    fn points(n: usize) -> Vec<Point> {
        (0..n)
            .map(|i| Point {
                latitude: 50.0 + i as f64 * 0.01,
                longitude: 30.0 + i as f64 * 0.01,
            })
            .collect()
    }

    // ── Contours ──

    #[tokio::test]
    async fn drawn_contour_needs_three_points_and_persists_nothing_on_failure() {
        let svc = service();
        let cancel = CancellationToken::new();

        for n in 0..3 {
            let err = svc
                .create_contour_from_drawing(&cancel, "дача", points(n))
                .await
                .unwrap_err();
            assert!(matches!(err, Error::Validation(_)));
        }

        assert!(svc.list_contours(&cancel).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn drawn_contour_is_retrievable_by_assigned_id() {
        let svc = service();
        let cancel = CancellationToken::new();

        let contour = svc
            .create_contour_from_drawing(&cancel, "дача", points(3))
            .await
            .unwrap();
        assert_eq!(contour.source, ContourSource::Drawn);
        assert!(!contour.id.is_empty());

        let listed = svc.list_contours(&cancel).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], contour);
    }

    #[tokio::test]
    async fn coordinate_and_import_variants_reject_empty_point_lists() {
        let svc = service();
        let cancel = CancellationToken::new();

        let err = svc
            .create_contour_from_coordinates(&cancel, "поле", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = svc.import_contour(&cancel, "лес", vec![]).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let imported = svc.import_contour(&cancel, "лес", points(1)).await.unwrap();
        assert_eq!(imported.source, ContourSource::Imported);
    }

    #[tokio::test]
    async fn concurrent_contour_creation_loses_no_writes() {
        let svc = Arc::new(service());
        let cancel = CancellationToken::new();
        let n = 16;

        let mut handles = Vec::new();
        for i in 0..n {
            let svc = Arc::clone(&svc);
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move {
                svc.create_contour_from_coordinates(&cancel, &format!("участок {i}"), points(2))
                    .await
                    .unwrap()
            }));
        }

        let mut ids = std::collections::HashSet::new();
        for handle in handles {
            let contour = handle.await.unwrap();
            assert!(ids.insert(contour.id));
        }
        assert_eq!(ids.len(), n);
        assert_eq!(svc.list_contours(&cancel).await.unwrap().len(), n);
    }

    // ── Information cards ──

    #[tokio::test]
    async fn card_requires_an_existing_contour() {
        let svc = service();
        let cancel = CancellationToken::new();

        let err = svc
            .create_information_card(&cancel, "", vec![], vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        let err = svc
            .create_information_card(&cancel, "missing", vec![], vec![])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn card_round_trips_through_contour_lookup() {
        let svc = service();
        let cancel = CancellationToken::new();

        let contour = svc
            .create_contour_from_drawing(&cancel, "дача", points(4))
            .await
            .unwrap();
        let card = svc
            .create_information_card(
                &cancel,
                &contour.id,
                vec![Attribute {
                    key: "area".to_string(),
                    value: "1200 м²".to_string(),
                    source: "auto".to_string(),
                    comment: String::new(),
                }],
                vec![],
            )
            .await
            .unwrap();
        assert!(!card.id.is_empty());

        let found = svc.card_for_contour(&cancel, &contour.id).await.unwrap();
        assert_eq!(found, Some(card));
        assert_eq!(svc.card_for_contour(&cancel, "other").await.unwrap(), None);
    }

    // ── Document packages ──

    #[tokio::test]
    async fn package_requires_at_least_one_source() {
        let svc = service();
        let cancel = CancellationToken::new();

        let err = svc
            .generate_document_package(&cancel, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));

        // Empty strings count as absent references.
        let err = svc
            .generate_document_package(&cancel, Some(String::new()), Some(String::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn contour_package_holds_four_documents_and_provenance() {
        let svc = service();
        let cancel = CancellationToken::new();

        let contour = svc
            .create_contour_from_drawing(&cancel, "дача", points(3))
            .await
            .unwrap();
        let package = svc
            .generate_document_package(&cancel, Some(contour.id.clone()), None)
            .await
            .unwrap();

        assert_eq!(package.documents.len(), 4);
        assert_eq!(package.generated_by, format!("contour:{}", contour.id));
        assert_eq!(package.contour_id.as_deref(), Some(contour.id.as_str()));
        assert_eq!(package.parcel_id, None);

        let sources: Vec<_> = package
            .documents
            .iter()
            .map(|d| d.source.as_str())
            .collect();
        assert_eq!(
            sources,
            [
                "generated_from_contour",
                "generated_from_contour",
                "template",
                "template"
            ]
        );

        let listed = svc.list_document_packages(&cancel).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn combined_package_joins_provenance_tokens() {
        let svc = service();
        let cancel = CancellationToken::new();

        let contour = svc
            .create_contour_from_drawing(&cancel, "дача", points(3))
            .await
            .unwrap();
        let package = svc
            .generate_document_package(
                &cancel,
                Some(contour.id.clone()),
                Some("tourism-1".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(package.documents.len(), 5);
        assert_eq!(
            package.generated_by,
            format!("contour:{};ready_parcel:tourism-1", contour.id)
        );
    }

    #[tokio::test]
    async fn package_document_ids_are_fresh_per_call() {
        let svc = service();
        let cancel = CancellationToken::new();

        let first = svc
            .generate_document_package(&cancel, None, Some("tourism-1".to_string()))
            .await
            .unwrap();
        let second = svc
            .generate_document_package(&cancel, None, Some("tourism-1".to_string()))
            .await
            .unwrap();

        let first_ids: std::collections::HashSet<_> =
            first.documents.iter().map(|d| d.id.clone()).collect();
        assert!(second.documents.iter().all(|d| !first_ids.contains(&d.id)));
    }

    #[tokio::test]
    async fn package_sources_must_resolve() {
        let svc = service();
        let cancel = CancellationToken::new();

        let err = svc
            .generate_document_package(&cancel, Some("missing".to_string()), None)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "contour not found");

        let err = svc
            .generate_document_package(&cancel, None, Some("missing".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "ready parcel not found");

        assert!(svc.list_document_packages(&cancel).await.unwrap().is_empty());
    }

    // ── Business processes ──

    #[tokio::test]
    async fn approval_process_walks_the_stage_machine() {
        let svc = service();
        let cancel = CancellationToken::new();

        let process = svc
            .create_business_process(&cancel, "Выдел участка")
            .await
            .unwrap();
        assert_eq!(process.stages.len(), 3);
        assert!(process
            .stages
            .iter()
            .all(|s| s.status == StageStatus::Pending));

        let process = svc
            .advance_business_process(&cancel, &process.id)
            .await
            .unwrap();
        assert_eq!(process.stages[0].status, StageStatus::InProgress);

        // Re-advancing while a stage runs is an idempotent no-op.
        let again = svc
            .advance_business_process(&cancel, &process.id)
            .await
            .unwrap();
        assert_eq!(again.stages[0].status, StageStatus::InProgress);
        assert_eq!(again.stages[1].status, StageStatus::Pending);

        let stage1 = process.stages[0].id.clone();
        let process = svc
            .complete_business_stage(&cancel, &process.id, &stage1, true)
            .await
            .unwrap();
        assert_eq!(process.stages[0].status, StageStatus::Completed);

        let process = svc
            .advance_business_process(&cancel, &process.id)
            .await
            .unwrap();
        assert_eq!(process.stages[1].status, StageStatus::InProgress);
    }

    #[tokio::test]
    async fn exhausted_process_refuses_to_advance() {
        let svc = service();
        let cancel = CancellationToken::new();

        let process = svc.create_business_process(&cancel, "p").await.unwrap();
        for stage_id in process.stages.iter().map(|s| s.id.clone()) {
            svc.advance_business_process(&cancel, &process.id)
                .await
                .unwrap();
            svc.complete_business_stage(&cancel, &process.id, &stage_id, true)
                .await
                .unwrap();
        }

        let err = svc
            .advance_business_process(&cancel, &process.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_process_and_stage_surface_not_found() {
        let svc = service();
        let cancel = CancellationToken::new();

        let err = svc
            .advance_business_process(&cancel, "missing")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "business process not found");

        let process = svc.create_business_process(&cancel, "p").await.unwrap();
        let err = svc
            .complete_business_stage(&cancel, &process.id, "no-such-stage", true)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "business stage not found");

        // Nothing was persisted for the failed completion.
        let reloaded = svc
            .advance_business_process(&cancel, &process.id)
            .await
            .unwrap();
        assert_eq!(reloaded.stages[0].status, StageStatus::InProgress);
        assert_eq!(reloaded.stages[1].status, StageStatus::Pending);
        assert_eq!(reloaded.stages[2].status, StageStatus::Pending);
    }

    // ── Public layer ──

    #[tokio::test]
    async fn publishing_snapshots_geometry_at_publish_time() {
        let svc = service();
        let cancel = CancellationToken::new();

        let contour = svc
            .create_contour_from_drawing(&cancel, "original", points(3))
            .await
            .unwrap();
        let feature = svc
            .publish_contour_to_layer(
                &cancel,
                &contour.id,
                HashMap::from([("purpose".to_string(), "ИЖС".to_string())]),
            )
            .await
            .unwrap();
        assert_eq!(feature.geometry.description, "original");

        let layer = svc.layer(&cancel).await.unwrap();
        assert_eq!(layer.features.len(), 1);
        assert_eq!(layer.features[0].properties["purpose"], "ИЖС");
    }

    #[tokio::test]
    async fn publishing_unknown_contour_leaves_the_layer_untouched() {
        let svc = service();
        let cancel = CancellationToken::new();

        let err = svc
            .publish_contour_to_layer(&cancel, "missing", HashMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "contour not found");

        let layer = svc.layer(&cancel).await.unwrap();
        assert!(layer.features.is_empty());
    }

    // ── Assistant ──

    #[tokio::test]
    async fn assistant_sees_parcels_of_the_preferred_category() {
        let svc = service();
        let cancel = CancellationToken::new();

        let request = SuggestionRequest {
            goal: "choose_parcel".to_string(),
            preferred_category: Some(ParcelCategory::Tourism),
            has_contour: false,
        };
        let suggestions = svc.assistant_suggestions(&cancel, &request).await.unwrap();

        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0].action, "list_ready_parcels");
        assert_eq!(suggestions[1].action, "select_parcel:tourism-1");
    }

    // ── Cancellation ──

    #[tokio::test]
    async fn cancelled_token_fails_fast_without_mutation() {
        let svc = service();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = svc
            .create_contour_from_drawing(&cancel, "дача", points(3))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));

        let err = svc.create_business_process(&cancel, "p").await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));

        let fresh = CancellationToken::new();
        assert!(svc.list_contours(&fresh).await.unwrap().is_empty());
    }
}
