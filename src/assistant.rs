//! Scripted digital assistant.
//!
//! A full assistant would run on rules or a model; the demonstration only
//! needs a goal → canned-hints lookup with no state of its own.

use crate::model::{AssistantSuggestion, ParcelCategory, ReadyParcel};
use serde::{Deserialize, Serialize};

/// What the user tells the assistant: the desired outcome, an optional
/// catalog category preference, and whether a contour already exists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuggestionRequest {
    pub goal: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_category: Option<ParcelCategory>,
    #[serde(default)]
    pub has_contour: bool,
}

/// Generates next-step hints from the request and the parcels the service
/// already fetched for the preferred category.
#[derive(Debug, Default, Clone, Copy)]
pub struct DigitalAssistant;

impl DigitalAssistant {
    pub fn new() -> Self {
        Self
    }

    pub fn suggest(
        &self,
        request: &SuggestionRequest,
        parcels: &[ReadyParcel],
    ) -> Vec<AssistantSuggestion> {
        let mut suggestions = Vec::new();

        match request.goal.as_str() {
            "create_contour" => {
                suggestions.push(AssistantSuggestion {
                    title: "Нарисуйте границы на карте".to_string(),
                    description: "Используйте инструмент рисования, чтобы очертить примерные границы участка.".to_string(),
                    action: "draw_contour".to_string(),
                });
                suggestions.push(AssistantSuggestion {
                    title: "Загрузите координаты".to_string(),
                    description: "Если у вас есть координаты в формате CSV или JSON, загрузите их для точного построения контура.".to_string(),
                    action: "upload_coordinates".to_string(),
                });
            }
            "choose_parcel" => {
                suggestions.push(AssistantSuggestion {
                    title: "Просмотрите готовые участки".to_string(),
                    description: "Сервис содержит перечни участков для стройки и туризма. Выберите подходящий вариант.".to_string(),
                    action: "list_ready_parcels".to_string(),
                });
                for parcel in parcels {
                    let matches = request
                        .preferred_category
                        .map_or(true, |category| parcel.category == category);
                    if matches {
                        suggestions.push(AssistantSuggestion {
                            title: parcel.name.clone(),
                            description: parcel.description.clone(),
                            action: format!("select_parcel:{}", parcel.id),
                        });
                    }
                }
            }
            "prepare_documents" => {
                if request.has_contour {
                    suggestions.push(AssistantSuggestion {
                        title: "Сформируйте комплект документов".to_string(),
                        description: "Используйте созданный контур, чтобы автоматически собрать необходимый пакет.".to_string(),
                        action: "generate_documents".to_string(),
                    });
                } else {
                    suggestions.push(AssistantSuggestion {
                        title: "Выберите основу для документов".to_string(),
                        description: "Создайте контур или выберите готовый участок, чтобы приступить к подготовке документов.".to_string(),
                        action: "choose_source".to_string(),
                    });
                }
            }
            _ => {
                suggestions.push(AssistantSuggestion {
                    title: "Изучите руководство".to_string(),
                    description: "Не уверены, с чего начать? Ознакомьтесь с описанием сервиса и примерами жизненных ситуаций.".to_string(),
                    action: "open_help".to_string(),
                });
            }
        }

        suggestions
    }
}
