use super::entities::ComponentType;
use serde::Deserialize;
use ts_rs::TS;

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "grading.ts")]
pub struct CreateGradingComponentRequest {
    pub name: String,
    pub component_type: ComponentType,
    pub weight: f64,
    pub max_score: f64,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "grading.ts")]
pub struct UpdateGradingComponentRequest {
    pub name: Option<String>,
    pub component_type: Option<ComponentType>,
    pub weight: Option<f64>,
    pub max_score: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "grading.ts")]
pub struct RecordScoreRequest {
    pub component_id: i64,
    pub score: f64,
}
