use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct CreateDrawingParams {
    #[schemars(description = "File name of the drawing, without directories; '.excalidraw' is added")]
    pub name: String,

    pub title: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadDrawingParams {
    pub name: String,

    #[schemars(
        description = "Omit fields equal to their defaults to save tokens (default: true)"
    )]
    pub compressed: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct AppendElementsParams {
    pub name: String,

    #[schemars(
        description = "Partial Excalidraw elements. Missing style fields are filled from the design system; at minimum give type, x, y, width, height."
    )]
    pub elements: Vec<Map<String, Value>>,

    #[schemars(
        description = "Replace element ids that collide with existing ones (default: true). When false, a collision is an error."
    )]
    pub regenerate_ids: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct DrawingNameParams {
    #[schemars(description = "File name of the drawing")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct ReadLibraryParams {
    #[schemars(description = "File name of the library; '.excalidrawlib' is added")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct UpdateDesignSystemParams {
    #[schemars(description = "Style key, e.g. 'strokeColor', 'roughness', 'fontSize'")]
    pub key: String,

    #[schemars(description = "New value for the key")]
    pub value: Value,
}
