use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct WriteNoteParams {
    #[schemars(
        description = "Path relative to the notes directory. Omit to derive one from the title."
    )]
    pub path: Option<String>,

    #[schemars(description = "Title used to generate a path when none is given")]
    pub title: Option<String>,

    #[schemars(description = "Markdown content; replaces any existing note at the path")]
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct NotePathParams {
    #[schemars(description = "Path relative to the notes directory")]
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct MoveNoteParams {
    pub old_path: String,

    pub new_path: String,
}
