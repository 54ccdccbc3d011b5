// DOM hooks and render tuning for the browser host

// Element ids
pub const CANVAS_ID: &str = "backdrop-canvas";
pub const CONTAINER_ID: &str = "backdrop-container";
pub const PROJECTS_ID: &str = "projects";
pub const SEARCH_ID: &str = "project-search";
pub const CATEGORY_ID: &str = "project-category";

// Attributes
pub const PROJECT_ATTR: &str = "data-project"; // card → project key
pub const BADGE_ATTR: &str = "data-badge"; // clickable tag/category badge
pub const CATEGORIES_ATTR: &str = "data-categories"; // space-separated on each card
pub const HELLO_WORD_SELECTOR: &str = "[data-hello-word]";
pub const PROJECT_SELECTOR: &str = "[data-project]";

// Canvas fade when the readiness gate flips
pub const CANVAS_FADE_MS: u32 = 420;

// Greeting rotation period
pub const GREETING_ROTATE_MS: i32 = 2600;

// Frames longer than this are treated as a stall (tab switch) rather than time passing
pub const MAX_FRAME_DELTA_SEC: f32 = 0.1;

// Sprite sizes in world units
pub const STAR_SIZE: f32 = 0.22;
pub const BREATH_SIZE: f32 = 0.14;
pub const WAVE_SIZE: f32 = 0.12;
pub const SPARKLE_SIZE: f32 = 0.06;
pub const MODEL_SPRITE_SIZE: f32 = 2.4; // multiplied by the instance scale
pub const PROP_SPRITE_SIZE: f32 = 0.9;

// GPU buffer capacities
pub const MAX_SPRITES: usize = 16_384;
pub const MAX_MESH_VERTICES: usize = 2_048;
pub const MAX_MESH_INDICES: usize = 8_192;

pub const CLEAR_COLOR: [f64; 3] = [0.01, 0.01, 0.02];
