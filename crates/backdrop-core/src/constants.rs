use glam::Vec3;

// Shared tuning constants for the backdrop fields, camera rig and gate.

// Activation
pub const VISIBILITY_EPSILON: f32 = 0.01; // render/skip threshold for a field's opacity
pub const DEFAULT_FADE_RATE: f32 = 5.0; // per second
pub const SLOW_FADE_RATE: f32 = 4.0; // polygons and model instances

// Starfield / base particles
pub const STARFIELD_COUNT: usize = 5000;
pub const STARFIELD_PEAK_OPACITY: f32 = 0.85;
pub const STARFIELD_CUBE_SIDE: f32 = 120.0;
pub const STARFIELD_MORPH_RATE: f32 = 1.5; // layout morph factor per second
pub const LOGO_SCALE: f32 = 6.5;
pub const LOGO_SLAB_SHARE: f32 = 0.75; // fraction of particles forming the red slab
pub const LOGO_WOBBLE_AMPLITUDE: f32 = 1.3;
pub const LOGO_RED: [f32; 3] = [1.0, 0.0, 0.2];
pub const LOGO_WHITE: [f32; 3] = [1.0, 1.0, 1.0];

// Breather
pub const BREATHER_COUNT: usize = 4500;
pub const BREATHER_PEAK_OPACITY: f32 = 0.95;
pub const BREATHER_MAX_RADIUS: f32 = 12.0;

// Wavefield
pub const WAVEFIELD_COLUMNS: usize = 110;
pub const WAVEFIELD_ROWS: usize = 44;
pub const WAVEFIELD_SPACING: f32 = 0.42;
pub const WAVEFIELD_PEAK_OPACITY: f32 = 0.9;
pub const WAVEFIELD_AMPLITUDE: f32 = 1.7;

// Polygon field
pub const POLYGON_COUNT: usize = 60;
pub const POLYGON_MIN_VERTICES: usize = 4;
pub const POLYGON_MAX_EXTRA_VERTICES: usize = 14; // vertices per polygon in [4, 4 + 14)
pub const POLYGON_ZONE_RADIUS: [f32; 3] = [10.0, 12.0, 30.0];
pub const POLYGON_FILL_PEAK_OPACITY: f32 = 0.55;
pub const POLYGON_WIRE_PEAK_OPACITY: f32 = 0.66;

// Instanced model field
pub const MODEL_INSTANCE_COUNT: usize = 50;
pub const MODEL_SPREAD: f32 = 75.0;
pub const MODEL_MAX_SPIN: f32 = 0.1; // radians per second, either direction

// Poster field
pub const POSTER_TEXTURE_COUNT: usize = 62;
pub const POSTER_TOTAL_IMAGES: usize = 120;
pub const POSTER_BASE_SPREAD: f32 = 9.0;
pub const POSTER_SPREAD_PER_TEXTURE: f32 = 0.4;
pub const POSTER_PLANE_SCALE: f32 = 1.6;
pub const POSTER_SPRING_K: f32 = 2.2;
pub const POSTER_DAMPING: f32 = 0.88;
pub const POSTER_VELOCITY_SCALE: f32 = 60.0; // spring velocity is expressed per 60 Hz frame
pub const POSTER_IDLE_INTERVAL: f64 = 0.12; // seconds between ramp batches
pub const POSTER_LINGER_SEC: f64 = 0.6; // keep posters mounted while they fade out

// Choreography
pub const NAIL_TEXTURE_COUNT: usize = 6;
pub const TEXTURE_PICK_ATTEMPTS: usize = 6;
pub const SPARKLE_COUNT: usize = 80;
pub const OVERLAY_COMMIT_THRESHOLD: f32 = 0.98;
pub const CURING_BLEND_WINDOW: f32 = 0.85; // fraction of curing used for the crossfade
pub const REAIM_DOT_THRESHOLD: f32 = 0.12;

// Camera rig
pub const CAMERA_FOV_DEGREES: f32 = 75.0;
pub const CAMERA_HOME: [f32; 3] = [0.0, 0.0, 25.0];
pub const CAMERA_FALLBACK: [f32; 3] = [0.0, 0.0, 35.0];
pub const CAMERA_TRANSITION_SEC: f32 = 0.9;
pub const CAMERA_HOME_TRANSITION_SEC: f32 = 1.0;
pub const AUTO_ROTATE_SPEED: f32 = 0.2; // orbit-controls units: 0.2 → one turn per 5 minutes

// Readiness gate
pub const GATE_EMPTY_DELAY_SEC: f64 = 0.12;
pub const GATE_SETTLE_DELAY_SEC: f64 = 0.08;
pub const GATE_FALLBACK_SEC: f64 = 7.0;

#[inline]
pub fn camera_home() -> Vec3 {
    Vec3::from(CAMERA_HOME)
}

#[inline]
pub fn camera_fallback() -> Vec3 {
    Vec3::from(CAMERA_FALLBACK)
}
