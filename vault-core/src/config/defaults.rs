// Single source of truth for all default values.

// --- Routing ---
pub const DEFAULT_MF_THRESHOLD_HIGH: f64 = 0.75;
pub const DEFAULT_SEMANTIC_POLARITY_THRESHOLD: f64 = 0.5;
pub const DEFAULT_ENTROPY_BALANCE_THRESHOLD: f64 = 0.26;
pub const DEFAULT_CLS_ANGLE_PROXIMITY_DEG: f64 = 15.0;

// --- Friction ---
pub const DEFAULT_MFG_THRESHOLD: f64 = 0.5;
pub const DEFAULT_SCAR_DELAY_CYCLES: u32 = 2;
pub const DEFAULT_FRICTION_EMA_ALPHA: f64 = 0.3;
pub const DEFAULT_FRICTION_LOAD_REFERENCE: f64 = 25.0;
pub const DEFAULT_RESOLVED_TICKET_CAPACITY: usize = 4096;

// --- Fracture ---
pub const DEFAULT_VSI_FRACTURE_THRESHOLD: f64 = 0.8;
pub const DEFAULT_VSI_STRESS_THRESHOLD: f64 = 0.6;
pub const DEFAULT_FRACTURE_ISOLATION_CYCLES: u32 = 3;
pub const DEFAULT_FALLBACK_THROTTLE_RATE: usize = 50;
pub const DEFAULT_DIVERGENCE_QUARANTINE_IDI: f64 = 0.72;
pub const DEFAULT_DIVERGENCE_SUSPEND_IDI: f64 = 0.80;
pub const DEFAULT_ECHO_FRICTION_THRESHOLD: f64 = 0.68;

// --- Optimization triggers ---
pub const DEFAULT_DRIFT_DEPTH_THRESHOLD: u32 = 12;
pub const DEFAULT_DRIFT_FRACTION_THRESHOLD: f64 = 0.10;
pub const DEFAULT_SCAR_DENSITY_THRESHOLD: usize = 25;
pub const DEFAULT_DENSITY_WINDOW_CYCLES: u64 = 100;
pub const DEFAULT_ENTROPY_SLOPE_THRESHOLD: f64 = 0.05;
pub const DEFAULT_ENTROPY_HISTORY_WINDOW: usize = 500;
pub const DEFAULT_THREAD_OVERLAP_THRESHOLD: f64 = 0.85;
pub const DEFAULT_MEMORY_USAGE_THRESHOLD: f64 = 0.90;

// --- Optimization pass ---
pub const DEFAULT_LOW_ENTROPY_CLUSTER_CUTOFF: f64 = 0.43;
pub const DEFAULT_MAX_COMPACTION_CLUSTER_SIZE: usize = 5;
pub const DEFAULT_COMPRESSION_ENTROPY_THRESHOLD: f64 = 5.0;
pub const DEFAULT_COMPRESSION_KEEP_FEATURES: usize = 8;

// --- Retention ---
pub const DEFAULT_IRS_CUTOFF: f64 = 0.12;
pub const DEFAULT_IRS_EPSILON: f64 = 1e-6;
pub const DEFAULT_RETENTION_GRACE_PASSES: u32 = 1;

// --- Capacity ---
pub const DEFAULT_MAX_ACTIVE_PER_SHARD: usize = 10_000;
pub const DEFAULT_SYMBOLIC_CAPACITY: usize = 10_000;

// --- Variants ---
pub const DEFAULT_FOSSIL_GRACE_PASSES: u32 = 3;
pub const DEFAULT_CONTRADICTION_MUTATION_SCORE: f64 = 80.0;
pub const DEFAULT_CONTRADICTION_MUTATION_AMPLITUDE: f64 = 0.05;
pub const DEFAULT_EXPRESSION_OVERLAP_THRESHOLD: f64 = 0.7;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_AUDIT_TRAIL_CAPACITY: usize = 1024;
