pub const MIN_SAMPLES_SPLIT: usize = 2;
pub const CHI_SQUARE_THRESHOLD: f64 = 0.05;
pub const PRUNE_SAMPLE_SIZE: usize = 1000;
