use crate::config::ProgressStrategy;
use crate::view::ProgressSurface;
use std::time::Duration;

const FIXED_CAP: f64 = 90.0;
const FIXED_STEP: f64 = 10.0;
const STAGED_CAP: f64 = 85.0;

const STAGE_CAPTIONS: [&str; 5] = [
    "Subiendo archivos...",
    "Extrayendo texto...",
    "Procesando contenido...",
    "Generando embeddings...",
    "Creando índices...",
];

pub const STARTING_CAPTION: &str = "Iniciando...";
pub const COMPLETED_CAPTION: &str = "Completado";

/// Simulated upload progress. Purely cosmetic: no transfer signal feeds it.
#[derive(Debug, Clone)]
pub struct ProgressModel {
    strategy: ProgressStrategy,
    progress: f64,
    stage: usize,
}

impl ProgressModel {
    pub fn new(strategy: ProgressStrategy) -> Self {
        Self { strategy, progress: 0.0, stage: 0 }
    }

    pub fn period(&self) -> Duration {
        match self.strategy {
            ProgressStrategy::Fixed => Duration::from_millis(200),
            ProgressStrategy::Staged => Duration::from_millis(250),
        }
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Advance one tick. `jitter` in `[0, 1)` sizes a staged increment and is
    /// ignored by the fixed strategy. Returns the new caption, or `None` once
    /// the cap is reached.
    pub fn advance(&mut self, jitter: f64) -> Option<String> {
        match self.strategy {
            ProgressStrategy::Fixed => {
                if self.progress >= FIXED_CAP {
                    return None;
                }
                self.progress = (self.progress + FIXED_STEP).min(FIXED_CAP);
                Some(format!("Subiendo... {}%", self.progress.round()))
            }
            ProgressStrategy::Staged => {
                if self.progress >= STAGED_CAP {
                    return None;
                }
                self.progress = (self.progress + jitter * 12.0 + 3.0).min(STAGED_CAP);
                let stage = (self.progress / 20.0).floor() as usize;
                if stage < STAGE_CAPTIONS.len() {
                    self.stage = stage;
                }
                Some(format!("{} {}%", STAGE_CAPTIONS[self.stage], self.progress.round()))
            }
        }
    }

    pub fn apply(&self, caption: String, surface: &mut ProgressSurface) {
        surface.percent = self.progress;
        surface.caption = caption;
    }
}
