//! Simulated progress for long AI calls
//!
//! The backend reports no progress, so these values only move the bar while
//! a request is in flight. They never reach 100 until `complete` is called.

use rand::Rng;
use std::time::Duration;

/// Tick period of the concept progress bar
pub const CONCEPT_TICK: Duration = Duration::from_millis(200);

/// Tick period of the staged progress bars
pub const STAGED_TICK: Duration = Duration::from_millis(300);

const CONCEPT_CAP: f64 = 90.0;
const CONCEPT_MAX_STEP: f64 = 15.0;
const STAGED_CAP: f64 = 95.0;
const DONE_LABEL: &str = "완료!";

/// Random-step progress shown while concept text is generated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConceptProgress {
    value: f64,
}

impl ConceptProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by a uniform step in `[0, 15)`, holding at 90
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        if self.value < CONCEPT_CAP {
            let step = rng.random::<f64>() * CONCEPT_MAX_STEP;
            self.value = (self.value + step).min(CONCEPT_CAP);
        }
        self.value
    }

    pub fn complete(&mut self) {
        self.value = 100.0;
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn percent(&self) -> u32 {
        self.value.round() as u32
    }
}

/// One band of a staged progress bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stage {
    /// The band applies while the value is below this bound
    pub below: f64,
    pub step: f64,
    pub label: &'static str,
}

const STUDY_PLAN_STAGES: &[Stage] = &[
    Stage {
        below: 30.0,
        step: 2.0,
        label: "강의계획서 분석 중...",
    },
    Stage {
        below: 60.0,
        step: 1.5,
        label: "학습 스타일 분석 중...",
    },
    Stage {
        below: 90.0,
        step: 1.0,
        label: "AI 학습 계획 생성 중...",
    },
    Stage {
        below: f64::INFINITY,
        step: 0.5,
        label: "최종 검토 중...",
    },
];

const SYLLABUS_UPLOAD_STAGES: &[Stage] = &[
    Stage {
        below: 30.0,
        step: 2.0,
        label: "PDF 파일 업로드 중...",
    },
    Stage {
        below: 50.0,
        step: 1.5,
        label: "텍스트 추출 중...",
    },
    Stage {
        below: 90.0,
        step: 1.0,
        label: "AI 분석 중...",
    },
    Stage {
        below: f64::INFINITY,
        step: 0.5,
        label: "완료 중...",
    },
];

/// Deterministic progress that slows down band by band, holding at 95
#[derive(Debug, Clone, PartialEq)]
pub struct StagedProgress {
    value: f64,
    stages: &'static [Stage],
    label: &'static str,
}

impl StagedProgress {
    /// Bands used while a study plan is generated
    pub fn study_plan() -> Self {
        Self::with_stages(STUDY_PLAN_STAGES)
    }

    /// Bands used while a syllabus is uploaded and analysed
    pub fn syllabus_upload() -> Self {
        Self::with_stages(SYLLABUS_UPLOAD_STAGES)
    }

    fn with_stages(stages: &'static [Stage]) -> Self {
        Self {
            value: 0.0,
            stages,
            label: stages.first().map(|s| s.label).unwrap_or_default(),
        }
    }

    pub fn tick(&mut self) -> f64 {
        if self.value >= STAGED_CAP {
            self.value = STAGED_CAP;
            return self.value;
        }

        if let Some(stage) = self.stages.iter().find(|s| self.value < s.below) {
            self.label = stage.label;
            self.value = (self.value + stage.step).min(STAGED_CAP);
        }
        self.value
    }

    pub fn complete(&mut self) {
        self.value = 100.0;
        self.label = DONE_LABEL;
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn percent(&self) -> u32 {
        self.value.round() as u32
    }
}
