//! Lookup table from mission type to pipeline.

use std::collections::HashMap;
use std::sync::Arc;

use super::pipeline::MissionPipeline;
use super::pipelines::{
    CoachingSweep, InsuranceOptimization, PreshiftSweep, SafetyInvestigation, WellnessCheck,
};
use super::types::MissionType;

#[derive(Clone, Default)]
pub struct MissionRegistry {
    pipelines: HashMap<MissionType, Arc<dyn MissionPipeline>>,
}

impl MissionRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with all five built-in pipelines.
    pub fn with_default_pipelines() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(CoachingSweep));
        registry.register(Arc::new(WellnessCheck));
        registry.register(Arc::new(SafetyInvestigation));
        registry.register(Arc::new(InsuranceOptimization));
        registry.register(Arc::new(PreshiftSweep));
        registry
    }

    /// Register a pipeline, replacing any previous one for its type.
    pub fn register(&mut self, pipeline: Arc<dyn MissionPipeline>) {
        self.pipelines.insert(pipeline.mission_type(), pipeline);
    }

    pub fn get(&self, mission_type: MissionType) -> Option<Arc<dyn MissionPipeline>> {
        self.pipelines.get(&mission_type).cloned()
    }

    /// Registered types, in declaration order.
    pub fn types(&self) -> Vec<MissionType> {
        MissionType::ALL
            .into_iter()
            .filter(|t| self.pipelines.contains_key(t))
            .collect()
    }
}
