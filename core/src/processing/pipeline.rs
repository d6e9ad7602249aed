use crate::prelude::{Sample, Stage, StageError, StageResult};
use crate::telemetry::log::LogManager;

/// An ordered, mutable composition of stages. A sample pushed in is
/// transformed by each stage in insertion order; the final sample pops
/// out.
///
/// Structural edits are not safe to interleave with an in-flight
/// `push`; callers serialize edits against pushes, typically by
/// quiescing the producer first.
pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
    logger: LogManager,
}

impl Pipeline {
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            logger: LogManager::new("pipeline"),
        }
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Feeds the sample through every stage in insertion order.
    pub fn push(&mut self, sample: Sample) -> Sample {
        let mut current = sample;
        for stage in &mut self.stages {
            current = stage.process(current);
        }
        current
    }

    /// Appends a stage to the end of the pipeline.
    pub fn add_stage(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
        self.logger
            .record_debug(&format!("stage added, len {}", self.stages.len()));
    }

    /// Removes and returns the stage at `index`.
    pub fn remove_stage(&mut self, index: usize) -> StageResult<Box<dyn Stage>> {
        if index >= self.stages.len() {
            return Err(StageError::StageIndex(index));
        }
        let stage = self.stages.remove(index);
        self.logger
            .record_debug(&format!("stage {} removed, len {}", index, self.stages.len()));
        Ok(stage)
    }

    /// Swaps the stages at the two indices.
    pub fn swap_stages(&mut self, first: usize, second: usize) -> StageResult<()> {
        let len = self.stages.len();
        if first >= len {
            return Err(StageError::StageIndex(first));
        }
        if second >= len {
            return Err(StageError::StageIndex(second));
        }
        self.stages.swap(first, second);
        self.logger
            .record_debug(&format!("stages {} and {} swapped", first, second));
        Ok(())
    }

    /// Mutable access to a stage, e.g. for tap attachment or control
    /// routing through `as_any_mut`.
    pub fn stage_mut(&mut self, index: usize) -> Option<&mut dyn Stage> {
        match self.stages.get_mut(index) {
            Some(stage) => Some(stage.as_mut()),
            None => None,
        }
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::Tap;
    use std::any::Any;

    struct Offset {
        amount: f64,
        tap: Tap,
    }

    impl Offset {
        fn new(amount: f64) -> Self {
            Self {
                amount,
                tap: Tap::new(),
            }
        }
    }

    impl Stage for Offset {
        fn process(&mut self, sample: Sample) -> Sample {
            self.tap.emit(Sample::new(sample.t, sample.v + self.amount))
        }

        fn tap(&mut self) -> &mut Tap {
            &mut self.tap
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Scale {
        factor: f64,
        tap: Tap,
    }

    impl Stage for Scale {
        fn process(&mut self, sample: Sample) -> Sample {
            self.tap.emit(Sample::new(sample.t, sample.v * self.factor))
        }

        fn tap(&mut self) -> &mut Tap {
            &mut self.tap
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    #[test]
    fn push_applies_stages_in_insertion_order() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(Box::new(Offset::new(1.0)));
        pipeline.add_stage(Box::new(Scale {
            factor: 10.0,
            tap: Tap::new(),
        }));

        // (2 + 1) * 10, not 2 * 10 + 1
        let out = pipeline.push(Sample::new(0.0, 2.0));
        assert_eq!(out.v, 30.0);
    }

    #[test]
    fn swap_reorders_processing() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(Box::new(Offset::new(1.0)));
        pipeline.add_stage(Box::new(Scale {
            factor: 10.0,
            tap: Tap::new(),
        }));
        pipeline.swap_stages(0, 1).unwrap();

        let out = pipeline.push(Sample::new(0.0, 2.0));
        assert_eq!(out.v, 21.0);
    }

    #[test]
    fn remove_shrinks_pipeline() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(Box::new(Offset::new(1.0)));
        assert_eq!(pipeline.len(), 1);
        pipeline.remove_stage(0).unwrap();
        assert!(pipeline.is_empty());
        assert!(matches!(
            pipeline.remove_stage(0),
            Err(StageError::StageIndex(0))
        ));
    }

    #[test]
    fn stage_mut_exposes_the_concrete_stage() {
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(Box::new(Offset::new(1.0)));

        let stage = pipeline.stage_mut(0).unwrap();
        assert!(stage.as_any_mut().downcast_mut::<Offset>().is_some());
        assert!(pipeline.stage_mut(1).is_none());
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let mut pipeline = Pipeline::new();
        let sample = Sample::new(1.0, -4.0);
        assert_eq!(pipeline.push(sample), sample);
    }
}
