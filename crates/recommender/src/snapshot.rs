//! Atomic holder for the served collaborative-model snapshot.

use engines::{EngineError, FactorModel, Result};
use std::sync::{Arc, RwLock};

/// The slot the serving path reads the collaborative model from.
///
/// Training builds a complete [`FactorModel`] off to the side and
/// [`ModelHandle::install`]s it: one pointer swap under a short write
/// lock. Readers clone the `Arc`, so an in-flight request keeps the
/// snapshot it started with even if a newer model lands mid-request —
/// nobody ever observes a partially updated model.
#[derive(Debug, Default)]
pub struct ModelHandle {
    slot: RwLock<Option<Arc<FactorModel>>>,
}

impl ModelHandle {
    /// A handle with no model installed yet
    pub fn empty() -> Self {
        Self::default()
    }

    /// Atomically replace the served snapshot
    pub fn install(&self, model: FactorModel) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = Some(Arc::new(model));
    }

    /// The currently served snapshot, or [`EngineError::ModelUnavailable`]
    /// if training has not completed yet
    pub fn current(&self) -> Result<Arc<FactorModel>> {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or_else(|| EngineError::model_unavailable("no trained model installed"))
    }

    pub fn is_loaded(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engines::{CancelToken, TrainConfig};

    fn tiny_model() -> FactorModel {
        let triples = vec![(1, 1, 4.0), (1, 2, 2.0), (2, 1, 5.0), (2, 2, 1.0)];
        FactorModel::train_on_triples(&triples, &TrainConfig::default(), &CancelToken::new())
            .unwrap()
    }

    #[test]
    fn test_empty_handle_is_unavailable() {
        let handle = ModelHandle::empty();
        assert!(!handle.is_loaded());
        assert!(matches!(
            handle.current(),
            Err(EngineError::ModelUnavailable { .. })
        ));
    }

    #[test]
    fn test_install_makes_model_available() {
        let handle = ModelHandle::empty();
        handle.install(tiny_model());
        assert!(handle.is_loaded());
        assert!(handle.current().is_ok());
    }

    #[test]
    fn test_reader_keeps_old_snapshot_across_swap() {
        let handle = ModelHandle::empty();
        handle.install(tiny_model());
        let held = handle.current().unwrap();

        handle.install(tiny_model());
        let fresh = handle.current().unwrap();

        // The held Arc still points at the old snapshot
        assert!(!Arc::ptr_eq(&held, &fresh));
        assert!(held.predict(1, 2).is_some());
    }
}
