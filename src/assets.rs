//! Asynchronously loaded resources
//!
//! Assets arrive through completion callbacks some frames after they are
//! requested. Until then consumers see `Pending::Loading` and skip whatever
//! needed the resource; the simulation never waits on a load.

/// A resource that may not have arrived yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending<T> {
    Loading,
    Ready(T),
}

impl<T> Default for Pending<T> {
    fn default() -> Self {
        Pending::Loading
    }
}

impl<T> Pending<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Pending::Ready(_))
    }

    /// Store the loaded resource, replacing anything already there
    pub fn resolve(&mut self, value: T) {
        *self = Pending::Ready(value);
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Pending::Ready(value) => Some(value),
            Pending::Loading => None,
        }
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        match self {
            Pending::Ready(value) => Some(value),
            Pending::Loading => None,
        }
    }

    /// Run `f` on the resource if it has arrived; no-op otherwise
    pub fn with<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.get_mut().map(f)
    }
}

/// Completion callback handed to an asset provider
pub type OnReady<T> = Box<dyn FnOnce(T)>;

/// Source of loaded assets (meshes are opaque to the core; audio is driven by it)
pub trait AssetProvider {
    type Audio;

    /// Start loading an audio file; `on_ready` runs once it can be played
    fn load_audio(&mut self, path: &'static str, on_ready: OnReady<Self::Audio>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_is_noop() {
        let mut slot: Pending<u32> = Pending::default();
        assert!(!slot.is_ready());
        assert_eq!(slot.with(|v| *v += 1), None);
        assert_eq!(slot.get(), None);
    }

    #[test]
    fn test_resolve() {
        let mut slot = Pending::Loading;
        slot.resolve(5);
        assert!(slot.is_ready());
        slot.with(|v| *v += 1);
        assert_eq!(slot.get(), Some(&6));
    }
}
