use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cabinet-wide display toggles shared between the actors.
///
/// Each flag has exactly one writer: the input actor flips `monochrome`, the
/// emulation actor flips `cocktail`. The presentation actor only reads them once
/// per frame, so `Relaxed` is enough; a toggle may show up one frame late.
#[derive(Clone, Debug)]
pub struct ModeFlags {
    monochrome: Arc<AtomicBool>,
    cocktail: Arc<AtomicBool>,
}

impl ModeFlags {
    pub fn new(monochrome: bool, cocktail: bool) -> Self {
        Self {
            monochrome: Arc::new(AtomicBool::new(monochrome)),
            cocktail: Arc::new(AtomicBool::new(cocktail)),
        }
    }

    pub fn monochrome(&self) -> bool {
        self.monochrome.load(Ordering::Relaxed)
    }

    pub fn cocktail(&self) -> bool {
        self.cocktail.load(Ordering::Relaxed)
    }

    /// Returns the new value.
    pub fn toggle_monochrome(&self) -> bool {
        !self.monochrome.fetch_xor(true, Ordering::Relaxed)
    }

    /// Returns the new value.
    pub fn toggle_cocktail(&self) -> bool {
        !self.cocktail.fetch_xor(true, Ordering::Relaxed)
    }
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self::new(true, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggles_are_shared_between_clones() {
        let modes = ModeFlags::default();
        let reader = modes.clone();
        assert!(reader.monochrome());
        assert!(!modes.toggle_monochrome());
        assert!(!reader.monochrome());
        assert!(modes.toggle_cocktail());
        assert!(reader.cocktail());
    }
}
