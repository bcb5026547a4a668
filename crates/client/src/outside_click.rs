use std::sync::{Arc, Mutex, PoisonError};

/// The element a pointer event landed on, as the chain of element ids from
/// the target up to the document root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerTarget {
    path: Vec<String>,
}

impl PointerTarget {
    pub fn new<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Whether the target is the element `id` or one of its descendants.
    pub fn is_within(&self, id: &str) -> bool {
        self.path.iter().any(|element| element == id)
    }
}

/// A component that closes when the user clicks somewhere else.
pub trait Dismissable: Send + Sync {
    /// Returns `true` if the component was open and is now closed.
    fn dismiss_if_outside(&self, target: &PointerTarget) -> bool;
}

/// The page's single click listener.
///
/// Each registered component runs its own containment test on every click.
/// One router is created per page binding, not per process.
#[derive(Default)]
pub struct OutsideClickRouter {
    components: Mutex<Vec<Arc<dyn Dismissable>>>,
}

impl OutsideClickRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, component: Arc<dyn Dismissable>) {
        self.components
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(component);
    }

    pub fn len(&self) -> usize {
        self.components
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dispatches a click to every component; returns how many closed.
    pub fn on_click(&self, target: &PointerTarget) -> usize {
        let components = self
            .components
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();

        components
            .iter()
            .filter(|component| component.dismiss_if_outside(target))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Panel {
        ids: Vec<&'static str>,
        open: AtomicBool,
    }

    impl Dismissable for Panel {
        fn dismiss_if_outside(&self, target: &PointerTarget) -> bool {
            if self.ids.iter().any(|id| target.is_within(id)) {
                return false;
            }
            self.open.swap(false, Ordering::SeqCst)
        }
    }

    #[test]
    fn test_each_component_tests_its_own_containment() {
        let athlete = Arc::new(Panel {
            ids: vec!["athleteSearch", "athleteResults"],
            open: AtomicBool::new(true),
        });
        let guide = Arc::new(Panel {
            ids: vec!["guideSearch", "guideResults"],
            open: AtomicBool::new(true),
        });

        let router = OutsideClickRouter::new();
        router.register(athlete.clone());
        router.register(guide.clone());
        assert_eq!(router.len(), 2);

        let click = PointerTarget::new(["row7", "guideResults", "body"]);
        assert_eq!(router.on_click(&click), 1);
        assert!(!athlete.open.load(Ordering::SeqCst));
        assert!(guide.open.load(Ordering::SeqCst));

        assert_eq!(router.on_click(&PointerTarget::new(["body"])), 1);
        assert_eq!(router.on_click(&PointerTarget::new(["body"])), 0);
    }
}
