//! Deferred, retryable initialization of configuration tables.

use std::fmt;

use once_cell::sync::OnceCell;

/// A value built by its initializer on first access.
///
/// Unlike a plain `static`, construction is deferred until somebody actually asks for the
/// value, and a failing initializer does not poison the cell: the error is handed to the
/// caller and the next access simply tries again.
pub struct LazyInit<T, E = crate::Error> {
    cell: OnceCell<T>,
    init: fn() -> Result<T, E>,
}

impl<T, E> LazyInit<T, E> {
    /// Creates an empty cell that will run `init` on first access.
    #[must_use]
    pub const fn new(init: fn() -> Result<T, E>) -> Self {
        Self {
            cell: OnceCell::new(),
            init,
        }
    }

    /// Returns the value, running the initializer if it has not succeeded yet.
    ///
    /// # Errors
    ///
    /// Returns whatever the initializer returned when it failed.
    pub fn get(&self) -> Result<&T, E> {
        self.cell.get_or_try_init(self.init)
    }

    /// Returns the value only if it has already been initialized.
    #[must_use]
    pub fn get_initialized(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Returns a mutable reference, initializing first if needed.
    ///
    /// # Errors
    ///
    /// Returns whatever the initializer returned when it failed.
    pub fn get_mut(&mut self) -> Result<&mut T, E> {
        if self.cell.get().is_none() {
            let value = (self.init)()?;
            // The cell is exclusively borrowed, so nobody can have filled it meanwhile.
            let _ = self.cell.set(value);
        }
        Ok(self
            .cell
            .get_mut()
            .unwrap_or_else(|| unreachable!("cell was just initialized")))
    }

    /// Drops the current value so the next access runs the initializer again.
    pub fn reset(&mut self) {
        self.cell.take();
    }
}

impl<T: fmt::Debug, E> fmt::Debug for LazyInit<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyInit")
            .field("value", &self.cell.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::LazyInit;

    /// Failure Is Retryable
    /// A failing initializer surfaces its error and is called again on the next access.
    #[test]
    fn test_failing_initializer() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);

        let lazy: LazyInit<bool, &str> = LazyInit::new(|| {
            CALLS.fetch_add(1, Ordering::SeqCst);
            Err("boom")
        });

        assert_eq!(lazy.get(), Err("boom"));
        assert_eq!(lazy.get(), Err("boom"));
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
        assert!(lazy.get_initialized().is_none());
    }

    /// Deferred Construction
    /// The value only exists after the first access and can be mutated and reset.
    #[test]
    fn test_access_and_reset() {
        let mut lazy: LazyInit<String, ()> = LazyInit::new(|| Ok("test".to_owned()));
        assert!(lazy.get_initialized().is_none());

        assert_eq!(lazy.get().map(String::as_str), Ok("test"));
        lazy.get_mut().unwrap().clear();
        assert_eq!(lazy.get().map(String::as_str), Ok(""));

        lazy.reset();
        assert_eq!(lazy.get().map(String::as_str), Ok("test"));
    }
}
