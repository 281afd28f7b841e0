use std::cell::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;

use super::loader::{load_file, LoadError};
use super::model::Dataset;

/// Anything that can produce the passenger table.
pub trait DatasetSource {
    fn load(&self) -> Result<Dataset, LoadError>;

    /// Human-readable description for status messages.
    fn describe(&self) -> String;
}

/// A dataset read from a file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileSource { path: path.into() }
    }
}

impl DatasetSource for FileSource {
    fn load(&self) -> Result<Dataset, LoadError> {
        load_file(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Load-once memoization of a [`DatasetSource`].
///
/// The first successful [`get`](Self::get) reads the source; every later call
/// returns the same `Arc` without touching it again. There is no
/// invalidation: a different source needs a new cache. Failed loads are not
/// remembered, so the next call retries.
pub struct DatasetCache {
    source: Box<dyn DatasetSource>,
    dataset: OnceCell<Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(source: Box<dyn DatasetSource>) -> Self {
        DatasetCache {
            source,
            dataset: OnceCell::new(),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(Box::new(FileSource::new(path)))
    }

    pub fn get(&self) -> Result<Arc<Dataset>, LoadError> {
        if let Some(ds) = self.dataset.get() {
            log::debug!("Dataset cache hit for {}", self.source.describe());
            return Ok(Arc::clone(ds));
        }
        let loaded = Arc::new(self.source.load()?);
        Ok(Arc::clone(self.dataset.get_or_init(|| loaded)))
    }

    /// The cached dataset, if it has been loaded already.
    pub fn peek(&self) -> Option<&Arc<Dataset>> {
        self.dataset.get()
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell as CallCount;
    use std::rc::Rc;

    use super::*;
    use crate::data::model::tests::record;
    use crate::data::model::{Passenger, Pclass, Port, Sex};

    struct CountingSource {
        calls: Rc<CallCount<usize>>,
        fail_first: bool,
    }

    impl DatasetSource for CountingSource {
        fn load(&self) -> Result<Dataset, LoadError> {
            let n = self.calls.get() + 1;
            self.calls.set(n);
            if self.fail_first && n == 1 {
                return Err(LoadError::Malformed("first read fails".into()));
            }
            let p = Passenger::new(record(Pclass::First, Sex::Female, Port::Cherbourg, true));
            Ok(Dataset::new(vec![p], "memory"))
        }

        fn describe(&self) -> String {
            "memory".into()
        }
    }

    #[test]
    fn loads_exactly_once() {
        let calls = Rc::new(CallCount::new(0));
        let cache = DatasetCache::new(Box::new(CountingSource {
            calls: calls.clone(),
            fail_first: false,
        }));
        assert!(cache.peek().is_none());

        let a = cache.get().unwrap();
        let b = cache.get().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(calls.get(), 1);
        assert!(cache.peek().is_some());
    }

    #[test]
    fn failed_load_is_not_cached() {
        let calls = Rc::new(CallCount::new(0));
        let cache = DatasetCache::new(Box::new(CountingSource {
            calls: calls.clone(),
            fail_first: true,
        }));
        assert!(matches!(cache.get(), Err(LoadError::Malformed(_))));
        assert!(cache.peek().is_none());
        assert_eq!(cache.get().unwrap().len(), 1);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn missing_file_surfaces_not_found() {
        let cache = DatasetCache::from_path("/no/such/dir/Titanic.csv");
        assert!(matches!(cache.get(), Err(LoadError::NotFound(_))));
    }
}
